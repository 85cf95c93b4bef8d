//! Driver configuration.
//!
//! Configuration is validated eagerly and is immutable once constructed: a
//! driver never runs in a partially-configured state. The host framework
//! supplies configuration as a key-value property map, or it can be read
//! from the driver's environment variable namespace.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::error::Err;
use crate::{tracerr, Result};

/// Property key for the permitted origins, one or more comma-separated
/// https URLs.
pub const BASE_URL: &str = "baseUrl";

/// Property key for the document root directory.
pub const BASE_PATH: &str = "basePath";

/// Property key for the optional subfolder minted DIDs are placed under.
pub const GENERATED_FOLDER: &str = "generatedFolder";

const ENV_BASE_URL: &str = "DIDWEB_DRIVER_BASE_URL";
const ENV_BASE_PATH: &str = "DIDWEB_DRIVER_BASE_PATH";
const ENV_GENERATED_FOLDER: &str = "DIDWEB_DRIVER_GENERATED_FOLDER";

/// Validated driver configuration.
#[derive(Clone, Debug)]
pub struct Config {
    // configured origin list, kept verbatim for the properties echo
    base_url: String,
    origins: Vec<Url>,
    base_path: PathBuf,
    generated_folder: Option<String>,
}

impl Config {
    /// Construct a configuration from a property map, as supplied by a
    /// registrar host framework. Recognized keys are [`BASE_URL`],
    /// [`BASE_PATH`] and [`GENERATED_FOLDER`].
    ///
    /// # Errors
    ///
    /// Returns `Err::InvalidConfig` if a required property is missing or
    /// fails validation.
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self> {
        debug!("configuring from properties: {:?}", properties.keys());
        Self::build(
            properties.get(BASE_URL).map(String::as_str),
            properties.get(BASE_PATH).map(String::as_str),
            properties.get(GENERATED_FOLDER).map(String::as_str),
        )
    }

    /// Construct a configuration from the `DIDWEB_DRIVER_*` environment
    /// variables: `DIDWEB_DRIVER_BASE_URL`, `DIDWEB_DRIVER_BASE_PATH` and
    /// `DIDWEB_DRIVER_GENERATED_FOLDER`.
    ///
    /// # Errors
    ///
    /// Returns `Err::InvalidConfig` if a required variable is unset or
    /// fails validation.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var(ENV_BASE_URL).ok();
        let base_path = std::env::var(ENV_BASE_PATH).ok();
        let generated_folder = std::env::var(ENV_GENERATED_FOLDER).ok();
        Self::build(base_url.as_deref(), base_path.as_deref(), generated_folder.as_deref())
    }

    fn build(
        base_url: Option<&str>, base_path: Option<&str>, generated_folder: Option<&str>,
    ) -> Result<Self> {
        let Some(base_url) = base_url.map(str::trim).filter(|s| !s.is_empty()) else {
            tracerr!(Err::InvalidConfig, "base URL is not defined");
        };
        let mut origins = Vec::new();
        for part in base_url.split(',') {
            let origin = match Url::parse(part.trim()) {
                Ok(url) => url,
                Err(e) => tracerr!(Err::InvalidConfig, "cannot parse origin {}: {e}", part.trim()),
            };
            if origin.scheme() != "https" {
                tracerr!(Err::InvalidConfig, "origin is not https: {origin}");
            }
            if origin.host_str().is_none() {
                tracerr!(Err::InvalidConfig, "origin has no host: {origin}");
            }
            origins.push(origin);
        }

        let Some(base_path) = base_path.map(str::trim).filter(|s| !s.is_empty()) else {
            tracerr!(Err::InvalidConfig, "base path is not defined");
        };
        let base_path = PathBuf::from(base_path);
        if !base_path.exists() {
            warn!("base path {} does not exist", base_path.display());
            info!("creating base path directories");
            if let Err(e) = fs::create_dir_all(&base_path) {
                tracerr!(
                    Err::InvalidConfig,
                    "cannot create directories for base path {}: {e}",
                    base_path.display()
                );
            }
        }
        if !base_path.is_dir() {
            tracerr!(Err::InvalidConfig, "base path {} is not a directory", base_path.display());
        }
        check_writable(&base_path)?;

        let generated_folder =
            generated_folder.map(str::trim).filter(|s| !s.is_empty()).map(ToString::to_string);

        Ok(Self {
            base_url: base_url.to_string(),
            origins,
            base_path,
            generated_folder,
        })
    }

    /// The permitted origins, in configuration order.
    #[must_use]
    pub fn origins(&self) -> &[Url] {
        &self.origins
    }

    /// The document root directory.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// The subfolder minted DIDs are placed under, if one is configured.
    #[must_use]
    pub fn generated_folder(&self) -> Option<&str> {
        self.generated_folder.as_deref()
    }

    /// Whether `host` matches a configured origin's host. Hostname matching
    /// is case-insensitive.
    #[must_use]
    pub fn matches_host(&self, host: &str) -> bool {
        self.origins
            .iter()
            .any(|origin| origin.host_str().is_some_and(|h| h.eq_ignore_ascii_case(host)))
    }

    /// The first configured origin's host, used when minting a DID without
    /// an explicit host option.
    #[must_use]
    pub fn default_host(&self) -> &str {
        self.origins[0].host_str().unwrap_or_default()
    }

    /// The active configuration as a property map, for the host framework's
    /// read-only properties echo. The origin list is echoed as configured,
    /// not re-serialized from the parsed URLs.
    #[must_use]
    pub fn properties(&self) -> Map<String, Value> {
        let mut properties = Map::new();
        properties.insert(BASE_URL.to_string(), Value::from(self.base_url.clone()));
        properties.insert(BASE_PATH.to_string(), Value::from(self.base_path.display().to_string()));
        if let Some(folder) = &self.generated_folder {
            properties.insert(GENERATED_FOLDER.to_string(), Value::from(folder.clone()));
        }
        properties
    }
}

// Probe writability by creating and removing a scratch file. Checking
// permission bits is not enough: read-only mounts and ACLs only show up on
// an actual write.
fn check_writable(dir: &Path) -> Result<()> {
    let probe = dir.join(format!(".probe-{}", Uuid::new_v4()));
    if let Err(e) = fs::write(&probe, b"") {
        tracerr!(Err::InvalidConfig, "base path {} is not writable: {e}", dir.display());
    }
    if let Err(e) = fs::remove_file(&probe) {
        warn!("cannot remove probe file {}: {e}", probe.display());
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use tempfile::tempdir;

    use super::*;

    fn properties(base_url: &str, base_path: &str) -> HashMap<String, String> {
        let mut props = HashMap::new();
        props.insert(BASE_URL.to_string(), base_url.to_string());
        props.insert(BASE_PATH.to_string(), base_path.to_string());
        props
    }

    #[test]
    fn comma_separated_origins() {
        let dir = tempdir().expect("should create temp dir");
        let props = properties(
            "https://example.org, https://other.example.com",
            &dir.path().to_string_lossy(),
        );

        let config = Config::from_properties(&props).expect("should configure");
        assert_eq!(config.origins().len(), 2);
        assert_eq!(config.default_host(), "example.org");
        assert!(config.matches_host("EXAMPLE.ORG"));
        assert!(config.matches_host("other.example.com"));
        assert!(!config.matches_host("example.com"));
    }

    #[test]
    fn non_https_origin_rejected() {
        let dir = tempdir().expect("should create temp dir");
        let props = properties("http://example.org", &dir.path().to_string_lossy());

        let err = Config::from_properties(&props).expect_err("expected error");
        assert!(err.is(Err::InvalidConfig));
    }

    #[test]
    fn missing_base_url_rejected() {
        let dir = tempdir().expect("should create temp dir");
        let mut props = HashMap::new();
        props.insert(BASE_PATH.to_string(), dir.path().to_string_lossy().to_string());

        let err = Config::from_properties(&props).expect_err("expected error");
        assert!(err.is(Err::InvalidConfig));
    }

    #[test]
    fn missing_base_path_created() {
        let dir = tempdir().expect("should create temp dir");
        let nested = dir.path().join("dids").join("hosted");
        let props = properties("https://example.org", &nested.to_string_lossy());

        let config = Config::from_properties(&props).expect("should configure");
        assert!(nested.is_dir());
        assert_eq!(config.base_path(), nested);
    }

    #[cfg(unix)]
    #[test]
    fn unwritable_base_path_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().expect("should create temp dir");
        let target = dir.path().join("readonly");
        fs::create_dir(&target).expect("should create dir");
        fs::set_permissions(&target, fs::Permissions::from_mode(0o555))
            .expect("should set permissions");

        // permission bits do not bind the superuser, nothing to assert then
        if fs::write(target.join("probe"), b"").is_ok() {
            let _ = fs::remove_file(target.join("probe"));
            return;
        }

        let props = properties("https://example.org", &target.to_string_lossy());
        let err = Config::from_properties(&props).expect_err("expected error");
        assert!(err.is(Err::InvalidConfig));

        fs::set_permissions(&target, fs::Permissions::from_mode(0o755))
            .expect("should restore permissions");
    }

    #[test]
    fn base_path_must_be_directory() {
        let dir = tempdir().expect("should create temp dir");
        let file = dir.path().join("not-a-dir");
        fs::write(&file, "x").expect("should write");
        let props = properties("https://example.org", &file.to_string_lossy());

        let err = Config::from_properties(&props).expect_err("expected error");
        assert!(err.is(Err::InvalidConfig));
    }

    #[test]
    fn properties_echo() {
        let dir = tempdir().expect("should create temp dir");
        let mut props = properties("https://example.org", &dir.path().to_string_lossy());
        props.insert(GENERATED_FOLDER.to_string(), "generated".to_string());

        let config = Config::from_properties(&props).expect("should configure");
        let echo = config.properties();
        // the echo carries the configured string, not the parsed URL
        assert_eq!(echo.get(BASE_URL), Some(&Value::from("https://example.org")));
        assert_eq!(
            echo.get(BASE_PATH),
            Some(&Value::from(dir.path().display().to_string()))
        );
        assert_eq!(echo.get(GENERATED_FOLDER), Some(&Value::from("generated")));
    }

    #[test]
    fn from_env() {
        let dir = tempdir().expect("should create temp dir");
        std::env::set_var(ENV_BASE_URL, "https://example.org");
        std::env::set_var(ENV_BASE_PATH, dir.path());

        let config = Config::from_env().expect("should configure");
        assert_eq!(config.default_host(), "example.org");
        assert_eq!(config.generated_folder(), None);
    }
}
