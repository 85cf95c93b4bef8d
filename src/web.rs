//! # did:web Registrar
//!
//! Maps `did:web` identifiers to filesystem locations under the configured
//! document root and implements the [`Registrar`] write operations against
//! them.
//!
//! A DID `did:web:<host>:<seg1>:<seg2>` resolves to the directory
//! `<basePath>/<seg1>/<seg2>` and its document lives in `did.json` inside
//! that directory. The mapping is purely syntactic and deterministic: the
//! same DID always resolves to the same path.

use std::path::PathBuf;

use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::document::DidDocument;
use crate::error::Err;
use crate::registrar::{
    CreateOptions, CreateState, DeactivateState, DocumentOperation, OperationStatus, Registrar,
    UpdateState,
};
use crate::{store, tracerr, Result};

/// Method prefix every DID handled by this driver must carry.
pub const METHOD_PREFIX: &str = "did:web:";

/// Registrar that implements the write operations of the did:web method
/// against a filesystem document root.
pub struct WebRegistrar {
    config: Config,
}

/// Configuration and identifier handling.
impl WebRegistrar {
    /// Create a new registrar for a validated configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    // Parse and validate a DID, returning the directory its document lives
    // in. The mapping is pure: no filesystem access, no normalization.
    fn did_to_path(&self, did: &str) -> Result<PathBuf> {
        if did.is_empty() {
            tracerr!(Err::MissingIdentifier, "DID is empty");
        }
        let Some(tail) = did.strip_prefix(METHOD_PREFIX) else {
            tracerr!(Err::UnsupportedMethod, "not a DID of the did:web method: {did}");
        };
        let segments: Vec<&str> = tail.split(':').collect();
        if segments.len() < 2 {
            tracerr!(Err::MalformedIdentifier, "DID needs a host and at least one segment: {did}");
        }
        let host = segments[0];
        if !self.config.matches_host(host) {
            tracerr!(Err::WrongHost, "host {host} does not match any configured origin");
        }

        let mut path = self.config.base_path().to_path_buf();
        for segment in &segments[1..] {
            // a segment that is empty or names a parent would escape the
            // document root
            if segment.is_empty() || *segment == "." || *segment == ".." {
                tracerr!(Err::MalformedIdentifier, "illegal path segment {segment:?} in {did}");
            }
            if segment.contains(['/', '\\']) {
                tracerr!(Err::MalformedIdentifier, "illegal path segment {segment:?} in {did}");
            }
            path.push(segment);
        }
        Ok(path)
    }

    // Mint a fresh DID under `host` and derive its path. The token carries
    // 128 bits of randomness so collisions with prior registrations are
    // negligible.
    fn mint(&self, host: &str) -> Result<(String, PathBuf)> {
        if !self.config.matches_host(host) {
            tracerr!(Err::WrongHost, "host {host} does not match any configured origin");
        }
        let token = Uuid::new_v4().to_string();
        let base = self.config.base_path();
        let (did, path) = match self.config.generated_folder() {
            Some(folder) => (
                format!("{METHOD_PREFIX}{host}:{folder}:{token}"),
                base.join(folder).join(&token),
            ),
            None => (format!("{METHOD_PREFIX}{host}:{token}"), base.join(&token)),
        };
        info!("minted {did} at {}", path.display());
        Ok((did, path))
    }
}

/// DID Registrar implementation for the Web method, backed by a filesystem
/// document root.
impl Registrar for WebRegistrar {
    /// Register a document. When the document carries no `id`, a DID is
    /// minted under the requested (or default) host and assigned before the
    /// document is stored.
    fn create(
        &self, document: Option<DidDocument>, options: &CreateOptions,
    ) -> Result<CreateState> {
        let Some(mut document) = document else {
            tracerr!(Err::InvalidInput, "no DID document provided");
        };
        debug!("create request for {:?}", document.id);

        let (did, dir) = if let Some(did) = document.id.clone() {
            let dir = self.did_to_path(&did)?;
            (did, dir)
        } else {
            let host = options.host.as_deref().unwrap_or_else(|| self.config.default_host());
            let (did, dir) = self.mint(host)?;
            document.id = Some(did.clone());
            (did, dir)
        };

        if store::exists(&dir) {
            tracerr!(Err::AlreadyExists, "DID already exists: {did}");
        }
        store::write_new(&dir, &did, &document)?;

        debug!("registration finished for {did}");
        Ok(CreateState {
            did,
            did_document: document,
            state: OperationStatus::Finished,
        })
    }

    /// Replace the document hosted for an existing DID.
    fn update(
        &self, did: Option<&str>, operations: &[DocumentOperation],
        mut documents: Vec<DidDocument>,
    ) -> Result<UpdateState> {
        if operations.len() > 1 {
            tracerr!(Err::InvalidOperation, "only one setDidDocument operation may be provided");
        }
        // an absent operation list means setDidDocument
        let operation = operations.first().copied().unwrap_or_default();
        if operation != DocumentOperation::SetDidDocument {
            tracerr!(Err::InvalidOperation, "unsupported document operation: {operation}");
        }
        if documents.is_empty() {
            tracerr!(Err::InvalidInput, "no DID document provided");
        }
        if documents.len() > 1 {
            tracerr!(Err::InvalidInput, "only one DID document may be provided");
        }
        let Some(did) = did else {
            tracerr!(Err::MissingIdentifier, "no DID provided");
        };
        debug!("update request for {did}");

        let dir = self.did_to_path(did)?;
        if !store::exists(&dir) {
            tracerr!(Err::NotFound, "DID does not exist: {did}");
        }
        let document = documents.remove(0);
        store::replace(&dir, did, &document)?;

        Ok(UpdateState {
            did_document: document,
            state: OperationStatus::Finished,
        })
    }

    /// Deactivate a DID by removing its document file. The directory is left
    /// behind as a harmless remnant.
    fn deactivate(&self, did: Option<&str>) -> Result<DeactivateState> {
        let Some(did) = did else {
            tracerr!(Err::MissingIdentifier, "no DID provided");
        };
        debug!("deactivate request for {did}");

        let dir = self.did_to_path(did)?;
        if !store::exists(&dir) {
            tracerr!(Err::NotFound, "DID does not exist: {did}");
        }
        store::remove(&dir, did)?;

        Ok(DeactivateState {
            state: OperationStatus::Finished,
        })
    }

    fn properties(&self) -> Map<String, Value> {
        self.config.properties()
    }

    fn method(&self) -> &str {
        "web"
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use tempfile::tempdir;

    use super::*;
    use crate::config::{BASE_PATH, BASE_URL};

    fn registrar(base_path: &std::path::Path) -> WebRegistrar {
        let mut props = HashMap::new();
        props.insert(BASE_URL.to_string(), "https://example.org".to_string());
        props.insert(BASE_PATH.to_string(), base_path.to_string_lossy().to_string());
        WebRegistrar::new(Config::from_properties(&props).expect("should configure"))
    }

    #[test]
    fn path_resolution_is_deterministic() {
        let dir = tempdir().expect("should create temp dir");
        let registrar = registrar(dir.path());

        let did = "did:web:example.org:users:alice";
        let first = registrar.did_to_path(did).expect("should resolve");
        let second = registrar.did_to_path(did).expect("should resolve");

        assert_eq!(first, second);
        assert_eq!(first, dir.path().join("users").join("alice"));
    }

    #[test]
    fn host_match_is_case_insensitive() {
        let dir = tempdir().expect("should create temp dir");
        let registrar = registrar(dir.path());

        let path =
            registrar.did_to_path("did:web:EXAMPLE.ORG:alice").expect("should resolve");
        assert_eq!(path, dir.path().join("alice"));
    }

    #[test]
    fn traversal_segments_rejected() {
        let dir = tempdir().expect("should create temp dir");
        let registrar = registrar(dir.path());

        for did in [
            "did:web:example.org:..:etc",
            "did:web:example.org:.",
            "did:web:example.org::alice",
            "did:web:example.org:a/b",
            "did:web:example.org:a\\b",
        ] {
            let err = registrar.did_to_path(did).expect_err("expected error");
            assert!(err.is(Err::MalformedIdentifier), "{did} should be malformed");
        }
    }

    #[test]
    fn minted_did_uses_generated_folder() {
        let dir = tempdir().expect("should create temp dir");
        let mut props = HashMap::new();
        props.insert(BASE_URL.to_string(), "https://example.org".to_string());
        props.insert(BASE_PATH.to_string(), dir.path().to_string_lossy().to_string());
        props.insert(crate::config::GENERATED_FOLDER.to_string(), "generated".to_string());
        let registrar =
            WebRegistrar::new(Config::from_properties(&props).expect("should configure"));

        let (did, path) = registrar.mint("example.org").expect("should mint");
        let token = did.rsplit(':').next().expect("token");

        assert!(did.starts_with("did:web:example.org:generated:"));
        assert_eq!(path, dir.path().join("generated").join(token));
        // minted DIDs resolve back to the same path
        assert_eq!(registrar.did_to_path(&did).expect("should resolve"), path);
    }

    #[test]
    fn mint_rejects_unconfigured_host() {
        let dir = tempdir().expect("should create temp dir");
        let registrar = registrar(dir.path());

        let err = registrar.mint("otherhost").expect_err("expected error");
        assert!(err.is(Err::WrongHost));
    }
}
