//! # Registrar Errors
//!
//! Error types surfaced by the did:web registrar driver. Every operation
//! failure maps to exactly one [`Err`] kind so callers can branch on the
//! failure without string matching.

use std::fmt::Display;

use thiserror::Error;

/// Simplify creation of errors with tracing.
///
/// # Example
/// ```
/// use didweb_registrar::error::Err;
/// use didweb_registrar::{tracerr, Result};
///
/// fn with_msg() -> Result<()> {
///     tracerr!(Err::InvalidInput, "message: {}", "some message")
/// }
///
/// fn no_msg() -> Result<()> {
///     tracerr!(Err::InvalidInput)
/// }
///
/// assert!(with_msg().is_err());
/// assert!(no_msg().is_err());
/// ```
#[macro_export]
macro_rules! tracerr {
    // with context
    ($code:expr, $($msg:tt)*) => {
        {
        use $crate::error::Context as _;
        tracing::error!($($msg)*);
        return Err($code).context(format!($($msg)*));
        }
    };
    // no context
    ($code:expr) => {
        {
        tracing::error!("{}", $code);
        return Err($code.into());
        }
    }
}

/// Public error type for the registrar driver.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error(#[from] anyhow::Error);

impl Error {
    /// Transfer the error to a DID registration state compatible format.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.0.root_cause().to_string(),
            "error_description": self.to_string(),
        })
    }

    /// Returns true if `E` is the type held by this error object.
    #[must_use]
    pub fn is(&self, err: Err) -> bool {
        self.0.downcast_ref::<Err>().map_or(false, |e| e == &err)
    }
}

/// Typed errors for the registrar driver.
#[derive(Clone, Copy, Error, Debug, PartialEq, Eq)]
pub enum Err {
    /// A request component other than the DID is missing or inconsistent, such
    /// as a create request without a document or an update request carrying
    /// more than one document. (See context for details)
    #[error("invalid_input")]
    InvalidInput,

    /// No DID was supplied for an operation that requires one.
    #[error("missing_identifier")]
    MissingIdentifier,

    /// The supplied DID does not use the `did:web:` method prefix.
    #[error("unsupported_method")]
    UnsupportedMethod,

    /// The supplied DID does not have the shape `did:web:<host>:<segment>`,
    /// or one of its path segments is empty or would escape the document
    /// root.
    #[error("malformed_identifier")]
    MalformedIdentifier,

    /// The host named by the DID does not match any configured origin.
    #[error("wrong_host")]
    WrongHost,

    /// A document is already registered at the path the DID resolves to.
    #[error("already_exists")]
    AlreadyExists,

    /// No document is registered at the path the DID resolves to.
    #[error("not_found")]
    NotFound,

    /// An update carried an unrecognized document operation, or more than
    /// one operation.
    #[error("invalid_operation")]
    InvalidOperation,

    /// An underlying filesystem operation failed. (See context for the DID
    /// being processed)
    #[error("storage_error")]
    StorageError,

    /// Driver configuration could not be resolved or validated.
    #[error("invalid_config")]
    InvalidConfig,
}

/// Context is used to decorate errors with useful context information.
pub trait Context<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Adds context to the error.
    ///
    /// # Arguments
    ///
    /// * `context` - The context to add to the error.
    ///
    /// # Returns
    ///
    /// Original return object or error with context appended.
    ///
    /// # Errors
    ///
    /// * Original error with context appended.
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static;
}

impl<T, E> Context<T, E> for core::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T, Error>
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Ok(ok) => Ok(ok),
            Err(e) => Err(Error(anyhow::Error::from(e).context(context))),
        }
    }
}

impl From<Err> for Error {
    fn from(error: Err) -> Self {
        Error(error.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error(err.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error(err.into())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error(err.into())
    }
}
