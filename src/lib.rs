//! # did:web Registrar Driver
//! <https://w3c-ccg.github.io/did-method-web/>
//!
//! Method driver for a DID registrar: maps `did:web` identifiers to DID
//! documents hosted on a filesystem and implements the create, update and
//! deactivate operations over them. The driver is a pure library behind the
//! [`registrar::Registrar`] trait, any serving layer can call it.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Validated, immutable driver configuration.
pub mod config;

/// DID document handling. The driver treats documents as opaque JSON.
pub mod document;

/// Error types and the `tracerr!` macro.
pub mod error;

/// The `Registrar` trait and its operation DTOs.
pub mod registrar;

/// Filesystem persistence primitives for hosted documents.
pub mod store;

/// The did:web driver: identifier-to-path mapping and the `Registrar`
/// implementation.
pub mod web;

pub use config::Config;
pub use document::DidDocument;
pub use error::{Err, Error};
pub use registrar::{
    CreateOptions, CreateState, DeactivateState, DocumentOperation, OperationStatus, Registrar,
    UpdateState,
};
pub use web::{WebRegistrar, METHOD_PREFIX};

/// Crate-wide result type.
pub type Result<T, E = Error> = core::result::Result<T, E>;
