//! <https://identity.foundation/did-registration/>

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{document::DidDocument, Result};

/// Options accepted by [`Registrar::create`].
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOptions {
    /// Host to mint a new DID under. Must match one of the configured
    /// origins. When omitted, the first configured origin's host is used.
    /// Ignored when the supplied document already carries an `id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// A document operation requested as part of [`Registrar::update`].
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentOperation {
    /// Replace the hosted document with the supplied one. The only operation
    /// this driver implements.
    #[default]
    SetDidDocument,

    /// Any operation kind the driver does not recognize. Always rejected.
    #[serde(other)]
    Unsupported,
}

/// Display implementation for document operations.
impl std::fmt::Display for DocumentOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self {
            DocumentOperation::SetDidDocument => write!(f, "setDidDocument"),
            DocumentOperation::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Status of a completed registrar operation. Operations either finish or
/// fail; the driver has no long-running or wait states.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationStatus {
    /// The operation completed.
    #[default]
    Finished,
}

/// State returned by a successful [`Registrar::create`].
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateState {
    /// The DID of the stored document, minted by the driver when the request
    /// document carried no `id`.
    pub did: String,
    /// The stored document, with `id` populated.
    pub did_document: DidDocument,
    /// Operation status.
    pub state: OperationStatus,
}

/// State returned by a successful [`Registrar::update`].
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateState {
    /// The document now hosted at the DID's path.
    pub did_document: DidDocument,
    /// Operation status.
    pub state: OperationStatus,
}

/// State returned by a successful [`Registrar::deactivate`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivateState {
    /// Operation status.
    pub state: OperationStatus,
}

/// A registrar supports the write operations of a DID method. This driver
/// implements the trait over a filesystem document root; a serving layer
/// (a universal registrar host, a CLI, tests) calls it directly.
pub trait Registrar {
    /// Register a DID document.
    ///
    /// # Arguments
    ///
    /// * `document` - The document to host. When it carries no `id`, the
    /// driver mints a fresh DID and assigns it before storing.
    /// * `options` - Method-specific registration options.
    ///
    /// # Returns
    ///
    /// The stored document with its DID.
    fn create(&self, document: Option<DidDocument>, options: &CreateOptions)
        -> Result<CreateState>;

    /// Replace the document hosted for an existing DID.
    ///
    /// # Arguments
    ///
    /// * `did` - The DID whose document is replaced.
    /// * `operations` - The requested document operations. An empty list is
    /// treated as a single [`DocumentOperation::SetDidDocument`].
    /// * `documents` - The replacement documents. Exactly one must be
    /// supplied.
    ///
    /// # Returns
    ///
    /// The document now hosted for the DID.
    fn update(
        &self, did: Option<&str>, operations: &[DocumentOperation], documents: Vec<DidDocument>,
    ) -> Result<UpdateState>;

    /// Deactivate a DID by removing its hosted document. A deactivated DID
    /// no longer resolves.
    ///
    /// # Arguments
    ///
    /// * `did` - The DID to deactivate.
    fn deactivate(&self, did: Option<&str>) -> Result<DeactivateState>;

    /// Read-only echo of the driver's active configuration.
    fn properties(&self) -> Map<String, Value>;

    /// Declare the DID method for this registrar.
    fn method(&self) -> &str;
}
