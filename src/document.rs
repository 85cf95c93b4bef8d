//! DID document as handled by this driver.
//!
//! The driver hosts documents, it does not interpret them. Apart from the
//! `id` member, which the driver reads to resolve a storage path and assigns
//! when minting a new DID, all document members are carried through
//! untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;

/// A DID document. Opaque to the driver apart from its identifier.
/// <https://www.w3.org/TR/did-core/>
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DidDocument {
    /// The document's DID. Absent on create requests that ask the driver to
    /// mint an identifier; always present on a stored document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The JSON-LD context, either a string or a list. Passed through as
    /// supplied.
    #[serde(rename = "@context", skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Any further members (verification methods, services, and so on),
    /// persisted verbatim.
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

impl DidDocument {
    /// Deserialize a document from its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the document to the canonical form stored on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if a document member cannot be represented as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
