//! Filesystem persistence for hosted DID documents.
//!
//! Each DID maps to one directory holding a single `did.json` file. The file
//! being present is the sole registration state, there is no index or
//! manifest beside it.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write as _};
use std::path::Path;

use crate::document::DidDocument;
use crate::error::Err;
use crate::{tracerr, Result};

/// Name of the document file inside each DID's directory.
pub const DOCUMENT_FILE: &str = "did.json";

/// Whether a document is registered in `dir`.
#[must_use]
pub fn exists(dir: &Path) -> bool {
    dir.join(DOCUMENT_FILE).is_file()
}

/// Store a document in `dir`, failing if one is already registered there.
/// Directories along the path are created as needed.
///
/// Exclusive creation of the file is the only existence guard that holds
/// against a concurrent caller racing past an earlier `exists` check.
///
/// # Errors
///
/// Returns `Err::AlreadyExists` if a document file is present, or
/// `Err::StorageError` for any other filesystem failure.
pub fn write_new(dir: &Path, did: &str, document: &DidDocument) -> Result<()> {
    if let Err(e) = fs::create_dir_all(dir) {
        tracerr!(Err::StorageError, "cannot create directories for {did}: {e}");
    }
    let path = dir.join(DOCUMENT_FILE);
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            tracerr!(Err::AlreadyExists, "DID already exists: {did}");
        }
        Err(e) => tracerr!(Err::StorageError, "cannot store the DID document for {did}: {e}"),
    };
    write_document(&mut file, did, document)
}

/// Replace the document registered in `dir`. The replacement is written to a
/// temp file in the same directory and renamed over the old document, so a
/// crash mid-write leaves the previous document intact.
///
/// # Errors
///
/// Returns `Err::StorageError` on any filesystem failure.
pub fn replace(dir: &Path, did: &str, document: &DidDocument) -> Result<()> {
    let tmp = dir.join(format!("{DOCUMENT_FILE}.tmp"));
    let mut file = match File::create(&tmp) {
        Ok(file) => file,
        Err(e) => tracerr!(Err::StorageError, "cannot store the DID document for {did}: {e}"),
    };
    write_document(&mut file, did, document)?;
    drop(file);
    if let Err(e) = fs::rename(&tmp, dir.join(DOCUMENT_FILE)) {
        tracerr!(Err::StorageError, "cannot replace the DID document for {did}: {e}");
    }
    Ok(())
}

/// Remove the document registered in `dir`. Parent directories are left
/// behind, absence of the file is the deactivation tombstone.
///
/// # Errors
///
/// Returns `Err::NotFound` if no document file is present, or
/// `Err::StorageError` for any other filesystem failure.
pub fn remove(dir: &Path, did: &str) -> Result<()> {
    match fs::remove_file(dir.join(DOCUMENT_FILE)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracerr!(Err::NotFound, "DID does not exist: {did}");
        }
        Err(e) => tracerr!(Err::StorageError, "cannot remove the DID document for {did}: {e}"),
    }
}

// Serialize and write the document as UTF-8 JSON, flushing before return.
fn write_document(file: &mut File, did: &str, document: &DidDocument) -> Result<()> {
    let json = match document.to_json() {
        Ok(json) => json,
        Err(e) => tracerr!(Err::StorageError, "cannot serialize document for {did}: {e}"),
    };
    if let Err(e) = file.write_all(json.as_bytes()).and_then(|()| file.flush()) {
        tracerr!(Err::StorageError, "cannot store the DID document for {did}: {e}");
    }
    Ok(())
}
