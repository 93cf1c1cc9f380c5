//! Transient local image resources referenced by `blob:` URIs.
//!
//! An image note whose content is a `blob:` reference exclusively owns the
//! resource behind it. The resource is released when the note is deleted or
//! its content is replaced; releasing twice is a no-op.

use crate::core::ids::generate_id;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// URI scheme that marks a transient, locally-held resource.
pub const BLOB_SCHEME: &str = "blob:";

#[derive(Debug)]
struct LocalBlob {
    mime: String,
    bytes: Vec<u8>,
}

/// Process-local store of transient image data.
///
/// Shared between the host (which mints references for pasted or picked
/// images) and the image handler (which releases them).
#[derive(Debug, Default)]
pub struct BlobStore {
    held: Mutex<HashMap<String, LocalBlob>>,
}

impl BlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `reference` names a transient local resource.
    pub fn is_transient(reference: &str) -> bool {
        reference.starts_with(BLOB_SCHEME)
    }

    fn held(&self) -> MutexGuard<'_, HashMap<String, LocalBlob>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes ownership of `bytes` and returns a fresh `blob:` reference to them.
    pub fn hold(&self, mime: &str, bytes: Vec<u8>) -> String {
        let reference = format!("{BLOB_SCHEME}quire/{}", generate_id());
        log::debug!("holding {} byte {mime} blob as {reference}", bytes.len());
        self.held().insert(reference.clone(), LocalBlob { mime: mime.to_string(), bytes });
        reference
    }

    pub fn is_held(&self, reference: &str) -> bool {
        self.held().contains_key(reference)
    }

    /// MIME type and a copy of the bytes behind `reference`, while held.
    pub fn get(&self, reference: &str) -> Option<(String, Vec<u8>)> {
        self.held()
            .get(reference)
            .map(|blob| (blob.mime.clone(), blob.bytes.clone()))
    }

    /// Releases `reference`.
    ///
    /// Returns `true` if the resource was held and is now released, `false`
    /// if it was already released or never held.
    pub fn release(&self, reference: &str) -> bool {
        match self.held().remove(reference) {
            Some(blob) => {
                log::debug!("released {} byte blob {reference}", blob.bytes.len());
                true
            }
            None => {
                log::trace!("blob {reference} already released");
                false
            }
        }
    }

    pub fn held_count(&self) -> usize {
        self.held().len()
    }
}
