//! Multi-note export bundles.
//!
//! A bundle is one JSON document holding the interchange record of every
//! exported note. Each record is produced and consumed by its kind's own
//! handler, so a bundle round-trips exactly like single-note interchange.

use crate::{Note, NoteRegistry, QuireError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Bundle format version written by this build.
pub const BUNDLE_VERSION: u32 = 1;

/// Version of the library that wrote a bundle.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Top-level JSON structure of an export bundle.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub version: u32,
    pub app_version: String,
    pub notes: Vec<Value>,
}

/// What a bundle contains, read without importing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSummary {
    pub app_version: String,
    pub note_count: usize,
}

/// Serializes `notes` into a bundle.
///
/// # Errors
///
/// [`QuireError::NotFound`] if a note's kind has no handler and
/// [`QuireError::UnsupportedOperation`] if its module does not declare `canExport`.
pub fn export_notes(registry: &NoteRegistry, notes: &[Note]) -> Result<String> {
    let mut records = Vec::with_capacity(notes.len());
    for note in notes {
        if !registry.capabilities_for(note.kind())?.can_export {
            return Err(QuireError::UnsupportedOperation(format!(
                "{} notes cannot be exported",
                note.kind()
            )));
        }
        let text = registry.serialize(note)?;
        records.push(serde_json::from_str::<Value>(&text)?);
    }
    let bundle = ExportBundle {
        version: BUNDLE_VERSION,
        app_version: APP_VERSION.to_string(),
        notes: records,
    };
    log::debug!("exported {} notes", bundle.notes.len());
    Ok(serde_json::to_string_pretty(&bundle)?)
}

fn parse_bundle(text: &str) -> Result<ExportBundle> {
    let bundle: ExportBundle = serde_json::from_str(text)
        .map_err(|e| QuireError::MalformedInterchange(format!("not an export bundle: {e}")))?;
    if bundle.version != BUNDLE_VERSION {
        return Err(QuireError::MalformedInterchange(format!(
            "unsupported bundle version {} (expected {BUNDLE_VERSION})",
            bundle.version
        )));
    }
    Ok(bundle)
}

/// Reads a bundle's header and note count.
pub fn peek_bundle(text: &str) -> Result<BundleSummary> {
    let bundle = parse_bundle(text)?;
    Ok(BundleSummary { app_version: bundle.app_version, note_count: bundle.notes.len() })
}

/// Deserializes every note in a bundle through its kind's handler.
///
/// The import is all-or-nothing: the first bad record fails the whole call.
///
/// # Errors
///
/// [`QuireError::MalformedInterchange`] for a bad bundle or record,
/// [`QuireError::UnsupportedOperation`] if a module does not declare `canImport`.
pub fn import_notes(registry: &NoteRegistry, text: &str) -> Result<Vec<Note>> {
    let bundle = parse_bundle(text)?;
    let mut notes = Vec::with_capacity(bundle.notes.len());
    for record in &bundle.notes {
        let note = registry.deserialize(&record.to_string())?;
        if !registry.capabilities_for(note.kind())?.can_import {
            return Err(QuireError::UnsupportedOperation(format!(
                "{} notes cannot be imported",
                note.kind()
            )));
        }
        notes.push(note);
    }
    log::debug!("imported {} notes written by version {}", notes.len(), bundle.app_version);
    Ok(notes)
}

/// Writes a bundle of `notes` to `path`.
pub fn export_to_file(registry: &NoteRegistry, notes: &[Note], path: &Path) -> Result<()> {
    let text = export_notes(registry, notes)?;
    fs::write(path, text)?;
    Ok(())
}

/// Reads and imports the bundle at `path`.
pub fn import_from_file(registry: &NoteRegistry, path: &Path) -> Result<Vec<Note>> {
    let text = fs::read_to_string(path)?;
    import_notes(registry, &text)
}
