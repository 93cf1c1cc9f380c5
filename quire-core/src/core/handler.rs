//! The operation set every note kind implements.

use crate::core::ids::{generate_id, next_timestamp, now_millis};
use crate::core::interchange;
use crate::core::normalize::{merge_common_fields, ResolvedContent};
use crate::{Note, NoteBody, NoteInput, NoteKind, QuireError, Result};
use serde_json::Map;
use std::fmt;

/// Per-kind note operations, looked up through the registry by kind tag.
///
/// Handlers never mutate a note in place: `update` returns a new value and
/// the host replaces its copy. The host must sequence calls per note id; two
/// overlapping `update`s of the same note can lose one side's fields.
pub trait NoteTypeHandler: Send + Sync + fmt::Debug {
    /// The kind this handler owns.
    fn kind(&self) -> NoteKind;

    /// Builds a new note from loosely-typed input, applying kind defaults.
    fn create(&self, data: &NoteInput) -> Result<Note>;

    /// Merges `updates` onto `note` and advances `updated`.
    ///
    /// A `type` key in `updates` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`QuireError::Validation`] if `note` is not of this handler's kind.
    fn update(&self, note: &Note, updates: &NoteInput) -> Result<Note>;

    /// Kind-specific cleanup before the host discards the note.
    ///
    /// Safe to call more than once.
    fn delete(&self, note: &Note) -> Result<()> {
        ensure_kind(note, self.kind())
    }

    /// `true` iff the note has an id, this kind, a creation time and a valid kind shape.
    fn validate(&self, note: &Note) -> bool;

    /// Produces the structured interchange text for `note`.
    fn serialize(&self, note: &Note) -> Result<String> {
        ensure_kind(note, self.kind())?;
        interchange::encode(note)
    }

    /// Inverse of [`serialize`](Self::serialize).
    ///
    /// # Errors
    ///
    /// Returns [`QuireError::MalformedInterchange`] if `text` is not a note
    /// record of this kind.
    fn deserialize(&self, text: &str) -> Result<Note>;

    /// Plain text a host search index should see for `note`.
    fn search_text(&self, note: &Note) -> String {
        note.content.clone()
    }
}

/// Fails unless `note` is of `kind`.
pub(crate) fn ensure_kind(note: &Note, kind: NoteKind) -> Result<()> {
    if note.kind() == kind {
        Ok(())
    } else {
        Err(kind_mismatch(note, kind))
    }
}

pub(crate) fn kind_mismatch(note: &Note, kind: NoteKind) -> QuireError {
    QuireError::Validation(format!("a {} note cannot be handled as {kind}", note.kind()))
}

/// Shared part of `validate`: id, kind and timestamps.
pub(crate) fn validate_common(note: &Note, kind: NoteKind) -> bool {
    !note.id.is_empty() && note.kind() == kind && note.created > 0 && note.updated >= note.created
}

/// Assembles a freshly created note with a new id and matching timestamps.
pub(crate) fn new_note(content: ResolvedContent, data: &NoteInput, body: NoteBody) -> Note {
    let now = now_millis();
    let kind = body.kind();
    let mut note = Note {
        id: generate_id(),
        content: content.content,
        created: now,
        updated: now,
        category: None,
        tags: Vec::new(),
        archived: false,
        metadata: Map::new(),
        body,
    };
    merge_common_fields(&mut note, data, interchange::reserved_metadata(kind));
    log::debug!("created {kind} note {}", note.id);
    note
}

/// Copies `note` with common fields merged and `updated` advanced.
pub(crate) fn updated_note(note: &Note, content: ResolvedContent, updates: &NoteInput, body: NoteBody) -> Note {
    let mut next = Note {
        content: content.content,
        updated: next_timestamp(note.updated),
        body,
        ..note.clone()
    };
    merge_common_fields(&mut next, updates, interchange::reserved_metadata(note.kind()));
    next
}
