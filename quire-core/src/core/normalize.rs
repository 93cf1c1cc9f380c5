//! Content normalization: one canonical `content` field, legacy aliases derived from it.
//!
//! Older consumers read `text`, `code`, `markdown` or `html` instead of
//! `content`. Those names are accepted on input and written back out at the
//! interchange boundary; inside the core only `content` is stored.

use crate::{Note, NoteBody, NoteInput, NoteKind};
use serde_json::{Map, Value};

/// Outcome of resolving the canonical content for a create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContent {
    pub content: String,
    /// `true` when the input explicitly supplied the content or its alias.
    pub supplied: bool,
}

/// The legacy input field that may carry content for `kind`, if any.
///
/// `html` is never an input alias; it is always derived from markdown.
pub fn input_alias(kind: NoteKind) -> Option<&'static str> {
    match kind {
        NoteKind::Text => Some("text"),
        NoteKind::Code => Some("code"),
        NoteKind::Markdown => Some("markdown"),
        NoteKind::Image | NoteKind::Todo => None,
    }
}

/// Resolves canonical content with precedence
/// alias field > `content` field > `previous` > empty.
pub fn resolve_content(kind: NoteKind, input: &NoteInput, previous: Option<&str>) -> ResolvedContent {
    let explicit = input_alias(kind)
        .and_then(|alias| input.get_str(alias))
        .or_else(|| input.get_str("content"));

    match explicit {
        Some(value) => ResolvedContent { content: value.to_string(), supplied: true },
        None => ResolvedContent {
            content: previous.unwrap_or_default().to_string(),
            supplied: false,
        },
    }
}

/// Legacy alias fields for `note`, each value-identical to `content` or its derivative.
pub fn legacy_aliases(note: &Note) -> Vec<(&'static str, String)> {
    match &note.body {
        NoteBody::Text => vec![("text", note.content.clone())],
        NoteBody::Code { .. } => vec![("code", note.content.clone())],
        NoteBody::Markdown { rendered_html, .. } => vec![
            ("markdown", note.content.clone()),
            ("html", rendered_html.clone()),
        ],
        NoteBody::Image { .. } | NoteBody::Todo { .. } => Vec::new(),
    }
}

/// Merges `category`, `tags`, `archived` and open `metadata` from `input` onto `note`.
///
/// Metadata is merged key by key; a `null` value removes the key. Keys listed
/// in `reserved` belong to the kind's typed state and are never copied into
/// the open map.
pub fn merge_common_fields(note: &mut Note, input: &NoteInput, reserved: &[&str]) {
    if let Some(category) = input.get_str("category") {
        note.category = Some(category.to_string());
    } else if input.is_null("category") {
        note.category = None;
    }
    if let Some(tags) = input.get_str_list("tags") {
        note.tags = tags;
    }
    if let Some(archived) = input.get_bool("archived") {
        note.archived = archived;
    }
    if let Some(extras) = input.get_object("metadata") {
        merge_metadata(&mut note.metadata, extras, reserved);
    }
}

fn merge_metadata(target: &mut Map<String, Value>, extras: &Map<String, Value>, reserved: &[&str]) {
    for (key, value) in extras {
        if reserved.contains(&key.as_str()) {
            continue;
        }
        if value.is_null() {
            target.remove(key);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}
