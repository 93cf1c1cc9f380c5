//! The structured interchange form shared by every kind's `serialize`/`deserialize`.
//!
//! A record is a flat JSON object carrying `id`, `type`, `content`, `created`
//! and `updated`, the common optional fields, and kind-specific state. Typed
//! kind fields travel inside `metadata` under their camelCase names. Legacy
//! aliases (`text`, `code`, `markdown`, `html`) are written next to `content`
//! for older readers and ignored on the way back in.

use crate::core::normalize::{input_alias, legacy_aliases};
use crate::{Note, NoteBody, NoteKind, QuireError, Result, TodoItem};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire shape of a single note.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    #[serde(default)]
    pub content: Option<String>,
    pub created: i64,
    pub updated: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<TodoItem>>,
    /// Legacy aliases on output; any unrecognised keys on input.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Metadata keys that hold typed state for `kind` rather than open extras.
pub fn reserved_metadata(kind: NoteKind) -> &'static [&'static str] {
    match kind {
        NoteKind::Text | NoteKind::Todo => &[],
        NoteKind::Code => &["language", "filename"],
        NoteKind::Markdown => &["renderedHtml"],
        NoteKind::Image => &["width", "height", "alt", "transforms"],
    }
}

/// Builds the wire record for `note`.
pub fn to_record(note: &Note) -> NoteRecord {
    let mut metadata = note.metadata.clone();
    let mut title = None;
    let mut items = None;
    match &note.body {
        NoteBody::Text => {}
        NoteBody::Code { language, filename } => {
            metadata.insert("language".into(), Value::from(language.clone()));
            if let Some(filename) = filename {
                metadata.insert("filename".into(), Value::from(filename.clone()));
            }
        }
        NoteBody::Markdown { title: t, rendered_html } => {
            title = Some(t.clone());
            metadata.insert("renderedHtml".into(), Value::from(rendered_html.clone()));
        }
        NoteBody::Image { width, height, alt, transforms } => {
            if let Some(w) = width {
                metadata.insert("width".into(), Value::from(*w));
            }
            if let Some(h) = height {
                metadata.insert("height".into(), Value::from(*h));
            }
            metadata.insert("alt".into(), Value::from(alt.clone()));
            metadata.insert(
                "transforms".into(),
                serde_json::to_value(transforms).unwrap_or_else(|_| Value::Array(Vec::new())),
            );
        }
        NoteBody::Todo { items: list } => items = Some(list.clone()),
    }

    let extra = legacy_aliases(note)
        .into_iter()
        .map(|(name, value)| (name.to_string(), Value::from(value)))
        .collect();

    NoteRecord {
        id: note.id.clone(),
        kind: note.kind(),
        content: Some(note.content.clone()),
        created: note.created,
        updated: note.updated,
        category: note.category.clone(),
        tags: note.tags.clone(),
        archived: note.archived,
        metadata,
        title,
        items,
        extra,
    }
}

/// Serializes `note` to its interchange text.
pub fn encode(note: &Note) -> Result<String> {
    Ok(serde_json::to_string(&to_record(note))?)
}

/// Parses interchange text into a record of the `expected` kind.
///
/// # Errors
///
/// Returns [`QuireError::MalformedInterchange`] if the text is not a record,
/// the record's `type` differs from `expected`, the id is empty, or neither
/// `content` nor the kind's legacy alias is present.
pub fn decode(text: &str, expected: NoteKind) -> Result<NoteRecord> {
    let mut record: NoteRecord = serde_json::from_str(text)
        .map_err(|e| QuireError::MalformedInterchange(e.to_string()))?;

    if record.kind != expected {
        return Err(QuireError::MalformedInterchange(format!(
            "expected a {expected} note, found {}",
            record.kind
        )));
    }
    if record.id.is_empty() {
        return Err(QuireError::MalformedInterchange("note id is empty".to_string()));
    }
    if record.content.is_none() {
        record.content = input_alias(expected)
            .and_then(|alias| record.extra.get(alias))
            .and_then(Value::as_str)
            .map(str::to_string);
    }
    if record.content.is_none() {
        return Err(QuireError::MalformedInterchange("note has no content".to_string()));
    }
    Ok(record)
}

impl NoteRecord {
    /// Removes `metadata.<key>` and returns it, treating `null` as absent.
    pub(crate) fn take_metadata(&mut self, key: &str) -> Option<Value> {
        self.metadata.remove(key).filter(|v| !v.is_null())
    }

    /// Removes a required string from metadata.
    pub(crate) fn take_required_str(&mut self, key: &str) -> Result<String> {
        match self.take_metadata(key) {
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(malformed_field(key, "a string")),
            None => Err(QuireError::MalformedInterchange(format!("metadata.{key} is missing"))),
        }
    }

    /// Removes an optional string from metadata.
    pub(crate) fn take_optional_str(&mut self, key: &str) -> Result<Option<String>> {
        match self.take_metadata(key) {
            Some(Value::String(s)) => Ok(Some(s)),
            Some(_) => Err(malformed_field(key, "a string")),
            None => Ok(None),
        }
    }

    /// Removes an optional unsigned dimension from metadata.
    pub(crate) fn take_optional_u32(&mut self, key: &str) -> Result<Option<u32>> {
        match self.take_metadata(key) {
            Some(value) => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| malformed_field(key, "a non-negative integer")),
            None => Ok(None),
        }
    }

    /// Finishes decoding by attaching the kind-specific `body`.
    pub(crate) fn into_note(self, body: NoteBody) -> Note {
        Note {
            id: self.id,
            content: self.content.unwrap_or_default(),
            created: self.created,
            updated: self.updated,
            category: self.category,
            tags: self.tags,
            archived: self.archived,
            metadata: self.metadata,
            body,
        }
    }
}

pub(crate) fn malformed_field(key: &str, expected: &str) -> QuireError {
    QuireError::MalformedInterchange(format!("metadata.{key} must be {expected}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn code_note() -> Note {
        let mut metadata = Map::new();
        metadata.insert("pinned".into(), json!(true));
        Note {
            id: "n-1".to_string(),
            content: "fn main() {}".to_string(),
            created: 10,
            updated: 20,
            category: Some("snippets".to_string()),
            tags: vec!["rust".to_string()],
            archived: false,
            metadata,
            body: NoteBody::Code { language: "rust".to_string(), filename: Some("main.rs".to_string()) },
        }
    }

    #[test]
    fn test_record_carries_minimum_fields_and_aliases() {
        let value: Value = serde_json::from_str(&encode(&code_note()).unwrap()).unwrap();
        assert_eq!(value["id"], "n-1");
        assert_eq!(value["type"], "code");
        assert_eq!(value["content"], "fn main() {}");
        assert_eq!(value["code"], "fn main() {}");
        assert_eq!(value["created"], 10);
        assert_eq!(value["updated"], 20);
        assert_eq!(value["metadata"]["language"], "rust");
        assert_eq!(value["metadata"]["filename"], "main.rs");
        assert_eq!(value["metadata"]["pinned"], true);
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let err = decode("not json", NoteKind::Text).unwrap_err();
        assert!(matches!(err, QuireError::MalformedInterchange(_)));
    }

    #[test]
    fn test_decode_rejects_wrong_kind() {
        let text = encode(&code_note()).unwrap();
        let err = decode(&text, NoteKind::Text).unwrap_err();
        assert!(matches!(err, QuireError::MalformedInterchange(_)));
    }

    #[test]
    fn test_decode_rejects_missing_required_field() {
        let err = decode(r#"{"id":"x","type":"text","content":"a","created":1}"#, NoteKind::Text).unwrap_err();
        assert!(matches!(err, QuireError::MalformedInterchange(_)));
    }

    #[test]
    fn test_decode_accepts_legacy_alias_without_content() {
        let record = decode(
            r#"{"id":"x","type":"text","text":"legacy body","created":1,"updated":2}"#,
            NoteKind::Text,
        )
        .unwrap();
        assert_eq!(record.content.as_deref(), Some("legacy body"));
    }

    #[test]
    fn test_decode_rejects_missing_content_and_alias() {
        let err = decode(r#"{"id":"x","type":"image","created":1,"updated":2}"#, NoteKind::Image).unwrap_err();
        assert!(matches!(err, QuireError::MalformedInterchange(_)));
    }

    #[test]
    fn test_take_optional_u32_rejects_negative() {
        let mut record = decode(
            r#"{"id":"x","type":"image","content":"u","created":1,"updated":2,"metadata":{"width":-3}}"#,
            NoteKind::Image,
        )
        .unwrap();
        assert!(record.take_optional_u32("width").is_err());
    }
}
