//! The note model: kind tags, per-kind bodies and loosely-typed handler input.

use crate::{QuireError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The closed set of note kinds the core knows how to handle.
///
/// Hosts address kinds by their lowercase tag (`"text"`, `"code"`, …).
///
/// ```rust
/// use quire_core::NoteKind;
///
/// let kind: NoteKind = "todo".parse().unwrap();
/// assert_eq!(kind, NoteKind::Todo);
/// assert!("sketch".parse::<NoteKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Text,
    Code,
    Markdown,
    Image,
    Todo,
}

impl NoteKind {
    /// Every kind, in registration order for the built-in modules.
    pub const ALL: [NoteKind; 5] = [
        NoteKind::Text,
        NoteKind::Code,
        NoteKind::Markdown,
        NoteKind::Image,
        NoteKind::Todo,
    ];

    /// The lowercase tag used on the wire and in registry lookups.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Code => "code",
            Self::Markdown => "markdown",
            Self::Image => "image",
            Self::Todo => "todo",
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for NoteKind {
    type Err = QuireError;

    fn from_str(tag: &str) -> Result<Self> {
        NoteKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or_else(|| QuireError::NotFound(format!("note type '{tag}'")))
    }
}

/// A single checklist entry of a todo note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: String,
    pub text: String,
    pub done: bool,
}

/// One step of the non-destructive edit list stored on an image note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ImageTransform {
    /// Clockwise rotation in degrees.
    Rotate { degrees: i32 },
    FlipHorizontal,
    FlipVertical,
    Crop { x: u32, y: u32, width: u32, height: u32 },
}

/// Kind-specific state of a note. The variant fixes the note's kind for life.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteBody {
    Text,
    Code {
        language: String,
        filename: Option<String>,
    },
    Markdown {
        title: String,
        /// Derived from `content`; recomputed whenever the content changes.
        rendered_html: String,
    },
    Image {
        width: Option<u32>,
        height: Option<u32>,
        alt: String,
        transforms: Vec<ImageTransform>,
    },
    Todo {
        /// Always the parse of `content`, or the source `content` was derived from.
        items: Vec<TodoItem>,
    },
}

impl NoteBody {
    #[must_use]
    pub fn kind(&self) -> NoteKind {
        match self {
            Self::Text => NoteKind::Text,
            Self::Code { .. } => NoteKind::Code,
            Self::Markdown { .. } => NoteKind::Markdown,
            Self::Image { .. } => NoteKind::Image,
            Self::Todo { .. } => NoteKind::Todo,
        }
    }
}

/// A note of any kind.
///
/// Notes are built by a handler's `create` or `deserialize` and changed only
/// through its `update`; fields are read through accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub(crate) id: String,
    pub(crate) content: String,
    pub(crate) created: i64,
    pub(crate) updated: i64,
    pub(crate) category: Option<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) archived: bool,
    /// Open extras only; typed kind fields live in `body`.
    pub(crate) metadata: Map<String, Value>,
    pub(crate) body: NoteBody,
}

impl Note {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> NoteKind {
        self.body.kind()
    }

    /// The canonical content string.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Creation time in epoch milliseconds.
    pub fn created(&self) -> i64 {
        self.created
    }

    /// Last-modification time in epoch milliseconds.
    pub fn updated(&self) -> i64 {
        self.updated
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn archived(&self) -> bool {
        self.archived
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn body(&self) -> &NoteBody {
        &self.body
    }

    /// Checklist items, for todo notes.
    pub fn items(&self) -> Option<&[TodoItem]> {
        match &self.body {
            NoteBody::Todo { items } => Some(items),
            _ => None,
        }
    }

    /// Title, for markdown notes.
    pub fn title(&self) -> Option<&str> {
        match &self.body {
            NoteBody::Markdown { title, .. } => Some(title),
            _ => None,
        }
    }
}

/// Loosely-typed input to `create` and `update`: a JSON object.
///
/// Accessors are lenient. A key holding the wrong JSON type reads as absent,
/// so handlers fall back to their defaults instead of failing.
///
/// ```rust
/// use quire_core::NoteInput;
///
/// let input = NoteInput::new().with("content", "hello").with("archived", true);
/// assert_eq!(input.get_str("content"), Some("hello"));
/// assert_eq!(input.get_str("archived"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteInput(Map<String, Value>);

impl NoteInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|v| !v.is_null())
    }

    /// `true` when `key` is present with an explicit `null`, which clears optional fields.
    pub fn is_null(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(Value::Null))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Reads an array of strings, skipping non-string entries.
    pub fn get_str_list(&self, key: &str) -> Option<Vec<String>> {
        self.0.get(key).and_then(Value::as_array).map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
    }

    pub fn get_object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    /// Reads `metadata.<key>`.
    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.get_object("metadata")
            .and_then(|m| m.get(key))
            .filter(|v| !v.is_null())
    }

    /// `true` when `metadata.<key>` is present with an explicit `null`.
    pub fn metadata_is_null(&self, key: &str) -> bool {
        self.get_object("metadata")
            .is_some_and(|m| matches!(m.get(key), Some(Value::Null)))
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata_value(key).and_then(Value::as_str)
    }

    pub fn metadata_u32(&self, key: &str) -> Option<u32> {
        self.metadata_value(key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    }
}

impl From<Map<String, Value>> for NoteInput {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Value> for NoteInput {
    /// Non-object values become empty input.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}
