//! Checklist notes whose items are parsed from, or rendered into, `content`.

use super::{kind_descriptor, KindModule};
use crate::core::handler::{kind_mismatch, new_note, updated_note, validate_common};
use crate::core::ids::generate_id;
use crate::core::interchange::decode;
use crate::core::module::SlashCommand;
use crate::core::normalize::{resolve_content, ResolvedContent};
use crate::core::todo_text::{parse_text_to_items, serialize_items_to_text};
use crate::{Note, NoteBody, NoteInput, NoteKind, NoteTypeHandler, QuireError, Result, TodoItem};
use serde_json::Value;
use std::sync::Arc;

/// Item text is single-line and trimmed so `content` re-parses to the same items.
fn clean_item_text(text: &str) -> String {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reads a directly supplied `items` array. Strings become unchecked items.
fn items_from_input(data: &NoteInput) -> Option<Vec<TodoItem>> {
    let entries = data.get("items")?.as_array()?;
    let items = entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(text) => Some(TodoItem {
                id: generate_id(),
                text: clean_item_text(text),
                done: false,
            }),
            Value::Object(fields) => Some(TodoItem {
                id: fields
                    .get("id")
                    .and_then(Value::as_str)
                    .filter(|id| !id.is_empty())
                    .map_or_else(generate_id, str::to_string),
                text: clean_item_text(fields.get("text").and_then(Value::as_str).unwrap_or_default()),
                done: fields.get("done").and_then(Value::as_bool).unwrap_or(false),
            }),
            _ => None,
        })
        .collect();
    Some(items)
}

/// Resolves content and items together.
///
/// Supplied content (or nothing at all) wins and items are parsed from it;
/// otherwise supplied items win and content is rendered from them.
fn resolve_items(data: &NoteInput, previous: Option<(&str, &[TodoItem])>) -> (ResolvedContent, Vec<TodoItem>) {
    let content = resolve_content(NoteKind::Todo, data, previous.map(|(content, _)| content));
    if content.supplied {
        let items = parse_text_to_items(&content.content);
        return (content, items);
    }
    if let Some(items) = items_from_input(data) {
        let content = ResolvedContent { content: serialize_items_to_text(&items), supplied: true };
        return (content, items);
    }
    match previous {
        Some((_, items)) => (content, items.to_vec()),
        None => {
            let items = parse_text_to_items(&content.content);
            (content, items)
        }
    }
}

fn same_entries(a: &[TodoItem], b: &[TodoItem]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.text == y.text && x.done == y.done)
}

/// Handler for [`NoteKind::Todo`]. No legacy alias.
#[derive(Debug, Default)]
pub struct TodoHandler;

impl TodoHandler {
    /// Flips `done` on one item, going through `update` so `content` follows.
    ///
    /// # Errors
    ///
    /// Returns [`QuireError::NotFound`] if no item has `item_id`.
    pub fn toggle(&self, note: &Note, item_id: &str) -> Result<Note> {
        let items = note.items().ok_or_else(|| kind_mismatch(note, NoteKind::Todo))?;
        if !items.iter().any(|item| item.id == item_id) {
            return Err(QuireError::NotFound(format!("todo item '{item_id}'")));
        }
        let toggled: Vec<TodoItem> = items
            .iter()
            .map(|item| TodoItem {
                done: if item.id == item_id { !item.done } else { item.done },
                ..item.clone()
            })
            .collect();
        self.update(note, &NoteInput::new().with("items", serde_json::to_value(toggled)?))
    }
}

impl NoteTypeHandler for TodoHandler {
    fn kind(&self) -> NoteKind {
        NoteKind::Todo
    }

    fn create(&self, data: &NoteInput) -> Result<Note> {
        let (content, items) = resolve_items(data, None);
        Ok(new_note(content, data, NoteBody::Todo { items }))
    }

    fn update(&self, note: &Note, updates: &NoteInput) -> Result<Note> {
        let NoteBody::Todo { items } = &note.body else {
            return Err(kind_mismatch(note, NoteKind::Todo));
        };
        let (content, items) = resolve_items(updates, Some((&note.content, items)));
        Ok(updated_note(note, content, updates, NoteBody::Todo { items }))
    }

    fn validate(&self, note: &Note) -> bool {
        validate_common(note, NoteKind::Todo)
            && matches!(&note.body, NoteBody::Todo { items } if same_entries(items, &parse_text_to_items(&note.content)))
    }

    fn deserialize(&self, text: &str) -> Result<Note> {
        let mut record = decode(text, NoteKind::Todo)?;
        let items = record
            .items
            .take()
            .ok_or_else(|| QuireError::MalformedInterchange("todo note has no items".to_string()))?;
        Ok(record.into_note(NoteBody::Todo { items }))
    }

    fn search_text(&self, note: &Note) -> String {
        note.items()
            .unwrap_or_default()
            .iter()
            .map(|item| item.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn module() -> KindModule {
    KindModule::new(
        kind_descriptor(
            NoteKind::Todo,
            "Checklist",
            "To-do lists with checkable items",
            vec![SlashCommand::new("/todo", "Checklist")
                .alias("checklist")
                .alias("tasks")
                .icon("check-square")
                .default_parameter("content", "[ ] ")],
            Vec::new(),
        ),
        Arc::new(TodoHandler),
    )
}
