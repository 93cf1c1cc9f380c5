//! Plain text notes.

use super::{kind_descriptor, KindModule};
use crate::core::handler::{ensure_kind, new_note, updated_note, validate_common};
use crate::core::interchange::decode;
use crate::core::module::SlashCommand;
use crate::core::normalize::resolve_content;
use crate::{Note, NoteBody, NoteInput, NoteKind, NoteTypeHandler, Result};
use std::sync::Arc;

/// Handler for [`NoteKind::Text`]. Legacy alias: `text`.
#[derive(Debug, Default)]
pub struct TextHandler;

impl NoteTypeHandler for TextHandler {
    fn kind(&self) -> NoteKind {
        NoteKind::Text
    }

    fn create(&self, data: &NoteInput) -> Result<Note> {
        let content = resolve_content(NoteKind::Text, data, None);
        Ok(new_note(content, data, NoteBody::Text))
    }

    fn update(&self, note: &Note, updates: &NoteInput) -> Result<Note> {
        ensure_kind(note, NoteKind::Text)?;
        let content = resolve_content(NoteKind::Text, updates, Some(&note.content));
        Ok(updated_note(note, content, updates, NoteBody::Text))
    }

    fn validate(&self, note: &Note) -> bool {
        validate_common(note, NoteKind::Text)
    }

    fn deserialize(&self, text: &str) -> Result<Note> {
        let record = decode(text, NoteKind::Text)?;
        Ok(record.into_note(NoteBody::Text))
    }
}

pub fn module() -> KindModule {
    KindModule::new(
        kind_descriptor(
            NoteKind::Text,
            "Text",
            "Plain text notes",
            vec![SlashCommand::new("/text", "Plain text note").alias("note").icon("text")],
            Vec::new(),
        ),
        Arc::new(TextHandler),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QuireError;
    use serde_json::json;

    #[test]
    fn test_create_from_legacy_alias() {
        let note = TextHandler.create(&NoteInput::new().with("text", "hello")).unwrap();
        assert_eq!(note.content(), "hello");
        assert_eq!(note.kind(), NoteKind::Text);
        assert_eq!(note.created(), note.updated());
        assert!(TextHandler.validate(&note));
    }

    #[test]
    fn test_create_with_nothing_defaults_to_empty() {
        let note = TextHandler.create(&NoteInput::new()).unwrap();
        assert_eq!(note.content(), "");
        assert!(note.tags().is_empty());
        assert!(!note.archived());
        assert!(TextHandler.validate(&note));
    }

    #[test]
    fn test_update_keeps_identity_and_advances_timestamp() {
        let note = TextHandler.create(&NoteInput::new().with("content", "a")).unwrap();
        let updated = TextHandler
            .update(&note, &NoteInput::new().with("content", "b").with("type", "code"))
            .unwrap();
        assert_eq!(updated.id(), note.id());
        assert_eq!(updated.kind(), NoteKind::Text);
        assert_eq!(updated.created(), note.created());
        assert!(updated.updated() > note.updated());
        assert_eq!(updated.content(), "b");
    }

    #[test]
    fn test_rapid_updates_strictly_increase() {
        let mut note = TextHandler.create(&NoteInput::new()).unwrap();
        for i in 0..50 {
            let next = TextHandler.update(&note, &NoteInput::new().with("content", i.to_string())).unwrap();
            assert!(next.updated() > note.updated());
            note = next;
        }
    }

    #[test]
    fn test_update_without_content_keeps_previous() {
        let note = TextHandler.create(&NoteInput::new().with("content", "keep")).unwrap();
        let updated = TextHandler.update(&note, &NoteInput::new().with("archived", true)).unwrap();
        assert_eq!(updated.content(), "keep");
        assert!(updated.archived());
    }

    #[test]
    fn test_round_trip_and_alias_on_wire() {
        let note = TextHandler
            .create(&NoteInput::from(json!({
                "content": "body",
                "category": "inbox",
                "tags": ["x", "y"],
                "metadata": { "color": "blue" }
            })))
            .unwrap();
        let text = TextHandler.serialize(&note).unwrap();
        let wire: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(wire["text"], "body");
        assert_eq!(TextHandler.deserialize(&text).unwrap(), note);
    }

    #[test]
    fn test_deserialize_garbage_is_malformed() {
        let err = TextHandler.deserialize("[1,2,3]").unwrap_err();
        assert!(matches!(err, QuireError::MalformedInterchange(_)));
    }

    #[test]
    fn test_delete_twice_is_ok() {
        let note = TextHandler.create(&NoteInput::new()).unwrap();
        TextHandler.delete(&note).unwrap();
        TextHandler.delete(&note).unwrap();
    }
}
