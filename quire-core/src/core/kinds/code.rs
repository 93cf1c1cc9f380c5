//! Source code notes with a language and optional filename.

use super::{kind_descriptor, KindModule};
use crate::core::handler::{kind_mismatch, new_note, updated_note, validate_common};
use crate::core::interchange::decode;
use crate::core::module::{ModuleParameter, ParameterType, SlashCommand};
use crate::core::normalize::resolve_content;
use crate::{Note, NoteBody, NoteInput, NoteKind, NoteTypeHandler, Result};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

const EXTENSION_LANGUAGES: &[(&str, &str)] = &[
    ("rs", "rust"),
    ("py", "python"),
    ("js", "javascript"),
    ("mjs", "javascript"),
    ("ts", "typescript"),
    ("tsx", "typescript"),
    ("go", "go"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("hpp", "cpp"),
    ("cs", "csharp"),
    ("rb", "ruby"),
    ("sh", "bash"),
    ("sql", "sql"),
    ("json", "json"),
    ("toml", "toml"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("html", "html"),
    ("css", "css"),
    ("md", "markdown"),
];

/// Guesses a language from `filename`'s extension.
pub fn language_for_filename(filename: &str) -> Option<&'static str> {
    let ext = Path::new(filename).extension()?.to_str()?.to_ascii_lowercase();
    EXTENSION_LANGUAGES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, language)| *language)
}

/// Handler for [`NoteKind::Code`]. Legacy alias: `code`.
#[derive(Debug, Clone)]
pub struct CodeHandler {
    default_language: String,
}

impl CodeHandler {
    pub fn new(default_language: &str) -> Self {
        Self { default_language: default_language.to_string() }
    }
}

fn supplied_language(data: &NoteInput) -> Option<String> {
    data.metadata_str("language")
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}

impl NoteTypeHandler for CodeHandler {
    fn kind(&self) -> NoteKind {
        NoteKind::Code
    }

    fn create(&self, data: &NoteInput) -> Result<Note> {
        let content = resolve_content(NoteKind::Code, data, None);
        let filename = data.metadata_str("filename").map(str::to_string);
        let language = supplied_language(data)
            .or_else(|| filename.as_deref().and_then(language_for_filename).map(str::to_string))
            .unwrap_or_else(|| self.default_language.clone());
        Ok(new_note(content, data, NoteBody::Code { language, filename }))
    }

    fn update(&self, note: &Note, updates: &NoteInput) -> Result<Note> {
        let NoteBody::Code { language, filename } = &note.body else {
            return Err(kind_mismatch(note, NoteKind::Code));
        };
        let content = resolve_content(NoteKind::Code, updates, Some(&note.content));
        let filename = match updates.metadata_str("filename") {
            Some(name) => Some(name.to_string()),
            None if updates.metadata_is_null("filename") => None,
            None => filename.clone(),
        };
        let language = supplied_language(updates).unwrap_or_else(|| language.clone());
        Ok(updated_note(note, content, updates, NoteBody::Code { language, filename }))
    }

    fn validate(&self, note: &Note) -> bool {
        validate_common(note, NoteKind::Code)
            && matches!(&note.body, NoteBody::Code { language, .. } if !language.trim().is_empty())
    }

    fn deserialize(&self, text: &str) -> Result<Note> {
        let mut record = decode(text, NoteKind::Code)?;
        let language = record.take_required_str("language")?;
        let filename = record.take_optional_str("filename")?;
        Ok(record.into_note(NoteBody::Code { language, filename }))
    }

    fn search_text(&self, note: &Note) -> String {
        match &note.body {
            NoteBody::Code { filename: Some(filename), .. } => format!("{filename}\n{}", note.content),
            _ => note.content.clone(),
        }
    }
}

pub fn module(default_language: &str) -> KindModule {
    let parameters = vec![ModuleParameter {
        id: "language".to_string(),
        label: "Language".to_string(),
        param_type: ParameterType::Text,
        default_value: Value::from(default_language),
        options: Vec::new(),
        description: "Language used for highlighting when none is given".to_string(),
    }];
    KindModule::new(
        kind_descriptor(
            NoteKind::Code,
            "Code",
            "Source code snippets with syntax metadata",
            vec![
                SlashCommand::new("/code", "Code snippet").alias("snippet").icon("code"),
                SlashCommand::new("/rust", "Rust snippet")
                    .icon("code")
                    .default_parameter("metadata", serde_json::json!({ "language": "rust" })),
            ],
            parameters,
        ),
        Arc::new(CodeHandler::new(default_language)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QuireError;
    use serde_json::json;

    fn handler() -> CodeHandler {
        CodeHandler::new("plaintext")
    }

    fn language(note: &Note) -> &str {
        match note.body() {
            NoteBody::Code { language, .. } => language,
            other => panic!("expected code body, got {other:?}"),
        }
    }

    #[test]
    fn test_default_language() {
        let note = handler().create(&NoteInput::new().with("code", "x = 1")).unwrap();
        assert_eq!(language(&note), "plaintext");
        assert_eq!(note.content(), "x = 1");
        assert!(handler().validate(&note));
    }

    #[test]
    fn test_language_inferred_from_filename() {
        let data = NoteInput::from(json!({ "content": "print(1)", "metadata": { "filename": "main.PY" } }));
        let note = handler().create(&data).unwrap();
        assert_eq!(language(&note), "python");
    }

    #[test]
    fn test_explicit_language_wins_over_filename() {
        let data = NoteInput::from(json!({ "metadata": { "filename": "a.rs", "language": "ron" } }));
        assert_eq!(language(&handler().create(&data).unwrap()), "ron");
    }

    #[test]
    fn test_blank_language_falls_back() {
        let data = NoteInput::from(json!({ "metadata": { "language": "  " } }));
        assert_eq!(language(&handler().create(&data).unwrap()), "plaintext");
    }

    #[test]
    fn test_update_language_and_clear_filename() {
        let data = NoteInput::from(json!({ "metadata": { "filename": "a.go" } }));
        let note = handler().create(&data).unwrap();
        let updates = NoteInput::from(json!({ "metadata": { "filename": null, "language": "zig" } }));
        let updated = handler().update(&note, &updates).unwrap();
        assert_eq!(updated.body(), &NoteBody::Code { language: "zig".to_string(), filename: None });
        assert!(updated.metadata().is_empty());
    }

    #[test]
    fn test_update_rejects_other_kind() {
        let text = super::super::TextHandler.create(&NoteInput::new()).unwrap();
        let err = handler().update(&text, &NoteInput::new()).unwrap_err();
        assert!(matches!(err, QuireError::Validation(_)));
    }

    #[test]
    fn test_round_trip() {
        let data = NoteInput::from(json!({
            "code": "fn main() {}",
            "metadata": { "filename": "main.rs", "owner": "me" },
            "archived": true
        }));
        let note = handler().create(&data).unwrap();
        let text = handler().serialize(&note).unwrap();
        assert_eq!(handler().deserialize(&text).unwrap(), note);
    }

    #[test]
    fn test_deserialize_requires_language() {
        let text = r#"{"id":"c1","type":"code","content":"x","created":1,"updated":1}"#;
        let err = handler().deserialize(text).unwrap_err();
        assert!(matches!(err, QuireError::MalformedInterchange(_)));
    }

    #[test]
    fn test_search_text_includes_filename() {
        let data = NoteInput::from(json!({ "content": "body", "metadata": { "filename": "notes.txt" } }));
        let note = handler().create(&data).unwrap();
        assert!(handler().search_text(&note).contains("notes.txt"));
    }

    #[test]
    fn test_language_for_filename() {
        assert_eq!(language_for_filename("lib.rs"), Some("rust"));
        assert_eq!(language_for_filename("Makefile"), None);
        assert_eq!(language_for_filename("archive.unknown"), None);
    }
}
