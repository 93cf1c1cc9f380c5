//! Core settings persistence.
//!
//! The host keeps a small JSON file of defaults that shape the built-in
//! handlers (default code language, markdown extensions) and which built-in
//! modules are installed at startup.

use crate::Result;
use pulldown_cmark::Options;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Markdown extensions enabled when rendering `renderedHtml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkdownOptions {
    pub tables: bool,
    pub strikethrough: bool,
    pub task_lists: bool,
    pub footnotes: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            task_lists: false,
            footnotes: false,
        }
    }
}

impl MarkdownOptions {
    pub(crate) fn to_cmark(self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        options
    }
}

/// Persisted core settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreSettings {
    /// Language given to code notes that supply none and whose filename gives no hint.
    pub default_code_language: String,
    pub markdown: MarkdownOptions,
    /// Ids of built-in modules to leave uninstalled.
    pub disabled_modules: Vec<String>,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            default_code_language: "plaintext".to_string(),
            markdown: MarkdownOptions::default(),
            disabled_modules: Vec::new(),
        }
    }
}

/// Loads settings from `path`; returns defaults if the file is missing or corrupt.
pub fn load_settings(path: &Path) -> CoreSettings {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring unreadable settings file {}: {e}", path.display());
            CoreSettings::default()
        }),
        Err(_) => CoreSettings::default(),
    }
}

/// Saves settings to `path`, creating parent directories as needed.
pub fn save_settings(path: &Path, settings: &CoreSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(&dir.path().join("absent.json"));
        assert_eq!(settings, CoreSettings::default());
        assert_eq!(settings.default_code_language, "plaintext");
    }

    #[test]
    fn test_corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_settings(&path), CoreSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = CoreSettings {
            default_code_language: "rust".to_string(),
            markdown: MarkdownOptions { footnotes: true, ..MarkdownOptions::default() },
            disabled_modules: vec!["cipher".to_string()],
        };
        save_settings(&path, &settings).unwrap();
        assert_eq!(load_settings(&path), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "markdown": { "taskLists": true } }"#).unwrap();
        let settings = load_settings(&path);
        assert_eq!(settings.default_code_language, "plaintext");
        assert!(settings.markdown.task_lists);
        assert!(settings.markdown.tables);
    }

    #[test]
    fn test_markdown_options_map_to_cmark_flags() {
        let options = MarkdownOptions::default().to_cmark();
        assert!(options.contains(Options::ENABLE_TABLES));
        assert!(!options.contains(Options::ENABLE_FOOTNOTES));
    }
}
