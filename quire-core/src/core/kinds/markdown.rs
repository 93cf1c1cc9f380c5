//! Markdown notes with a title and derived HTML.

use super::{kind_descriptor, KindModule};
use crate::core::handler::{kind_mismatch, new_note, updated_note, validate_common};
use crate::core::interchange::decode;
use crate::core::module::SlashCommand;
use crate::core::normalize::resolve_content;
use crate::{MarkdownOptions, Note, NoteBody, NoteInput, NoteKind, NoteTypeHandler, QuireError, Result};
use pulldown_cmark::{html as md_html, Parser};
use regex::Regex;
use std::sync::{Arc, OnceLock};

const MAX_DERIVED_TITLE: usize = 80;

/// Converts a CommonMark string to HTML with the given extensions.
///
/// The result is raw HTML; sanitising it is the presentation layer's job.
pub fn render_markdown_to_html(text: &str, options: MarkdownOptions) -> String {
    let parser = Parser::new_ext(text, options.to_cmark());
    let mut html_output = String::new();
    md_html::push_html(&mut html_output, parser);
    html_output
}

/// An ATX heading: 1 to 6 `#`, then whitespace or end of line, with an
/// optional closing run of `#`.
fn atx_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^#{1,6}(?:[ \t]+(.*?))?(?:[ \t]+#+)?[ \t]*$").expect("heading pattern is valid")
    })
}

fn heading_text(line: &str) -> Option<&str> {
    atx_heading()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|text| text.as_str().trim())
        .filter(|text| !text.is_empty())
}

/// First non-empty ATX heading, else first non-blank line, trimmed and capped at 80 chars.
fn derive_title(content: &str) -> String {
    let heading = content.lines().map(str::trim).find_map(heading_text);
    let line = heading.or_else(|| content.lines().map(str::trim).find(|l| !l.is_empty()));
    line.unwrap_or_default().chars().take(MAX_DERIVED_TITLE).collect()
}

/// Handler for [`NoteKind::Markdown`]. Legacy aliases: `markdown`, and `html` (derived).
#[derive(Debug, Clone, Default)]
pub struct MarkdownHandler {
    options: MarkdownOptions,
}

impl MarkdownHandler {
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }
}

impl NoteTypeHandler for MarkdownHandler {
    fn kind(&self) -> NoteKind {
        NoteKind::Markdown
    }

    fn create(&self, data: &NoteInput) -> Result<Note> {
        let content = resolve_content(NoteKind::Markdown, data, None);
        let title = data
            .get_str("title")
            .map(str::to_string)
            .unwrap_or_else(|| derive_title(&content.content));
        let rendered_html = render_markdown_to_html(&content.content, self.options);
        Ok(new_note(content, data, NoteBody::Markdown { title, rendered_html }))
    }

    fn update(&self, note: &Note, updates: &NoteInput) -> Result<Note> {
        let NoteBody::Markdown { title, rendered_html } = &note.body else {
            return Err(kind_mismatch(note, NoteKind::Markdown));
        };
        let content = resolve_content(NoteKind::Markdown, updates, Some(&note.content));
        let rendered_html = if content.content == note.content {
            rendered_html.clone()
        } else {
            render_markdown_to_html(&content.content, self.options)
        };
        // A title still equal to the one derived from the old content follows the content.
        let title = match updates.get_str("title") {
            Some(explicit) => explicit.to_string(),
            None if content.supplied && *title == derive_title(&note.content) => derive_title(&content.content),
            None => title.clone(),
        };
        Ok(updated_note(note, content, updates, NoteBody::Markdown { title, rendered_html }))
    }

    fn validate(&self, note: &Note) -> bool {
        validate_common(note, NoteKind::Markdown)
    }

    fn deserialize(&self, text: &str) -> Result<Note> {
        let mut record = decode(text, NoteKind::Markdown)?;
        let title = record
            .title
            .take()
            .ok_or_else(|| QuireError::MalformedInterchange("markdown note has no title".to_string()))?;
        let rendered_html = match record.take_optional_str("renderedHtml")? {
            Some(html) => html,
            None => render_markdown_to_html(record.content.as_deref().unwrap_or_default(), self.options),
        };
        Ok(record.into_note(NoteBody::Markdown { title, rendered_html }))
    }

    fn search_text(&self, note: &Note) -> String {
        match &note.body {
            NoteBody::Markdown { title, .. } if !title.is_empty() => format!("{title}\n{}", note.content),
            _ => note.content.clone(),
        }
    }
}

pub fn module(options: MarkdownOptions) -> KindModule {
    KindModule::new(
        kind_descriptor(
            NoteKind::Markdown,
            "Markdown",
            "Rich notes written in CommonMark",
            vec![SlashCommand::new("/markdown", "Markdown note").alias("md").icon("markdown")],
            Vec::new(),
        ),
        Arc::new(MarkdownHandler::new(options)),
    )
}
