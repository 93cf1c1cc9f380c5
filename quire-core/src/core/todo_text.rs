//! Text ↔ checklist conversion for todo notes.
//!
//! Parsing is lenient: any non-blank line that is not a checkbox line becomes
//! an unchecked item holding the whole line.

use crate::core::ids::generate_id;
use crate::TodoItem;
use regex::Regex;
use std::sync::OnceLock;

fn checkbox_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\s-]*\[([ xX])\](.*)$").expect("checkbox pattern is valid"))
}

/// Parses checklist text into items, one per non-blank line.
///
/// Each line may start with dashes or whitespace, then `[x]`, `[X]` or `[ ]`,
/// then the item text. Every item gets a fresh id.
///
/// ```rust
/// use quire_core::parse_text_to_items;
///
/// let items = parse_text_to_items("- [x] buy milk\n[ ] walk dog");
/// assert_eq!(items.len(), 2);
/// assert!(items[0].done);
/// assert_eq!(items[1].text, "walk dog");
/// ```
pub fn parse_text_to_items(text: &str) -> Vec<TodoItem> {
    text.split(['\n', '\r'])
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> TodoItem {
    match checkbox_line().captures(line) {
        Some(caps) => {
            let marker = caps.get(1).map_or(" ", |m| m.as_str());
            let rest = caps.get(2).map_or("", |m| m.as_str());
            TodoItem {
                id: generate_id(),
                text: rest.trim().to_string(),
                done: marker.eq_ignore_ascii_case("x"),
            }
        }
        None => TodoItem {
            id: generate_id(),
            text: line.trim().to_string(),
            done: false,
        },
    }
}

/// Renders items as `[x] text` / `[ ] text` lines joined with `\n`.
pub fn serialize_items_to_text(items: &[TodoItem]) -> String {
    items
        .iter()
        .map(|item| format!("[{}] {}", if item.done { 'x' } else { ' ' }, item.text))
        .collect::<Vec<_>>()
        .join("\n")
}
