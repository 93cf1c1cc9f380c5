//! Rotate-by-13 cipher view.

use super::{transform_descriptor, ContentTransform, TransformModule};
use crate::core::module::SlashCommand;
use crate::Result;

/// Rotates ASCII Latin letters by 13 places, preserving case.
///
/// Every other character, including non-ASCII letters, is left unchanged.
///
/// ```rust
/// use quire_core::transform::rot13::rot13;
///
/// assert_eq!(rot13("Hello, World!"), "Uryyb, Jbeyq!");
/// ```
pub fn rot13(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'a'..='z' => rotate(c, b'a'),
            'A'..='Z' => rotate(c, b'A'),
            _ => c,
        })
        .collect()
}

fn rotate(c: char, base: u8) -> char {
    char::from((c as u8 - base + 13) % 26 + base)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Rot13;

impl ContentTransform for Rot13 {
    fn transform(&self, content: &str) -> Result<String> {
        Ok(rot13(content))
    }
}

pub fn cipher_module() -> TransformModule {
    TransformModule::new(
        transform_descriptor(
            "cipher",
            "Cipher view",
            env!("CARGO_PKG_VERSION"),
            "Shows any note through a ROT13 cipher without changing it",
            vec![SlashCommand::new("/cipher", "Toggle cipher view").alias("rot13").icon("lock")],
        ),
        Box::new(Rot13),
    )
}
