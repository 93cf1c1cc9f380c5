//! Image notes: a URL or transient `blob:` reference plus display metadata.

use super::{kind_descriptor, KindModule};
use crate::core::handler::{ensure_kind, kind_mismatch, new_note, updated_note, validate_common};
use crate::core::interchange::{decode, malformed_field};
use crate::core::module::SlashCommand;
use crate::core::normalize::resolve_content;
use crate::{BlobStore, ImageTransform, Note, NoteBody, NoteInput, NoteKind, NoteTypeHandler, Result};
use std::sync::Arc;

/// Reads `metadata.transforms`, dropping entries that do not parse or crop to nothing.
///
/// Returns `None` when the key is absent or not an array.
fn transforms_from_input(data: &NoteInput) -> Option<Vec<ImageTransform>> {
    let entries = data.metadata_value("transforms")?.as_array()?;
    let transforms = entries
        .iter()
        .filter_map(|entry| match serde_json::from_value::<ImageTransform>(entry.clone()) {
            Ok(t) if is_valid_transform(&t) => Some(t),
            Ok(_) | Err(_) => {
                log::warn!("dropping invalid image transform {entry}");
                None
            }
        })
        .collect();
    Some(transforms)
}

fn is_valid_transform(transform: &ImageTransform) -> bool {
    match transform {
        ImageTransform::Crop { width, height, .. } => *width > 0 && *height > 0,
        _ => true,
    }
}

fn dimension(data: &NoteInput, key: &str, previous: Option<u32>) -> Option<u32> {
    match data.metadata_u32(key) {
        Some(value) => Some(value),
        None if data.metadata_is_null(key) => None,
        None => previous,
    }
}

/// Handler for [`NoteKind::Image`]. No legacy alias.
///
/// A note whose content is a `blob:` reference owns that blob in the shared
/// [`BlobStore`]. The blob is released on `delete`, or on `update` when the
/// content is replaced.
#[derive(Debug, Clone)]
pub struct ImageHandler {
    blobs: Arc<BlobStore>,
}

impl ImageHandler {
    pub fn new(blobs: Arc<BlobStore>) -> Self {
        Self { blobs }
    }

    fn release_if_transient(&self, reference: &str) {
        if BlobStore::is_transient(reference) {
            self.blobs.release(reference);
        }
    }
}

impl NoteTypeHandler for ImageHandler {
    fn kind(&self) -> NoteKind {
        NoteKind::Image
    }

    fn create(&self, data: &NoteInput) -> Result<Note> {
        let content = resolve_content(NoteKind::Image, data, None);
        let body = NoteBody::Image {
            width: dimension(data, "width", None),
            height: dimension(data, "height", None),
            alt: data.metadata_str("alt").unwrap_or_default().to_string(),
            transforms: transforms_from_input(data).unwrap_or_default(),
        };
        Ok(new_note(content, data, body))
    }

    fn update(&self, note: &Note, updates: &NoteInput) -> Result<Note> {
        let NoteBody::Image { width, height, alt, transforms } = &note.body else {
            return Err(kind_mismatch(note, NoteKind::Image));
        };
        let content = resolve_content(NoteKind::Image, updates, Some(&note.content));
        let body = NoteBody::Image {
            width: dimension(updates, "width", *width),
            height: dimension(updates, "height", *height),
            alt: updates.metadata_str("alt").map_or_else(|| alt.clone(), str::to_string),
            transforms: transforms_from_input(updates).unwrap_or_else(|| transforms.clone()),
        };
        if content.content != note.content {
            self.release_if_transient(&note.content);
        }
        Ok(updated_note(note, content, updates, body))
    }

    fn delete(&self, note: &Note) -> Result<()> {
        ensure_kind(note, NoteKind::Image)?;
        self.release_if_transient(&note.content);
        Ok(())
    }

    fn validate(&self, note: &Note) -> bool {
        validate_common(note, NoteKind::Image)
            && matches!(&note.body, NoteBody::Image { transforms, .. } if transforms.iter().all(is_valid_transform))
    }

    fn deserialize(&self, text: &str) -> Result<Note> {
        let mut record = decode(text, NoteKind::Image)?;
        let width = record.take_optional_u32("width")?;
        let height = record.take_optional_u32("height")?;
        let alt = record.take_optional_str("alt")?.unwrap_or_default();
        let transforms = match record.take_metadata("transforms") {
            Some(value) => serde_json::from_value(value)
                .map_err(|_| malformed_field("transforms", "a list of image transforms"))?,
            None => Vec::new(),
        };
        Ok(record.into_note(NoteBody::Image { width, height, alt, transforms }))
    }

    fn search_text(&self, note: &Note) -> String {
        match &note.body {
            NoteBody::Image { alt, .. } => alt.clone(),
            _ => String::new(),
        }
    }
}

pub fn module(blobs: Arc<BlobStore>) -> KindModule {
    KindModule::new(
        kind_descriptor(
            NoteKind::Image,
            "Image",
            "Pictures by URL or pasted from the clipboard",
            vec![SlashCommand::new("/image", "Image").alias("img").alias("picture").icon("image")],
            Vec::new(),
        ),
        Arc::new(ImageHandler::new(blobs)),
    )
}
