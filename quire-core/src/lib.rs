//! Core library for Quire's note types: the plugin contract every kind of
//! note content implements, and the registry that dispatches on it.
//!
//! A host builds one [`NoteRegistry`] at startup, normally with
//! [`NoteRegistry::with_builtins`], and keeps it for the life of the process.
//! Every note operation goes through the handler the registry returns for the
//! note's kind tag:
//!
//! ```rust
//! use quire_core::{BlobStore, CoreSettings, NoteInput, NoteRegistry};
//! use std::sync::Arc;
//!
//! let registry = NoteRegistry::with_builtins(&CoreSettings::default(), Arc::new(BlobStore::new()))?;
//! let todo = registry.create("todo", &NoteInput::new().with("content", "[ ] write docs"))?;
//! assert!(registry.validate(&todo));
//! assert_eq!(todo.items().map(<[_]>::len), Some(1));
//! # Ok::<(), quire_core::QuireError>(())
//! ```
//!
//! The core performs no persistence, networking or presentation. It defines
//! the shape and rules those layers must respect.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

pub use crate::core::{kinds, transform};

// Re-export commonly used types.
#[doc(inline)]
pub use crate::core::{
    blobs::BlobStore,
    error::{QuireError, Result},
    export::{
        export_notes, export_to_file, import_from_file, import_notes, peek_bundle, BundleSummary,
        ExportBundle, APP_VERSION, BUNDLE_VERSION,
    },
    handler::NoteTypeHandler,
    ids::{generate_id, next_timestamp, now_millis},
    interchange::NoteRecord,
    kinds::{builtin_modules, CodeHandler, ImageHandler, KindModule, MarkdownHandler, TextHandler, TodoHandler},
    module::{
        Capabilities, Components, InstallContext, ModuleDescriptor, ModuleParameter, NoteModule, ParameterType,
        SlashCommand,
    },
    note::{ImageTransform, Note, NoteBody, NoteInput, NoteKind, TodoItem},
    registry::{NoteRegistry, SlashMatch},
    settings::{load_settings, save_settings, CoreSettings, MarkdownOptions},
    todo_text::{parse_text_to_items, serialize_items_to_text},
    transform::{ContentTransform, Rot13, ScriptTransform, TransformModule},
};
