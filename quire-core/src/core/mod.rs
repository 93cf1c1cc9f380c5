//! Internal domain modules for the Quire note-type core.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod blobs;
pub mod error;
pub mod export;
pub mod handler;
pub mod ids;
pub mod interchange;
pub mod kinds;
pub mod module;
pub mod normalize;
pub mod note;
pub mod registry;
pub mod settings;
pub mod todo_text;
pub mod transform;

#[doc(inline)]
pub use blobs::BlobStore;
#[doc(inline)]
pub use error::{QuireError, Result};
#[doc(inline)]
pub use export::{export_notes, import_notes, peek_bundle, BundleSummary, ExportBundle, APP_VERSION};
#[doc(inline)]
pub use handler::NoteTypeHandler;
#[doc(inline)]
pub use ids::{generate_id, next_timestamp};
#[doc(inline)]
pub use module::{Capabilities, InstallContext, ModuleDescriptor, NoteModule, SlashCommand};
#[doc(inline)]
pub use note::{ImageTransform, Note, NoteBody, NoteInput, NoteKind, TodoItem};
#[doc(inline)]
pub use registry::{NoteRegistry, SlashMatch};
#[doc(inline)]
pub use settings::{load_settings, save_settings, CoreSettings, MarkdownOptions};
#[doc(inline)]
pub use todo_text::{parse_text_to_items, serialize_items_to_text};
#[doc(inline)]
pub use transform::{ContentTransform, TransformModule};
