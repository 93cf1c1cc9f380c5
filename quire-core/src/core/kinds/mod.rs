//! Built-in note kinds and the modules that install them.

pub mod code;
pub mod image;
pub mod markdown;
pub mod text;
pub mod todo;

pub use code::CodeHandler;
pub use image::ImageHandler;
pub use markdown::MarkdownHandler;
pub use text::TextHandler;
pub use todo::TodoHandler;

use crate::core::module::{Capabilities, Components, ModuleParameter, SlashCommand};
use crate::core::transform;
use crate::{BlobStore, CoreSettings, InstallContext, ModuleDescriptor, NoteKind, NoteModule, NoteTypeHandler, Result};
use std::fmt;
use std::sync::Arc;

/// A module that owns exactly one note kind through one handler.
pub struct KindModule {
    descriptor: ModuleDescriptor,
    handler: Arc<dyn NoteTypeHandler>,
}

impl KindModule {
    pub fn new(descriptor: ModuleDescriptor, handler: Arc<dyn NoteTypeHandler>) -> Self {
        Self { descriptor, handler }
    }
}

impl fmt::Debug for KindModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindModule")
            .field("id", &self.descriptor.id)
            .field("kind", &self.handler.kind())
            .finish()
    }
}

impl NoteModule for KindModule {
    fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    fn install(&self, context: &mut InstallContext<'_>) -> Result<()> {
        for kind in &self.descriptor.supported_types {
            context.register_note_type(kind.tag(), Arc::clone(&self.handler))?;
        }
        Ok(())
    }
}

/// Descriptor shared by the built-in kind modules.
pub(crate) fn kind_descriptor(
    kind: NoteKind,
    name: &str,
    description: &str,
    slash_commands: Vec<SlashCommand>,
    parameters: Vec<ModuleParameter>,
) -> ModuleDescriptor {
    ModuleDescriptor {
        id: kind.tag().to_string(),
        name: name.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: description.to_string(),
        supported_types: vec![kind],
        slash_commands,
        parameters,
        components: Components {
            editor: Some(format!("{kind}-editor")),
            viewer: Some(format!("{kind}-viewer")),
        },
        capabilities: Capabilities::owning(),
    }
}

/// Every built-in module, in install order: the five kinds, then the cipher view.
pub fn builtin_modules(settings: &CoreSettings, blobs: Arc<BlobStore>) -> Vec<Arc<dyn NoteModule>> {
    vec![
        Arc::new(text::module()),
        Arc::new(code::module(&settings.default_code_language)),
        Arc::new(markdown::module(settings.markdown)),
        Arc::new(image::module(blobs)),
        Arc::new(todo::module()),
        Arc::new(transform::rot13::cipher_module()),
    ]
}
