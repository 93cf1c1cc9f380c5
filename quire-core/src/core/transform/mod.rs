//! Read-only transform modules.
//!
//! A transform module owns no note kind. It reads any note's canonical
//! content and returns a display-time view of it; the note is never changed.

pub mod rot13;
pub mod script;

pub use rot13::Rot13;
pub use script::ScriptTransform;

use crate::core::module::{Capabilities, Components, SlashCommand};
use crate::{InstallContext, ModuleDescriptor, NoteModule, Result};
use std::fmt;

/// A pure content → display text function.
pub trait ContentTransform: Send + Sync {
    fn transform(&self, content: &str) -> Result<String>;
}

/// A module that exposes one [`ContentTransform`] and registers no kinds.
pub struct TransformModule {
    descriptor: ModuleDescriptor,
    transform: Box<dyn ContentTransform>,
}

impl TransformModule {
    pub fn new(descriptor: ModuleDescriptor, transform: Box<dyn ContentTransform>) -> Self {
        Self { descriptor, transform }
    }
}

impl fmt::Debug for TransformModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformModule")
            .field("id", &self.descriptor.id)
            .finish_non_exhaustive()
    }
}

impl NoteModule for TransformModule {
    fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    fn install(&self, _context: &mut InstallContext<'_>) -> Result<()> {
        Ok(())
    }

    fn transformer(&self) -> Option<&dyn ContentTransform> {
        Some(self.transform.as_ref())
    }
}

pub(crate) fn transform_descriptor(
    id: &str,
    name: &str,
    version: &str,
    description: &str,
    slash_commands: Vec<SlashCommand>,
) -> ModuleDescriptor {
    ModuleDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        version: version.to_string(),
        description: description.to_string(),
        supported_types: Vec::new(),
        slash_commands,
        parameters: Vec::new(),
        components: Components { editor: None, viewer: Some(format!("{id}-viewer")) },
        capabilities: Capabilities::transform_only(),
    }
}
