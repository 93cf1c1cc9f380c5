//! Module descriptors: what a plugin declares to the host and how it installs.

use crate::core::transform::ContentTransform;
use crate::{NoteKind, NoteTypeHandler, QuireError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// What a module lets the host do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_create: bool,
    pub can_edit: bool,
    pub can_transform: bool,
    #[serde(default)]
    pub can_export: bool,
    #[serde(default)]
    pub can_import: bool,
    #[serde(default)]
    pub supports_search: bool,
}

impl Capabilities {
    /// A module that owns a kind and supports every note operation.
    pub fn owning() -> Self {
        Self {
            can_create: true,
            can_edit: true,
            can_transform: false,
            can_export: true,
            can_import: true,
            supports_search: true,
        }
    }

    /// A module that only reads content for display.
    pub fn transform_only() -> Self {
        Self { can_transform: true, ..Self::default() }
    }
}

/// A slash command that inserts a note of the module's kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlashCommand {
    pub command: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Input applied to `create` when the command is chosen.
    #[serde(default)]
    pub default_parameters: Map<String, Value>,
}

impl SlashCommand {
    pub fn new(command: &str, description: &str) -> Self {
        Self {
            command: command.to_string(),
            aliases: Vec::new(),
            description: description.to_string(),
            icon: None,
            default_parameters: Map::new(),
        }
    }

    #[must_use]
    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }

    #[must_use]
    pub fn default_parameter(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.default_parameters.insert(key.to_string(), value.into());
        self
    }

    /// Matches `name` against the command and its aliases, ignoring case and a leading `/`.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.trim().trim_start_matches('/');
        std::iter::once(&self.command)
            .chain(self.aliases.iter())
            .any(|candidate| candidate.trim_start_matches('/').eq_ignore_ascii_case(name))
    }
}

/// Type of a user-tunable module parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    Text,
    Number,
    Boolean,
    Select,
}

/// A user-tunable setting a module exposes to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleParameter {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub param_type: ParameterType,
    pub default_value: Value,
    /// Allowed values, for `select` parameters.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub description: String,
}

/// Opaque references to presentation-layer components, resolved by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<String>,
}

/// Everything a module declares about itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    pub id: String,
    pub name: String,
    pub version: String,
    pub description: String,
    pub supported_types: Vec<NoteKind>,
    #[serde(default)]
    pub slash_commands: Vec<SlashCommand>,
    #[serde(default)]
    pub parameters: Vec<ModuleParameter>,
    #[serde(default)]
    pub components: Components,
    pub capabilities: Capabilities,
}

/// A plugin installed into the registry at startup.
pub trait NoteModule: Send + Sync {
    fn descriptor(&self) -> &ModuleDescriptor;

    /// Registers one handler per supported kind through `context`.
    fn install(&self, context: &mut InstallContext<'_>) -> Result<()>;

    /// The display transform, for modules declaring `canTransform`.
    fn transformer(&self) -> Option<&dyn ContentTransform> {
        None
    }
}

/// A handler together with the module that registered it.
#[derive(Debug, Clone)]
pub(crate) struct Registration {
    pub(crate) module_id: String,
    pub(crate) handler: Arc<dyn NoteTypeHandler>,
}

/// The one capability a module receives during `install`.
pub struct InstallContext<'a> {
    module_id: &'a str,
    table: &'a mut HashMap<NoteKind, Registration>,
    registered: Vec<NoteKind>,
}

impl<'a> InstallContext<'a> {
    pub(crate) fn new(module_id: &'a str, table: &'a mut HashMap<NoteKind, Registration>) -> Self {
        Self { module_id, table, registered: Vec::new() }
    }

    /// Associates `kind_tag` with `handler`.
    ///
    /// # Errors
    ///
    /// - [`QuireError::NotFound`] if `kind_tag` is not a known kind.
    /// - [`QuireError::Validation`] if the handler owns a different kind.
    /// - [`QuireError::DuplicateRegistration`] if the kind already has a handler.
    pub fn register_note_type(&mut self, kind_tag: &str, handler: Arc<dyn NoteTypeHandler>) -> Result<()> {
        let kind: NoteKind = kind_tag.parse()?;
        if handler.kind() != kind {
            return Err(QuireError::Validation(format!(
                "handler for {} cannot be registered as {kind}",
                handler.kind()
            )));
        }
        if let Some(existing) = self.table.get(&kind) {
            return Err(QuireError::DuplicateRegistration(format!(
                "note type '{kind}' is already provided by module '{}'",
                existing.module_id
            )));
        }
        log::debug!("module '{}' registered note type '{kind}'", self.module_id);
        self.table.insert(
            kind,
            Registration { module_id: self.module_id.to_string(), handler },
        );
        self.registered.push(kind);
        Ok(())
    }

    pub(crate) fn into_registered(self) -> Vec<NoteKind> {
        self.registered
    }
}
