//! The kind-tag → handler table and the module set that filled it.
//!
//! [`NoteRegistry`] is built once at startup, usually with
//! [`NoteRegistry::with_builtins`], and then passed by reference to anything
//! that needs a handler. It is read-only after installation.

use crate::core::kinds::builtin_modules;
use crate::core::module::Registration;
use crate::{
    BlobStore, Capabilities, CoreSettings, InstallContext, Note, NoteInput, NoteKind, NoteModule,
    NoteTypeHandler, QuireError, Result,
};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The outcome of resolving a slash command typed by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct SlashMatch {
    pub module_id: String,
    /// The first kind the module supports; `None` for transform modules.
    pub kind: Option<NoteKind>,
    /// Input the host should pass to `create` for this command.
    pub default_parameters: NoteInput,
}

/// Explicit registry of installed modules and the handlers they registered.
///
/// Duplicate kind tags and duplicate module ids are rejected with
/// [`QuireError::DuplicateRegistration`]; a registration is never replaced.
#[derive(Default)]
pub struct NoteRegistry {
    handlers: HashMap<NoteKind, Registration>,
    modules: Vec<Arc<dyn NoteModule>>,
}

impl fmt::Debug for NoteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modules: Vec<&str> = self.modules.iter().map(|m| m.descriptor().id.as_str()).collect();
        f.debug_struct("NoteRegistry")
            .field("modules", &modules)
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl NoteRegistry {
    /// Creates an empty registry with no modules installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in module not listed in
    /// `settings.disabled_modules`.
    ///
    /// # Errors
    ///
    /// Propagates any installation failure; the built-ins never conflict.
    pub fn with_builtins(settings: &CoreSettings, blobs: Arc<BlobStore>) -> Result<Self> {
        let mut registry = Self::new();
        for module in builtin_modules(settings, blobs) {
            let id = &module.descriptor().id;
            if settings.disabled_modules.iter().any(|disabled| disabled == id) {
                log::warn!("built-in module '{id}' is disabled by settings");
                continue;
            }
            registry.install(module)?;
        }
        log::info!(
            "note registry ready: {} modules, kinds [{}]",
            registry.modules.len(),
            registry.kinds().iter().map(|k| k.tag()).collect::<Vec<_>>().join(", ")
        );
        Ok(registry)
    }

    /// Runs `module.install` and records the module.
    ///
    /// Installation is all-or-nothing: if the module fails, or registers a
    /// different set of kinds than its descriptor declares, the registry is
    /// left unchanged.
    ///
    /// # Errors
    ///
    /// - [`QuireError::DuplicateRegistration`] for a repeated module id or kind tag.
    /// - [`QuireError::Validation`] if the descriptor and the registrations disagree,
    ///   or `canTransform` is declared without a transformer.
    pub fn install(&mut self, module: Arc<dyn NoteModule>) -> Result<()> {
        let descriptor = module.descriptor();
        if self.module(&descriptor.id).is_some() {
            return Err(QuireError::DuplicateRegistration(format!(
                "module '{}' is already installed",
                descriptor.id
            )));
        }
        if descriptor.capabilities.can_transform && module.transformer().is_none() {
            return Err(QuireError::Validation(format!(
                "module '{}' declares canTransform but has no transform",
                descriptor.id
            )));
        }

        let mut staged = self.handlers.clone();
        let mut context = InstallContext::new(&descriptor.id, &mut staged);
        module.install(&mut context)?;
        let mut registered = context.into_registered();
        registered.sort();
        let mut declared = descriptor.supported_types.clone();
        declared.sort();
        declared.dedup();
        if registered != declared {
            return Err(QuireError::Validation(format!(
                "module '{}' declares {declared:?} but registered {registered:?}",
                descriptor.id
            )));
        }

        log::debug!("installed module '{}' v{}", descriptor.id, descriptor.version);
        self.handlers = staged;
        self.modules.push(module);
        Ok(())
    }

    /// Returns the handler for `kind_tag`.
    ///
    /// # Errors
    ///
    /// Returns [`QuireError::NotFound`] if the tag is unknown or has no handler.
    pub fn lookup(&self, kind_tag: &str) -> Result<Arc<dyn NoteTypeHandler>> {
        let kind: NoteKind = kind_tag.parse()?;
        self.handler_for(kind)
    }

    pub fn handler_for(&self, kind: NoteKind) -> Result<Arc<dyn NoteTypeHandler>> {
        self.registration(kind).map(|r| Arc::clone(&r.handler))
    }

    pub fn module(&self, module_id: &str) -> Option<&Arc<dyn NoteModule>> {
        self.modules.iter().find(|m| m.descriptor().id == module_id)
    }

    /// Installed modules in install order.
    pub fn modules(&self) -> &[Arc<dyn NoteModule>] {
        &self.modules
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<NoteKind> {
        let mut kinds: Vec<NoteKind> = self.handlers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Modules that expose a display transform.
    pub fn transform_modules(&self) -> Vec<&Arc<dyn NoteModule>> {
        self.modules
            .iter()
            .filter(|m| m.descriptor().capabilities.can_transform)
            .collect()
    }

    fn registration(&self, kind: NoteKind) -> Result<&Registration> {
        self.handlers
            .get(&kind)
            .ok_or_else(|| QuireError::NotFound(format!("no handler registered for note type '{kind}'")))
    }

    fn require_module(&self, module_id: &str) -> Result<&Arc<dyn NoteModule>> {
        self.module(module_id)
            .ok_or_else(|| QuireError::NotFound(format!("module '{module_id}'")))
    }

    /// The owning module's capabilities, with the handler.
    fn owner(&self, kind: NoteKind) -> Result<(Capabilities, &Registration)> {
        let registration = self.registration(kind)?;
        let module = self.require_module(&registration.module_id)?;
        Ok((module.descriptor().capabilities, registration))
    }

    /// Creates a note of `kind_tag` if its module declares `canCreate`.
    ///
    /// # Errors
    ///
    /// [`QuireError::NotFound`] for an unknown tag, [`QuireError::UnsupportedOperation`]
    /// when the owning module cannot create.
    pub fn create(&self, kind_tag: &str, data: &NoteInput) -> Result<Note> {
        let kind: NoteKind = kind_tag.parse()?;
        let (caps, registration) = self.owner(kind)?;
        if !caps.can_create {
            return Err(unsupported(&registration.module_id, "create"));
        }
        registration.handler.create(data)
    }

    /// Creates a note through a specific module, as a slash command would.
    pub fn create_with(&self, module_id: &str, kind_tag: &str, data: &NoteInput) -> Result<Note> {
        let module = self.require_module(module_id)?;
        let descriptor = module.descriptor();
        let kind: NoteKind = kind_tag.parse()?;
        if !descriptor.capabilities.can_create || !descriptor.supported_types.contains(&kind) {
            return Err(unsupported(module_id, &format!("create {kind} notes")));
        }
        self.handler_for(kind)?.create(data)
    }

    /// Updates `note` if its module declares `canEdit`.
    pub fn update(&self, note: &Note, updates: &NoteInput) -> Result<Note> {
        let (caps, registration) = self.owner(note.kind())?;
        if !caps.can_edit {
            return Err(unsupported(&registration.module_id, "edit"));
        }
        registration.handler.update(note, updates)
    }

    pub fn delete(&self, note: &Note) -> Result<()> {
        self.handler_for(note.kind())?.delete(note)
    }

    /// `false` also when no handler is registered for the note's kind.
    pub fn validate(&self, note: &Note) -> bool {
        self.handler_for(note.kind()).is_ok_and(|handler| handler.validate(note))
    }

    /// Like [`validate`](Self::validate) but fails with [`QuireError::Validation`],
    /// for callers about to persist `note`.
    pub fn ensure_valid(&self, note: &Note) -> Result<()> {
        if self.handler_for(note.kind())?.validate(note) {
            Ok(())
        } else {
            Err(QuireError::Validation(format!("{} note {} is not valid", note.kind(), note.id())))
        }
    }

    pub fn serialize(&self, note: &Note) -> Result<String> {
        self.handler_for(note.kind())?.serialize(note)
    }

    /// Deserializes a record of any registered kind, dispatching on its `type`.
    ///
    /// # Errors
    ///
    /// [`QuireError::MalformedInterchange`] if `text` is not a JSON object with a
    /// string `type`; [`QuireError::NotFound`] if that type has no handler.
    pub fn deserialize(&self, text: &str) -> Result<Note> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| QuireError::MalformedInterchange(format!("not a note record: {e}")))?;
        let tag = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| QuireError::MalformedInterchange("note record has no type".to_string()))?;
        self.lookup(tag)?.deserialize(text)
    }

    /// Searchable text for `note`, if its module declares `supportsSearch`.
    pub fn search_text(&self, note: &Note) -> Result<String> {
        let (caps, registration) = self.owner(note.kind())?;
        if !caps.supports_search {
            return Err(unsupported(&registration.module_id, "search"));
        }
        Ok(registration.handler.search_text(note))
    }

    /// Renders `note` through a transform module. The note is not modified.
    ///
    /// # Errors
    ///
    /// [`QuireError::NotFound`] for an unknown module,
    /// [`QuireError::UnsupportedOperation`] if it has no transform.
    pub fn apply_transform(&self, module_id: &str, note: &Note) -> Result<String> {
        let module = self.require_module(module_id)?;
        match module.transformer() {
            Some(transform) if module.descriptor().capabilities.can_transform => {
                transform.transform(note.content())
            }
            _ => Err(unsupported(module_id, "transform")),
        }
    }

    /// Finds the module whose slash command or alias matches `name`.
    ///
    /// Modules are searched in install order.
    pub fn resolve_slash_command(&self, name: &str) -> Result<SlashMatch> {
        self.modules
            .iter()
            .find_map(|module| {
                let descriptor = module.descriptor();
                descriptor
                    .slash_commands
                    .iter()
                    .find(|command| command.matches(name))
                    .map(|command| SlashMatch {
                        module_id: descriptor.id.clone(),
                        kind: descriptor.supported_types.first().copied(),
                        default_parameters: NoteInput::from(command.default_parameters.clone()),
                    })
            })
            .ok_or_else(|| QuireError::NotFound(format!("slash command '{name}'")))
    }

    pub(crate) fn capabilities_for(&self, kind: NoteKind) -> Result<Capabilities> {
        self.owner(kind).map(|(caps, _)| caps)
    }
}

fn unsupported(module_id: &str, operation: &str) -> QuireError {
    QuireError::UnsupportedOperation(format!("module '{module_id}' does not support {operation}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kinds::{text, KindModule};
    use crate::core::transform::script::script_module;
    use crate::{ModuleDescriptor, TextHandler};
    use serde_json::json;

    fn builtins() -> (Arc<BlobStore>, NoteRegistry) {
        let blobs = Arc::new(BlobStore::new());
        let registry = NoteRegistry::with_builtins(&CoreSettings::default(), Arc::clone(&blobs)).unwrap();
        (blobs, registry)
    }

    /// A module whose install registers nothing, whatever it declares.
    struct Silent(ModuleDescriptor);

    impl NoteModule for Silent {
        fn descriptor(&self) -> &ModuleDescriptor {
            &self.0
        }

        fn install(&self, _context: &mut InstallContext<'_>) -> Result<()> {
            Ok(())
        }
    }

    fn read_only_text_module() -> KindModule {
        let mut descriptor = text::module().descriptor().clone();
        descriptor.id = "read-only-text".to_string();
        descriptor.capabilities = Capabilities { can_create: false, can_edit: false, ..Capabilities::owning() };
        KindModule::new(descriptor, Arc::new(TextHandler))
    }

    #[test]
    fn test_builtins_register_every_kind() {
        let (_, registry) = builtins();
        assert_eq!(registry.kinds(), NoteKind::ALL.to_vec());
        for kind in NoteKind::ALL {
            assert_eq!(registry.lookup(kind.tag()).unwrap().kind(), kind);
        }
        assert_eq!(registry.modules().len(), 6);
        assert_eq!(registry.transform_modules().len(), 1);
    }

    #[test]
    fn test_lookup_unregistered_tag_is_not_found() {
        let (_, registry) = builtins();
        assert!(matches!(registry.lookup("drawing"), Err(QuireError::NotFound(_))));
        assert!(matches!(NoteRegistry::new().lookup("text"), Err(QuireError::NotFound(_))));
    }

    #[test]
    fn test_disabled_modules_are_skipped() {
        let settings = CoreSettings {
            disabled_modules: vec!["image".to_string(), "cipher".to_string()],
            ..CoreSettings::default()
        };
        let registry = NoteRegistry::with_builtins(&settings, Arc::new(BlobStore::new())).unwrap();
        assert!(matches!(registry.lookup("image"), Err(QuireError::NotFound(_))));
        assert!(registry.module("cipher").is_none());
        assert!(registry.lookup("todo").is_ok());
    }

    #[test]
    fn test_duplicate_kind_is_rejected_and_table_unchanged() {
        let (_, mut registry) = builtins();
        let mut descriptor = text::module().descriptor().clone();
        descriptor.id = "other-text".to_string();
        let err = registry.install(Arc::new(KindModule::new(descriptor, Arc::new(TextHandler)))).unwrap_err();
        assert!(matches!(err, QuireError::DuplicateRegistration(_)));
        assert!(registry.module("other-text").is_none());
    }

    #[test]
    fn test_duplicate_module_id_is_rejected() {
        let mut registry = NoteRegistry::new();
        registry.install(Arc::new(text::module())).unwrap();
        let err = registry.install(Arc::new(text::module())).unwrap_err();
        assert!(matches!(err, QuireError::DuplicateRegistration(_)));
    }

    #[test]
    fn test_install_must_register_declared_kinds() {
        let descriptor = text::module().descriptor().clone();
        let err = NoteRegistry::new().install(Arc::new(Silent(descriptor))).unwrap_err();
        assert!(matches!(err, QuireError::Validation(_)));
    }

    #[test]
    fn test_transform_capability_needs_a_transform() {
        let mut descriptor = text::module().descriptor().clone();
        descriptor.supported_types.clear();
        descriptor.capabilities = Capabilities::transform_only();
        let err = NoteRegistry::new().install(Arc::new(Silent(descriptor))).unwrap_err();
        assert!(matches!(err, QuireError::Validation(_)));
    }

    #[test]
    fn test_every_created_and_updated_note_validates() {
        let (_, registry) = builtins();
        let samples = [
            ("text", json!({ "text": "hello" })),
            ("code", json!({ "code": "fn main() {}", "metadata": { "filename": "main.rs" } })),
            ("markdown", json!({ "markdown": "# Title\n\nbody" })),
            ("image", json!({ "content": "https://x/y.png", "metadata": { "alt": "y" } })),
            ("todo", json!({ "content": "- [x] a\n[ ] b" })),
        ];
        for (tag, data) in samples {
            let note = registry.create(tag, &NoteInput::from(data)).unwrap();
            assert!(registry.validate(&note), "{tag} create");
            registry.ensure_valid(&note).unwrap();
            let updated = registry
                .update(&note, &NoteInput::new().with("content", "changed").with("type", "text"))
                .unwrap();
            assert_eq!(updated.kind(), note.kind());
            assert!(registry.validate(&updated), "{tag} update");
        }
    }

    #[test]
    fn test_round_trip_through_registry() {
        let (_, registry) = builtins();
        let note = registry.create("markdown", &NoteInput::new().with("content", "*hi*")).unwrap();
        let text = registry.serialize(&note).unwrap();
        assert_eq!(registry.deserialize(&text).unwrap(), note);
    }

    #[test]
    fn test_deserialize_dispatch_errors() {
        let (_, registry) = builtins();
        assert!(matches!(registry.deserialize("{"), Err(QuireError::MalformedInterchange(_))));
        assert!(matches!(registry.deserialize(r#"{"id":"x"}"#), Err(QuireError::MalformedInterchange(_))));
        assert!(matches!(
            registry.deserialize(r#"{"id":"x","type":"drawing","content":""}"#),
            Err(QuireError::NotFound(_))
        ));
    }

    #[test]
    fn test_ensure_valid_reports_validation_error() {
        let (_, registry) = builtins();
        let mut note = registry.create("text", &NoteInput::new()).unwrap();
        note.id.clear();
        assert!(!registry.validate(&note));
        assert!(matches!(registry.ensure_valid(&note), Err(QuireError::Validation(_))));
    }

    #[test]
    fn test_capability_checks() {
        let mut registry = NoteRegistry::new();
        registry.install(Arc::new(read_only_text_module())).unwrap();
        let err = registry.create("text", &NoteInput::new()).unwrap_err();
        assert!(matches!(err, QuireError::UnsupportedOperation(_)));

        let note = TextHandler.create(&NoteInput::new()).unwrap();
        assert!(matches!(registry.update(&note, &NoteInput::new()), Err(QuireError::UnsupportedOperation(_))));
        assert_eq!(registry.search_text(&note).unwrap(), "");
        assert!(!registry.capabilities_for(NoteKind::Text).unwrap().can_create);
    }

    #[test]
    fn test_create_with_transform_module_is_unsupported() {
        let (_, registry) = builtins();
        let err = registry.create_with("cipher", "text", &NoteInput::new()).unwrap_err();
        assert!(matches!(err, QuireError::UnsupportedOperation(_)));
        let err = registry.create_with("code", "text", &NoteInput::new()).unwrap_err();
        assert!(matches!(err, QuireError::UnsupportedOperation(_)));
        let note = registry.create_with("code", "code", &NoteInput::new()).unwrap();
        assert_eq!(note.kind(), NoteKind::Code);
        assert!(matches!(registry.create_with("nope", "text", &NoteInput::new()), Err(QuireError::NotFound(_))));
    }

    #[test]
    fn test_apply_transform_leaves_note_unchanged() {
        let (_, registry) = builtins();
        let note = registry.create("todo", &NoteInput::new().with("content", "[ ] Hello")).unwrap();
        let before = note.clone();
        assert_eq!(registry.apply_transform("cipher", &note).unwrap(), "[ ] Uryyb");
        assert_eq!(note, before);
        assert!(matches!(registry.apply_transform("todo", &note), Err(QuireError::UnsupportedOperation(_))));
        assert!(matches!(registry.apply_transform("missing", &note), Err(QuireError::NotFound(_))));
    }

    #[test]
    fn test_scripted_transform_installs() {
        let (_, mut registry) = builtins();
        let module = script_module("// @name: Upper\nfn transform(c) { c.to_upper() }")
            .unwrap();
        registry.install(Arc::new(module)).unwrap();
        let note = registry.create("text", &NoteInput::new().with("content", "abc")).unwrap();
        assert_eq!(registry.apply_transform("script-upper", &note).unwrap(), "ABC");
    }

    #[test]
    fn test_resolve_slash_command() {
        let (_, registry) = builtins();
        let found = registry.resolve_slash_command("/Checklist").unwrap();
        assert_eq!(found.module_id, "todo");
        assert_eq!(found.kind, Some(NoteKind::Todo));
        assert_eq!(found.default_parameters.get_str("content"), Some("[ ] "));

        let rust = registry.resolve_slash_command("rust").unwrap();
        assert_eq!(rust.kind, Some(NoteKind::Code));
        assert_eq!(rust.default_parameters.metadata_str("language"), Some("rust"));

        let cipher = registry.resolve_slash_command("rot13").unwrap();
        assert_eq!(cipher.kind, None);

        assert!(matches!(registry.resolve_slash_command("/nope"), Err(QuireError::NotFound(_))));
    }

    #[test]
    fn test_registry_delete_releases_image_blob() {
        let (blobs, registry) = builtins();
        let reference = blobs.hold("image/png", vec![0; 8]);
        let note = registry.create("image", &NoteInput::new().with("content", reference.as_str())).unwrap();
        registry.delete(&note).unwrap();
        registry.delete(&note).unwrap();
        assert!(!blobs.is_held(&reference));
    }
}
