//! Transforms written as Rhai scripts.
//!
//! A script defines `fn transform(content)` returning a string, and may name
//! itself with front matter:
//!
//! ```rhai
//! // @name: Shout
//! // @description: Upper-cases everything
//! fn transform(content) { content.to_upper() }
//! ```

use super::{transform_descriptor, ContentTransform, TransformModule};
use crate::{QuireError, Result};
use rhai::{Engine, Scope, AST};

/// Bounds a single transform call so a runaway script cannot stall display.
const MAX_OPERATIONS: u64 = 500_000;

/// Parsed front-matter metadata from a script's leading comments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    pub name: String,
    pub description: String,
    pub version: String,
}

/// Reads `// @key: value` lines from the leading comment block of a script.
///
/// Blank lines are skipped; the first line of code ends the block.
pub fn parse_front_matter(source: &str) -> FrontMatter {
    let mut fm = FrontMatter::default();
    let header = source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map_while(|line| line.strip_prefix("//"));
    for comment in header {
        let Some((key, value)) = comment.trim().strip_prefix('@').and_then(|tag| tag.split_once(':')) else {
            continue;
        };
        let field = match key.trim() {
            "name" => &mut fm.name,
            "description" => &mut fm.description,
            "version" => &mut fm.version,
            _ => continue,
        };
        *field = value.trim().to_string();
    }
    fm
}

/// Lower-cased alphanumeric runs of `name` joined by `-`; `"script"` if there are none.
pub fn slugify(name: &str) -> String {
    let words: Vec<String> = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect();
    if words.is_empty() {
        "script".to_string()
    } else {
        words.join("-")
    }
}

/// A compiled Rhai `transform(content)` function.
#[derive(Debug)]
pub struct ScriptTransform {
    engine: Engine,
    ast: AST,
}

impl ScriptTransform {
    /// Compiles `source` and checks that it defines `transform(content)`.
    ///
    /// # Errors
    ///
    /// Returns [`QuireError::Scripting`] if the script does not compile or
    /// lacks a one-argument `transform` function.
    pub fn compile(source: &str) -> Result<Self> {
        let mut engine = Engine::new();
        engine.set_max_operations(MAX_OPERATIONS);
        let ast = engine
            .compile(source)
            .map_err(|e| QuireError::Scripting(e.to_string()))?;
        let has_entry = ast
            .iter_functions()
            .any(|f| f.name == "transform" && f.params.len() == 1);
        if !has_entry {
            return Err(QuireError::Scripting(
                "script must define fn transform(content)".to_string(),
            ));
        }
        Ok(Self { engine, ast })
    }
}

impl ContentTransform for ScriptTransform {
    fn transform(&self, content: &str) -> Result<String> {
        self.engine
            .call_fn::<String>(&mut Scope::new(), &self.ast, "transform", (content.to_string(),))
            .map_err(|e| QuireError::Scripting(format!("transform failed: {e}")))
    }
}

/// Builds a transform module from a Rhai script.
///
/// The module id is `script-<slug of @name>`.
pub fn script_module(source: &str) -> Result<TransformModule> {
    let transform = ScriptTransform::compile(source)?;
    let fm = parse_front_matter(source);
    let name = if fm.name.is_empty() { "Script transform".to_string() } else { fm.name };
    let version = if fm.version.is_empty() { "0.0.0".to_string() } else { fm.version };
    let id = format!("script-{}", slugify(&name));
    log::debug!("compiled transform script '{name}' as module '{id}'");
    Ok(TransformModule::new(
        transform_descriptor(&id, &name, &version, &fm.description, Vec::new()),
        Box::new(transform),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NoteModule;

    const SHOUT: &str = "// @name: Shout Out\n// @description: Upper-cases everything\n// @version: 1.2.0\n\nfn transform(content) { content.to_upper() }\n";

    #[test]
    fn test_parse_front_matter() {
        let fm = parse_front_matter(SHOUT);
        assert_eq!(fm.name, "Shout Out");
        assert_eq!(fm.description, "Upper-cases everything");
        assert_eq!(fm.version, "1.2.0");
    }

    #[test]
    fn test_front_matter_stops_at_code() {
        let fm = parse_front_matter("fn transform(c) { c }\n// @name: Late");
        assert_eq!(fm, FrontMatter::default());
    }

    #[test]
    fn test_unknown_keys_and_colons_in_values() {
        let fm = parse_front_matter("// @author: me\n// @description: a: b\nfn transform(c) { c }");
        assert_eq!(fm.name, "");
        assert_eq!(fm.description, "a: b");
    }

    #[test]
    fn test_regular_comments_are_skipped() {
        let fm = parse_front_matter("// just a note\n// @name: After\nfn transform(c) { c }");
        assert_eq!(fm.name, "After");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Shout Out"), "shout-out");
        assert_eq!(slugify("  Spaced  Out!! "), "spaced-out");
        assert_eq!(slugify("---"), "script");
        assert_eq!(slugify("Größe_2 ümlaut"), "größe-2-ümlaut");
        assert_eq!(slugify(""), "script");
    }

    #[test]
    fn test_script_module_transforms() {
        let module = script_module(SHOUT).unwrap();
        assert_eq!(module.descriptor().id, "script-shout-out");
        assert_eq!(module.descriptor().version, "1.2.0");
        assert!(module.descriptor().capabilities.can_transform);
        let out = module.transformer().unwrap().transform("hi there").unwrap();
        assert_eq!(out, "HI THERE");
    }

    #[test]
    fn test_missing_transform_fn_is_rejected() {
        let err = ScriptTransform::compile("fn other(x) { x }").unwrap_err();
        assert!(matches!(err, QuireError::Scripting(_)));
    }

    #[test]
    fn test_syntax_error_is_rejected() {
        assert!(matches!(ScriptTransform::compile("fn transform(c) {"), Err(QuireError::Scripting(_))));
    }

    #[test]
    fn test_runtime_error_surfaces() {
        let t = ScriptTransform::compile("fn transform(c) { throw \"boom\"; }").unwrap();
        assert!(matches!(t.transform("x"), Err(QuireError::Scripting(_))));
    }

    #[test]
    fn test_non_string_result_is_an_error() {
        let t = ScriptTransform::compile("fn transform(c) { 42 }").unwrap();
        assert!(t.transform("x").is_err());
    }

    #[test]
    fn test_runaway_script_is_stopped() {
        let t = ScriptTransform::compile("fn transform(c) { loop { } }").unwrap();
        assert!(t.transform("x").is_err());
    }
}
