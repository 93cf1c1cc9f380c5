//! Error types for the Quire core library.

use thiserror::Error;

/// All errors that can occur within the Quire core library.
#[derive(Debug, Error)]
pub enum QuireError {
    /// A note failed validation and must not be persisted.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A kind tag, module, transform or slash command is not registered.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Interchange text did not parse into the expected note shape.
    #[error("Malformed interchange data: {0}")]
    MalformedInterchange(String),

    /// The owning module does not declare the capability for this operation.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A kind tag or module id was registered twice.
    #[error("Already registered: {0}")]
    DuplicateRegistration(String),

    /// A Rhai transform script failed to compile or execute.
    #[error("Scripting error: {0}")]
    Scripting(String),

    /// An I/O operation on the filesystem failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings or bundle JSON could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias that pins the error type to [`QuireError`].
pub type Result<T> = std::result::Result<T, QuireError>;

impl QuireError {
    /// Returns a short, human-readable message suitable for display to the end user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::NotFound(what) => format!("Unknown note type or module: {what}"),
            Self::MalformedInterchange(_) => "The note data could not be read".to_string(),
            Self::UnsupportedOperation(msg) => format!("Not available here: {msg}"),
            Self::DuplicateRegistration(what) => format!("Already installed: {what}"),
            Self::Scripting(e) => format!("Script error: {e}"),
            Self::Io(e) => format!("File error: {e}"),
            Self::Json(e) => format!("Data format error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_the_tag() {
        let e = QuireError::NotFound("sketch".to_string());
        assert!(e.to_string().contains("sketch"));
        assert!(e.user_message().contains("sketch"));
    }

    #[test]
    fn test_malformed_user_message_hides_parser_detail() {
        let e = QuireError::MalformedInterchange("expected value at line 1 column 1".to_string());
        assert!(!e.user_message().contains("line 1"));
    }

    #[test]
    fn test_json_error_converts() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: QuireError = err.into();
        assert!(matches!(e, QuireError::Json(_)));
    }
}
