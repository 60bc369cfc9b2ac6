//! Prompt-specific error types.

use thiserror::Error;

/// Errors raised while loading or rendering prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt not found: {0}")]
    NotFound(String),

    /// A required argument was absent or empty on `prompts/get`.
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// The template text is malformed.
    #[error("Template error: {0}")]
    Template(String),

    /// A prompt file has no usable name.
    #[error("Invalid prompt file: {0}")]
    InvalidFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid prompt JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl PromptError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn missing_argument(arg: impl Into<String>) -> Self {
        Self::MissingArgument(arg.into())
    }

    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    pub fn invalid_file(msg: impl Into<String>) -> Self {
        Self::InvalidFile(msg.into())
    }

    /// Whether the caller's request caused the error, as opposed to the
    /// server's own prompt files.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::MissingArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(PromptError::not_found("x").is_client_error());
        assert!(PromptError::missing_argument("problem").is_client_error());
        assert!(!PromptError::template("missing {{/if}}").is_client_error());

        let err: PromptError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(!err.is_client_error());
        assert!(err.to_string().starts_with("Invalid prompt JSON"));
    }
}
