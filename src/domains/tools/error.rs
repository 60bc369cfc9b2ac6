//! Tool-specific error types.

use thiserror::Error;

/// Errors that can occur while dispatching a tool call.
///
/// Failures inside a tool (a bad expression, an unreachable weather API)
/// are not errors at this level: tools report them in their result.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found or is disabled.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// The arguments do not match the tool's input schema.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }
}
