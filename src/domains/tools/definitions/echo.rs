//! Echo tool.
//!
//! Returns the caller's message, optionally uppercased and prefixed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::Config;

use super::ToolDefinition;
use super::common::structured_result;

/// Parameters for the echo tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct EchoParams {
    #[schemars(description = "Message to echo back")]
    pub message: String,

    #[schemars(description = "Optional prefix, rendered as '<prefix>: <message>'")]
    #[serde(default)]
    pub prefix: Option<String>,

    #[schemars(description = "Convert the message to uppercase (default: false)")]
    #[serde(default)]
    pub uppercase: bool,
}

/// Structured output of the echo tool.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct EchoOutput {
    pub message: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default)]
pub struct EchoTool;

impl EchoTool {
    /// Apply the uppercase and prefix options to the message.
    pub fn render(params: &EchoParams) -> String {
        let message = if params.uppercase {
            params.message.to_uppercase()
        } else {
            params.message.clone()
        };
        match params.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("{}: {}", prefix, message),
            _ => message,
        }
    }
}

#[async_trait]
impl ToolDefinition for EchoTool {
    const NAME: &'static str = "echo";

    const DESCRIPTION: &'static str = "Echo a message back, optionally uppercased and with a prefix. Returns the message and the server timestamp.";

    type Params = EchoParams;

    async fn execute(params: EchoParams, _config: Arc<Config>) -> CallToolResult {
        let message = Self::render(&params);
        debug!("Echoing message of {} bytes", message.len());
        let output = EchoOutput {
            message: message.clone(),
            timestamp: Local::now().to_rfc3339(),
        };
        structured_result(message, &output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(message: &str, prefix: Option<&str>, uppercase: bool) -> EchoParams {
        EchoParams {
            message: message.to_string(),
            prefix: prefix.map(str::to_string),
            uppercase,
        }
    }

    #[test]
    fn test_render() {
        assert_eq!(EchoTool::render(&params("hello", None, false)), "hello");
        assert_eq!(EchoTool::render(&params("hello", None, true)), "HELLO");
        assert_eq!(EchoTool::render(&params("hello", Some("bot"), true)), "bot: HELLO");
        assert_eq!(EchoTool::render(&params("hello", Some(""), false)), "hello");
    }

    #[test]
    fn test_params_defaults() {
        let params: EchoParams = serde_json::from_str(r#"{"message": "hi"}"#).unwrap();
        assert!(!params.uppercase);
        assert!(params.prefix.is_none());
    }

    #[tokio::test]
    async fn test_execute() {
        let config = Arc::new(Config::default());
        let result = EchoTool::execute(params("hi", Some("echo"), false), config).await;
        assert_eq!(result.is_error, Some(false));
        let output = result.structured_content.unwrap();
        assert_eq!(output["message"], "echo: hi");
        let timestamp = output["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }
}
