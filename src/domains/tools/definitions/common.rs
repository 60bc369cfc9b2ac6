//! Result helpers shared by the tool definitions.

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use tracing::warn;

/// Create an error result with a text message.
pub fn error_result(message: &str) -> CallToolResult {
    warn!("{}", message);
    CallToolResult::error(vec![Content::text(message.to_string())])
}

/// Create a success result carrying a text summary and structured content.
pub fn structured_result<T: Serialize>(summary: impl Into<String>, data: &T) -> CallToolResult {
    with_structured(CallToolResult::success(vec![Content::text(summary)]), data)
}

/// Create an error result that still carries structured content.
pub fn structured_error<T: Serialize>(summary: impl Into<String>, data: &T) -> CallToolResult {
    with_structured(CallToolResult::error(vec![Content::text(summary)]), data)
}

fn with_structured<T: Serialize>(mut result: CallToolResult, data: &T) -> CallToolResult {
    match serde_json::to_value(data) {
        Ok(value) => {
            result.structured_content = Some(value);
            result
        }
        Err(e) => error_result(&format!("Failed to serialize tool output: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;

    #[test]
    fn test_structured_result() {
        let result = structured_result("done", &serde_json::json!({ "value": 1 }));
        assert_eq!(result.is_error, Some(false));
        assert_eq!(
            result.structured_content,
            Some(serde_json::json!({ "value": 1 }))
        );
        match &result.content[0].raw {
            RawContent::Text(text) => assert_eq!(text.text, "done"),
            _ => panic!("expected text content"),
        }
    }

    #[test]
    fn test_structured_error() {
        let result = structured_error("failed", &serde_json::json!({ "error": "boom" }));
        assert_eq!(result.is_error, Some(true));
        assert!(result.structured_content.is_some());
    }
}
