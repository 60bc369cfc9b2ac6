//! Tool definitions module.
//!
//! Each tool lives in its own module and implements [`ToolDefinition`],
//! which is all the router and the registry need to expose it.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::handler::server::tool::cached_schema_for_type;
use rmcp::model::{CallToolResult, Tool};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::core::config::Config;

pub mod calculator;
pub mod common;
pub mod echo;
pub mod weather;

pub use calculator::{CalculatorParams, CalculatorTool};
pub use echo::{EchoParams, EchoTool};
pub use weather::{WeatherParams, WeatherTool};

/// A tool that can be listed and called over any transport.
#[async_trait]
pub trait ToolDefinition: Send + Sync + 'static {
    /// Tool name as registered in MCP.
    const NAME: &'static str;

    /// Tool description shown to clients.
    const DESCRIPTION: &'static str;

    /// Input parameters. Their JSON schema is the tool's input schema.
    type Params: DeserializeOwned + JsonSchema + Send + 'static;

    /// Execute the tool logic with already-validated parameters.
    async fn execute(params: Self::Params, config: Arc<Config>) -> CallToolResult;

    /// Create a Tool model for this tool (metadata).
    fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<Self::Params>(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}
