//! Tool Registry - central registration and dispatch for all tools.
//!
//! The registry is built once from configuration and never changes
//! afterwards. It provides:
//! - The list of enabled tools and their metadata
//! - Transport-independent dispatch of tool calls (used by HTTP)
//! - The routes for the rmcp ToolRouter (used by STDIO)

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRoute;
use rmcp::model::{CallToolResult, Tool};
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::config::Config;

use super::definitions::{CalculatorTool, EchoTool, ToolDefinition, WeatherTool};
use super::error::ToolError;
use super::router::route;

/// Every tool this server knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Echo,
    Weather,
    Calculator,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [Self::Echo, Self::Weather, Self::Calculator];

    pub fn name(self) -> &'static str {
        match self {
            Self::Echo => EchoTool::NAME,
            Self::Weather => WeatherTool::NAME,
            Self::Calculator => CalculatorTool::NAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    pub fn to_tool(self) -> Tool {
        match self {
            Self::Echo => EchoTool::to_tool(),
            Self::Weather => WeatherTool::to_tool(),
            Self::Calculator => CalculatorTool::to_tool(),
        }
    }

    pub(super) fn route<S>(self, config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        match self {
            Self::Echo => route::<EchoTool, S>(config),
            Self::Weather => route::<WeatherTool, S>(config),
            Self::Calculator => route::<CalculatorTool, S>(config),
        }
    }
}

async fn dispatch<T: ToolDefinition>(
    arguments: Value,
    config: Arc<Config>,
) -> Result<CallToolResult, ToolError> {
    let params: T::Params = serde_json::from_value(arguments)
        .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
    Ok(T::execute(params, config).await)
}

/// Tool registry - the immutable set of enabled tools.
pub struct ToolRegistry {
    config: Arc<Config>,
    kinds: Vec<ToolKind>,
}

impl ToolRegistry {
    /// Create a registry holding the tools enabled in `config`.
    ///
    /// Unknown names in the enabled list are logged and ignored.
    pub fn new(config: Arc<Config>) -> Self {
        for name in &config.tools.enabled {
            if ToolKind::from_name(name).is_none() {
                warn!("Ignoring unknown tool in configuration: {}", name);
            }
        }
        let kinds = ToolKind::ALL
            .into_iter()
            .filter(|kind| config.tools.enabled.iter().any(|n| n == kind.name()))
            .collect();
        Self { config, kinds }
    }

    pub fn config(&self) -> Arc<Config> {
        self.config.clone()
    }

    pub fn kinds(&self) -> &[ToolKind] {
        &self.kinds
    }

    /// Get all enabled tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.kinds.iter().map(|kind| kind.name()).collect()
    }

    /// Get all enabled tools as Tool models (metadata).
    pub fn tools(&self) -> Vec<Tool> {
        self.kinds.iter().map(|kind| kind.to_tool()).collect()
    }

    /// Dispatch a tool call by name.
    ///
    /// Arguments are validated against the tool's parameter type first;
    /// a failure there is [`ToolError::InvalidArguments`].
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, ToolError> {
        let kind = self
            .kinds
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| {
                warn!("Unknown tool requested: {}", name);
                ToolError::not_found(name)
            })?;

        debug!("Dispatching tool call: {}", name);
        let config = self.config.clone();
        match kind {
            ToolKind::Echo => dispatch::<EchoTool>(arguments, config).await,
            ToolKind::Weather => dispatch::<WeatherTool>(arguments, config).await,
            ToolKind::Calculator => dispatch::<CalculatorTool>(arguments, config).await,
        }
    }
}
