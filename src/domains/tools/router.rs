//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! Each enabled tool contributes one route; the routes deserialize the call
//! arguments into the tool's parameter type before running it.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
};

use crate::core::config::Config;

use super::definitions::ToolDefinition;
use super::registry::ToolRegistry;

/// Create the route for a single tool.
pub fn route<T, S>(config: Arc<Config>) -> ToolRoute<S>
where
    T: ToolDefinition,
    S: Send + Sync + 'static,
{
    ToolRoute::new_dyn(T::to_tool(), move |ctx: ToolCallContext<'_, S>| {
        let args = ctx.arguments.clone().unwrap_or_default();
        let config = config.clone();
        async move {
            let params: T::Params = serde_json::from_value(serde_json::Value::Object(args))
                .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
            Ok(T::execute(params, config).await)
        }
        .boxed()
    })
}

/// Build the tool router with every tool the registry has enabled.
pub fn build_tool_router<S>(registry: &ToolRegistry) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    registry
        .kinds()
        .iter()
        .fold(ToolRouter::new(), |router, kind| {
            router.with_route(kind.route(registry.config()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestServer {}

    #[test]
    fn test_build_router() {
        let registry = ToolRegistry::new(Arc::new(Config::default()));
        let router: ToolRouter<TestServer> = build_tool_router(&registry);
        let tools = router.list_all();
        assert_eq!(tools.len(), 3);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"echo"));
        assert!(names.contains(&"weather"));
        assert!(names.contains(&"calculator"));
    }

    #[test]
    fn test_router_honours_enabled_list() {
        let mut config = Config::default();
        config.tools.enabled = vec!["calculator".to_string()];
        let registry = ToolRegistry::new(Arc::new(config));
        let router: ToolRouter<TestServer> = build_tool_router(&registry);
        let tools = router.list_all();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "calculator");
    }

    #[test]
    fn test_registry_matches_router() {
        let registry = ToolRegistry::new(Arc::new(Config::default()));
        let registry_names = registry.tool_names();

        let router: ToolRouter<TestServer> = build_tool_router(&registry);
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

        assert_eq!(registry_names.len(), router_names.len());
        for name in registry_names {
            assert!(router_names.contains(&name));
        }
    }
}
