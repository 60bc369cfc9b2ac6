//! Resource service implementation.
//!
//! The ResourceService holds the enabled resources and handles list and
//! read requests. Resources are defined in `definitions/` and registered via
//! `registry.rs`; adding one does not require modifying this file.

use std::path::PathBuf;

use rmcp::model::{ReadResourceResult, Resource, ResourceContents, ResourceTemplate};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::definitions::documentation::{DocsQuery, read_documentation};
use super::definitions::system_info::SystemInfo;
use super::error::ResourceError;
use super::registry::{get_all_resources, get_resource_templates, resource_names};
use crate::core::config::ResourcesConfig;

/// Service for listing and reading resources.
pub struct ResourceService {
    /// Directory served by the documentation resource.
    docs_dir: PathBuf,

    /// Enabled resources in registration order.
    resources: Vec<ResourceEntry>,

    /// Resource templates for parameterized resources.
    templates: Vec<ResourceTemplate>,
}

/// An entry in the resource registry.
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    /// The resource metadata.
    pub resource: Resource,

    /// The content provider for this resource.
    pub content: ResourceContent,
}

/// Different types of resource content.
#[derive(Debug, Clone)]
pub enum ResourceContent {
    /// Dynamic content computed on every read.
    Dynamic(DynamicResourceType),
}

/// Types of dynamic resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicResourceType {
    /// Host and process information.
    SystemInfo,

    /// Markdown files of the docs directory.
    Documentation,
}

impl ResourceService {
    /// Create a service exposing the resources enabled in `config`.
    pub fn new(config: &ResourcesConfig) -> Self {
        info!("Initializing ResourceService");

        let known = resource_names();
        for name in &config.enabled {
            if !known.contains(&name.as_str()) {
                warn!("Ignoring unknown resource in configuration: {}", name);
            }
        }

        let resources: Vec<ResourceEntry> = get_all_resources()
            .into_iter()
            .filter(|entry| config.enabled.iter().any(|n| *n == entry.resource.raw.name))
            .collect();
        for entry in &resources {
            info!("Registering resource: {}", entry.resource.raw.uri);
        }

        Self {
            docs_dir: config.docs_dir.clone(),
            resources,
            templates: get_resource_templates(&config.enabled),
        }
    }

    /// List all available resources.
    pub async fn list_resources(&self) -> Vec<Resource> {
        self.resources
            .iter()
            .map(|entry| entry.resource.clone())
            .collect()
    }

    /// List all available resource templates.
    pub async fn list_resource_templates(&self) -> Vec<ResourceTemplate> {
        self.templates.clone()
    }

    /// Read a resource by URI. A query string (`?query=..&tags=..`) is
    /// accepted only by the documentation resource.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult, ResourceError> {
        let (base, query) = match uri.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (uri, None),
        };

        let entry = self
            .resources
            .iter()
            .find(|entry| entry.resource.raw.uri == base)
            .ok_or_else(|| ResourceError::not_found(uri))?;

        debug!("Reading resource: {}", uri);
        let content = match &entry.content {
            ResourceContent::Dynamic(dynamic_type) => {
                self.resolve_dynamic_content(uri, *dynamic_type, query)?
            }
        };

        Ok(ReadResourceResult {
            contents: vec![content],
        })
    }

    /// Resolve dynamic resource content.
    fn resolve_dynamic_content(
        &self,
        uri: &str,
        dynamic_type: DynamicResourceType,
        query: Option<&str>,
    ) -> Result<ResourceContents, ResourceError> {
        match dynamic_type {
            DynamicResourceType::SystemInfo => {
                if query.is_some() {
                    return Err(ResourceError::invalid_uri(uri));
                }
                json_contents(&SystemInfo::collect(), uri)
            }
            DynamicResourceType::Documentation => {
                let filter = query.map(DocsQuery::parse).transpose()?.unwrap_or_default();
                json_contents(&read_documentation(&self.docs_dir, &filter)?, uri)
            }
        }
    }
}

fn json_contents<T: Serialize>(value: &T, uri: &str) -> Result<ResourceContents, ResourceError> {
    let text =
        serde_json::to_string_pretty(value).map_err(|e| ResourceError::internal(e.to_string()))?;
    Ok(ResourceContents::text(text, uri))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(docs_dir: PathBuf) -> ResourcesConfig {
        ResourcesConfig {
            docs_dir,
            ..ResourcesConfig::default()
        }
    }

    fn text_of(result: &ReadResourceResult) -> serde_json::Value {
        match &result.contents[0] {
            ResourceContents::TextResourceContents { text, .. } => {
                serde_json::from_str(text).unwrap()
            }
            _ => panic!("expected text contents"),
        }
    }

    #[tokio::test]
    async fn test_resource_service_creation() {
        let service = ResourceService::new(&ResourcesConfig::default());
        let resources = service.list_resources().await;
        assert_eq!(resources.len(), 2);
        assert_eq!(service.list_resource_templates().await.len(), 1);
    }

    #[tokio::test]
    async fn test_enabled_filter() {
        let config = ResourcesConfig {
            enabled: vec!["system_info".to_string()],
            ..ResourcesConfig::default()
        };
        let service = ResourceService::new(&config);
        assert_eq!(service.list_resources().await.len(), 1);
        assert!(service.list_resource_templates().await.is_empty());
        assert!(matches!(
            service.read_resource("docs://content").await,
            Err(ResourceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_read_system_info() {
        let service = ResourceService::new(&ResourcesConfig::default());
        let result = service.read_resource("system://info").await.unwrap();
        let info = text_of(&result);
        assert_eq!(info["server_version"], env!("CARGO_PKG_VERSION"));
        assert!(info["cpu_count"].is_u64());
    }

    #[tokio::test]
    async fn test_read_documentation_with_query() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.md"), "# Alpha\nfirst").unwrap();
        std::fs::write(dir.path().join("b.md"), "# Beta\nsecond").unwrap();
        let service = ResourceService::new(&config(dir.path().to_path_buf()));

        let all = text_of(&service.read_resource("docs://content").await.unwrap());
        assert_eq!(all["total_entries"], 2);

        let uri = "docs://content?query=beta";
        let result = service.read_resource(uri).await.unwrap();
        let filtered = text_of(&result);
        assert_eq!(filtered["total_entries"], 1);
        assert_eq!(filtered["entries"][0]["title"], "Beta");
        assert_eq!(filtered["query"], "beta");
    }

    #[tokio::test]
    async fn test_read_nonexistent_resource() {
        let service = ResourceService::new(&ResourcesConfig::default());
        let result = service.read_resource("mcp://server/nonexistent").await;
        assert!(matches!(result, Err(ResourceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_query_on_system_info_is_invalid() {
        let service = ResourceService::new(&ResourcesConfig::default());
        let result = service.read_resource("system://info?x=1").await;
        assert!(matches!(result, Err(ResourceError::InvalidUri(_))));
    }
}
