//! Resource Registry - central registration of all resources.
//!
//! When adding a new resource:
//! 1. Create the resource file in `definitions/`
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it here in `get_all_resources()`

use rmcp::model::{AnnotateAble, RawResource, RawResourceTemplate, ResourceTemplate};

use super::definitions::{DocumentationResource, ResourceDefinition, SystemInfoResource};
use super::service::ResourceEntry;

/// Helper function to create an annotated resource from a definition.
fn build_resource<R: ResourceDefinition>() -> ResourceEntry {
    let mut raw = RawResource::new(R::URI, R::NAME);
    raw.description = Some(R::DESCRIPTION.to_string());
    raw.mime_type = Some(R::MIME_TYPE.to_string());

    ResourceEntry {
        resource: raw.no_annotation(),
        content: R::content(),
    }
}

/// Get all known resources as ResourceEntries, enabled or not.
pub fn get_all_resources() -> Vec<ResourceEntry> {
    vec![
        build_resource::<SystemInfoResource>(),
        build_resource::<DocumentationResource>(),
    ]
}

/// Get the templates of the resources named in `enabled`.
///
/// Resource templates use URI templates (RFC 6570) to describe
/// parameterized resources that clients can fill in.
pub fn get_resource_templates(enabled: &[String]) -> Vec<ResourceTemplate> {
    let mut templates = Vec::new();
    if enabled.iter().any(|n| n == DocumentationResource::NAME) {
        templates.push(
            RawResourceTemplate {
                uri_template: DocumentationResource::URI_TEMPLATE.to_string(),
                name: DocumentationResource::NAME.to_string(),
                title: Some("Search Documentation".to_string()),
                description: Some(
                    "Documentation entries filtered by a text query and/or comma-separated tags"
                        .to_string(),
                ),
                mime_type: Some(DocumentationResource::MIME_TYPE.to_string()),
            }
            .no_annotation(),
        );
    }
    templates
}

/// Names of every known resource.
pub fn resource_names() -> Vec<&'static str> {
    vec![SystemInfoResource::NAME, DocumentationResource::NAME]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_all_resources() {
        let resources = get_all_resources();
        assert_eq!(resources.len(), 2);

        let uris: Vec<_> = resources
            .iter()
            .map(|r| r.resource.raw.uri.as_str())
            .collect();
        assert!(uris.contains(&"system://info"));
        assert!(uris.contains(&"docs://content"));
    }

    #[test]
    fn test_resource_templates() {
        let templates = get_resource_templates(&["documentation".to_string()]);
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].raw.uri_template, "docs://content{?query,tags}");

        assert!(get_resource_templates(&["system_info".to_string()]).is_empty());
    }

    #[test]
    fn test_resource_names() {
        assert_eq!(resource_names(), vec!["system_info", "documentation"]);
    }
}
