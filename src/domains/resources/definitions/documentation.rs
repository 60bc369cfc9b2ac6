//! Documentation resource definition.
//!
//! Serves the markdown files of the configured docs directory. The
//! `docs://content{?query,tags}` template filters them by a case-insensitive
//! text query and by tags declared in YAML-style frontmatter.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::ResourceDefinition;
use crate::domains::resources::error::ResourceError;
use crate::domains::resources::service::{DynamicResourceType, ResourceContent};

/// Documentation resource (dynamic).
pub struct DocumentationResource;

impl DocumentationResource {
    pub const URI_TEMPLATE: &'static str = "docs://content{?query,tags}";
}

impl ResourceDefinition for DocumentationResource {
    const URI: &'static str = "docs://content";
    const NAME: &'static str = "documentation";
    const DESCRIPTION: &'static str = "Provides documentation for the MCP server and its components";
    const MIME_TYPE: &'static str = "application/json";

    fn content() -> ResourceContent {
        ResourceContent::Dynamic(DynamicResourceType::Documentation)
    }
}

/// Filters accepted in the URI query string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DocsQuery {
    /// Case-insensitive substring of the title or content.
    pub query: Option<String>,
    /// Comma-separated tags; an entry matches if it has any of them.
    pub tags: Option<String>,
}

impl DocsQuery {
    /// Parse the part of a URI after `?`.
    pub fn parse(query: &str) -> Result<Self, ResourceError> {
        serde_urlencoded::from_str(query)
            .map_err(|e| ResourceError::invalid_uri(format!("invalid query '{}': {}", query, e)))
    }

    fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn matches(&self, entry: &DocumentationEntry) -> bool {
        let tags = self.tag_list();
        if !tags.is_empty() && !tags.iter().any(|t| entry.tags.contains(t)) {
            return false;
        }
        match self.query.as_deref().filter(|q| !q.is_empty()) {
            Some(q) => {
                let q = q.to_lowercase();
                entry.content.to_lowercase().contains(&q) || entry.title.to_lowercase().contains(&q)
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentationEntry {
    pub title: String,
    pub content: String,
    /// Path relative to the docs directory, with `/` separators.
    pub path: String,
    pub tags: Vec<String>,
    /// RFC 3339 modification time.
    pub last_modified: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentationResponse {
    pub entries: Vec<DocumentationEntry>,
    pub total_entries: usize,
    pub query: Option<String>,
}

/// Read and filter every markdown file under `docs_dir`.
///
/// A missing docs directory yields an empty response. Files that cannot be
/// read are logged and skipped.
pub fn read_documentation(
    docs_dir: &Path,
    filter: &DocsQuery,
) -> Result<DocumentationResponse, ResourceError> {
    let mut files = Vec::new();
    if docs_dir.is_dir() {
        collect_markdown(docs_dir, &mut files)?;
    } else {
        debug!("Docs directory {} does not exist", docs_dir.display());
    }
    files.sort();

    let mut entries = Vec::new();
    for file in files {
        match load_entry(docs_dir, &file) {
            Ok(entry) if filter.matches(&entry) => entries.push(entry),
            Ok(_) => {}
            Err(e) => warn!("Skipping documentation file {}: {}", file.display(), e),
        }
    }

    Ok(DocumentationResponse {
        total_entries: entries.len(),
        entries,
        query: filter.query.clone(),
    })
}

/// Symlinks are not followed.
fn collect_markdown(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), ResourceError> {
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(std::io::Error::from)?;
        let is_markdown = entry.path().extension().is_some_and(|ext| ext == "md");
        if entry.file_type().is_file() && is_markdown {
            files.push(entry.into_path());
        }
    }
    Ok(())
}

fn load_entry(docs_dir: &Path, file: &Path) -> Result<DocumentationEntry, ResourceError> {
    let content = fs::read_to_string(file)?;
    let modified: DateTime<Utc> = fs::metadata(file)?.modified()?.into();
    let relative = file.strip_prefix(docs_dir).unwrap_or(file);
    let path = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");

    Ok(DocumentationEntry {
        title: extract_title(&content),
        tags: extract_tags(&content),
        content,
        path,
        last_modified: modified.to_rfc3339(),
    })
}

/// Split off a leading `---` frontmatter block, returning (frontmatter, body).
fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content.strip_prefix("---") else {
        return (None, content);
    };
    match rest.find("---") {
        Some(end) => (Some(rest[..end].trim()), &rest[end + 3..]),
        None => (None, content),
    }
}

/// First non-empty line of the body, without heading markers.
pub fn extract_title(content: &str) -> String {
    let (_, body) = split_frontmatter(content);
    body.lines()
        .map(|line| line.trim_matches(|c| c == '#' || c == ' '))
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Tags from a `tags:` frontmatter line, as `[a, b]` or `a, b`.
pub fn extract_tags(content: &str) -> Vec<String> {
    let (Some(frontmatter), _) = split_frontmatter(content) else {
        return Vec::new();
    };
    let Some(raw) = frontmatter
        .lines()
        .find_map(|line| line.trim().strip_prefix("tags:"))
    else {
        return Vec::new();
    };

    let raw = raw.trim();
    let list = raw
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .unwrap_or(raw);
    list.split(',')
        .map(|tag| tag.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}
