//! Loading of prompt templates from a directory.
//!
//! Two file kinds are recognized:
//! - `*.json`: `{ "name"?, "description"?, "template", "arguments"? }`
//! - `*.txt`: the whole file is the template, named after the file stem
//!
//! When a file declares no arguments, every placeholder becomes an optional
//! argument. Files that cannot be read or parsed are logged and skipped.

use std::fs;
use std::path::Path;

use rmcp::model::PromptArgument;
use serde::Deserialize;
use tracing::{debug, error, warn};

use super::error::PromptError;
use super::templates::PromptTemplate;

/// On-disk shape of a `*.json` prompt.
#[derive(Debug, Deserialize)]
struct PromptFile {
    name: Option<String>,
    description: Option<String>,
    template: String,
    arguments: Option<Vec<ArgumentFile>>,
}

#[derive(Debug, Deserialize)]
struct ArgumentFile {
    name: String,
    description: Option<String>,
    #[serde(default)]
    required: bool,
}

impl From<ArgumentFile> for PromptArgument {
    fn from(arg: ArgumentFile) -> Self {
        PromptArgument {
            name: arg.name,
            title: None,
            description: arg.description,
            required: Some(arg.required),
        }
    }
}

/// Load every prompt in `dir`, in file name order.
///
/// A missing directory yields no prompts.
pub fn load_prompts(dir: &Path) -> Vec<PromptTemplate> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Prompts directory not available: {} ({})", dir.display(), e);
            return Vec::new();
        }
    };

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut prompts = Vec::new();
    for path in paths {
        let loaded = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => load_json(&path),
            Some("txt") => load_text(&path),
            _ => continue,
        };
        match loaded {
            Ok(template) => {
                debug!("Loaded prompt '{}' from {}", template.name, path.display());
                prompts.push(template);
            }
            Err(e) => error!("Error loading prompt from {}: {}", path.display(), e),
        }
    }
    prompts
}

fn file_stem(path: &Path) -> Result<String, PromptError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| PromptError::invalid_file(path.display().to_string()))
}

fn load_json(path: &Path) -> Result<PromptTemplate, PromptError> {
    let raw = fs::read_to_string(path)?;
    let file: PromptFile = serde_json::from_str(&raw)?;

    let name = match file.name {
        Some(name) => name,
        None => file_stem(path)?,
    };
    let mut template = PromptTemplate::new(name, file.description, Vec::new(), file.template);
    template.arguments = match file.arguments {
        Some(arguments) => arguments.into_iter().map(PromptArgument::from).collect(),
        None => inferred_arguments(&template)?,
    };
    template.validate()?;
    Ok(template)
}

fn load_text(path: &Path) -> Result<PromptTemplate, PromptError> {
    let raw = fs::read_to_string(path)?;
    let mut template = PromptTemplate::new(file_stem(path)?, None, Vec::new(), raw);
    template.arguments = inferred_arguments(&template)?;
    Ok(template)
}

fn inferred_arguments(template: &PromptTemplate) -> Result<Vec<PromptArgument>, PromptError> {
    Ok(template
        .placeholders()?
        .into_iter()
        .map(|name| PromptArgument {
            name,
            title: None,
            description: None,
            required: Some(false),
        })
        .collect())
}
