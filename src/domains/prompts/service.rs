//! Prompt service implementation.
//!
//! The PromptService holds the built-in prompts plus those loaded from the
//! prompts directory, and renders them on request. A loaded prompt with the
//! same name as a built-in replaces it.

use std::collections::HashMap;

use rmcp::model::{GetPromptResult, Prompt, PromptMessage, PromptMessageRole};
use tracing::{debug, info, warn};

use super::error::PromptError;
use super::loader::load_prompts;
use super::registry::get_all_prompts;
use super::templates::PromptTemplate;
use crate::core::config::PromptsConfig;

/// Service for listing and rendering prompts.
pub struct PromptService {
    /// Prompts in listing order.
    prompts: Vec<PromptTemplate>,
}

impl PromptService {
    /// Create a service with the built-in prompts and those in `config.prompts_dir`.
    pub fn new(config: &PromptsConfig) -> Self {
        info!("Initializing PromptService");

        let mut service = Self::from_templates(get_all_prompts());
        for template in load_prompts(&config.prompts_dir) {
            service.register_prompt(template);
        }
        service
    }

    /// Create a service from an explicit list of templates.
    pub fn from_templates(templates: Vec<PromptTemplate>) -> Self {
        let mut service = Self {
            prompts: Vec::with_capacity(templates.len()),
        };
        for template in templates {
            service.register_prompt(template);
        }
        service
    }

    fn register_prompt(&mut self, template: PromptTemplate) {
        info!("Registering prompt: {}", template.name);
        match self.prompts.iter_mut().find(|p| p.name == template.name) {
            Some(existing) => {
                warn!("Prompt '{}' redefined; using the latest definition", template.name);
                *existing = template;
            }
            None => self.prompts.push(template),
        }
    }

    /// List all available prompts.
    pub async fn list_prompts(&self) -> Vec<Prompt> {
        self.prompts
            .iter()
            .map(|template| Prompt {
                name: template.name.clone(),
                title: None,
                description: template.description.clone(),
                arguments: Some(template.arguments.clone()),
                icons: None,
                meta: None,
            })
            .collect()
    }

    /// Render a prompt with the given arguments.
    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<HashMap<String, String>>,
    ) -> Result<GetPromptResult, PromptError> {
        let template = self
            .prompts
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| PromptError::not_found(name))?;

        let arguments = arguments.unwrap_or_default();
        for arg in &template.arguments {
            let provided = arguments.get(&arg.name).is_some_and(|v| !v.is_empty());
            if arg.required.unwrap_or(false) && !provided {
                return Err(PromptError::missing_argument(&arg.name));
            }
        }

        debug!("Rendering prompt: {}", name);
        let content = template.render(&arguments)?;

        Ok(GetPromptResult {
            description: template.description.clone(),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, content)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::PromptMessageContent;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> PromptsConfig {
        PromptsConfig {
            prompts_dir: dir.path().to_path_buf(),
        }
    }

    fn text(result: &GetPromptResult) -> &str {
        match &result.messages[0].content {
            PromptMessageContent::Text { text } => text,
            _ => panic!("expected text content"),
        }
    }

    #[tokio::test]
    async fn test_built_ins_listed_in_order() {
        let dir = TempDir::new().unwrap();
        let service = PromptService::new(&config(&dir));

        let names: Vec<_> = service
            .list_prompts()
            .await
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["calculate", "weather_report", "tool_overview"]);
    }

    #[tokio::test]
    async fn test_get_prompt_with_arguments() {
        let dir = TempDir::new().unwrap();
        let service = PromptService::new(&config(&dir));

        let mut args = HashMap::new();
        args.insert("location".to_string(), "Paris".to_string());
        let result = service.get_prompt("weather_report", Some(args)).await.unwrap();
        assert!(text(&result).contains("weather in Paris."));
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let dir = TempDir::new().unwrap();
        let service = PromptService::new(&config(&dir));

        let result = service.get_prompt("calculate", None).await;
        assert!(matches!(result, Err(PromptError::MissingArgument(arg)) if arg == "problem"));
    }

    #[tokio::test]
    async fn test_get_nonexistent_prompt() {
        let dir = TempDir::new().unwrap();
        let service = PromptService::new(&config(&dir));

        let result = service.get_prompt("nonexistent", None).await;
        assert!(matches!(result, Err(PromptError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_directory_prompts_are_appended() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("story.txt"), "Tell a story about {{hero}}.").unwrap();
        let service = PromptService::new(&config(&dir));

        let prompts = service.list_prompts().await;
        assert_eq!(prompts.len(), 4);
        assert_eq!(prompts[3].name, "story");

        let mut args = HashMap::new();
        args.insert("hero".to_string(), "a robot".to_string());
        let result = service.get_prompt("story", Some(args)).await.unwrap();
        assert_eq!(text(&result), "Tell a story about a robot.");
    }

    #[tokio::test]
    async fn test_directory_prompt_replaces_built_in() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("calculate.txt"), "Just compute {{problem}}").unwrap();
        let service = PromptService::new(&config(&dir));

        assert_eq!(service.list_prompts().await.len(), 3);
        let result = service.get_prompt("calculate", None).await.unwrap();
        assert_eq!(text(&result), "Just compute ");
    }
}
