//! Prompt Registry - central registration of the built-in prompts.
//!
//! When adding a new built-in prompt:
//! 1. Create the prompt file in `definitions/`
//! 2. Export it in `definitions/mod.rs`
//! 3. Register it here in `get_all_prompts()`

use super::definitions::{
    CalculatePrompt, PromptDefinition, ToolOverviewPrompt, WeatherReportPrompt,
};
use super::templates::PromptTemplate;

/// Build a PromptTemplate from a PromptDefinition.
fn build_template<P: PromptDefinition>() -> PromptTemplate {
    PromptTemplate::new(
        P::NAME,
        Some(P::DESCRIPTION.to_string()),
        P::arguments(),
        P::template(),
    )
}

/// Get all built-in prompts as PromptTemplates.
pub fn get_all_prompts() -> Vec<PromptTemplate> {
    vec![
        build_template::<CalculatePrompt>(),
        build_template::<WeatherReportPrompt>(),
        build_template::<ToolOverviewPrompt>(),
    ]
}

/// Names of the built-in prompts.
pub fn prompt_names() -> Vec<&'static str> {
    vec![
        CalculatePrompt::NAME,
        WeatherReportPrompt::NAME,
        ToolOverviewPrompt::NAME,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_all_prompts() {
        let prompts = get_all_prompts();
        let names: Vec<_> = prompts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, prompt_names());
    }

    #[test]
    fn test_built_in_templates_are_well_formed() {
        for prompt in get_all_prompts() {
            assert!(prompt.validate().is_ok(), "{}", prompt.name);
            let placeholders = prompt.placeholders().unwrap();
            for arg in &prompt.arguments {
                assert!(placeholders.contains(&arg.name), "{}: {}", prompt.name, arg.name);
            }
        }
    }
}
