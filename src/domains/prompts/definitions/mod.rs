//! Built-in prompt definitions.
//!
//! Each prompt is defined in its own file with its metadata, arguments and
//! template. Prompts loaded from the prompts directory sit alongside these.

mod calculate;
mod tool_overview;
mod weather_report;

pub use calculate::CalculatePrompt;
pub use tool_overview::ToolOverviewPrompt;
pub use weather_report::WeatherReportPrompt;

use rmcp::model::PromptArgument;

/// Trait for built-in prompt definitions.
pub trait PromptDefinition {
    /// The unique name of the prompt.
    const NAME: &'static str;

    /// A description of what the prompt does.
    const DESCRIPTION: &'static str;

    /// The template with `{{variable}}` placeholders.
    fn template() -> String;

    /// The arguments this prompt accepts.
    fn arguments() -> Vec<PromptArgument>;
}

/// Shorthand for a prompt argument without a title.
pub(crate) fn argument(name: &str, description: &str, required: bool) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        title: None,
        description: Some(description.to_string()),
        required: Some(required),
    }
}
