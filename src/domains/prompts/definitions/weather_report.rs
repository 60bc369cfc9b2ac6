//! Weather report prompt definition.

use rmcp::model::PromptArgument;

use super::{PromptDefinition, argument};

/// Asks the model for a readable weather briefing.
pub struct WeatherReportPrompt;

impl PromptDefinition for WeatherReportPrompt {
    const NAME: &'static str = "weather_report";
    const DESCRIPTION: &'static str = "Write a short weather briefing for a location using the weather tool";

    fn template() -> String {
        "Use the `weather` tool to look up the weather in {{location}}\
         {{#if units}} using {{units}} units{{/if}}\
         {{#if days}} with a {{days}}-day forecast{{/if}}.\n\
         Summarize the current conditions in two or three sentences\
         {{#if days}}, then give one line per forecast day{{/if}}. \
         Mention anything notable such as strong wind or large temperature swings."
            .to_string()
    }

    fn arguments() -> Vec<PromptArgument> {
        vec![
            argument("location", "City name, optionally with a country code", true),
            argument("units", "metric, imperial or standard", false),
            argument("days", "Number of forecast days (1-7)", false),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weather_report_prompt_metadata() {
        assert_eq!(WeatherReportPrompt::NAME, "weather_report");
        let args = WeatherReportPrompt::arguments();
        assert_eq!(args[0].name, "location");
        assert_eq!(args[0].required, Some(true));
        assert!(args[1..].iter().all(|a| a.required == Some(false)));
    }
}
