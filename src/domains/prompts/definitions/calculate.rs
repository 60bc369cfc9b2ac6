//! Calculation prompt definition.

use rmcp::model::PromptArgument;

use super::{PromptDefinition, argument};

/// Asks the model to solve a problem with the calculator tool.
pub struct CalculatePrompt;

impl PromptDefinition for CalculatePrompt {
    const NAME: &'static str = "calculate";
    const DESCRIPTION: &'static str = "Solve a math problem step by step using the calculator tool";

    fn template() -> String {
        "Solve the following problem: {{problem}}\n\
         \n\
         Translate it into one or more expressions for the `calculator` tool and call it \
         for every computation instead of doing arithmetic yourself.\
         {{#if precision}} Report results with {{precision}} decimal places.{{/if}}\
         {{#if show_steps}} Explain each step before giving the final answer.{{else}} \
         Reply with the final answer only.{{/if}}"
            .to_string()
    }

    fn arguments() -> Vec<PromptArgument> {
        vec![
            argument("problem", "The problem or expression to solve", true),
            argument("precision", "Number of decimal places in the answer", false),
            argument("show_steps", "Set to any value to show the working", false),
        ]
    }
}
