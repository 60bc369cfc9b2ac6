//! Tool overview prompt definition.

use rmcp::model::PromptArgument;

use super::{PromptDefinition, argument};
use crate::domains::tools::definitions::calculator::{CONSTANTS, FUNCTIONS};

/// Describes the server's tools so the model knows when to use them.
pub struct ToolOverviewPrompt;

impl PromptDefinition for ToolOverviewPrompt {
    const NAME: &'static str = "tool_overview";
    const DESCRIPTION: &'static str = "Explain the tools this server provides and how to call them";

    fn template() -> String {
        let functions = FUNCTIONS
            .iter()
            .map(|f| f.usage)
            .collect::<Vec<_>>()
            .join(", ");
        let constants = CONSTANTS
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "This server provides the following tools:\n\
             - `echo`: repeats a message, optionally uppercased or prefixed.\n\
             - `weather`: current weather and up to 7 forecast days for a location.\n\
             - `calculator`: evaluates arithmetic with + - * / // ** ^ and % (percent).\n  \
             Functions: {functions}.\n  \
             Constants: {constants}. Variables can be passed as a name to number map.\n\
             {{{{#if task}}}}\nThe user wants to: {{{{task}}}}\n\
             Pick the tool that fits best and explain how to call it.{{{{/if}}}}"
        )
    }

    fn arguments() -> Vec<PromptArgument> {
        vec![argument("task", "What the user is trying to do", false)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_lists_functions() {
        let template = ToolOverviewPrompt::template();
        assert!(template.contains("atan2(y, x)"));
        assert!(template.contains("tau"));
        assert!(template.contains("{{#if task}}"));
        assert!(template.contains("{{task}}"));
    }
}
