//! Calculator tool.
//!
//! Evaluates a mathematical expression with a restricted grammar: numbers,
//! the operators `+ - * / // ** ^ %`, parentheses, a fixed table of math
//! functions, the constants `pi e tau inf nan`, and caller-supplied
//! variables. Nothing else can be named, so no code runs besides arithmetic.

mod error;
mod evaluator;
mod identifiers;
mod namespace;
mod parser;
mod sanitizer;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::CallToolResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::config::Config;

use super::ToolDefinition;
use super::common::{structured_error, structured_result};

pub use error::{ErrorKind, EvalError};
pub use evaluator::{
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH, DEFAULT_PRECISION, Evaluation, Evaluator, Limits,
    MAX_PRECISION, evaluate, format_number,
};
pub use identifiers::extract_function_calls;
pub use namespace::{CONSTANTS, FUNCTIONS};
pub use sanitizer::sanitize;

/// Parameters for the calculator tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CalculatorParams {
    /// The expression to evaluate.
    #[schemars(description = "Mathematical expression, e.g. '2 + 3 * 4', 'sqrt(16)', '50%*200', '2^10'")]
    pub expression: String,

    /// Number of decimal digits in the formatted result.
    #[schemars(description = "Decimal places for non-integral results (default: 6, max: 64)")]
    #[serde(default)]
    pub precision: Option<u32>,

    /// Variables usable by name inside the expression.
    #[schemars(description = "Variable values by name, e.g. {\"x\": 2}. They override the constants pi, e, tau")]
    #[serde(default)]
    pub variables: Option<HashMap<String, f64>>,
}

/// The numeric result as it appears in the tool output.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum CalculationValue {
    Integer(i64),
    Float(f64),
    /// Non-finite values and the failure marker `"Error"`.
    Text(String),
}

/// Largest magnitude below which every integer is exactly representable.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

impl CalculationValue {
    fn from_value(value: f64, formatted: &str) -> Self {
        if !value.is_finite() {
            Self::Text(formatted.to_string())
        } else if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
            Self::Integer(value as i64)
        } else {
            Self::Float(value)
        }
    }

    fn error() -> Self {
        Self::Text("Error".to_string())
    }
}

/// Structured output of the calculator tool.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct CalculatorOutput {
    pub result: CalculationValue,
    pub formatted_result: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CalculatorOutput {
    fn success(evaluation: Evaluation) -> Self {
        Self {
            result: CalculationValue::from_value(evaluation.value, &evaluation.formatted),
            formatted_result: evaluation.formatted,
            steps: Some(evaluation.steps),
            error: None,
        }
    }

    fn failure(error: &EvalError) -> Self {
        Self {
            result: CalculationValue::error(),
            formatted_result: "Error".to_string(),
            steps: None,
            error: Some(error.to_string()),
        }
    }
}

/// Calculator tool implementation.
#[derive(Debug, Clone, Default)]
pub struct CalculatorTool;

impl CalculatorTool {
    /// Evaluate `params` with the limits from `config`.
    pub fn calculate(params: &CalculatorParams, config: &Config) -> Result<Evaluation, EvalError> {
        let settings = &config.tools.calculator;
        let evaluator = Evaluator::new(Limits {
            max_length: settings.max_expression_length,
            max_depth: settings.max_nesting_depth,
        });
        let precision = params.precision.unwrap_or(settings.default_precision);
        let empty = HashMap::new();
        let variables = params.variables.as_ref().unwrap_or(&empty);
        evaluator.evaluate(&params.expression, variables, precision)
    }
}

#[async_trait]
impl ToolDefinition for CalculatorTool {
    const NAME: &'static str = "calculator";

    const DESCRIPTION: &'static str = "Evaluate a mathematical expression safely. Supports + - * / // ** (or ^), % as percent, parentheses, the constants pi, e, tau, inf, nan, caller variables, and the functions abs, round, min, max, sum, sin, cos, tan, asin, acos, atan, atan2, sinh, cosh, tanh, exp, log, log10, log2, sqrt, pow, degrees, radians, ceil, floor, trunc, factorial, gcd. Returns the numeric result, a formatted result and the evaluation steps.";

    type Params = CalculatorParams;

    async fn execute(params: CalculatorParams, config: Arc<Config>) -> CallToolResult {
        match Self::calculate(&params, &config) {
            Ok(evaluation) => {
                info!(
                    expression = %params.expression,
                    result = %evaluation.formatted,
                    "Calculation succeeded"
                );
                let summary = format!("{} = {}", params.expression.trim(), evaluation.formatted);
                structured_result(summary, &CalculatorOutput::success(evaluation))
            }
            Err(e) => {
                warn!(
                    expression = %params.expression,
                    kind = %e.kind(),
                    "Calculation failed: {}",
                    e
                );
                structured_error(e.to_string(), &CalculatorOutput::failure(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(expression: &str) -> CalculatorParams {
        CalculatorParams {
            expression: expression.to_string(),
            precision: None,
            variables: None,
        }
    }

    async fn run(params: CalculatorParams) -> CallToolResult {
        CalculatorTool::execute(params, Arc::new(Config::default())).await
    }

    #[test]
    fn test_params_defaults() {
        let params: CalculatorParams = serde_json::from_str(r#"{"expression": "1+1"}"#).unwrap();
        assert_eq!(params.precision, None);
        assert!(params.variables.is_none());
    }

    #[test]
    fn test_params_reject_bad_types() {
        assert!(serde_json::from_str::<CalculatorParams>(r#"{}"#).is_err());
        assert!(serde_json::from_str::<CalculatorParams>(r#"{"expression": 5}"#).is_err());
        assert!(
            serde_json::from_str::<CalculatorParams>(r#"{"expression": "1", "precision": -1}"#)
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_success_output() {
        let result = run(params("2 + 3 * 4")).await;
        assert_eq!(result.is_error, Some(false));
        let output = result.structured_content.unwrap();
        assert_eq!(output["result"], serde_json::json!(14));
        assert_eq!(output["formatted_result"], "14");
        assert!(output["steps"].is_array());
        assert!(output.get("error").is_none());
    }

    #[tokio::test]
    async fn test_float_output() {
        let mut p = params("x + pi");
        p.precision = Some(2);
        p.variables = Some(HashMap::from([("x".to_string(), 1.0)]));
        let output = run(p).await.structured_content.unwrap();
        assert_eq!(output["formatted_result"], "4.14");
        assert!(output["result"].is_f64());
    }

    #[tokio::test]
    async fn test_error_output() {
        let result = run(params("foo(1)")).await;
        assert_eq!(result.is_error, Some(true));
        let output = result.structured_content.unwrap();
        assert_eq!(output["result"], "Error");
        assert_eq!(output["formatted_result"], "Error");
        assert_eq!(output["error"], "Function 'foo' is not allowed");
        assert!(output.get("steps").is_none());
    }

    #[tokio::test]
    async fn test_non_finite_output() {
        let output = run(params("-inf")).await.structured_content.unwrap();
        assert_eq!(output["result"], "-inf");
    }

    #[test]
    fn test_configured_limits() {
        let mut config = Config::default();
        config.tools.calculator.max_expression_length = 3;
        assert!(matches!(
            CalculatorTool::calculate(&params("1 + 2"), &config),
            Err(EvalError::Disallowed(_))
        ));
        config.tools.calculator.default_precision = 2;
        config.tools.calculator.max_expression_length = 100;
        let evaluation = CalculatorTool::calculate(&params("1 / 3"), &config).unwrap();
        assert_eq!(evaluation.formatted, "0.33");
    }

    #[test]
    fn test_calculation_value() {
        assert_eq!(CalculationValue::from_value(3.0, "3"), CalculationValue::Integer(3));
        assert_eq!(CalculationValue::from_value(0.5, "0.5"), CalculationValue::Float(0.5));
        assert_eq!(
            CalculationValue::from_value(1e300, "1e300"),
            CalculationValue::Float(1e300)
        );
        assert_eq!(
            CalculationValue::from_value(f64::NAN, "nan"),
            CalculationValue::Text("nan".to_string())
        );
    }

    #[test]
    fn test_tool_metadata() {
        let tool = CalculatorTool::to_tool();
        assert_eq!(tool.name, "calculator");
        assert!(tool.input_schema.contains_key("properties"));
    }
}
