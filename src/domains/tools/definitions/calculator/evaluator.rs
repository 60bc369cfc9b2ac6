//! The evaluation pipeline: bounds, sanitizing, validation, parsing,
//! evaluation and formatting.

use std::collections::HashMap;

use tracing::debug;

use super::error::EvalError;
use super::identifiers::{is_forbidden_name, is_identifier, validate_identifiers};
use super::namespace::{self, Namespace};
use super::parser;
use super::sanitizer::{is_plain_arithmetic, sanitize, stripped_characters};

pub const DEFAULT_PRECISION: u32 = 6;
pub const MAX_PRECISION: u32 = 64;
pub const DEFAULT_MAX_LENGTH: usize = 1000;
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Bounds applied to every expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum expression length in characters.
    pub max_length: usize,
    /// Maximum nesting of unary operators, powers and parentheses.
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// A successful evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    pub formatted: String,
    pub steps: Vec<String>,
}

/// Evaluates expressions under fixed [`Limits`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    limits: Limits,
}

impl Evaluator {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Evaluate `expr` with the given variables, rendering the result with
    /// `precision` decimal digits (clamped to [`MAX_PRECISION`]).
    ///
    /// Nothing is evaluated unless the whole expression parses and every
    /// name in it resolves.
    pub fn evaluate(
        &self,
        expr: &str,
        variables: &HashMap<String, f64>,
        precision: u32,
    ) -> Result<Evaluation, EvalError> {
        let length = expr.chars().count();
        if length > self.limits.max_length {
            return Err(EvalError::disallowed(format!(
                "expression is {} characters long, the limit is {}",
                length, self.limits.max_length
            )));
        }

        let stripped = stripped_characters(expr);
        if !stripped.is_empty() {
            let listed: Vec<String> = stripped.iter().map(|c| format!("'{}'", c)).collect();
            return Err(EvalError::disallowed(format!(
                "unsupported characters {}",
                listed.join(", ")
            )));
        }

        check_variable_names(variables)?;

        let sanitized = sanitize(expr);
        let mut steps = Vec::new();

        let tree = if is_plain_arithmetic(&sanitized) {
            steps.push(format!("Evaluating arithmetic expression: {}", sanitized.trim()));
            parser::parse(&sanitized, Namespace::empty(), self.limits.max_depth)?
        } else {
            steps.push(format!("Evaluating expression: {}", sanitized.trim()));
            if !variables.is_empty() {
                let mut bindings: Vec<_> = variables.iter().collect();
                bindings.sort_by(|a, b| a.0.cmp(b.0));
                let listed: Vec<String> =
                    bindings.iter().map(|(k, v)| format!("{} = {}", k, v)).collect();
                steps.push(format!("Using variables: {}", listed.join(", ")));
            }
            let functions = validate_identifiers(&sanitized)?;
            if !functions.is_empty() {
                steps.push(format!("Validated functions: {}", functions.join(", ")));
            }
            parser::parse(
                &sanitized,
                Namespace::with_variables(variables),
                self.limits.max_depth,
            )?
        };

        let value = tree.eval()?;
        let formatted = format_number(value, precision.min(MAX_PRECISION));
        steps.push(format!("Result: {}", formatted));
        debug!(expression = %sanitized, result = %formatted, "Expression evaluated");

        Ok(Evaluation {
            value,
            formatted,
            steps,
        })
    }
}

/// Evaluate with the default limits.
pub fn evaluate(
    expr: &str,
    variables: &HashMap<String, f64>,
    precision: u32,
) -> Result<Evaluation, EvalError> {
    Evaluator::default().evaluate(expr, variables, precision)
}

fn check_variable_names(variables: &HashMap<String, f64>) -> Result<(), EvalError> {
    let mut names: Vec<&String> = variables.keys().collect();
    names.sort();
    for name in names {
        if !is_identifier(name) {
            return Err(EvalError::disallowed(format!(
                "'{}' is not a valid variable name",
                name
            )));
        }
        if is_forbidden_name(name) {
            return Err(EvalError::disallowed(format!(
                "'{}' cannot be used as a variable name",
                name
            )));
        }
        if namespace::function(name).is_some() {
            return Err(EvalError::disallowed(format!(
                "variable '{}' would shadow a function",
                name
            )));
        }
    }
    Ok(())
}

/// Render a result: integral values without a decimal point, everything
/// else with exactly `precision` digits after it.
pub fn format_number(value: f64, precision: u32) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value.fract() == 0.0 {
        if value == 0.0 {
            return "0".to_string();
        }
        return format!("{:.0}", value);
    }
    format!("{:.*}", precision as usize, value)
}
