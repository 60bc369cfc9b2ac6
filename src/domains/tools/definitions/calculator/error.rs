//! Evaluation error types.

use serde::Serialize;
use thiserror::Error;

/// Errors produced while sanitizing, validating or evaluating an expression.
///
/// Every variant is recovered by the calculator tool and reported to the
/// caller as a structured error payload.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// An identifier used as a call is not in the function table.
    #[error("Function '{0}' is not allowed")]
    UnknownFunction(String),

    /// An identifier does not resolve to a constant or variable.
    #[error("Name '{0}' is not defined")]
    UnknownName(String),

    /// The expression does not parse under the restricted grammar.
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// A function received an argument outside its domain.
    #[error("Math domain error: {0}")]
    Domain(String),

    /// Division or floor division by zero.
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    /// A finite computation produced a value too large to represent.
    #[error("Numeric overflow: {0}")]
    Overflow(String),

    /// The expression contains constructs that are never evaluated.
    #[error("Disallowed expression: {0}")]
    Disallowed(String),
}

/// Coarse classification of an [`EvalError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    UnknownFunction,
    UnknownName,
    SyntaxError,
    DomainError,
    DivisionByZero,
    Overflow,
    Disallowed,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::UnknownFunction => "UnknownFunction",
            Self::UnknownName => "UnknownName",
            Self::SyntaxError => "SyntaxError",
            Self::DomainError => "DomainError",
            Self::DivisionByZero => "DivisionByZero",
            Self::Overflow => "Overflow",
            Self::Disallowed => "Disallowed",
        };
        f.write_str(name)
    }
}

impl EvalError {
    /// Create a new syntax error.
    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::Syntax(msg.into())
    }

    /// Create a new domain error.
    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    /// Create a new division-by-zero error.
    pub fn division_by_zero(msg: impl Into<String>) -> Self {
        Self::DivisionByZero(msg.into())
    }

    /// Create a new overflow error.
    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::Overflow(msg.into())
    }

    /// Create a new disallowed-construct error.
    pub fn disallowed(msg: impl Into<String>) -> Self {
        Self::Disallowed(msg.into())
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownFunction(_) => ErrorKind::UnknownFunction,
            Self::UnknownName(_) => ErrorKind::UnknownName,
            Self::Syntax(_) => ErrorKind::SyntaxError,
            Self::Domain(_) => ErrorKind::DomainError,
            Self::DivisionByZero(_) => ErrorKind::DivisionByZero,
            Self::Overflow(_) => ErrorKind::Overflow,
            Self::Disallowed(_) => ErrorKind::Disallowed,
        }
    }
}
