//! Function table, constant table and per-call name resolution.
//!
//! Both tables are `static` data: they are fixed at compile time and never
//! mutated, so concurrent evaluations can read them without coordination.

use std::collections::HashMap;
use std::f64::consts;

use super::error::EvalError;

/// Number of arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    AtLeast(usize),
}

impl Arity {
    /// Whether `count` arguments satisfy this arity.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exact(n) => count == n,
            Self::Range(min, max) => (min..=max).contains(&count),
            Self::AtLeast(min) => count >= min,
        }
    }

    /// Human-readable form used in error messages.
    pub fn describe(self) -> String {
        let plural = |n: usize| if n == 1 { "argument" } else { "arguments" };
        match self {
            Self::Exact(n) => format!("exactly {} {}", n, plural(n)),
            Self::Range(min, max) => format!("{} to {} arguments", min, max),
            Self::AtLeast(n) => format!("at least {} {}", n, plural(n)),
        }
    }
}

/// Signature shared by every table entry.
pub type MathFn = fn(&[f64]) -> Result<f64, EvalError>;

/// An entry of the function table.
pub struct Function {
    pub name: &'static str,
    pub arity: Arity,
    /// Usage shown in tool descriptions and documentation.
    pub usage: &'static str,
    pub apply: MathFn,
}

impl Function {
    /// Apply the function and classify non-finite results.
    ///
    /// A NaN produced from non-NaN inputs is a domain error; an infinity
    /// produced from finite inputs is an overflow.
    pub fn call(&self, args: &[f64]) -> Result<f64, EvalError> {
        let value = (self.apply)(args)?;
        if value.is_nan() && !args.iter().any(|a| a.is_nan()) {
            return Err(EvalError::domain(format!("{}() argument out of domain", self.name)));
        }
        if value.is_infinite() && args.iter().all(|a| a.is_finite()) {
            return Err(EvalError::overflow(format!("{}() result out of range", self.name)));
        }
        Ok(value)
    }
}

/// The closed set of callable functions.
#[rustfmt::skip]
pub static FUNCTIONS: &[Function] = &[
    Function { name: "abs", arity: Arity::Exact(1), usage: "abs(x)", apply: |a| Ok(a[0].abs()) },
    Function { name: "round", arity: Arity::Range(1, 2), usage: "round(x[, digits])", apply: round },
    Function { name: "min", arity: Arity::AtLeast(1), usage: "min(a, b, ...)", apply: min },
    Function { name: "max", arity: Arity::AtLeast(1), usage: "max(a, b, ...)", apply: max },
    Function { name: "sum", arity: Arity::AtLeast(1), usage: "sum(a, b, ...)", apply: |a| Ok(a.iter().sum()) },
    Function { name: "sin", arity: Arity::Exact(1), usage: "sin(x)", apply: |a| Ok(a[0].sin()) },
    Function { name: "cos", arity: Arity::Exact(1), usage: "cos(x)", apply: |a| Ok(a[0].cos()) },
    Function { name: "tan", arity: Arity::Exact(1), usage: "tan(x)", apply: |a| Ok(a[0].tan()) },
    Function { name: "asin", arity: Arity::Exact(1), usage: "asin(x)", apply: |a| Ok(a[0].asin()) },
    Function { name: "acos", arity: Arity::Exact(1), usage: "acos(x)", apply: |a| Ok(a[0].acos()) },
    Function { name: "atan", arity: Arity::Exact(1), usage: "atan(x)", apply: |a| Ok(a[0].atan()) },
    Function { name: "atan2", arity: Arity::Exact(2), usage: "atan2(y, x)", apply: |a| Ok(a[0].atan2(a[1])) },
    Function { name: "sinh", arity: Arity::Exact(1), usage: "sinh(x)", apply: |a| Ok(a[0].sinh()) },
    Function { name: "cosh", arity: Arity::Exact(1), usage: "cosh(x)", apply: |a| Ok(a[0].cosh()) },
    Function { name: "tanh", arity: Arity::Exact(1), usage: "tanh(x)", apply: |a| Ok(a[0].tanh()) },
    Function { name: "exp", arity: Arity::Exact(1), usage: "exp(x)", apply: |a| Ok(a[0].exp()) },
    Function { name: "log", arity: Arity::Range(1, 2), usage: "log(x[, base])", apply: log },
    Function { name: "log10", arity: Arity::Exact(1), usage: "log10(x)", apply: |a| positive(a[0], "log10").map(f64::log10) },
    Function { name: "log2", arity: Arity::Exact(1), usage: "log2(x)", apply: |a| positive(a[0], "log2").map(f64::log2) },
    Function { name: "sqrt", arity: Arity::Exact(1), usage: "sqrt(x)", apply: |a| Ok(a[0].sqrt()) },
    Function { name: "pow", arity: Arity::Exact(2), usage: "pow(x, y)", apply: |a| power(a[0], a[1]) },
    Function { name: "degrees", arity: Arity::Exact(1), usage: "degrees(x)", apply: |a| Ok(a[0].to_degrees()) },
    Function { name: "radians", arity: Arity::Exact(1), usage: "radians(x)", apply: |a| Ok(a[0].to_radians()) },
    Function { name: "ceil", arity: Arity::Exact(1), usage: "ceil(x)", apply: |a| integral(a[0], "ceil").map(f64::ceil) },
    Function { name: "floor", arity: Arity::Exact(1), usage: "floor(x)", apply: |a| integral(a[0], "floor").map(f64::floor) },
    Function { name: "trunc", arity: Arity::Exact(1), usage: "trunc(x)", apply: |a| integral(a[0], "trunc").map(f64::trunc) },
    Function { name: "factorial", arity: Arity::Exact(1), usage: "factorial(n)", apply: factorial },
    Function { name: "gcd", arity: Arity::Exact(2), usage: "gcd(a, b)", apply: gcd },
];

/// Built-in constants. Caller variables take precedence over these.
pub static CONSTANTS: &[(&str, f64)] = &[
    ("pi", consts::PI),
    ("e", consts::E),
    ("tau", consts::TAU),
    ("inf", f64::INFINITY),
    ("nan", f64::NAN),
];

/// Look up a function by name.
pub fn function(name: &str) -> Option<&'static Function> {
    FUNCTIONS.iter().find(|f| f.name == name)
}

/// Look up a constant by name.
pub fn constant(name: &str) -> Option<f64> {
    CONSTANTS.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
}

/// The set of names resolvable during a single evaluation.
#[derive(Debug, Clone, Copy)]
pub struct Namespace<'a> {
    variables: Option<&'a HashMap<String, f64>>,
}

impl<'a> Namespace<'a> {
    /// A namespace that resolves nothing: no functions, constants or variables.
    pub fn empty() -> Self {
        Self { variables: None }
    }

    /// Function table, constants, then caller variables layered on top.
    pub fn with_variables(variables: &'a HashMap<String, f64>) -> Self {
        Self {
            variables: Some(variables),
        }
    }

    /// Resolve a value name. Caller variables win over constants.
    pub fn value(&self, name: &str) -> Option<f64> {
        let variables = self.variables?;
        variables.get(name).copied().or_else(|| constant(name))
    }

    /// Resolve a function name.
    pub fn function(&self, name: &str) -> Option<&'static Function> {
        self.variables?;
        function(name)
    }
}

/// Exponentiation with the error classification used by `**` and `pow()`.
pub fn power(base: f64, exponent: f64) -> Result<f64, EvalError> {
    if base == 0.0 && exponent < 0.0 {
        return Err(EvalError::division_by_zero(
            "zero cannot be raised to a negative power",
        ));
    }
    if base < 0.0 && base.is_finite() && exponent.is_finite() && exponent.fract() != 0.0 {
        return Err(EvalError::domain(
            "negative number cannot be raised to a fractional power",
        ));
    }
    let value = base.powf(exponent);
    if value.is_infinite() && base.is_finite() && exponent.is_finite() {
        return Err(EvalError::overflow("power result out of range"));
    }
    Ok(value)
}

fn positive(x: f64, name: &str) -> Result<f64, EvalError> {
    if x <= 0.0 {
        return Err(EvalError::domain(format!("{}() requires a positive argument", name)));
    }
    Ok(x)
}

fn integral(x: f64, name: &str) -> Result<f64, EvalError> {
    if x.is_nan() {
        return Err(EvalError::domain(format!("{}() cannot convert NaN to an integer", name)));
    }
    if x.is_infinite() {
        return Err(EvalError::overflow(format!(
            "{}() cannot convert infinity to an integer",
            name
        )));
    }
    Ok(x)
}

fn log(a: &[f64]) -> Result<f64, EvalError> {
    let x = positive(a[0], "log")?;
    match a.get(1) {
        None => Ok(x.ln()),
        Some(&base) => {
            let base = positive(base, "log")?;
            if base == 1.0 {
                return Err(EvalError::division_by_zero("logarithm base cannot be 1"));
            }
            Ok(x.ln() / base.ln())
        }
    }
}

/// Rounds half to even, optionally to a number of decimal digits.
fn round(a: &[f64]) -> Result<f64, EvalError> {
    let x = a[0];
    let Some(&digits) = a.get(1) else {
        return integral(x, "round").map(f64::round_ties_even);
    };
    if digits.fract() != 0.0 || !digits.is_finite() {
        return Err(EvalError::domain("round() digits must be an integer"));
    }
    if !x.is_finite() {
        return Ok(x);
    }
    let scale = 10f64.powi(digits.abs().min(308.0) as i32);
    if digits < 0.0 {
        return Ok((x / scale).round_ties_even() * scale);
    }
    let scaled = x * scale;
    if !scaled.is_finite() {
        return Ok(x);
    }
    Ok(scaled.round_ties_even() / scale)
}

// Keeps the first of equal candidates, so NaN in the first slot wins.
fn min(a: &[f64]) -> Result<f64, EvalError> {
    Ok(a[1..].iter().fold(a[0], |acc, &x| if x < acc { x } else { acc }))
}

fn max(a: &[f64]) -> Result<f64, EvalError> {
    Ok(a[1..].iter().fold(a[0], |acc, &x| if x > acc { x } else { acc }))
}

/// Largest n whose factorial fits in an f64.
const MAX_FACTORIAL: f64 = 170.0;

fn factorial(a: &[f64]) -> Result<f64, EvalError> {
    let n = a[0];
    if !n.is_finite() || n.fract() != 0.0 {
        return Err(EvalError::domain("factorial() only accepts integral values"));
    }
    if n < 0.0 {
        return Err(EvalError::domain("factorial() not defined for negative values"));
    }
    if n > MAX_FACTORIAL {
        return Err(EvalError::overflow("factorial() result out of range"));
    }
    Ok((2..=n as u64).fold(1.0, |acc, k| acc * k as f64))
}

fn gcd(a: &[f64]) -> Result<f64, EvalError> {
    if a.iter().any(|x| !x.is_finite() || x.fract() != 0.0) {
        return Err(EvalError::domain("gcd() only accepts integral values"));
    }
    // `%` is exact on integral floats, so Euclid stays exact at any magnitude.
    let (mut x, mut y) = (a[0].abs(), a[1].abs());
    while y != 0.0 {
        (x, y) = (y, x % y);
    }
    Ok(x)
}
