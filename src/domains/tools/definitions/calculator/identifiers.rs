//! Identifier scanning over sanitized expressions.
//!
//! These checks run before parsing so that forbidden constructs are reported
//! as such rather than as generic syntax errors.

use super::error::EvalError;
use super::namespace;

/// Words that would introduce statements, control flow or imports.
const RESERVED_WORDS: &[&str] = &[
    "import", "from", "lambda", "exec", "eval", "def", "class", "return", "yield", "del",
    "global", "with", "for", "while", "if", "else", "try", "except", "raise", "and", "or",
    "not", "in", "is",
];

/// An identifier found in an expression, with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Identifier<'a> {
    name: &'a str,
    start: usize,
    end: usize,
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Every maximal word run that does not start with a digit.
fn identifiers(expr: &str) -> Vec<Identifier<'_>> {
    let mut found = Vec::new();
    let mut chars = expr.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if !is_word(c) {
            continue;
        }
        let mut end = start + c.len_utf8();
        while let Some(&(i, next)) = chars.peek() {
            if !is_word(next) {
                break;
            }
            end = i + next.len_utf8();
            chars.next();
        }
        if !c.is_ascii_digit() {
            found.push(Identifier {
                name: &expr[start..end],
                start,
                end,
            });
        }
    }
    found
}

fn next_significant(expr: &str, from: usize) -> Option<char> {
    expr[from..].chars().find(|c| !c.is_whitespace())
}

fn previous_significant(expr: &str, until: usize) -> Option<(usize, char)> {
    expr[..until]
        .char_indices()
        .rev()
        .find(|(_, c)| !c.is_whitespace())
}

/// Names used as calls, unique and in order of first appearance.
pub fn extract_function_calls(expr: &str) -> Vec<String> {
    let mut calls: Vec<String> = Vec::new();
    for ident in identifiers(expr) {
        if next_significant(expr, ident.end) == Some('(')
            && !calls.iter().any(|c| c == ident.name)
        {
            calls.push(ident.name.to_string());
        }
    }
    calls
}

/// Whether `name` can never be bound by a caller variable.
pub fn is_forbidden_name(name: &str) -> bool {
    name.starts_with("__") || RESERVED_WORDS.contains(&name)
}

/// Whether `name` is a syntactically valid identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => chars.all(is_word),
        _ => false,
    }
}

/// Reject attribute access, dunder names, reserved words and calls to
/// anything outside the function table.
///
/// Returns the validated function names in order of first appearance.
pub fn validate_identifiers(expr: &str) -> Result<Vec<String>, EvalError> {
    let idents = identifiers(expr);

    for (i, c) in expr.char_indices() {
        if c != '.' {
            continue;
        }
        let follows_attribute = matches!(
            next_significant(expr, i + 1),
            Some(n) if n.is_alphabetic() || n == '_'
        );
        if !follows_attribute {
            continue;
        }
        let on_object = match previous_significant(expr, i) {
            Some((_, ')')) => true,
            Some((p, _)) => idents.iter().any(|id| id.start <= p && p < id.end),
            None => false,
        };
        if on_object {
            return Err(EvalError::disallowed("attribute access is not permitted"));
        }
    }

    for ident in &idents {
        if ident.name.starts_with("__") {
            return Err(EvalError::disallowed(format!(
                "dunder name '{}' is not permitted",
                ident.name
            )));
        }
        if RESERVED_WORDS.contains(&ident.name) {
            return Err(EvalError::disallowed(format!(
                "keyword '{}' is not permitted",
                ident.name
            )));
        }
    }

    let calls = extract_function_calls(expr);
    if let Some(unknown) = calls.iter().find(|name| namespace::function(name).is_none()) {
        return Err(EvalError::UnknownFunction(unknown.clone()));
    }
    Ok(calls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_function_calls() {
        assert_eq!(
            extract_function_calls("sqrt(16) + max (1, sqrt(4)) + x"),
            vec!["sqrt", "max"]
        );
        assert!(extract_function_calls("2 * (3 + 4)").is_empty());
        assert!(extract_function_calls("1e5").is_empty());
    }

    #[test]
    fn test_unknown_function() {
        assert_eq!(
            validate_identifiers("foo(1)"),
            Err(EvalError::UnknownFunction("foo".to_string()))
        );
        assert_eq!(
            validate_identifiers("sqrt(4) + open(1)"),
            Err(EvalError::UnknownFunction("open".to_string()))
        );
    }

    #[test]
    fn test_variable_used_as_call() {
        assert!(matches!(validate_identifiers("x(2)"), Err(EvalError::UnknownFunction(_))));
    }

    #[test]
    fn test_attribute_access() {
        for expr in ["x.real", "(1).real", "pi . imag", "sqrt(4).hex"] {
            assert!(
                matches!(validate_identifiers(expr), Err(EvalError::Disallowed(_))),
                "{}",
                expr
            );
        }
        assert!(validate_identifiers("1.5 + .5").is_ok());
        assert!(validate_identifiers("1.e5").is_ok());
    }

    #[test]
    fn test_dunder_and_keywords() {
        assert!(matches!(
            validate_identifiers("__import__(1)"),
            Err(EvalError::Disallowed(_))
        ));
        assert!(matches!(
            validate_identifiers("import os"),
            Err(EvalError::Disallowed(_))
        ));
        assert!(matches!(
            validate_identifiers("lambda x"),
            Err(EvalError::Disallowed(_))
        ));
        assert!(matches!(
            validate_identifiers("1 if x else 2"),
            Err(EvalError::Disallowed(_))
        ));
    }

    #[test]
    fn test_valid_expression() {
        assert_eq!(
            validate_identifiers("sqrt(x) + log(y, 2) + sqrt(1)"),
            Ok(vec!["sqrt".to_string(), "log".to_string()])
        );
    }

    #[test]
    fn test_identifier_rules() {
        assert!(is_identifier("x"));
        assert!(is_identifier("_tmp1"));
        assert!(!is_identifier("1x"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
        assert!(is_forbidden_name("__class__"));
        assert!(is_forbidden_name("while"));
        assert!(!is_forbidden_name("rate"));
    }
}
