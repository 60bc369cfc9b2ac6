//! Character-level clean-up of raw calculator input.

/// Operators and punctuation accepted besides identifiers and whitespace.
const PERMITTED_SYMBOLS: &str = "+-*/().,%^";

/// Whether the sanitizer keeps `c`.
pub fn is_permitted(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c.is_whitespace() || PERMITTED_SYMBOLS.contains(c)
}

/// Characters of `raw` that [`sanitize`] would remove, without duplicates.
pub fn stripped_characters(raw: &str) -> Vec<char> {
    let mut found = Vec::new();
    for c in raw.chars().filter(|c| !is_permitted(*c)) {
        if !found.contains(&c) {
            found.push(c);
        }
    }
    found
}

/// Normalize a raw expression into the evaluator's input language.
///
/// Unsupported characters are removed. `%` means "percent of" and becomes
/// `/100*`, so `50%-10` is half of -10. When the next significant character
/// is a binary operator, a closing parenthesis, a comma or the end of input,
/// it becomes `/100` instead, so `50%*200` is half of 200 and `50%` is 0.5.
/// `^` is always exponentiation (never bitwise xor) and becomes `**`.
///
/// The output contains neither `%` nor `^`, so sanitizing twice is the same
/// as sanitizing once.
pub fn sanitize(raw: &str) -> String {
    let kept: Vec<char> = raw.chars().filter(|c| is_permitted(*c)).collect();
    let mut out = String::with_capacity(kept.len() + 8);

    for (i, &c) in kept.iter().enumerate() {
        match c {
            '%' => {
                let next = kept[i + 1..].iter().find(|c| !c.is_whitespace());
                match next {
                    Some(&n) if !ends_percent_factor(n) => out.push_str("/100*"),
                    _ => out.push_str("/100"),
                }
            }
            '^' => out.push_str("**"),
            _ => out.push(c),
        }
    }
    out
}

/// Whether the sanitized expression needs nothing beyond plain arithmetic.
pub fn is_plain_arithmetic(expr: &str) -> bool {
    expr.chars()
        .all(|c| c.is_ascii_digit() || c.is_whitespace() || "+-*/().".contains(c))
}

fn ends_percent_factor(c: char) -> bool {
    matches!(c, '*' | '/' | ')' | ',' | '%' | '^')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_unsupported_characters() {
        assert_eq!(sanitize("2 + 3; rm"), "2 + 3 rm");
        assert_eq!(sanitize("a[0]"), "a0");
        assert_eq!(stripped_characters("a[0] = 1;"), vec!['[', ']', '=', ';']);
        assert!(stripped_characters("sqrt(2) * 3").is_empty());
    }

    #[test]
    fn test_percent_rewrite() {
        assert_eq!(sanitize("50%*200"), "50/100*200");
        assert_eq!(sanitize("50%"), "50/100");
        assert_eq!(sanitize("50% 200"), "50/100* 200");
        assert_eq!(sanitize("50% + 1"), "50/100* + 1");
        assert_eq!(sanitize("50%-10"), "50/100*-10");
        assert_eq!(sanitize("10%(4)"), "10/100*(4)");
        assert_eq!(sanitize("max(50%, 1)"), "max(50/100, 1)");
        assert_eq!(sanitize("(50%)"), "(50/100)");
    }

    #[test]
    fn test_caret_is_power() {
        assert_eq!(sanitize("2^10"), "2**10");
        assert_eq!(sanitize("x ^ y"), "x ** y");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "2 + 3 * 4",
            "50%*200",
            "2^10 % 3",
            "sqrt(16); import os",
            "__class__.__bases__",
            "  1e-3 + .5  ",
            "ünïcödé + 1",
            "",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_plain_arithmetic() {
        assert!(is_plain_arithmetic("2 + 3 * (4 - 1) / 2.5"));
        assert!(is_plain_arithmetic("7 // 2"));
        assert!(!is_plain_arithmetic("2 ** 3 + pi"));
        assert!(!is_plain_arithmetic("1e3"));
        assert!(!is_plain_arithmetic("max(1, 2)"));
    }
}
