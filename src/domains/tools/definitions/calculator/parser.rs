//! Tokenizer and recursive-descent parser for calculator expressions.
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '//') unary)*
//! unary   := ('+' | '-') unary | power
//! power   := primary ('**' unary)?
//! primary := NUMBER | NAME | NAME '(' args ')' | '(' expr ')'
//! args    := expr (',' expr)* ','?
//! ```
//!
//! Names are resolved against the [`Namespace`] while parsing, so a parsed
//! [`Expr`] is closed: evaluating it cannot fail on a lookup.

use std::fmt;

use super::error::EvalError;
use super::namespace::{self, Function, Namespace};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Name(String),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Name(name) => f.write_str(name),
            Self::Plus => f.write_str("+"),
            Self::Minus => f.write_str("-"),
            Self::Star => f.write_str("*"),
            Self::DoubleStar => f.write_str("**"),
            Self::Slash => f.write_str("/"),
            Self::DoubleSlash => f.write_str("//"),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
            Self::Comma => f.write_str(","),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::DoubleStar);
                i += 2;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                tokens.push(Token::DoubleSlash);
                i += 2;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let (number, next) = lex_number(&chars, i)?;
                tokens.push(Token::Number(number));
                i = next;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Name(chars[start..i].iter().collect()));
            }
            other => {
                return Err(EvalError::syntax(format!(
                    "unexpected character '{}' at position {}",
                    other, i
                )));
            }
        }
    }
    Ok(tokens)
}

/// Lex `12`, `1.5`, `.5`, `5.` and exponent forms such as `1e-3`.
fn lex_number(chars: &[char], start: usize) -> Result<(f64, usize), EvalError> {
    let digits = |mut i: usize| {
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let int_end = digits(start);
    let mut end = int_end;
    if chars.get(end) == Some(&'.') {
        end = digits(end + 1);
    }
    if end - start == 1 && chars[start] == '.' {
        return Err(EvalError::syntax(format!(
            "unexpected '.' at position {}",
            start
        )));
    }

    if matches!(chars.get(end), Some('e' | 'E')) {
        let mut exp = end + 1;
        if matches!(chars.get(exp), Some('+' | '-')) {
            exp += 1;
        }
        if chars.get(exp).is_some_and(|c| c.is_ascii_digit()) {
            end = digits(exp);
        }
    }

    let text: String = chars[start..end].iter().collect();
    let value = text
        .parse::<f64>()
        .map_err(|_| EvalError::syntax(format!("invalid number '{}'", text)))?;
    Ok((value, end))
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Pow,
}

/// A parsed expression with every name already resolved.
pub enum Expr {
    Number(f64),
    Neg(Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(&'static Function, Vec<Expr>),
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Neg(inner) => write!(f, "-({:?})", inner),
            Self::Binary(op, lhs, rhs) => write!(f, "{:?}({:?}, {:?})", op, lhs, rhs),
            Self::Call(func, args) => write!(f, "{}{:?}", func.name, args),
        }
    }
}

impl Expr {
    /// Evaluate the tree. Only arithmetic failures can occur here.
    pub fn eval(&self) -> Result<f64, EvalError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Neg(inner) => Ok(-inner.eval()?),
            Self::Binary(op, lhs, rhs) => apply_binary(*op, lhs.eval()?, rhs.eval()?),
            Self::Call(func, args) => {
                let values = args.iter().map(Expr::eval).collect::<Result<Vec<_>, _>>()?;
                func.call(&values)
            }
        }
    }
}

fn apply_binary(op: BinaryOp, lhs: f64, rhs: f64) -> Result<f64, EvalError> {
    let value = match op {
        BinaryOp::Add => lhs + rhs,
        BinaryOp::Sub => lhs - rhs,
        BinaryOp::Mul => lhs * rhs,
        BinaryOp::Div | BinaryOp::FloorDiv if rhs == 0.0 => {
            return Err(EvalError::division_by_zero(format!("{} / 0", lhs)));
        }
        BinaryOp::Div => lhs / rhs,
        BinaryOp::FloorDiv => (lhs / rhs).floor(),
        BinaryOp::Pow => return namespace::power(lhs, rhs),
    };
    if value.is_infinite() && lhs.is_finite() && rhs.is_finite() {
        return Err(EvalError::overflow("arithmetic result out of range"));
    }
    Ok(value)
}

/// Parse `input` into a closed expression tree.
pub fn parse(input: &str, namespace: Namespace<'_>, max_depth: usize) -> Result<Expr, EvalError> {
    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(EvalError::syntax("empty expression"));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        max_depth,
        namespace,
    };
    let expr = parser.parse_expr()?;
    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(EvalError::syntax(format!("unexpected '{}'", token))),
    }
}

struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    max_depth: usize,
    namespace: Namespace<'a>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), EvalError> {
        match self.advance() {
            Some(ref t) if t == token => Ok(()),
            Some(other) => Err(EvalError::syntax(format!(
                "expected '{}' but found '{}'",
                token, other
            ))),
            None => Err(EvalError::syntax(format!(
                "expected '{}' but reached end of expression",
                token
            ))),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_term(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::DoubleSlash) => BinaryOp::FloorDiv,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    // Every recursive path passes through here, so this is where depth is bounded.
    fn parse_unary(&mut self) -> Result<Expr, EvalError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(EvalError::disallowed(format!(
                "expression nesting exceeds {} levels",
                self.max_depth
            )));
        }
        let result = if self.eat(&Token::Minus) {
            self.parse_unary().map(|e| Expr::Neg(Box::new(e)))
        } else if self.eat(&Token::Plus) {
            self.parse_unary()
        } else {
            self.parse_power()
        };
        self.depth -= 1;
        result
    }

    fn parse_power(&mut self) -> Result<Expr, EvalError> {
        let base = self.parse_primary()?;
        if self.eat(&Token::DoubleStar) {
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Name(name)) if self.peek() == Some(&Token::LParen) => {
                self.pos += 1;
                self.parse_call(&name)
            }
            Some(Token::Name(name)) => self.resolve_name(&name),
            Some(other) => Err(EvalError::syntax(format!("unexpected '{}'", other))),
            None => Err(EvalError::syntax("unexpected end of expression")),
        }
    }

    fn resolve_name(&self, name: &str) -> Result<Expr, EvalError> {
        if let Some(value) = self.namespace.value(name) {
            return Ok(Expr::Number(value));
        }
        if self.namespace.function(name).is_some() {
            return Err(EvalError::syntax(format!(
                "function '{}' must be called with arguments",
                name
            )));
        }
        Err(EvalError::UnknownName(name.to_string()))
    }

    fn parse_call(&mut self, name: &str) -> Result<Expr, EvalError> {
        let func = self
            .namespace
            .function(name)
            .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))?;

        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.eat(&Token::Comma) {
                    if self.eat(&Token::RParen) {
                        break;
                    }
                    continue;
                }
                self.expect(&Token::RParen)?;
                break;
            }
        }

        if !func.arity.accepts(args.len()) {
            return Err(EvalError::syntax(format!(
                "{}() takes {} ({} given)",
                func.name,
                func.arity.describe(),
                args.len()
            )));
        }
        Ok(Expr::Call(func, args))
    }
}
