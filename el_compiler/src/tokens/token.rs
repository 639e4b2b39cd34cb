//! Token types produced by the EL lexer
//!
//! The lexer runs in two modes. Template text outside `${...}` becomes `Text`
//! tokens with escapes already resolved; inside an expression the usual
//! punctuation, names and literals are produced.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric literal value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NumberLiteral {
    Integer(i64),
    /// Always finite
    Decimal(f64),
}

impl fmt::Display for NumberLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberLiteral::Integer(i) => write!(f, "{}", i),
            NumberLiteral::Decimal(d) => write!(f, "{:?}", d),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Token {
    /// Literal template text, `$$` and `##{` escapes resolved
    Text(String),
    /// `${`
    ExprStart,
    /// `}` closing an expression
    ExprEnd,
    /// `#{name}`, lexed whole
    Parameter(String),

    /// Attribute or function name
    Identifier(String),
    /// Quoted string with escapes resolved
    StringLiteral(String),
    Number(NumberLiteral),

    Colon,
    LeftParen,
    RightParen,
    Comma,

    Eof,
}

impl Token {
    /// Short description used in "expected X, found Y" messages
    pub fn describe(&self) -> String {
        match self {
            Token::Text(_) => "template text".to_string(),
            Token::ExprStart => "'${'".to_string(),
            Token::ExprEnd => "'}'".to_string(),
            Token::Parameter(name) => format!("parameter '#{{{}}}'", name),
            Token::Identifier(name) => format!("name '{}'", name),
            Token::StringLiteral(_) => "string literal".to_string(),
            Token::Number(n) => format!("number {}", n),
            Token::Colon => "':'".to_string(),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, Token::Eof)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// First character of a bare name
pub fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

/// Subsequent characters of a bare name
pub fn is_identifier_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-')
}

/// Whether `name` lexes back as a single identifier token
pub fn is_bare_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first) => chars.all(is_identifier_continue),
        _ => false,
    }
}

/// Identifiers that read as literals in argument position
pub fn is_reserved_literal(name: &str) -> bool {
    matches!(name, "true" | "false" | "null")
}
