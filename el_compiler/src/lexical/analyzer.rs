//! Two-mode lexical analyzer for EL property values
//!
//! Outside an expression the analyzer collects template text and resolves the
//! `$$` and `##{` escapes. Inside `${...}` it produces expression tokens. A
//! stack of open `${` positions tracks nesting so that `}` closes the innermost
//! expression and an unclosed one can be reported where it was opened.

use crate::logging::codes;
use crate::tokens::{NumberLiteral, Token, TokenStream};
use crate::tokens::token::{is_identifier_continue, is_identifier_start};
use crate::utils::{Position, Span, Spanned};
use crate::{log_debug, log_error};
use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character '{character}' at {position}")]
    InvalidCharacter { character: char, position: Position },

    #[error("Unterminated string literal starting at {position}")]
    UnterminatedString { position: Position },

    #[error("Invalid number '{text}' at {position}")]
    InvalidNumber { text: String, position: Position },

    #[error("Expression starting at {position} is never closed")]
    UnterminatedExpression { position: Position },

    #[error("Parameter reference starting at {position} is never closed")]
    UnterminatedParameter { position: Position },

    #[error("Empty parameter name at {position}")]
    EmptyParameterName { position: Position },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexerError::UnterminatedExpression { .. } => codes::lexical::UNTERMINATED_EXPRESSION,
            LexerError::UnterminatedParameter { .. } => codes::lexical::UNTERMINATED_PARAMETER,
            LexerError::EmptyParameterName { .. } => codes::lexical::EMPTY_PARAMETER_NAME,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            LexerError::InvalidCharacter { position, .. }
            | LexerError::UnterminatedString { position }
            | LexerError::InvalidNumber { position, .. }
            | LexerError::UnterminatedExpression { position }
            | LexerError::UnterminatedParameter { position }
            | LexerError::EmptyParameterName { position } => *position,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub expression_count: usize,
    pub parameter_count: usize,
    pub max_nesting_depth: usize,
    pub text_bytes: usize,
}

impl LexicalMetrics {
    fn record_token(&mut self, token: &Token) {
        self.total_tokens += 1;
        match token {
            Token::ExprStart => self.expression_count += 1,
            Token::Parameter(_) => self.parameter_count += 1,
            Token::Text(text) => self.text_bytes += text.len(),
            _ => {}
        }
    }
}

/// Character cursor that keeps line/column positions in step
struct Cursor<'a> {
    chars: Peekable<CharIndices<'a>>,
    pos: Position,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
            pos: Position::start(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.clone().nth(n).map(|(_, ch)| ch)
    }

    fn bump(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        self.pos = self.pos.advance(ch);
        Some(ch)
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }
}

pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    tokens: Vec<Spanned<Token>>,
    /// Start positions of the currently open `${`
    open_expressions: Vec<Position>,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            tokens: Vec::new(),
            open_expressions: Vec::new(),
        }
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    pub fn tokenize(&mut self, source: &str) -> Result<TokenStream, LexerError> {
        self.metrics = LexicalMetrics::default();
        self.tokens.clear();
        self.open_expressions.clear();

        log_debug!("Starting lexical analysis", "source_bytes" => source.len());

        let mut cursor = Cursor::new(source);

        let result = loop {
            let step = if self.open_expressions.is_empty() {
                self.lex_template(&mut cursor)
            } else {
                self.lex_expression_token(&mut cursor)
            };

            match step {
                Ok(true) => continue,
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        if let Err(error) = result {
            log_error!(error.error_code(), &error.to_string(),
                span = Span::point(error.position()),
                "offset" => error.position().offset
            );
            return Err(error);
        }

        self.push(Token::Eof, cursor.pos, cursor.pos);

        log_debug!("Lexical analysis complete",
            "tokens" => self.metrics.total_tokens,
            "expressions" => self.metrics.expression_count,
            "max_depth" => self.metrics.max_nesting_depth
        );

        Ok(TokenStream::new(std::mem::take(&mut self.tokens)))
    }

    fn push(&mut self, token: Token, start: Position, end: Position) {
        self.metrics.record_token(&token);
        self.tokens.push(Spanned::new(token, Span::new(start, end)));
    }

    fn single(&mut self, cursor: &mut Cursor<'_>, token: Token) {
        let start = cursor.pos;
        cursor.bump();
        self.push(token, start, cursor.pos);
    }

    fn open_expression(&mut self, cursor: &mut Cursor<'_>) {
        let start = cursor.pos;
        cursor.bump_n(2);
        self.push(Token::ExprStart, start, cursor.pos);
        self.open_expressions.push(start);
        self.metrics.max_nesting_depth = self
            .metrics
            .max_nesting_depth
            .max(self.open_expressions.len());
    }

    /// Template text up to the next `${`, `#{` or end of input.
    /// Returns false at end of input.
    fn lex_template(&mut self, cursor: &mut Cursor<'_>) -> Result<bool, LexerError> {
        let start = cursor.pos;
        let mut text = String::new();

        while let Some(ch) = cursor.peek() {
            match (ch, cursor.peek_nth(1), cursor.peek_nth(2)) {
                ('$', Some('$'), _) => {
                    cursor.bump_n(2);
                    text.push('$');
                }
                ('$', Some('{'), _) => break,
                ('#', Some('#'), Some('{')) => {
                    cursor.bump_n(3);
                    text.push_str("#{");
                }
                ('#', Some('{'), _) => break,
                _ => {
                    cursor.bump();
                    text.push(ch);
                }
            }
        }

        if !text.is_empty() {
            self.push(Token::Text(text), start, cursor.pos);
        }

        match cursor.peek() {
            None => Ok(false),
            Some('$') => {
                self.open_expression(cursor);
                Ok(true)
            }
            Some(_) => {
                self.lex_parameter(cursor)?;
                Ok(true)
            }
        }
    }

    fn lex_expression_token(&mut self, cursor: &mut Cursor<'_>) -> Result<bool, LexerError> {
        while cursor.peek().is_some_and(char::is_whitespace) {
            cursor.bump();
        }

        let start = cursor.pos;
        let Some(ch) = cursor.peek() else {
            let position = self.open_expressions.first().copied().unwrap_or(start);
            return Err(LexerError::UnterminatedExpression { position });
        };

        match ch {
            '$' if cursor.peek_nth(1) == Some('{') => self.open_expression(cursor),
            '#' if cursor.peek_nth(1) == Some('{') => self.lex_parameter(cursor)?,
            '}' => {
                self.single(cursor, Token::ExprEnd);
                self.open_expressions.pop();
            }
            ':' => self.single(cursor, Token::Colon),
            '(' => self.single(cursor, Token::LeftParen),
            ')' => self.single(cursor, Token::RightParen),
            ',' => self.single(cursor, Token::Comma),
            '\'' | '"' => self.lex_string(cursor, ch)?,
            '-' if cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.lex_number(cursor)?
            }
            c if c.is_ascii_digit() => self.lex_number(cursor)?,
            c if is_identifier_start(c) => {
                let mut name = String::new();
                while let Some(c) = cursor.peek().filter(|c| is_identifier_continue(*c)) {
                    name.push(c);
                    cursor.bump();
                }
                self.push(Token::Identifier(name), start, cursor.pos);
            }
            other => {
                return Err(LexerError::InvalidCharacter {
                    character: other,
                    position: start,
                })
            }
        }

        Ok(true)
    }

    /// `#{name}` as a single token
    fn lex_parameter(&mut self, cursor: &mut Cursor<'_>) -> Result<(), LexerError> {
        let start = cursor.pos;
        cursor.bump_n(2);

        let mut name = String::new();
        loop {
            match cursor.bump() {
                Some('}') => break,
                Some(c) => name.push(c),
                None => return Err(LexerError::UnterminatedParameter { position: start }),
            }
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(LexerError::EmptyParameterName { position: start });
        }

        self.push(Token::Parameter(name.to_string()), start, cursor.pos);
        Ok(())
    }

    /// Quoted string; unknown escapes keep their backslash so regex arguments
    /// such as `'\d+'` survive unchanged
    fn lex_string(&mut self, cursor: &mut Cursor<'_>, quote: char) -> Result<(), LexerError> {
        let start = cursor.pos;
        cursor.bump();

        let mut content = String::new();
        loop {
            match cursor.bump() {
                None => return Err(LexerError::UnterminatedString { position: start }),
                Some(c) if c == quote => break,
                Some('\\') => match cursor.bump() {
                    None => return Err(LexerError::UnterminatedString { position: start }),
                    Some('n') => content.push('\n'),
                    Some('t') => content.push('\t'),
                    Some('r') => content.push('\r'),
                    Some(c @ ('\\' | '"' | '\'')) => content.push(c),
                    Some(other) => {
                        content.push('\\');
                        content.push(other);
                    }
                },
                Some(c) => content.push(c),
            }
        }

        self.push(Token::StringLiteral(content), start, cursor.pos);
        Ok(())
    }

    /// Integer, decimal or exponent literal with an optional leading `-`
    fn lex_number(&mut self, cursor: &mut Cursor<'_>) -> Result<(), LexerError> {
        let start = cursor.pos;
        let mut text = String::new();
        let mut is_decimal = false;

        if cursor.peek() == Some('-') {
            text.push('-');
            cursor.bump();
        }
        take_digits(cursor, &mut text);

        if cursor.peek() == Some('.') && cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            is_decimal = true;
            text.push('.');
            cursor.bump();
            take_digits(cursor, &mut text);
        }

        if matches!(cursor.peek(), Some('e' | 'E')) {
            let exponent_follows = match cursor.peek_nth(1) {
                Some(c) if c.is_ascii_digit() => true,
                Some('+' | '-') => cursor.peek_nth(2).is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            };
            if exponent_follows {
                is_decimal = true;
                text.push('e');
                cursor.bump();
                if let Some(sign) = cursor.peek().filter(|c| matches!(c, '+' | '-')) {
                    text.push(sign);
                    cursor.bump();
                }
                take_digits(cursor, &mut text);
            }
        }

        // `12abc` or `1.2.3` is one malformed literal, not two tokens
        if cursor.peek().is_some_and(is_identifier_continue) {
            while let Some(c) = cursor.peek().filter(|c| is_identifier_continue(*c)) {
                text.push(c);
                cursor.bump();
            }
            return Err(LexerError::InvalidNumber {
                text,
                position: start,
            });
        }

        let literal = if is_decimal {
            match text.parse::<f64>() {
                Ok(value) if value.is_finite() => NumberLiteral::Decimal(value),
                _ => {
                    return Err(LexerError::InvalidNumber {
                        text,
                        position: start,
                    })
                }
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => NumberLiteral::Integer(value),
                Err(_) => {
                    return Err(LexerError::InvalidNumber {
                        text,
                        position: start,
                    })
                }
            }
        };

        self.push(Token::Number(literal), start, cursor.pos);
        Ok(())
    }
}

fn take_digits(cursor: &mut Cursor<'_>, text: &mut String) {
    while let Some(d) = cursor.peek().filter(char::is_ascii_digit) {
        text.push(d);
        cursor.bump();
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
