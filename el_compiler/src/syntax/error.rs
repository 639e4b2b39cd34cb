//! Syntax errors raised while building the concrete syntax tree

use crate::logging::{codes, Code};
use crate::utils::{Position, Span};

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    #[error("Unexpected {found}: expected {expected} at {}", span.start)]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    #[error("Unexpected end of input: expected {expected} at {}", span.start)]
    UnexpectedEndOfInput { expected: String, span: Span },

    #[error("Empty expression at {}", span.start)]
    EmptyExpression { span: Span },

    /// A malformed expression nested inside the expression starting at `outer_offset`
    ///
    /// Kept flat however deep the nesting goes: `inner` is never itself
    /// `Nested`, and `within` holds the offsets of the expressions between
    /// the outermost and the failing one, innermost first.
    #[error("In expression starting at offset {outer_offset}: {inner}")]
    Nested {
        outer_offset: usize,
        within: Vec<usize>,
        inner: Box<SyntaxError>,
    },
}

impl SyntaxError {
    pub fn unexpected_token(expected: &str, found: &str, span: Span) -> Self {
        Self::UnexpectedToken {
            expected: expected.to_string(),
            found: found.to_string(),
            span,
        }
    }

    pub fn unexpected_end_of_input(expected: &str, span: Span) -> Self {
        Self::UnexpectedEndOfInput {
            expected: expected.to_string(),
            span,
        }
    }

    pub fn nested(outer_start: Position, inner: SyntaxError) -> Self {
        match inner {
            Self::Nested {
                outer_offset,
                mut within,
                inner,
            } => {
                within.push(outer_offset);
                Self::Nested {
                    outer_offset: outer_start.offset,
                    within,
                    inner,
                }
            }
            other => Self::Nested {
                outer_offset: outer_start.offset,
                within: Vec::new(),
                inner: Box::new(other),
            },
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::UnexpectedToken { .. } => codes::syntax::UNEXPECTED_TOKEN,
            Self::UnexpectedEndOfInput { .. } => codes::syntax::UNEXPECTED_END_OF_INPUT,
            Self::EmptyExpression { .. } => codes::syntax::EMPTY_EXPRESSION,
            Self::Nested { .. } => codes::syntax::NESTED_EXPRESSION,
        }
    }

    /// Span of the innermost offending token
    pub fn span(&self) -> Span {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEndOfInput { span, .. }
            | Self::EmptyExpression { span } => *span,
            Self::Nested { inner, .. } => inner.span(),
        }
    }

    pub fn position(&self) -> Position {
        self.span().start
    }

    /// What went wrong, without the location
    pub fn detail(&self) -> String {
        match self {
            Self::UnexpectedToken {
                expected, found, ..
            } => format!("expected {}, found {}", expected, found),
            Self::UnexpectedEndOfInput { expected, .. } => {
                format!("expected {}, found end of input", expected)
            }
            Self::EmptyExpression { .. } => "expression has no subject".to_string(),
            Self::Nested { inner, .. } => inner.detail(),
        }
    }

    /// Start offsets of the enclosing expressions, outermost first
    pub fn outer_offsets(&self) -> Vec<usize> {
        match self {
            Self::Nested {
                outer_offset,
                within,
                ..
            } => std::iter::once(*outer_offset)
                .chain(within.iter().rev().copied())
                .collect(),
            _ => Vec::new(),
        }
    }
}
