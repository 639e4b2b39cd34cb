//! Resolution errors: the catalog rejected a call or a chain shape

use crate::logging::{codes, Code};
use crate::utils::Span;

pub type ResolveResult<T> = Result<T, ResolveError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("Unknown function '{name}' at {}", span.start)]
    UnknownFunction { name: String, span: Span },

    #[error("Function '{name}' expects {} argument(s), got {got} at {}",
        arity_text(*expected_min, *expected_max), span.start)]
    ArityMismatch {
        name: String,
        got: usize,
        expected_min: usize,
        expected_max: Option<usize>,
        span: Span,
    },

    #[error("Function '{name}' requires a subject at {}", span.start)]
    SubjectRequired { name: String, span: Span },

    #[error("Function '{name}' cannot be applied to a subject at {}", span.start)]
    SubjectNotAllowed { name: String, span: Span },

    #[error("Multi-value result of '{name}' is never reduced at {}", span.start)]
    MultiValueUnreduced { name: String, span: Span },

    #[error("Function '{name}' is not supported at {}", span.start)]
    UnsupportedFeature { name: String, span: Span },
}

fn arity_text(min: usize, max: Option<usize>) -> String {
    match max {
        Some(max) if max == min => min.to_string(),
        Some(max) => format!("{}-{}", min, max),
        None => format!("at least {}", min),
    }
}

impl ResolveError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnknownFunction { .. } => codes::resolution::UNKNOWN_FUNCTION,
            Self::ArityMismatch { .. } => codes::resolution::ARITY_MISMATCH,
            Self::SubjectRequired { .. } => codes::resolution::SUBJECT_REQUIRED,
            Self::SubjectNotAllowed { .. } => codes::resolution::SUBJECT_NOT_ALLOWED,
            Self::MultiValueUnreduced { .. } => codes::resolution::MULTI_VALUE_UNREDUCED,
            Self::UnsupportedFeature { .. } => codes::resolution::UNSUPPORTED_FEATURE,
        }
    }

    /// Function the error is about
    pub fn name(&self) -> &str {
        match self {
            Self::UnknownFunction { name, .. }
            | Self::ArityMismatch { name, .. }
            | Self::SubjectRequired { name, .. }
            | Self::SubjectNotAllowed { name, .. }
            | Self::MultiValueUnreduced { name, .. }
            | Self::UnsupportedFeature { name, .. } => name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UnknownFunction { span, .. }
            | Self::ArityMismatch { span, .. }
            | Self::SubjectRequired { span, .. }
            | Self::SubjectNotAllowed { span, .. }
            | Self::MultiValueUnreduced { span, .. }
            | Self::UnsupportedFeature { span, .. } => *span,
        }
    }
}
