use crate::config::compile_time::syntax::MAX_ERROR_SNIPPET_LENGTH;
use crate::lexical::LexerError;
use crate::logging::Code;
use crate::semantic_analysis::ResolveError;
use crate::syntax::SyntaxError;
use crate::utils::{Position, SourceMap};

/// Why an expression failed to compile
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error("Lexical analysis failed: {0}")]
    Lexical(#[from] LexerError),

    #[error("Syntax analysis failed: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("Resolution failed: {0}")]
    Resolve(#[from] ResolveError),
}

/// Flat classification of compile failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompileErrorKind {
    /// Malformed grammar, lexical or syntactic
    Syntax,
    UnknownFunction,
    ArityMismatch,
    SubjectRequired,
    SubjectNotAllowed,
    MultiValueUnreduced,
    UnsupportedFeature,
}

impl CompileErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Syntax => "SyntaxError",
            Self::UnknownFunction => "UnknownFunctionError",
            Self::ArityMismatch => "ArityMismatchError",
            Self::SubjectRequired => "SubjectRequiredError",
            Self::SubjectNotAllowed => "SubjectNotAllowedError",
            Self::MultiValueUnreduced => "MultiValueUnreducedError",
            Self::UnsupportedFeature => "UnsupportedFeatureError",
        }
    }
}

impl CompileError {
    pub fn kind(&self) -> CompileErrorKind {
        match self {
            Self::Lexical(_) | Self::Syntax(_) => CompileErrorKind::Syntax,
            Self::Resolve(e) => match e {
                ResolveError::UnknownFunction { .. } => CompileErrorKind::UnknownFunction,
                ResolveError::ArityMismatch { .. } => CompileErrorKind::ArityMismatch,
                ResolveError::SubjectRequired { .. } => CompileErrorKind::SubjectRequired,
                ResolveError::SubjectNotAllowed { .. } => CompileErrorKind::SubjectNotAllowed,
                ResolveError::MultiValueUnreduced { .. } => CompileErrorKind::MultiValueUnreduced,
                ResolveError::UnsupportedFeature { .. } => CompileErrorKind::UnsupportedFeature,
            },
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::Lexical(e) => e.error_code(),
            Self::Syntax(e) => e.error_code(),
            Self::Resolve(e) => e.error_code(),
        }
    }

    /// Where in the source the problem was found
    pub fn position(&self) -> Position {
        match self {
            Self::Lexical(e) => e.position(),
            Self::Syntax(e) => e.position(),
            Self::Resolve(e) => e.span().start,
        }
    }

    /// Function name for catalog errors
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Self::Resolve(e) => Some(e.name()),
            _ => None,
        }
    }

    pub fn is_unsupported(&self) -> bool {
        self.kind() == CompileErrorKind::UnsupportedFeature
    }

    /// Message without location, for syntax errors the "expected X" detail
    pub fn detail(&self) -> String {
        match self {
            Self::Lexical(e) => e.to_string(),
            Self::Syntax(e) => e.detail(),
            Self::Resolve(e) => e.to_string(),
        }
    }

    /// Multi-line report with a caret under the offending column
    pub fn report(&self, source: &str) -> String {
        let position = self.position();
        let map = SourceMap::new(truncate(source));
        if position.offset > MAX_ERROR_SNIPPET_LENGTH {
            return format!("{}: {}", self.kind().as_str(), self);
        }
        map.format_error(position.offset, &format!("{}: {}", self.kind().as_str(), self.detail()))
    }
}

fn truncate(source: &str) -> &str {
    match source.char_indices().nth(MAX_ERROR_SNIPPET_LENGTH) {
        Some((idx, _)) => &source[..idx],
        None => source,
    }
}
