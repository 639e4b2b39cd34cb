use el_compiler::logging::{codes, Code};
use el_compiler::CompileError;

/// Failures that depend on attribute values and so surface only at evaluation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("cannot convert '{value}' to {expected_kind}")]
    TypeCoercion {
        value: String,
        expected_kind: &'static str,
    },

    #[error("invalid regex '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("arithmetic error: {message}")]
    Arithmetic { message: String },

    #[error("invalid argument to {function}: {reason}")]
    InvalidArgument {
        function: &'static str,
        reason: String,
    },

    #[error("'{name}' is not supported")]
    Unsupported { name: String },

    #[error("host lookup failed: {reason}")]
    Host { reason: String },

    #[error("multi-value result of '{name}' was not reduced")]
    UnreducedMultiValue { name: String },

    #[error("nested expression failed to compile: {0}")]
    NestedCompile(CompileError),
}

impl EvalError {
    pub fn coercion(value: impl Into<String>, expected_kind: &'static str) -> Self {
        EvalError::TypeCoercion {
            value: value.into(),
            expected_kind,
        }
    }

    pub fn invalid_argument(function: &'static str, reason: impl Into<String>) -> Self {
        EvalError::InvalidArgument {
            function,
            reason: reason.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            EvalError::TypeCoercion { .. } => codes::evaluation::TYPE_COERCION,
            EvalError::InvalidRegex { .. } => codes::evaluation::INVALID_REGEX,
            EvalError::Arithmetic { .. } => codes::evaluation::ARITHMETIC,
            EvalError::InvalidArgument { .. } => codes::evaluation::INVALID_ARGUMENT,
            EvalError::Unsupported { .. } => codes::evaluation::UNSUPPORTED_FEATURE,
            EvalError::Host { .. } => codes::evaluation::HOST_LOOKUP,
            EvalError::UnreducedMultiValue { .. } => codes::evaluation::UNREDUCED_MULTI_VALUE,
            EvalError::NestedCompile(_) => codes::evaluation::NESTED_COMPILE,
        }
    }

    /// Name used in reports, mirroring the compile-time error kinds
    pub fn kind(&self) -> &'static str {
        match self {
            EvalError::TypeCoercion { .. } => "TypeCoercionError",
            EvalError::InvalidRegex { .. } => "InvalidRegexError",
            EvalError::Arithmetic { .. } => "ArithmeticError",
            EvalError::InvalidArgument { .. } => "InvalidArgumentError",
            EvalError::Unsupported { .. } => "UnsupportedFeatureError",
            EvalError::Host { .. } => "HostError",
            EvalError::UnreducedMultiValue { .. } => "MultiValueUnreducedError",
            EvalError::NestedCompile(e) => e.kind().as_str(),
        }
    }
}

pub type EvalResult<T> = Result<T, EvalError>;
