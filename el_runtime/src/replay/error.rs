// replay/error.rs

use el_compiler::logging::{codes, Code};

/// Failures loading a sample corpus; per-sample failures are outcomes, not errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReplayError {
    #[error("cannot read corpus {path}: {reason}")]
    CorpusUnreadable { path: String, reason: String },

    #[error("invalid corpus {path}: {reason}")]
    CorpusInvalid { path: String, reason: String },

    #[error("duplicate sample id '{id}' in {path}")]
    DuplicateSampleId { path: String, id: String },
}

impl ReplayError {
    pub fn error_code(&self) -> Code {
        match self {
            ReplayError::CorpusUnreadable { .. } => codes::replay::CORPUS_UNREADABLE,
            ReplayError::CorpusInvalid { .. } | ReplayError::DuplicateSampleId { .. } => {
                codes::replay::CORPUS_INVALID
            }
        }
    }
}
