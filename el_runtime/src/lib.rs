//! # el_runtime
//!
//! Evaluation side of the expression language: runtime values, the
//! per-function semantics, the evaluator, render artifacts and sample replay.

pub mod execution;
pub mod functions;
pub mod logging;
pub mod render;
pub mod replay;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;

// Convenience re-exports
pub use execution::{evaluate, Evaluator};
pub use render::{render, Artifact, RenderTarget};
pub use types::{AttributeEnvironment, EvalError, EvalResult, Number, ResolvedValue};

pub mod prelude {
    pub use crate::execution::{evaluate, init_evaluation_preferences, Evaluator};
    pub use crate::render::{render, Artifact, RenderTarget};
    pub use crate::replay::{replay_file, replay_samples, ReplayError, ReplayReport, Sample};
    pub use crate::types::{AttributeEnvironment, EvalError, Number, ResolvedValue};

    pub use el_compiler::{compile, CompileError, CompiledExpression, Dialect, Expression};
}
