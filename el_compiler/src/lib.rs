// Internal modules
pub mod batch;
pub mod catalog;
pub mod config;
pub mod date_pattern;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod render;
pub mod semantic_analysis;
pub mod syntax;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use catalog::{Function, FunctionSignature, ValueType};
pub use grammar::ast::{Expression, FunctionCall, Literal, Quantifier};
pub use pipeline::{
    compile, compile_cached, CompilationCache, CompileError, CompileErrorKind, CompiledExpression,
};
pub use render::{render_expression, render_source, Dialect, RenderError};
