//! Per-function evaluation, dispatched on the catalog's function enums
//!
//! Every function receives its subject (already evaluated, `Null` for
//! standalone calls) and fully evaluated arguments.

pub mod boolean;
pub mod coercion;
pub mod datetime;
pub mod encoding;
pub mod multi;
pub mod numeric;
pub mod standalone;
pub mod string;

use crate::types::{AttributeEnvironment, EvalError, EvalResult, ResolvedValue};
use chrono::FixedOffset;
use el_compiler::catalog::Function;

/// What a function may consult besides its operands
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub env: &'a AttributeEnvironment,
    /// Zone for date functions called without one
    pub zone: FixedOffset,
}

impl<'a> EvalContext<'a> {
    pub fn new(env: &'a AttributeEnvironment, zone: FixedOffset) -> Self {
        Self { env, zone }
    }
}

/// Evaluate one resolved call
pub fn call(
    function: Function,
    subject: &ResolvedValue,
    args: &[ResolvedValue],
    ctx: &EvalContext<'_>,
) -> EvalResult<ResolvedValue> {
    match function {
        Function::String(f) => string::call(f, subject, args, ctx),
        Function::Boolean(f) => boolean::call(f, subject, args),
        Function::Numeric(f) => numeric::call(f, subject, args),
        Function::DateTime(f) => datetime::call(f, subject, args, ctx),
        Function::Encoding(f) => encoding::call(f, subject),
        Function::Multi(f) => multi::call(f, subject, args, ctx),
        Function::Standalone(f) => standalone::call(f, args),
        Function::Json(_) | Function::Hash(_) | Function::State(_) => Err(EvalError::Unsupported {
            name: function.name().to_string(),
        }),
    }
}

/// Argument `index`, or `Null` when omitted
pub(crate) fn arg(args: &[ResolvedValue], index: usize) -> &ResolvedValue {
    args.get(index).unwrap_or(&ResolvedValue::Null)
}

/// Argument `index` as a string, if supplied
pub(crate) fn opt_string(args: &[ResolvedValue], index: usize) -> Option<String> {
    args.get(index).map(coercion::to_string)
}

pub(crate) fn compile_regex(pattern: &str) -> EvalResult<regex::Regex> {
    regex::Regex::new(pattern).map_err(|e| EvalError::InvalidRegex {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Regex that must match the whole input
pub(crate) fn compile_full_regex(pattern: &str) -> EvalResult<regex::Regex> {
    regex::Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| EvalError::InvalidRegex {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}
