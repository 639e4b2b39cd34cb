//! Turning a compiled expression into something a code generator can use
//!
//! Either a closure that evaluates the expression or source text in a
//! target dialect. Both compute the same value for every environment.

use crate::execution::evaluate;
use crate::types::{AttributeEnvironment, EvalError, ResolvedValue};
use el_compiler::{render_source, CompiledExpression, Dialect, RenderError};
use std::fmt;

pub type EvaluatorFn = dyn Fn(&AttributeEnvironment) -> Result<ResolvedValue, EvalError> + Send + Sync;

pub enum Artifact {
    Evaluator(Box<EvaluatorFn>),
    Source(String),
}

impl Artifact {
    /// Evaluate a closure artifact; `None` for source text
    pub fn call(&self, env: &AttributeEnvironment) -> Option<Result<ResolvedValue, EvalError>> {
        match self {
            Artifact::Evaluator(f) => Some(f(env)),
            Artifact::Source(_) => None,
        }
    }

    pub fn as_source(&self) -> Option<&str> {
        match self {
            Artifact::Source(text) => Some(text),
            Artifact::Evaluator(_) => None,
        }
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artifact::Evaluator(_) => f.write_str("Artifact::Evaluator(..)"),
            Artifact::Source(text) => f.debug_tuple("Artifact::Source").field(text).finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Evaluator,
    Source(Dialect),
}

pub fn render(compiled: &CompiledExpression, target: RenderTarget) -> Result<Artifact, RenderError> {
    match target {
        RenderTarget::Evaluator => {
            let compiled = compiled.clone();
            Ok(Artifact::Evaluator(Box::new(move |env: &AttributeEnvironment| {
                evaluate(&compiled, env)
            })))
        }
        RenderTarget::Source(dialect) => render_source(compiled, dialect).map(Artifact::Source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use el_compiler::compile;

    #[test]
    fn test_evaluator_artifact_is_reusable_across_threads() {
        let compiled = compile("${filename:toUpper()}").unwrap();
        let artifact = std::sync::Arc::new(render(&compiled, RenderTarget::Evaluator).unwrap());
        assert!(artifact.as_source().is_none());

        let handles: Vec<_> = ["a.txt", "b.txt"]
            .into_iter()
            .map(|name| {
                let artifact = std::sync::Arc::clone(&artifact);
                std::thread::spawn(move || {
                    let env = AttributeEnvironment::from_pairs([("filename", name)]);
                    artifact.call(&env).unwrap().unwrap()
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec![ResolvedValue::str("A.TXT"), ResolvedValue::str("B.TXT")]);
    }

    #[test]
    fn test_source_artifacts() {
        let compiled = compile("${filename:toUpper()}").unwrap();
        let canonical = render(&compiled, RenderTarget::Source(Dialect::Canonical)).unwrap();
        assert_eq!(canonical.as_source(), Some("${filename:toUpper()}"));
        assert!(canonical.call(&AttributeEnvironment::new()).is_none());

        let python = render(&compiled, RenderTarget::Source(Dialect::Python)).unwrap();
        assert!(python.as_source().unwrap().contains("upper()"));
    }
}
