//! Semantic analysis: binds calls to the function catalog and checks chain shape

pub mod error;
pub mod resolver;

pub use error::{ResolveError, ResolveResult};
pub use resolver::{static_type, ResolutionMetrics, Resolver};

use crate::grammar::ast::Expression;
use crate::grammar::cst::CstTemplate;
use crate::logging::codes;
use crate::{log_error, log_success};

/// Resolve a parsed property value into a typed expression
pub fn resolve(cst: &CstTemplate) -> ResolveResult<Expression> {
    let mut resolver = Resolver::new();

    match resolver.resolve_template(cst) {
        Ok(expression) => {
            let metrics = resolver.metrics();
            log_success!(
                codes::success::RESOLUTION_COMPLETE,
                "Expression resolved",
                "expressions" => metrics.expressions,
                "calls" => metrics.calls,
                "multi_value_chains" => metrics.multi_value_chains,
                "result_type" => static_type(&expression)
            );
            Ok(expression)
        }
        Err(error) => {
            log_error!(error.error_code(), &error.to_string(),
                span = error.span(),
                "function" => error.name()
            );
            Err(error)
        }
    }
}
