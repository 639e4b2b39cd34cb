pub mod engine;

pub use engine::Evaluator;

use crate::functions::{datetime, EvalContext};
use crate::logging::{log_consumer_debug, log_consumer_error, log_consumer_success, log_consumer_warning};
use crate::types::{AttributeEnvironment, EvalResult, ResolvedValue};
use chrono::{FixedOffset, Offset, Utc};
use el_compiler::config::runtime::EvaluationPreferences;
use el_compiler::logging::codes;
use el_compiler::CompiledExpression;
use std::sync::OnceLock;

static PREFERENCES: OnceLock<EvaluationPreferences> = OnceLock::new();
static DEFAULT_ZONE: OnceLock<FixedOffset> = OnceLock::new();

fn preferences() -> &'static EvaluationPreferences {
    PREFERENCES.get_or_init(EvaluationPreferences::default)
}

/// Install evaluation preferences; only the first call takes effect and it
/// must precede the first evaluation
pub fn init_evaluation_preferences(preferences: EvaluationPreferences) -> Result<(), String> {
    PREFERENCES
        .set(preferences)
        .map_err(|_| "Evaluation preferences already initialized".to_string())
}

/// Zone for date functions called without one; an unparseable setting falls back to UTC
pub fn default_zone() -> FixedOffset {
    *DEFAULT_ZONE.get_or_init(|| {
        let configured = &preferences().default_time_zone;
        datetime::parse_zone(configured).unwrap_or_else(|e| {
            log_consumer_warning(
                "Ignoring invalid default time zone",
                &[("configured", configured.as_str()), ("reason", &e.to_string())],
            );
            Utc.fix()
        })
    })
}

/// Evaluate a compiled expression against one environment
pub fn evaluate(compiled: &CompiledExpression, env: &AttributeEnvironment) -> EvalResult<ResolvedValue> {
    let result = Evaluator::new(env).evaluate(compiled.expression());

    match &result {
        Ok(value) => log_consumer_success(
            codes::success::EVALUATION_COMPLETE,
            "Expression evaluated",
            &[("source", compiled.source()), ("result_type", value.type_name())],
        ),
        Err(e) => log_consumer_error(
            e.error_code(),
            &e.to_string(),
            &[("source", compiled.source()), ("kind", e.kind())],
        ),
    }
    result
}

/// Nested evaluation sharing the caller's environment and zone
pub(crate) fn evaluate_in(compiled: &CompiledExpression, ctx: &EvalContext<'_>) -> EvalResult<ResolvedValue> {
    log_consumer_debug("Evaluating nested expression", &[("source", compiled.source())]);
    Evaluator::from_context(*ctx).evaluate(compiled.expression())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EvalError;
    use assert_matches::assert_matches;
    use el_compiler::compile;

    #[test]
    fn test_evaluate_entry_point() {
        let compiled = compile("${count:plus(1)}").unwrap();
        let env = AttributeEnvironment::from_pairs([("count", "5")]);
        assert_eq!(evaluate(&compiled, &env).unwrap(), ResolvedValue::int(6));

        let env = AttributeEnvironment::from_pairs([("count", "5.5")]);
        assert_eq!(evaluate(&compiled, &env).unwrap(), ResolvedValue::float(6.5));

        let env = AttributeEnvironment::from_pairs([("count", "five")]);
        assert_matches!(evaluate(&compiled, &env), Err(EvalError::TypeCoercion { .. }));
    }

    #[test]
    fn test_nested_evaluation_sees_caller_environment() {
        let env = AttributeEnvironment::from_pairs([("template", "${name:toUpper()}"), ("name", "ada")]);
        let compiled = compile("${template:evaluateELString()}").unwrap();
        assert_eq!(evaluate(&compiled, &env).unwrap(), ResolvedValue::str("ADA"));
    }

    #[test]
    fn test_default_zone_is_stable() {
        assert_eq!(default_zone(), default_zone());
    }
}
