//! Compilation pipeline: source text -> tokens -> concrete syntax tree -> expression
//!
//! Compilation is a pure function of the source string. Each stage's error is
//! wrapped into `CompileError`; nothing is partially compiled.

mod cache;
mod compiled;
mod error;
mod info;

pub use cache::{CacheStats, CompilationCache};
pub use compiled::CompiledExpression;
pub use error::{CompileError, CompileErrorKind};
pub use info::{get_pipeline_info, PipelineInfo};

use crate::config::runtime::CompilerPreferences;
use crate::logging::codes;
use crate::semantic_analysis::static_type;
use crate::{lexical, log_performance, log_success, semantic_analysis, syntax};
use std::sync::OnceLock;
use std::time::Instant;

static PREFERENCES: OnceLock<CompilerPreferences> = OnceLock::new();
static SHARED_CACHE: OnceLock<CompilationCache> = OnceLock::new();

fn preferences() -> &'static CompilerPreferences {
    PREFERENCES.get_or_init(CompilerPreferences::default)
}

/// Install compiler preferences; only the first call takes effect
pub fn init_compiler_preferences(preferences: CompilerPreferences) -> Result<(), String> {
    PREFERENCES
        .set(preferences)
        .map_err(|_| "Compiler preferences already initialized".to_string())
}

/// Compile one property value
pub fn compile(source: &str) -> Result<CompiledExpression, CompileError> {
    let start = Instant::now();

    let tokens = lexical::tokenize(source)?;
    let lexed = start.elapsed();

    let cst = syntax::parse_tokens(tokens)?;
    let parsed = start.elapsed();

    let expression = semantic_analysis::resolve(&cst)?;
    let total = start.elapsed();

    let result_type = static_type(&expression);

    if preferences().log_stage_timings {
        log_performance!(
            codes::success::COMPILATION_COMPLETE,
            "Compilation stage timings",
            duration = total,
            "lexical_us" => lexed.as_micros(),
            "syntax_us" => (parsed - lexed).as_micros(),
            "resolution_us" => (total - parsed).as_micros()
        );
    } else {
        log_success!(
            codes::success::COMPILATION_COMPLETE,
            "Expression compiled",
            "source_bytes" => source.len(),
            "result_type" => result_type
        );
    }

    Ok(CompiledExpression::new(source, expression, result_type))
}

/// Compile through the process-wide cache when caching is enabled
pub fn compile_cached(source: &str) -> Result<CompiledExpression, CompileError> {
    if preferences().enable_cache {
        shared_cache().get_or_compile(source)
    } else {
        compile(source)
    }
}

pub fn shared_cache() -> &'static CompilationCache {
    SHARED_CACHE.get_or_init(CompilationCache::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ValueType;
    use crate::grammar::ast::Expression;
    use assert_matches::assert_matches;

    #[test]
    fn test_compile_reports_result_type() {
        let compiled = compile("${filename:length()}").unwrap();
        assert_eq!(compiled.result_type(), ValueType::Number);
        assert_eq!(compiled.source(), "${filename:length()}");
        assert!(!compiled.is_plain_text());
        assert!(compile("just text").unwrap().is_plain_text());
    }

    #[test]
    fn test_error_kinds_and_positions() {
        let err = compile("${filename:toUpper(}").unwrap_err();
        assert_eq!(err.kind(), CompileErrorKind::Syntax);
        assert_eq!(err.position().offset, 19);

        let err = compile("${'unterminated}").unwrap_err();
        assert_matches!(err, CompileError::Lexical(_));
        assert_eq!(err.kind(), CompileErrorKind::Syntax);

        let err = compile("${x:frob()}").unwrap_err();
        assert_eq!(err.kind(), CompileErrorKind::UnknownFunction);
        assert_eq!(err.function_name(), Some("frob"));
        assert_eq!(err.position().offset, 4);

        let err = compile("${allAttributes('a','b')}").unwrap_err();
        assert_eq!(err.kind(), CompileErrorKind::MultiValueUnreduced);

        assert!(compile("${x:jsonPath('$.a')}").unwrap_err().is_unsupported());
    }

    #[test]
    fn test_report_has_caret() {
        let source = "${x:frob()}";
        let report = compile(source).unwrap_err().report(source);
        assert!(report.contains("UnknownFunctionError"));
        assert!(report.contains("1 | ${x:frob()}"));
        assert!(report.contains("    ^"));
    }

    #[test]
    fn test_compile_is_idempotent() {
        let source = "pre_$${attr}_${name:substringAfter('_'):toLower()}";
        assert_eq!(compile(source).unwrap(), compile(source).unwrap());
        assert_matches!(compile(source).unwrap().expression(), Expression::Template(_));
    }

    #[test]
    fn test_compile_cached_shares_result() {
        let a = compile_cached("${shared:trim()}").unwrap();
        let b = compile_cached("${shared:trim()}").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_pipeline_info() {
        let info = get_pipeline_info();
        assert_eq!(info.stages.len(), 3);
        assert!(info.unsupported_functions > 0);
        assert!(info.report().contains("Catalog Functions"));
    }
}
