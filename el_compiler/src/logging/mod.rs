//! Global logging for the EL compiler and runtime
//!
//! Thread-safe global logger, a per-thread source context for batch runs,
//! cargo-style error reporting, and the `log_*!` macros.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, ProcessingSummary, SourceContext};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

thread_local! {
    static SOURCE_CONTEXT: RefCell<Option<SourceContext>> = const { RefCell::new(None) };
}

/// Initialize global logging from the runtime preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(service::create_configured_service());
    install(logging_service.clone())?;

    for code in [
        codes::system::INTERNAL_ERROR,
        codes::lexical::INVALID_CHARACTER,
        codes::syntax::UNEXPECTED_TOKEN,
        codes::resolution::UNKNOWN_FUNCTION,
    ] {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!("Missing metadata for code: {}", code));
        }
    }

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with a custom service (tests, embedding applications)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    install(service)
}

fn install(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized")?;

    GLOBAL_ERROR_COLLECTOR
        .set(Arc::new(ErrorCollector::new()))
        .map_err(|_| "Global error collector already initialized")?;

    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some() && GLOBAL_ERROR_COLLECTOR.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR
        .get()
        .map(|collector| collector.as_ref())
}

pub fn set_source_context(origin: impl Into<String>, source_id: usize) {
    let context = SourceContext::new(origin, source_id);

    if let Some(collector) = try_get_global_error_collector() {
        collector.record_source_context(context.clone());
    }

    SOURCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(context);
    });
}

pub fn clear_source_context() {
    SOURCE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with the given source attached to every event logged on this thread
pub fn with_source_context<F, R>(origin: impl Into<String>, source_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_source_context(origin, source_id);
    let result = f();
    clear_source_context();
    result
}

pub fn get_current_source_context() -> Option<SourceContext> {
    SOURCE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

fn decorate(mut event: LogEvent, context: Vec<(&str, &str)>) -> LogEvent {
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    if config::include_source_context() {
        if let Some(source) = get_current_source_context() {
            event = event
                .with_origin(&source.origin)
                .with_context("source_id", &source.source_id.to_string());
        }
    }

    event
}

/// Backing function for `log_error!`; errors are also collected per source
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let mut event = decorate(LogEvent::error(code, message), context);
    if let Some(s) = span {
        event = event.with_span(s);
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event.clone());
    }

    if let (Some(source), Some(collector)) =
        (get_current_source_context(), try_get_global_error_collector())
    {
        collector.record_event(&source.origin, event);
    }
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(decorate(LogEvent::success(code, message), context));
    }
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(decorate(LogEvent::info(message), context));
    }
}

/// Backing function for `log_warning!`; warnings are collected like errors
pub fn log_warning_with_context(code: Option<Code>, message: &str, context: Vec<(&str, &str)>) {
    let base = match code {
        Some(code) => LogEvent::warning_with_code(code, message),
        None => LogEvent::warning(message),
    };
    let event = decorate(base, context);

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event.clone());
    }

    if let (Some(source), Some(collector)) =
        (get_current_source_context(), try_get_global_error_collector())
    {
        collector.record_event(&source.origin, event);
    }
}

pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(decorate(LogEvent::debug(message), context));
    }
}

pub fn get_processing_summary() -> ProcessingSummary {
    try_get_global_error_collector()
        .map(|collector| collector.get_summary())
        .unwrap_or_default()
}

pub fn get_source_errors(origin: &str) -> Vec<LogEvent> {
    try_get_global_error_collector()
        .map(|collector| collector.get_source_errors(origin))
        .unwrap_or_default()
}

pub fn print_cargo_style_summary() {
    if let Some(collector) = try_get_global_error_collector() {
        println!("{}", collector::format_cargo_style_errors(collector));
    } else {
        println!("No error collector available for summary");
    }
}

pub fn clear_error_collection() {
    if let Some(collector) = try_get_global_error_collector() {
        collector.clear();
    }
}

pub fn get_system_diagnostics() -> String {
    let mut diagnostics = String::new();

    diagnostics.push_str("=== Logging System Diagnostics ===\n");
    diagnostics.push_str(&format!("Initialized: {}\n", is_initialized()));

    if let Some(collector) = try_get_global_error_collector() {
        let (current, max, fraction) = collector.get_capacity_info();
        diagnostics.push_str(&format!(
            "Capacity: {}/{} ({:.1}%)\n",
            current,
            max,
            fraction * 100.0
        ));

        let summary = collector.get_summary();
        diagnostics.push_str(&format!("Sources processed: {}\n", summary.total_sources));
        diagnostics.push_str(&format!("Total errors: {}\n", summary.total_errors));
        diagnostics.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    diagnostics.push('\n');
    diagnostics.push_str(&config::get_config_summary());

    diagnostics
}

/// Error logging that falls back to stderr before initialization
pub fn safe_log_error(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(LogEvent::error(code, message));
    } else {
        eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_context_management() {
        assert!(get_current_source_context().is_none());

        set_source_context("rules.el", 1);
        let context = get_current_source_context().unwrap();
        assert_eq!(context.origin, "rules.el");
        assert_eq!(context.source_id, 1);

        clear_source_context();
        assert!(get_current_source_context().is_none());
    }

    #[test]
    fn test_with_source_context() {
        let result = with_source_context("corpus.json", 2, || {
            assert_eq!(get_current_source_context().unwrap().origin, "corpus.json");
            42
        });

        assert_eq!(result, 42);
        assert!(get_current_source_context().is_none());
    }

    #[test]
    fn test_safe_logging_without_init() {
        safe_log_error(codes::system::INTERNAL_ERROR, "fallback path");
    }

    #[test]
    fn test_diagnostics() {
        let diagnostics = get_system_diagnostics();
        assert!(diagnostics.contains("Logging System Diagnostics"));
        assert!(diagnostics.contains("Logging Configuration"));
    }
}
