//! Runtime logging
//!
//! Forwards runtime events to the compiler's logging service so compile and
//! evaluation events share one sink and one error collector. With the
//! `logging` feature every event is also emitted through the `log` facade.

use el_compiler::logging::{self as compiler_logging, Code};

/// Log an evaluation error with structured context
pub fn log_consumer_error(code: Code, message: &str, context: &[(&str, &str)]) {
    #[cfg(feature = "logging")]
    log::error!("[{}] {}{}", code.as_str(), message, facade_suffix(context));

    compiler_logging::log_error_with_context(code, message, None, context.to_vec());
}

pub fn log_consumer_warning(message: &str, context: &[(&str, &str)]) {
    #[cfg(feature = "logging")]
    log::warn!("{}{}", message, facade_suffix(context));

    compiler_logging::log_warning_with_context(None, message, context.to_vec());
}

pub fn log_consumer_success(code: Code, message: &str, context: &[(&str, &str)]) {
    #[cfg(feature = "logging")]
    log::info!("[{}] {}{}", code.as_str(), message, facade_suffix(context));

    compiler_logging::log_success_with_context(code, message, context.to_vec());
}

pub fn log_consumer_info(message: &str, context: &[(&str, &str)]) {
    #[cfg(feature = "logging")]
    log::info!("{}{}", message, facade_suffix(context));

    compiler_logging::log_info_with_context(message, context.to_vec());
}

pub fn log_consumer_debug(message: &str, context: &[(&str, &str)]) {
    #[cfg(feature = "logging")]
    log::debug!("{}{}", message, facade_suffix(context));

    compiler_logging::log_debug_with_context(message, context.to_vec());
}

/// Attach `origin` (e.g. a sample id) to every event logged while `f` runs
pub fn with_consumer_context<F, R>(origin: &str, index: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    compiler_logging::with_source_context(origin, index, f)
}

#[cfg(feature = "logging")]
fn facade_suffix(context: &[(&str, &str)]) -> String {
    if context.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = context.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!(" ({})", pairs.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use el_compiler::logging::codes;

    #[test]
    fn test_bridge_is_silent_without_a_global_logger() {
        // Must not panic whether or not another test initialised logging
        log_consumer_error(codes::evaluation::TYPE_COERCION, "bad number", &[("value", "x")]);
        log_consumer_warning("careful", &[]);
        log_consumer_debug("detail", &[("k", "v")]);
        let value = with_consumer_context("sample-1", 0, || 41 + 1);
        assert_eq!(value, 42);
    }
}
