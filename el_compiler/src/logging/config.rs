//! Logging configuration
//!
//! Buffer limits are compile-time constants from the build profile. Output
//! format and verbosity are runtime preferences.

use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

type EventsLogLevel = crate::logging::events::LogLevel;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install runtime preferences; only the first call wins
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized")?;

    Ok(())
}

fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

pub fn get_min_log_level() -> EventsLogLevel {
    get_runtime_preferences().min_log_level.to_events_log_level()
}

pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    get_runtime_preferences().enable_console_logging
}

pub fn use_cargo_style_output() -> bool {
    get_runtime_preferences().enable_cargo_style_output
}

/// Whether events get the origin (file, line or sample id) attached
pub fn include_source_context() -> bool {
    get_runtime_preferences().include_source_context
}

pub fn get_log_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_log_events_per_source() -> usize {
    MAX_LOG_EVENTS_PER_SOURCE
}

pub fn get_max_error_collection() -> usize {
    MAX_ERROR_COLLECTION
}

/// Sanity-check the compile-time limits
pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE > 100_000 {
        return Err(format!("Log buffer size too large: {}", LOG_BUFFER_SIZE));
    }

    if LOG_BUFFER_SIZE < 100 {
        return Err(format!("Log buffer size too small: {}", LOG_BUFFER_SIZE));
    }

    if MAX_LOG_EVENTS_PER_SOURCE > LOG_BUFFER_SIZE {
        return Err("Max log events per source exceeds total buffer size".to_string());
    }

    if MAX_ERROR_COLLECTION == 0 {
        return Err("Error collection limit must be at least 1".to_string());
    }

    Ok(())
}

/// Human-readable configuration dump for `elc --info`
pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();

    format!(
        "Logging Configuration:\n\
         === Limits (compile-time) ===\n\
         - Log buffer size: {}\n\
         - Max events per source: {}\n\
         - Max message length: {}\n\
         - Max collected errors: {}\n\
         === Preferences (runtime) ===\n\
         - Min log level: {:?}\n\
         - Structured logging: {}\n\
         - Console logging: {}\n\
         - Cargo-style output: {}\n\
         - Include source context: {}",
        LOG_BUFFER_SIZE,
        MAX_LOG_EVENTS_PER_SOURCE,
        MAX_LOG_MESSAGE_LENGTH,
        MAX_ERROR_COLLECTION,
        preferences.min_log_level,
        preferences.use_structured_logging,
        preferences.enable_console_logging,
        preferences.enable_cargo_style_output,
        preferences.include_source_context,
    )
}
