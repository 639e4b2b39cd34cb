// RUNTIME PREFERENCES (User Experience)

use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the configured logger
    pub min_log_level: LogLevel,

    /// Whether to enable cargo-style error reporting
    pub enable_cargo_style_output: bool,

    /// Whether to attach the source context (file, line) to log events
    pub include_source_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var(env_vars::LOGGING_USE_STRUCTURED)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var(env_vars::LOGGING_ENABLE_CONSOLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
            enable_cargo_style_output: env::var(env_vars::LOGGING_CARGO_STYLE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_source_context: env::var(env_vars::LOGGING_INCLUDE_SOURCE_CONTEXT)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerPreferences {
    /// Whether to log per-stage timings for every compiled expression
    pub log_stage_timings: bool,

    /// Whether compiled expressions are deduplicated through the compilation cache
    pub enable_cache: bool,
}

impl Default for CompilerPreferences {
    fn default() -> Self {
        Self {
            log_stage_timings: env::var(env_vars::COMPILER_LOG_STAGE_TIMINGS)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_cache: env::var(env_vars::COMPILER_ENABLE_CACHE)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationPreferences {
    /// Time zone used by date functions when no zone argument is given
    pub default_time_zone: String,
}

impl Default for EvaluationPreferences {
    fn default() -> Self {
        Self {
            default_time_zone: env::var(env_vars::EVAL_DEFAULT_TIME_ZONE)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "UTC".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(value: &str) -> Option<LogLevel> {
    match value.trim().to_ascii_lowercase().as_str() {
        "error" => Some(LogLevel::Error),
        "warn" | "warning" => Some(LogLevel::Warning),
        "info" => Some(LogLevel::Info),
        "debug" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// All runtime preferences in one place
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub logging: LoggingPreferences,
    pub compiler: CompilerPreferences,
    pub evaluation: EvaluationPreferences,
}

impl RuntimeConfig {
    /// Parse a TOML preferences document; missing tables fall back to the environment
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Invalid runtime configuration: {}", e))
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "EL_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "EL_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "EL_LOGGING_MIN_LEVEL";
    pub const LOGGING_CARGO_STYLE: &str = "EL_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_SOURCE_CONTEXT: &str = "EL_LOGGING_INCLUDE_SOURCE_CONTEXT";

    // Compiler
    pub const COMPILER_LOG_STAGE_TIMINGS: &str = "EL_COMPILER_LOG_STAGE_TIMINGS";
    pub const COMPILER_ENABLE_CACHE: &str = "EL_COMPILER_ENABLE_CACHE";

    // Evaluation
    pub const EVAL_DEFAULT_TIME_ZONE: &str = "EL_EVAL_DEFAULT_TIME_ZONE";
}
