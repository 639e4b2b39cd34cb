//! Log events emitted by the compiler stages, batch runner and evaluator

use super::codes::Code;
use crate::utils::Span;
use std::collections::HashMap;
use std::time::SystemTime;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
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
}

/// Generic codes for events logged without a registered code
const GENERIC_WARNING: Code = Code::new("W000");
const GENERIC_INFO: Code = Code::new("I000");
const GENERIC_DEBUG: Code = Code::new("D000");

/// Core log event structure
#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    pub span: Option<Span>,
    pub context: HashMap<String, String>,
}

impl LogEvent {
    fn build(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            level,
            code,
            message: truncate_message(message),
            span: None,
            context: HashMap::new(),
        }
    }

    pub fn error(error_code: Code, message: &str) -> Self {
        Self::build(LogLevel::Error, error_code, message)
    }

    pub fn warning(message: &str) -> Self {
        Self::build(LogLevel::Warning, GENERIC_WARNING, message)
    }

    pub fn warning_with_code(warning_code: Code, message: &str) -> Self {
        Self::build(LogLevel::Warning, warning_code, message)
    }

    pub fn info(message: &str) -> Self {
        Self::build(LogLevel::Info, GENERIC_INFO, message)
    }

    pub fn info_with_code(info_code: Code, message: &str) -> Self {
        Self::build(LogLevel::Info, info_code, message)
    }

    /// Info-level event carrying a success code
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::build(LogLevel::Info, success_code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::build(LogLevel::Debug, GENERIC_DEBUG, message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    /// Attach the origin of the expression (file and line, or a sample id)
    pub fn with_origin(self, origin: &str) -> Self {
        self.with_context("origin", origin)
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    pub fn requires_halt(&self) -> bool {
        super::codes::requires_halt(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        super::codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        super::codes::get_category(self.code.as_str())
    }

    pub fn description(&self) -> &'static str {
        super::codes::get_description(self.code.as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        super::codes::get_action(self.code.as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        super::codes::is_recoverable(self.code.as_str())
    }

    /// One-line form: `[LEVEL] CODE - message at line:col`
    pub fn format(&self) -> String {
        let span_str = self
            .span
            .as_ref()
            .map(|s| format!(" at {}:{}", s.start().line, s.start().column))
            .unwrap_or_default();

        format!(
            "[{}] {} - {}{}",
            self.level.as_str(),
            self.code.as_str(),
            self.message,
            span_str
        )
    }

    pub fn format_detailed(&self) -> String {
        let mut output = self.format();

        output.push_str(&format!("\n  Category: {}", self.category()));
        output.push_str(&format!("\n  Severity: {}", self.severity()));

        if self.is_error() {
            output.push_str(&format!("\n  Recoverable: {}", self.is_recoverable()));
            output.push_str(&format!("\n  Requires halt: {}", self.requires_halt()));
        }

        let description = self.description();
        if description != "Unknown error" {
            output.push_str(&format!("\n  Description: {}", description));
        }

        let action = self.recommended_action();
        if action != "No specific action available" {
            output.push_str(&format!("\n  Recommended action: {}", action));
        }

        if !self.context.is_empty() {
            let mut keys: Vec<_> = self.context.keys().collect();
            keys.sort();
            output.push_str("\n  Context:");
            for key in keys {
                output.push_str(&format!("\n    {}: {}", key, self.context[key]));
            }
        }

        output
    }

    /// Format as JSON for structured logging
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let timestamp = self
            .timestamp
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let mut json = serde_json::json!({
            "timestamp_ms": timestamp,
            "level": self.level.as_str(),
            "code": self.code.as_str(),
            "message": self.message,
            "category": self.category(),
            "severity": self.severity(),
        });

        if self.is_error() {
            json["error_metadata"] = serde_json::json!({
                "recoverable": self.is_recoverable(),
                "requires_halt": self.requires_halt(),
                "description": self.description(),
                "recommended_action": self.recommended_action(),
            });
        }

        if let Some(span) = &self.span {
            json["span"] = serde_json::json!({
                "start_offset": span.start().offset,
                "end_offset": span.end().offset,
                "line": span.start().line,
                "column": span.start().column,
            });
        }

        if !self.context.is_empty() {
            json["context"] = serde_json::Value::Object(
                self.context
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect(),
            );
        }

        serde_json::to_string(&json)
    }
}

fn truncate_message(message: &str) -> String {
    let limit = crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
    if message.chars().count() <= limit {
        return message.to_string();
    }
    let mut truncated: String = message.chars().take(limit).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::{Position, Span};

    #[test]
    fn test_error_event_creation() {
        let event = LogEvent::error(codes::resolution::UNKNOWN_FUNCTION, "Unknown function 'frob'");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E060");
        assert_eq!(event.category(), "Resolution");
    }

    #[test]
    fn test_event_with_context() {
        let event = LogEvent::error(codes::resolution::ARITY_MISMATCH, "Wrong arity")
            .with_context("function", "substring")
            .with_origin("rules.el:3");

        assert_eq!(event.context.get("function"), Some(&"substring".to_string()));
        assert_eq!(event.context.get("origin"), Some(&"rules.el:3".to_string()));
    }

    #[test]
    fn test_event_formatting_with_span() {
        let span = Span::new(Position::new(4, 1, 5), Position::new(9, 1, 10));
        let event =
            LogEvent::error(codes::lexical::INVALID_CHARACTER, "Invalid character '@'").with_span(span);
        let formatted = event.format();

        assert!(formatted.starts_with("[ERROR] E020"));
        assert!(formatted.ends_with("at 1:5"));
    }

    #[test]
    fn test_generic_codes() {
        assert_eq!(LogEvent::warning("careful").code.as_str(), "W000");
        assert_eq!(LogEvent::debug("trace").code.as_str(), "D000");
        assert!(LogEvent::success(codes::success::COMPILATION_COMPLETE, "ok").is_info());
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::error(codes::evaluation::ARITHMETIC, "Division by zero")
            .with_context("function", "divide");

        let json = event.format_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["code"], "E082");
        assert_eq!(value["context"]["function"], "divide");
        assert_eq!(value["error_metadata"]["recoverable"], true);
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let limit = crate::config::compile_time::logging::MAX_LOG_MESSAGE_LENGTH;
        let long = "x".repeat(limit + 10);
        let event = LogEvent::info(&long);
        assert_eq!(event.message.chars().count(), limit + 3);
    }
}
