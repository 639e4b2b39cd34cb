//! Diagnostic collector for batch compilation and sample replay
//!
//! Events are grouped by source (an `.el` file, a corpus file, or an inline
//! expression) so they can be printed cargo-style after a parallel run.

use super::events::LogEvent;
use crate::config::compile_time::logging::*;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Source currently being processed on this thread
#[derive(Debug, Clone)]
pub struct SourceContext {
    /// Display name of the source, usually a file path
    pub origin: String,
    pub source_id: usize,
    pub start_time: Instant,
}

impl SourceContext {
    pub fn new(origin: impl Into<String>, source_id: usize) -> Self {
        Self {
            origin: origin.into(),
            source_id,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingSummary {
    pub total_sources: usize,
    pub clean_sources: usize,
    pub failed_sources: usize,
    pub sources_with_warnings: usize,
    pub total_errors: usize,
    pub total_warnings: usize,
    pub total_processing_time: Duration,
    pub average_source_time: Duration,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.total_warnings > 0
    }
}

/// Thread-safe event store keyed by source origin
pub struct ErrorCollector {
    source_events: Mutex<BTreeMap<String, Vec<LogEvent>>>,
    source_contexts: Mutex<BTreeMap<String, SourceContext>>,
    processing_start: Instant,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self {
            source_events: Mutex::new(BTreeMap::new()),
            source_contexts: Mutex::new(BTreeMap::new()),
            processing_start: Instant::now(),
        }
    }

    /// Record an event; past the per-source limit a single overflow warning is kept
    pub fn record_event(&self, origin: &str, event: LogEvent) {
        let mut events = lock(&self.source_events);
        let collected: usize = events.values().map(Vec::len).sum();
        if collected >= MAX_ERROR_COLLECTION && event.is_error() {
            return;
        }

        let source_events = events.entry(origin.to_string()).or_default();

        if source_events.len() < MAX_LOG_EVENTS_PER_SOURCE {
            source_events.push(event);
        } else if source_events.len() == MAX_LOG_EVENTS_PER_SOURCE {
            source_events.push(LogEvent::warning(&format!(
                "Too many events for source (limit: {})",
                MAX_LOG_EVENTS_PER_SOURCE
            )));
        }
    }

    pub fn record_source_context(&self, context: SourceContext) {
        lock(&self.source_contexts).insert(context.origin.clone(), context);
    }

    pub fn get_source_events(&self, origin: &str) -> Vec<LogEvent> {
        lock(&self.source_events)
            .get(origin)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get_source_errors(&self, origin: &str) -> Vec<LogEvent> {
        lock(&self.source_events)
            .get(origin)
            .map(|events| events.iter().filter(|e| e.is_error()).cloned().collect())
            .unwrap_or_default()
    }

    pub fn source_has_errors(&self, origin: &str) -> bool {
        lock(&self.source_events)
            .get(origin)
            .is_some_and(|events| events.iter().any(|e| e.is_error()))
    }

    pub fn get_all_source_events(&self) -> BTreeMap<String, Vec<LogEvent>> {
        lock(&self.source_events).clone()
    }

    pub fn get_summary(&self) -> ProcessingSummary {
        let events = lock(&self.source_events);
        let contexts = lock(&self.source_contexts);

        let mut summary = ProcessingSummary {
            total_sources: events.len(),
            total_processing_time: self.processing_start.elapsed(),
            ..ProcessingSummary::default()
        };

        let mut total_time = Duration::ZERO;
        let mut timed = 0u32;

        for (origin, source_events) in events.iter() {
            let errors = source_events.iter().filter(|e| e.is_error()).count();
            let warnings = source_events.iter().filter(|e| e.is_warning()).count();

            if errors > 0 {
                summary.failed_sources += 1;
            } else if warnings > 0 {
                summary.sources_with_warnings += 1;
            } else {
                summary.clean_sources += 1;
            }
            summary.total_errors += errors;
            summary.total_warnings += warnings;

            if let Some(context) = contexts.get(origin) {
                total_time += context.elapsed();
                timed += 1;
            }
        }

        if timed > 0 {
            summary.average_source_time = total_time / timed;
        }

        summary
    }

    pub fn get_critical_errors(&self) -> Vec<(String, LogEvent)> {
        lock(&self.source_events)
            .iter()
            .flat_map(|(origin, events)| {
                events
                    .iter()
                    .filter(|e| e.is_error() && e.requires_halt())
                    .map(move |e| (origin.clone(), e.clone()))
            })
            .collect()
    }

    pub fn total_event_count(&self) -> usize {
        lock(&self.source_events).values().map(Vec::len).sum()
    }

    /// (current, max, fraction) against the global buffer size
    pub fn get_capacity_info(&self) -> (usize, usize, f64) {
        let current = self.total_event_count();
        let max = LOG_BUFFER_SIZE;
        let fraction = if max > 0 {
            current as f64 / max as f64
        } else {
            0.0
        };
        (current, max, fraction)
    }

    pub fn clear(&self) {
        lock(&self.source_events).clear();
        lock(&self.source_contexts).clear();
    }
}

impl Default for ErrorCollector {
    fn default() -> Self {
        Self::new()
    }
}

fn location(origin: &str, event: &LogEvent) -> String {
    let line = event.context.get("line").cloned();
    match (&event.span, line) {
        (Some(span), Some(line)) => format!(" --> {}:{}:{}", origin, line, span.start().column),
        (Some(span), None) => format!(
            " --> {}:{}:{}",
            origin,
            span.start().line,
            span.start().column
        ),
        (None, Some(line)) => format!(" --> {}:{}", origin, line),
        (None, None) => String::new(),
    }
}

fn push_context(output: &mut String, event: &LogEvent) {
    let mut keys: Vec<_> = event
        .context
        .keys()
        .filter(|k| !matches!(k.as_str(), "origin" | "source_id" | "line"))
        .collect();
    keys.sort();
    for key in keys {
        output.push_str(&format!("  = {}: {}\n", key, event.context[key]));
    }
}

/// Cargo-style report of every collected error and warning
pub fn format_cargo_style_errors(collector: &ErrorCollector) -> String {
    let mut output = String::new();

    for (origin, events) in &collector.get_all_source_events() {
        let errors: Vec<_> = events.iter().filter(|e| e.is_error()).collect();
        let warnings: Vec<_> = events.iter().filter(|e| e.is_warning()).collect();

        if errors.is_empty() && warnings.is_empty() {
            continue;
        }

        output.push_str(&format!("Checking {}...\n", origin));

        for event in errors {
            output.push_str(&format!(
                "error[{}]: {}{}\n",
                event.code.as_str(),
                event.message,
                location(origin, event)
            ));
            output.push_str(&format!(
                "  = severity: {}, category: {}\n",
                event.severity(),
                event.category()
            ));
            push_context(&mut output, event);

            let action = event.recommended_action();
            if action != "No specific action available" {
                output.push_str(&format!("  = help: {}\n", action));
            }
        }

        for event in warnings {
            output.push_str(&format!(
                "warning[{}]: {}{}\n",
                event.code.as_str(),
                event.message,
                location(origin, event)
            ));
            push_context(&mut output, event);
        }

        output.push('\n');
    }

    let summary = collector.get_summary();
    if summary.total_errors > 0 {
        output.push_str(&format!("\nTotal errors: {}\n", summary.total_errors));
    }
    if summary.total_warnings > 0 {
        output.push_str(&format!("Total warnings: {}\n", summary.total_warnings));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::{Position, Span};

    #[test]
    fn test_record_and_query() {
        let collector = ErrorCollector::new();
        collector.record_event(
            "rules.el",
            LogEvent::error(codes::resolution::UNKNOWN_FUNCTION, "Unknown function 'frob'"),
        );

        assert_eq!(collector.get_source_events("rules.el").len(), 1);
        assert!(collector.source_has_errors("rules.el"));
        assert!(!collector.source_has_errors("other.el"));
    }

    #[test]
    fn test_processing_summary() {
        let collector = ErrorCollector::new();
        collector.record_event(
            "a.el",
            LogEvent::error(codes::lexical::INVALID_CHARACTER, "bad char"),
        );
        collector.record_event("b.el", LogEvent::warning("degraded"));
        collector.record_event("c.el", LogEvent::info("ok"));

        let summary = collector.get_summary();
        assert_eq!(summary.total_sources, 3);
        assert_eq!(summary.failed_sources, 1);
        assert_eq!(summary.sources_with_warnings, 1);
        assert_eq!(summary.clean_sources, 1);
        assert!(summary.has_errors());
    }

    #[test]
    fn test_per_source_limit() {
        let collector = ErrorCollector::new();
        for i in 0..(MAX_LOG_EVENTS_PER_SOURCE + 5) {
            collector.record_event("big.el", LogEvent::info(&format!("event {}", i)));
        }
        let events = collector.get_source_events("big.el");
        assert_eq!(events.len(), MAX_LOG_EVENTS_PER_SOURCE + 1);
        assert!(events.last().unwrap().is_warning());
    }

    #[test]
    fn test_cargo_style_format() {
        let collector = ErrorCollector::new();
        let span = Span::new(Position::new(6, 1, 7), Position::new(10, 1, 11));
        collector.record_event(
            "rules.el",
            LogEvent::error(codes::resolution::ARITY_MISMATCH, "substring expects 1 to 2 arguments")
                .with_span(span)
                .with_context("line", "4")
                .with_context("function", "substring"),
        );

        let report = format_cargo_style_errors(&collector);
        assert!(report.contains("Checking rules.el..."));
        assert!(report.contains("error[E061]: substring expects 1 to 2 arguments --> rules.el:4:7"));
        assert!(report.contains("  = function: substring"));
        assert!(report.contains("  = help: "));
        assert!(report.contains("Total errors: 1"));
    }

    #[test]
    fn test_critical_errors() {
        let collector = ErrorCollector::new();
        collector.record_event("x", LogEvent::error(codes::system::INTERNAL_ERROR, "boom"));
        collector.record_event("x", LogEvent::error(codes::evaluation::ARITHMETIC, "div"));

        let critical = collector.get_critical_errors();
        assert_eq!(critical.len(), 1);
        assert_eq!(critical[0].1.code.as_str(), "ERR001");
    }
}
