//! # Replay Types
//!
//! Captured samples and the diff report produced by replaying them. Field
//! names follow the validation tool's JSON so corpora can be exchanged as-is.

use crate::functions::coercion;
use crate::types::{AttributeEnvironment, Number, ResolvedValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One captured execution: an expression, the attributes it saw and what it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: String,

    #[serde(default)]
    pub description: String,

    pub expression: String,

    #[serde(default)]
    pub attributes: BTreeMap<String, String>,

    #[serde(default)]
    pub parameters: BTreeMap<String, String>,

    /// Value observed in the real run; ignored when `expected_error` is set
    #[serde(default)]
    pub expected: serde_json::Value,

    /// Either the runtime kind (`integer`, `string`, ...) or the static type (`Number`, ...)
    #[serde(default)]
    pub result_type: Option<String>,

    /// Error kind the sample is expected to fail with, e.g. `TypeCoercionError`
    #[serde(default)]
    pub expected_error: Option<String>,
}

impl Sample {
    pub fn environment(&self) -> AttributeEnvironment {
        AttributeEnvironment {
            attributes: self.attributes.clone(),
            parameters: self.parameters.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleStatus {
    Passed,
    Mismatch,
    CompileError,
    EvaluationError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: String,
    pub code: String,
    pub message: String,
}

/// Result of replaying one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleOutcome {
    pub id: String,
    pub description: String,
    pub expression: String,
    pub status: SampleStatus,
    pub expected: serde_json::Value,
    pub actual: Option<serde_json::Value>,
    pub actual_type: Option<String>,
    pub error: Option<ErrorDetail>,
    /// Human readable reason for a non-passing sample
    pub detail: Option<String>,
}

impl SampleOutcome {
    pub fn passed(&self) -> bool {
        self.status == SampleStatus::Passed
    }
}

/// Diff report for a whole corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    pub corpus: String,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub duration_ms: u64,
    pub total: u32,
    pub passed: u32,
    pub mismatched: u32,
    pub errors: u32,
    /// Percentage of samples that passed (0-100)
    pub pass_percentage: f32,
    pub outcomes: Vec<SampleOutcome>,
}

impl ReplayReport {
    pub fn new(corpus: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            corpus: corpus.into(),
            started: now,
            finished: now,
            duration_ms: 0,
            total: 0,
            passed: 0,
            mismatched: 0,
            errors: 0,
            pass_percentage: 0.0,
            outcomes: Vec::new(),
        }
    }

    pub fn add_outcome(&mut self, outcome: SampleOutcome) {
        self.total += 1;
        match outcome.status {
            SampleStatus::Passed => self.passed += 1,
            SampleStatus::Mismatch => self.mismatched += 1,
            SampleStatus::CompileError | SampleStatus::EvaluationError => self.errors += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Stamp the end time and compute the pass percentage
    pub fn finalize(&mut self) {
        self.finished = Utc::now();
        self.duration_ms = (self.finished - self.started).num_milliseconds().max(0) as u64;
        if self.total > 0 {
            self.pass_percentage = (self.passed as f32 / self.total as f32) * 100.0;
        }
    }

    pub fn is_successful(&self) -> bool {
        self.passed == self.total
    }

    pub fn failures(&self) -> impl Iterator<Item = &SampleOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} samples: {} passed, {} mismatched, {} errors ({:.1}%)",
            self.total, self.passed, self.mismatched, self.errors, self.pass_percentage
        )
    }
}

/// Whether an evaluated value matches a captured JSON value
///
/// Strings compare by string form since captured attributes are text;
/// numbers compare numerically, arrays element by element.
pub fn matches_expected(actual: &ResolvedValue, expected: &serde_json::Value) -> bool {
    use serde_json::Value;

    match expected {
        Value::Null => actual.is_null(),
        Value::String(text) => coercion::to_string(actual) == *text,
        Value::Bool(b) => coercion::to_bool(actual).ok() == Some(*b),
        Value::Number(n) => match (coercion::to_number(actual), n.as_i64()) {
            (Ok(Number::Int(i)), Some(expected)) => i == expected,
            (Ok(number), _) => n.as_f64().is_some_and(|e| e == number.as_f64()),
            (Err(_), _) => false,
        },
        Value::Array(items) => match actual {
            ResolvedValue::Multi(values) => {
                values.len() == items.len()
                    && values.iter().zip(items).all(|(v, e)| matches_expected(v, e))
            }
            _ => false,
        },
        Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sample_defaults() {
        let sample: Sample = serde_json::from_value(json!({
            "id": "s1",
            "expression": "${a}"
        }))
        .unwrap();
        assert!(sample.attributes.is_empty());
        assert_eq!(sample.expected, serde_json::Value::Null);
        assert!(sample.result_type.is_none());
        assert!(sample.environment().is_empty());
    }

    #[test]
    fn test_matches_expected() {
        assert!(matches_expected(&ResolvedValue::str("6"), &json!("6")));
        assert!(matches_expected(&ResolvedValue::int(6), &json!("6")));
        assert!(matches_expected(&ResolvedValue::int(6), &json!(6)));
        assert!(matches_expected(&ResolvedValue::float(6.5), &json!(6.5)));
        assert!(!matches_expected(&ResolvedValue::float(6.0), &json!("6")));
        assert!(matches_expected(&ResolvedValue::Bool(true), &json!(true)));
        assert!(matches_expected(&ResolvedValue::str("TRUE"), &json!(true)));
        assert!(!matches_expected(&ResolvedValue::str(""), &json!(null)));
        assert!(matches_expected(
            &ResolvedValue::Multi(vec!["a".into(), ResolvedValue::Null]),
            &json!(["a", null])
        ));
        assert!(!matches_expected(&ResolvedValue::str("x"), &json!({"a": 1})));
    }

    #[test]
    fn test_report_counts() {
        let outcome = |status| SampleOutcome {
            id: "x".into(),
            description: String::new(),
            expression: "${x}".into(),
            status,
            expected: json!(null),
            actual: None,
            actual_type: None,
            error: None,
            detail: None,
        };
        let mut report = ReplayReport::new("corpus.json");
        report.add_outcome(outcome(SampleStatus::Passed));
        report.add_outcome(outcome(SampleStatus::Mismatch));
        report.add_outcome(outcome(SampleStatus::EvaluationError));
        report.add_outcome(outcome(SampleStatus::Passed));
        report.finalize();

        assert_eq!((report.total, report.passed, report.mismatched, report.errors), (4, 2, 1, 1));
        assert_eq!(report.pass_percentage, 50.0);
        assert!(!report.is_successful());
        assert_eq!(report.failures().count(), 2);

        let json = report.to_json().unwrap();
        assert!(json.contains("\"status\": \"evaluation_error\""));
        let restored = ReplayReport::from_json(&json).unwrap();
        assert_eq!(restored.outcomes.len(), 4);
    }
}
