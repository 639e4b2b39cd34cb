//! Runtime values flowing between chained calls

use chrono::{DateTime, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_int(self) -> bool {
        matches!(self, Number::Int(_))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(d) => f.write_str(&format_float(*d)),
        }
    }
}

/// Render a float the way the source engine prints doubles
///
/// Plain notation with at least one fractional digit inside `[1e-3, 1e7)`,
/// otherwise `<mantissa>E<exponent>` with the shortest round-trip digits.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let magnitude = value.abs();
    if (1e-3..1e7).contains(&magnitude) {
        let plain = value.to_string();
        return if plain.contains('.') {
            plain
        } else {
            format!("{}.0", plain)
        };
    }

    let scientific = format!("{:e}", value);
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{}E{}", mantissa, exponent),
        Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
        None => scientific,
    }
}

/// Value produced by evaluating an expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResolvedValue {
    Str(String),
    Num(Number),
    Bool(bool),
    /// Millisecond-resolution instant
    Temporal(DateTime<Utc>),
    Multi(Vec<ResolvedValue>),
    Null,
}

impl ResolvedValue {
    pub fn str(value: impl Into<String>) -> Self {
        ResolvedValue::Str(value.into())
    }

    pub fn int(value: i64) -> Self {
        ResolvedValue::Num(Number::Int(value))
    }

    pub fn float(value: f64) -> Self {
        ResolvedValue::Num(Number::Float(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ResolvedValue::Null)
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, ResolvedValue::Multi(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResolvedValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ResolvedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_multi(&self) -> Option<&[ResolvedValue]> {
        match self {
            ResolvedValue::Multi(values) => Some(values),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ResolvedValue::Str(_) => "string",
            ResolvedValue::Num(Number::Int(_)) => "integer",
            ResolvedValue::Num(Number::Float(_)) => "decimal",
            ResolvedValue::Bool(_) => "boolean",
            ResolvedValue::Temporal(_) => "date",
            ResolvedValue::Multi(_) => "multi-value",
            ResolvedValue::Null => "null",
        }
    }

    /// Truncate an instant to milliseconds
    pub fn temporal(instant: DateTime<Utc>) -> Self {
        let millis = instant.timestamp_millis();
        ResolvedValue::Temporal(DateTime::from_timestamp_millis(millis).unwrap_or(instant))
    }

    /// JSON form used by replay reports
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ResolvedValue::Str(s) => serde_json::Value::String(s.clone()),
            ResolvedValue::Num(Number::Int(i)) => serde_json::Value::from(*i),
            ResolvedValue::Num(Number::Float(d)) => serde_json::Number::from_f64(*d)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(format_float(*d))),
            ResolvedValue::Bool(b) => serde_json::Value::Bool(*b),
            ResolvedValue::Temporal(_) => serde_json::Value::String(self.to_string()),
            ResolvedValue::Multi(values) => {
                serde_json::Value::Array(values.iter().map(|v| v.to_json()).collect())
            }
            ResolvedValue::Null => serde_json::Value::Null,
        }
    }
}

/// String form of a value as text coercion sees it
///
/// Temporals always print in UTC with the default pattern, independent of
/// the configured zone; `toDate()` reads the `UTC` label back exactly.
impl fmt::Display for ResolvedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedValue::Str(s) => f.write_str(s),
            ResolvedValue::Num(n) => write!(f, "{}", n),
            ResolvedValue::Bool(b) => write!(f, "{}", b),
            ResolvedValue::Temporal(instant) => f.write_str(
                &crate::functions::datetime::format_default(*instant, Utc.fix()),
            ),
            ResolvedValue::Multi(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", value)?;
                }
                Ok(())
            }
            ResolvedValue::Null => Ok(()),
        }
    }
}

impl From<&str> for ResolvedValue {
    fn from(value: &str) -> Self {
        ResolvedValue::Str(value.to_string())
    }
}

impl From<String> for ResolvedValue {
    fn from(value: String) -> Self {
        ResolvedValue::Str(value)
    }
}

impl From<bool> for ResolvedValue {
    fn from(value: bool) -> Self {
        ResolvedValue::Bool(value)
    }
}

impl From<i64> for ResolvedValue {
    fn from(value: i64) -> Self {
        ResolvedValue::int(value)
    }
}

impl From<f64> for ResolvedValue {
    fn from(value: f64) -> Self {
        ResolvedValue::float(value)
    }
}
