//! Implicit conversions between value kinds

use crate::types::{EvalError, EvalResult, Number, ResolvedValue};

/// String form; `Null` reads as the empty string
pub fn to_string(value: &ResolvedValue) -> String {
    match value {
        ResolvedValue::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Integer unless the text carries a `.` or exponent marker
pub fn parse_number(text: &str) -> EvalResult<Number> {
    let trimmed = text.trim();
    let parsed = if trimmed.contains(['.', 'e', 'E']) {
        trimmed.parse::<f64>().ok().map(Number::Float)
    } else {
        trimmed.parse::<i64>().ok().map(Number::Int)
    };
    parsed.ok_or_else(|| EvalError::coercion(text, "number"))
}

pub fn to_number(value: &ResolvedValue) -> EvalResult<Number> {
    match value {
        ResolvedValue::Num(n) => Ok(*n),
        ResolvedValue::Str(s) => parse_number(s),
        ResolvedValue::Temporal(instant) => Ok(Number::Int(instant.timestamp_millis())),
        ResolvedValue::Multi(_) => Err(EvalError::coercion(value.to_string(), "number")),
        ResolvedValue::Bool(_) | ResolvedValue::Null => {
            Err(EvalError::coercion(value.to_string(), "number"))
        }
    }
}

/// Whole number; decimals truncate toward zero
pub fn to_int(value: &ResolvedValue) -> EvalResult<i64> {
    Ok(match to_number(value)? {
        Number::Int(i) => i,
        Number::Float(d) => d as i64,
    })
}

/// Index or count argument; negative values are rejected
pub fn to_count(value: &ResolvedValue, function: &'static str) -> EvalResult<usize> {
    let n = to_int(value)?;
    usize::try_from(n).map_err(|_| EvalError::invalid_argument(function, format!("{} is negative", n)))
}

pub fn to_bool(value: &ResolvedValue) -> EvalResult<bool> {
    match value {
        ResolvedValue::Bool(b) => Ok(*b),
        other => {
            let text = to_string(other);
            match text.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(EvalError::coercion(text, "boolean")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_number_parsing() {
        assert_eq!(parse_number("5").unwrap(), Number::Int(5));
        assert_eq!(parse_number(" -12 ").unwrap(), Number::Int(-12));
        assert_eq!(parse_number("5.5").unwrap(), Number::Float(5.5));
        assert_eq!(parse_number("1e3").unwrap(), Number::Float(1000.0));
        assert_matches!(
            parse_number("abc"),
            Err(EvalError::TypeCoercion { expected_kind: "number", .. })
        );
        assert!(parse_number("").is_err());
        assert!(parse_number("99999999999999999999").is_err());
    }

    #[test]
    fn test_non_numeric_kinds_fail() {
        assert!(to_number(&ResolvedValue::Bool(true)).is_err());
        assert!(to_number(&ResolvedValue::Null).is_err());
        assert_eq!(to_int(&ResolvedValue::float(-2.9)).unwrap(), -2);
        assert!(to_count(&ResolvedValue::int(-1), "substring").is_err());
    }

    #[test]
    fn test_bool_coercion() {
        assert!(to_bool(&"TRUE".into()).unwrap());
        assert!(!to_bool(&" false ".into()).unwrap());
        assert_matches!(to_bool(&"yes".into()), Err(EvalError::TypeCoercion { .. }));
        assert!(to_bool(&ResolvedValue::Null).is_err());
    }
}
