//! Date formatting and parsing
//!
//! Patterns arrive in EL form and are translated to `chrono` directives
//! per call. Instants are carried in UTC; zones only affect how they are
//! printed or how zone-less text is read.

use super::coercion::to_string;
use super::{opt_string, EvalContext};
use crate::types::{EvalError, EvalResult, Number, ResolvedValue};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use el_compiler::catalog::DateTimeFn;
use el_compiler::date_pattern::{self, DEFAULT_DATE_PATTERN};

pub fn call(
    function: DateTimeFn,
    subject: &ResolvedValue,
    args: &[ResolvedValue],
    ctx: &EvalContext<'_>,
) -> EvalResult<ResolvedValue> {
    let zone = match opt_string(args, 1) {
        Some(name) => parse_zone(&name)?,
        None => ctx.zone,
    };

    match function {
        DateTimeFn::Format | DateTimeFn::FormatInstant => {
            let allow_iso = function == DateTimeFn::FormatInstant;
            let instant = to_instant(subject, allow_iso)?;
            let pattern = opt_string(args, 0).unwrap_or_default();
            Ok(ResolvedValue::Str(format_in(instant, &pattern, zone)?))
        }
        DateTimeFn::ToDate | DateTimeFn::ToInstant => {
            let pattern = args.first().filter(|p| !p.is_null()).map(to_string);
            Ok(ResolvedValue::temporal(parse_date(subject, pattern.as_deref(), zone)?))
        }
    }
}

/// Accepts `UTC`, `GMT`, `Z`, `+HH:MM`, `-HHMM`, `GMT+H` and the like
pub fn parse_zone(name: &str) -> EvalResult<FixedOffset> {
    let trimmed = name.trim();
    if matches!(trimmed, "UTC" | "GMT" | "Z") {
        return Ok(Utc.fix());
    }
    let unknown = || EvalError::invalid_argument("timeZone", format!("unknown time zone '{}'", trimmed));

    let offset = trimmed
        .strip_prefix("GMT")
        .or_else(|| trimmed.strip_prefix("UTC"))
        .unwrap_or(trimmed);
    let (sign, rest) = match offset.chars().next() {
        Some('+') => (1, &offset[1..]),
        Some('-') => (-1, &offset[1..]),
        _ => return Err(unknown()),
    };
    // Byte-index splitting below needs single-byte characters
    if !rest.is_ascii() {
        return Err(unknown());
    }
    let (hours, minutes) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None if rest.len() > 2 => rest.split_at(rest.len() - 2),
        None => (rest, "0"),
    };
    let all_digits = |s: &str| !s.is_empty() && s.len() <= 2 && s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(hours) || !all_digits(minutes) {
        return Err(unknown());
    }
    let hours: i32 = hours.parse().map_err(|_| unknown())?;
    let minutes: i32 = minutes.parse().map_err(|_| unknown())?;
    if minutes >= 60 {
        return Err(unknown());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(unknown)
}

/// Label printed for `zzz`: `UTC` at offset zero, otherwise `UTC+HH:MM`
pub fn zone_label(zone: FixedOffset) -> String {
    let seconds = zone.local_minus_utc();
    if seconds == 0 {
        return "UTC".to_string();
    }
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("UTC{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}

/// String form of a date, as used whenever one is coerced to text
pub fn format_default(instant: DateTime<Utc>, zone: FixedOffset) -> String {
    let host = date_pattern::translate(DEFAULT_DATE_PATTERN);
    format_host(instant, &host, zone).unwrap_or_else(|_| instant.to_rfc3339())
}

fn format_in(instant: DateTime<Utc>, pattern: &str, zone: FixedOffset) -> EvalResult<String> {
    format_host(instant, &date_pattern::translate(pattern), zone)
}

fn format_host(instant: DateTime<Utc>, host: &str, zone: FixedOffset) -> EvalResult<String> {
    let host = substitute_zone_name(host, &zone_label(zone));
    if !date_pattern::is_valid_host_pattern(&host) {
        return Err(EvalError::invalid_argument("format", format!("unusable date pattern '{}'", host)));
    }
    Ok(instant.with_timezone(&zone).format(&host).to_string())
}

/// `chrono` prints `%Z` of a fixed offset as the offset itself
fn substitute_zone_name(host: &str, label: &str) -> String {
    let mut out = String::with_capacity(host.len());
    let mut chars = host.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('Z') => out.push_str(label),
            Some(next) => {
                out.push('%');
                out.push(next);
            }
            None => out.push('%'),
        }
    }
    out
}

/// Rewrite the first `UTC`/`GMT` label (with any `±HH:MM` suffix) as `±HH:MM`
fn zone_label_as_offset(text: &str) -> Option<String> {
    let start = [text.find("UTC"), text.find("GMT")].into_iter().flatten().min()?;
    let tail = &text[start + 3..];
    let suffix = match tail.chars().next() {
        Some('+' | '-') => {
            1 + tail[1..]
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == ':')
                .count()
        }
        _ => 0,
    };
    let end = start + 3 + suffix;
    let zone = parse_zone(&text[start..end]).ok()?;
    Some(format!("{}{}{}", &text[..start], zone, &text[end..]))
}

fn is_epoch_text(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn from_epoch_millis(millis: i64) -> EvalResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| EvalError::coercion(millis.to_string(), "date"))
}

/// Interpret a subject as an instant: a date, epoch milliseconds, or (for
/// `formatInstant`) ISO-8601 text
fn to_instant(value: &ResolvedValue, allow_iso: bool) -> EvalResult<DateTime<Utc>> {
    match value {
        ResolvedValue::Temporal(instant) => Ok(*instant),
        ResolvedValue::Num(Number::Int(ms)) => from_epoch_millis(*ms),
        ResolvedValue::Num(Number::Float(ms)) => from_epoch_millis(*ms as i64),
        other => {
            let text = to_string(other);
            let trimmed = text.trim();
            if is_epoch_text(trimmed) {
                let ms = trimmed.parse::<i64>().map_err(|_| EvalError::coercion(trimmed, "date"))?;
                return from_epoch_millis(ms);
            }
            if allow_iso {
                if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
                    return Ok(parsed.with_timezone(&Utc));
                }
                if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
                    return Ok(naive.and_utc());
                }
            }
            Err(EvalError::coercion(trimmed, "date"))
        }
    }
}

fn parse_date(value: &ResolvedValue, pattern: Option<&str>, zone: FixedOffset) -> EvalResult<DateTime<Utc>> {
    let pattern = match pattern {
        Some(pattern) => pattern,
        None => match value {
            ResolvedValue::Temporal(_) | ResolvedValue::Num(_) => return to_instant(value, false),
            ResolvedValue::Str(s) if is_epoch_text(s.trim()) => return to_instant(value, false),
            _ => DEFAULT_DATE_PATTERN,
        },
    };

    let text = to_string(value);
    let trimmed = text.trim();
    let host = date_pattern::translate(pattern);
    let failed = || EvalError::coercion(trimmed, "date");

    if !date_pattern::is_valid_host_pattern(&host) {
        return Err(EvalError::invalid_argument("toDate", format!("unusable date pattern '{}'", host)));
    }
    // `chrono` skips `%Z` text when parsing, so read the label as an offset instead
    let with_offset = substitute_zone_name(&host, "%:z");
    if with_offset != host {
        if let Some(relabeled) = zone_label_as_offset(trimmed) {
            if let Ok(parsed) = DateTime::parse_from_str(&relabeled, &with_offset) {
                return Ok(parsed.with_timezone(&Utc));
            }
        }
    }
    if let Ok(parsed) = DateTime::parse_from_str(trimmed, &host) {
        return Ok(parsed.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(trimmed, &host).or_else(|_| {
        NaiveDate::parse_from_str(trimmed, &host)
            .map(|date| date.and_hms_opt(0, 0, 0).unwrap_or_default())
    });
    let naive = naive.map_err(|_| failed())?;
    naive
        .and_local_timezone(zone)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributeEnvironment;
    use assert_matches::assert_matches;

    fn ctx(env: &AttributeEnvironment) -> EvalContext<'_> {
        EvalContext::new(env, Utc.fix())
    }

    fn eval(function: DateTimeFn, subject: ResolvedValue, args: &[ResolvedValue]) -> EvalResult<ResolvedValue> {
        let env = AttributeEnvironment::new();
        call(function, &subject, args, &ctx(&env))
    }

    const JAN_2_2024: i64 = 1_704_164_645_123;

    #[test]
    fn test_zone_parsing() {
        assert_eq!(parse_zone("UTC").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_zone("+02:00").unwrap().local_minus_utc(), 7200);
        assert_eq!(parse_zone("GMT-0530").unwrap().local_minus_utc(), -(5 * 3600 + 30 * 60));
        assert_eq!(parse_zone("UTC+3").unwrap().local_minus_utc(), 3 * 3600);
        assert_matches!(parse_zone("America/Nowhere"), Err(EvalError::InvalidArgument { .. }));
        assert!(parse_zone("+02:75").is_err());
    }

    #[test]
    fn test_non_ascii_zone_is_rejected() {
        assert_matches!(parse_zone("+é1"), Err(EvalError::InvalidArgument { .. }));
        assert_matches!(parse_zone("UTC-1é"), Err(EvalError::InvalidArgument { .. }));
        assert_matches!(
            eval(DateTimeFn::Format, ResolvedValue::int(0), &["yyyy".into(), "+é1".into()]),
            Err(EvalError::InvalidArgument { .. })
        );
    }

    #[test]
    fn test_zone_label_is_read_back_as_offset() {
        let text = "Tue Jan 02 05:00:00 UTC+02:00 2024";
        let parsed = eval(DateTimeFn::ToDate, text.into(), &[]).unwrap();
        assert_matches!(&parsed, ResolvedValue::Temporal(t) if t.timestamp_millis() == 1_704_164_400_000);

        let shifted = eval(DateTimeFn::Format, parsed.clone(), &["HH:mm zzz".into(), "+02:00".into()]).unwrap();
        assert_eq!(shifted, ResolvedValue::str("05:00 UTC+02:00"));

        let instant = DateTime::from_timestamp_millis(JAN_2_2024 - 123).unwrap();
        let zone = parse_zone("-04:30").unwrap();
        let text = format_default(instant, zone);
        assert_eq!(text, "Mon Jan 01 22:34:05 UTC-04:30 2024");
        let back = eval(DateTimeFn::ToDate, text.into(), &[]).unwrap();
        assert_eq!(back, ResolvedValue::temporal(instant));

        let gmt = eval(
            DateTimeFn::ToDate,
            "2024-01-02 05:00 GMT+2".into(),
            &["yyyy-MM-dd HH:mm zzz".into()],
        )
        .unwrap();
        assert_eq!(gmt, parsed);
    }

    #[test]
    fn test_zone_label() {
        assert_eq!(zone_label(Utc.fix()), "UTC");
        assert_eq!(zone_label(parse_zone("-04:30").unwrap()), "UTC-04:30");
    }

    #[test]
    fn test_format_epoch_millis() {
        let formatted = eval(
            DateTimeFn::Format,
            ResolvedValue::int(JAN_2_2024),
            &["yyyy-MM-dd HH:mm:ss.SSS".into()],
        )
        .unwrap();
        assert_eq!(formatted, ResolvedValue::str("2024-01-02 03:04:05.123"));

        let shifted = eval(
            DateTimeFn::Format,
            ResolvedValue::str(JAN_2_2024.to_string()),
            &["HH:mm zzz".into(), "+02:00".into()],
        )
        .unwrap();
        assert_eq!(shifted, ResolvedValue::str("05:04 UTC+02:00"));
    }

    #[test]
    fn test_format_instant_accepts_iso_text() {
        let formatted = eval(
            DateTimeFn::FormatInstant,
            "2024-01-02T03:04:05Z".into(),
            &["yyyy/MM/dd".into()],
        )
        .unwrap();
        assert_eq!(formatted, ResolvedValue::str("2024/01/02"));
        assert_matches!(
            eval(DateTimeFn::Format, "2024-01-02T03:04:05Z".into(), &["yyyy".into()]),
            Err(EvalError::TypeCoercion { expected_kind: "date", .. })
        );
    }

    #[test]
    fn test_to_date_with_pattern_and_zone() {
        let parsed = eval(
            DateTimeFn::ToDate,
            "2024-01-02 05:04:05".into(),
            &["yyyy-MM-dd HH:mm:ss".into(), "+02:00".into()],
        )
        .unwrap();
        match parsed {
            ResolvedValue::Temporal(t) => assert_eq!(t.timestamp_millis(), JAN_2_2024 - 123),
            other => panic!("unexpected {other:?}"),
        }

        let date_only = eval(DateTimeFn::ToDate, "2024-01-02".into(), &["yyyy-MM-dd".into()]).unwrap();
        assert_eq!(date_only.to_string(), "Tue Jan 02 00:00:00 UTC 2024");
    }

    #[test]
    fn test_to_date_default_pattern_round_trips_string_form() {
        let instant = DateTime::from_timestamp_millis(JAN_2_2024).unwrap();
        let text = format_default(instant, Utc.fix());
        let parsed = eval(DateTimeFn::ToDate, text.clone().into(), &[]).unwrap();
        assert_eq!(parsed.to_string(), text);

        let from_epoch = eval(DateTimeFn::ToInstant, ResolvedValue::int(0), &[]).unwrap();
        assert_eq!(from_epoch.to_string(), "Thu Jan 01 00:00:00 UTC 1970");
    }

    #[test]
    fn test_unparseable_dates() {
        assert_matches!(
            eval(DateTimeFn::ToDate, "not a date".into(), &["yyyy-MM-dd".into()]),
            Err(EvalError::TypeCoercion { .. })
        );
        assert_matches!(
            eval(DateTimeFn::Format, ResolvedValue::Bool(true), &["yyyy".into()]),
            Err(EvalError::TypeCoercion { .. })
        );
    }
}
