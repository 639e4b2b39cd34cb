use super::coercion::{to_bool, to_count, to_int, to_string};
use super::{arg, compile_regex, opt_string, EvalContext};
use crate::types::{EvalError, EvalResult, ResolvedValue};
use el_compiler::catalog::StringFn;
use el_compiler::config::compile_time::evaluation::MAX_STRING_LENGTH;
use rand::Rng;

pub fn call(
    function: StringFn,
    subject: &ResolvedValue,
    args: &[ResolvedValue],
    ctx: &EvalContext<'_>,
) -> EvalResult<ResolvedValue> {
    let s = to_string(subject);
    let text = |i: usize| to_string(arg(args, i));

    Ok(match function {
        StringFn::ToUpper => s.to_uppercase().into(),
        StringFn::ToLower => s.to_lowercase().into(),
        StringFn::Trim => s.trim().into(),
        StringFn::Length => ResolvedValue::int(s.chars().count() as i64),
        StringFn::Substring => {
            let start = to_int(arg(args, 0))?;
            let end = match args.get(1) {
                Some(end) => Some(to_int(end)?),
                None => None,
            };
            substring(&s, start, end).into()
        }
        StringFn::SubstringBefore => {
            let d = text(0);
            s.find(&d).map_or(s.clone(), |i| s[..i].to_string()).into()
        }
        StringFn::SubstringAfter => {
            let d = text(0);
            s.find(&d).map_or(s.clone(), |i| s[i + d.len()..].to_string()).into()
        }
        StringFn::SubstringBeforeLast => {
            let d = text(0);
            s.rfind(&d).map_or(s.clone(), |i| s[..i].to_string()).into()
        }
        StringFn::SubstringAfterLast => {
            let d = text(0);
            s.rfind(&d).map_or(s.clone(), |i| s[i + d.len()..].to_string()).into()
        }
        StringFn::Append => format!("{}{}", s, text(0)).into(),
        StringFn::Prepend => format!("{}{}", text(0), s).into(),
        StringFn::Replace => s.replace(&text(0), &text(1)).into(),
        StringFn::ReplaceFirst | StringFn::ReplaceAll => {
            let re = compile_regex(&text(0))?;
            let replacement = java_replacement(&text(1), re.captures_len() - 1)
                .map_err(|reason| EvalError::invalid_argument(function.as_str(), reason))?;
            let limit = if function == StringFn::ReplaceFirst { 1 } else { 0 };
            re.replacen(&s, limit, replacement.as_str()).into_owned().into()
        }
        StringFn::ReplaceNull => match subject {
            ResolvedValue::Null => arg(args, 0).clone(),
            _ => s.into(),
        },
        StringFn::ReplaceEmpty => {
            if s.trim().is_empty() {
                arg(args, 0).clone()
            } else {
                s.into()
            }
        }
        StringFn::IndexOf => char_index(&s, s.find(&text(0))).into(),
        StringFn::LastIndexOf => char_index(&s, s.rfind(&text(0))).into(),
        StringFn::PadLeft | StringFn::PadRight => {
            let width = to_count(arg(args, 0), function.as_str())?;
            if width > MAX_STRING_LENGTH {
                return Err(EvalError::invalid_argument(
                    function.as_str(),
                    format!("width {} exceeds the limit of {}", width, MAX_STRING_LENGTH),
                ));
            }
            let pad = opt_string(args, 1).filter(|p| !p.is_empty()).unwrap_or_else(|| "_".to_string());
            pad_string(&s, width, &pad, function == StringFn::PadLeft).into()
        }
        StringFn::Repeat => {
            let low = to_int(arg(args, 0))?;
            let high = match args.get(1) {
                Some(high) => to_int(high)?,
                None => low,
            };
            if low < 0 || high < low {
                return Err(EvalError::invalid_argument(
                    "repeat",
                    format!("invalid repeat bounds {}..{}", low, high),
                ));
            }
            let longest = usize::try_from(high)
                .ok()
                .and_then(|high| high.checked_mul(s.len()))
                .filter(|bytes| *bytes <= MAX_STRING_LENGTH);
            if longest.is_none() {
                return Err(EvalError::invalid_argument(
                    "repeat",
                    format!("repeating {} bytes {} times exceeds the limit of {}", s.len(), high, MAX_STRING_LENGTH),
                ));
            }
            let times = if low == high {
                low
            } else {
                rand::rng().random_range(low..=high)
            };
            s.repeat(times as usize).into()
        }
        StringFn::GetDelimitedField => {
            let index = to_int(arg(args, 0))?;
            if index < 1 {
                return Err(EvalError::invalid_argument(
                    "getDelimitedField",
                    "field index must be at least 1",
                ));
            }
            let options = FieldOptions {
                delimiter: opt_string(args, 1).unwrap_or_else(|| ",".to_string()),
                quote: single_char(opt_string(args, 2).as_deref().unwrap_or("\"")),
                escape: single_char(opt_string(args, 3).as_deref().unwrap_or("\\")),
                strip: match args.get(4) {
                    Some(flag) => to_bool(flag)?,
                    None => false,
                },
            };
            delimited_field(&s, index as usize, &options).into()
        }
        StringFn::EvaluateElString => {
            let compiled = el_compiler::compile_cached(&s).map_err(EvalError::NestedCompile)?;
            crate::execution::evaluate_in(&compiled, ctx)?
        }
    })
}

/// Clamped character slice; an inverted range is empty
fn substring(s: &str, start: i64, end: Option<i64>) -> String {
    let len = s.chars().count() as i64;
    let begin = start.clamp(0, len);
    let finish = end.unwrap_or(len).clamp(0, len);
    if begin >= finish {
        return String::new();
    }
    s.chars()
        .skip(begin as usize)
        .take((finish - begin) as usize)
        .collect()
}

/// Byte offset to character index, -1 when absent
fn char_index(s: &str, byte_index: Option<usize>) -> ResolvedValue {
    ResolvedValue::int(match byte_index {
        Some(i) => s[..i].chars().count() as i64,
        None => -1,
    })
}

fn pad_string(s: &str, width: usize, pad: &str, left: bool) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.to_string();
    }
    let fill: String = pad.chars().cycle().take(width - len).collect();
    if left {
        fill + s
    } else {
        format!("{}{}", s, fill)
    }
}

/// Java-style `$1` and `\$` into the regex crate's replacement syntax
///
/// A group number takes further digits only while it still names one of
/// the pattern's `groups`, so `$10` with one group is group 1 then `0`.
fn java_replacement(replacement: &str, groups: usize) -> Result<String, String> {
    let mut out = String::with_capacity(replacement.len());
    let mut chars = replacement.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('$') => out.push_str("$$"),
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            },
            '$' if chars.peek().is_some_and(|c| c.is_ascii_digit()) => {
                let mut group = chars.next().and_then(|c| c.to_digit(10)).unwrap_or(0) as usize;
                if group > groups {
                    return Err(format!("no group {} in pattern with {} groups", group, groups));
                }
                while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
                    let extended = group * 10 + digit as usize;
                    if extended > groups {
                        break;
                    }
                    group = extended;
                    chars.next();
                }
                out.push_str(&format!("${{{}}}", group));
            }
            '$' => out.push_str("$$"),
            other => out.push(other),
        }
    }
    Ok(out)
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

struct FieldOptions {
    delimiter: String,
    quote: Option<char>,
    escape: Option<char>,
    strip: bool,
}

/// 1-based field of a delimited record; missing fields are empty
fn delimited_field(s: &str, index: usize, options: &FieldOptions) -> String {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut rest = s;

    while let Some(ch) = rest.chars().next() {
        let after = &rest[ch.len_utf8()..];

        if Some(ch) == options.escape {
            if let Some(next) = after.chars().next() {
                if !options.strip {
                    current.push(ch);
                }
                current.push(next);
                rest = &after[next.len_utf8()..];
                continue;
            }
        }

        if Some(ch) == options.quote {
            quoted = !quoted;
            if !options.strip {
                current.push(ch);
            }
        } else if !quoted && !options.delimiter.is_empty() && rest.starts_with(&options.delimiter) {
            fields.push(std::mem::take(&mut current));
            rest = &rest[options.delimiter.len()..];
            continue;
        } else {
            current.push(ch);
        }
        rest = after;
    }
    fields.push(current);

    fields.into_iter().nth(index - 1).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttributeEnvironment;
    use assert_matches::assert_matches;
    use chrono::{Offset, Utc};

    fn eval(function: StringFn, subject: &str, args: &[ResolvedValue]) -> EvalResult<ResolvedValue> {
        let env = AttributeEnvironment::new();
        call(function, &subject.into(), args, &EvalContext::new(&env, Utc.fix()))
    }

    fn text(function: StringFn, subject: &str, args: &[ResolvedValue]) -> String {
        to_string(&eval(function, subject, args).unwrap())
    }

    #[test]
    fn test_delimiter_search_falls_back_to_subject() {
        assert_eq!(text(StringFn::SubstringBefore, "noext", &[".".into()]), "noext");
        assert_eq!(text(StringFn::SubstringAfter, "noext", &[".".into()]), "noext");
        assert_eq!(text(StringFn::SubstringBefore, "a.b.c", &[".".into()]), "a");
        assert_eq!(text(StringFn::SubstringAfter, "a.b.c", &[".".into()]), "b.c");
        assert_eq!(text(StringFn::SubstringBeforeLast, "a.b.c", &[".".into()]), "a.b");
        assert_eq!(text(StringFn::SubstringAfterLast, "a.b.c", &[".".into()]), "c");
    }

    #[test]
    fn test_substring_clamps() {
        assert_eq!(text(StringFn::Substring, "hello", &[ResolvedValue::int(1), ResolvedValue::int(3)]), "el");
        assert_eq!(text(StringFn::Substring, "hello", &[ResolvedValue::int(2)]), "llo");
        assert_eq!(text(StringFn::Substring, "hello", &[ResolvedValue::int(-4), ResolvedValue::int(99)]), "hello");
        assert_eq!(text(StringFn::Substring, "hello", &[ResolvedValue::int(4), ResolvedValue::int(2)]), "");
        assert_eq!(text(StringFn::Substring, "héllo", &[ResolvedValue::int(1), ResolvedValue::int(2)]), "é");
    }

    #[test]
    fn test_index_functions() {
        assert_eq!(eval(StringFn::IndexOf, "abcabc", &["c".into()]).unwrap(), ResolvedValue::int(2));
        assert_eq!(eval(StringFn::LastIndexOf, "abcabc", &["c".into()]).unwrap(), ResolvedValue::int(5));
        assert_eq!(eval(StringFn::IndexOf, "abc", &["z".into()]).unwrap(), ResolvedValue::int(-1));
        assert_eq!(eval(StringFn::IndexOf, "éa", &["a".into()]).unwrap(), ResolvedValue::int(1));
    }

    #[test]
    fn test_regex_replacement_uses_capture_groups() {
        assert_eq!(
            text(StringFn::ReplaceAll, "2024-01-15", &["(\\d+)-(\\d+)-(\\d+)".into(), "$3/$2/$1".into()]),
            "15/01/2024"
        );
        assert_eq!(text(StringFn::ReplaceFirst, "aaa", &["a".into(), "b".into()]), "baa");
        assert_eq!(text(StringFn::ReplaceAll, "a.b", &["\\.".into(), "\\$".into()]), "a$b");
        assert_eq!(text(StringFn::ReplaceAll, "ab", &["(a)".into(), "$1$name".into()]), "a$nameb");
        assert_matches!(
            eval(StringFn::ReplaceAll, "x", &["(".into(), "y".into()]),
            Err(EvalError::InvalidRegex { .. })
        );
    }

    #[test]
    fn test_java_replacement_translation() {
        assert_eq!(java_replacement("$1-$12", 12).unwrap(), "${1}-${12}");
        assert_eq!(java_replacement("$1-$12", 1).unwrap(), "${1}-${1}2");
        assert_eq!(java_replacement("\\$5 \\\\", 0).unwrap(), "$$5 \\");
        assert_eq!(java_replacement("cost $", 0).unwrap(), "cost $$");
        assert!(java_replacement("$2", 1).is_err());
    }

    #[test]
    fn test_group_number_stops_at_group_count() {
        assert_eq!(text(StringFn::ReplaceAll, "ab", &["(a)".into(), "$10".into()]), "a0b");
        assert_eq!(text(StringFn::ReplaceFirst, "aa", &["(a)".into(), "<$11>".into()]), "<a1>a");
        assert_matches!(
            eval(StringFn::ReplaceAll, "ab", &["(a)".into(), "$2".into()]),
            Err(EvalError::InvalidArgument { function: "replaceAll", .. })
        );
    }

    #[test]
    fn test_null_and_empty_replacement() {
        let env = AttributeEnvironment::new();
        let ctx = EvalContext::new(&env, Utc.fix());
        assert_eq!(
            call(StringFn::ReplaceNull, &ResolvedValue::Null, &["dflt".into()], &ctx).unwrap(),
            ResolvedValue::str("dflt")
        );
        assert_eq!(text(StringFn::ReplaceNull, "", &["dflt".into()]), "");
        assert_eq!(text(StringFn::ReplaceEmpty, "  ", &["dflt".into()]), "dflt");
        assert_eq!(text(StringFn::ReplaceEmpty, "x", &["dflt".into()]), "x");
    }

    #[test]
    fn test_padding() {
        assert_eq!(text(StringFn::PadLeft, "test", &[ResolvedValue::int(10), "#".into()]), "######test");
        assert_eq!(text(StringFn::PadRight, "test", &[ResolvedValue::int(7)]), "test___");
        assert_eq!(text(StringFn::PadLeft, "test", &[ResolvedValue::int(8), "ab".into()]), "ababtest");
        assert_eq!(text(StringFn::PadLeft, "longer", &[ResolvedValue::int(3)]), "longer");
    }

    #[test]
    fn test_oversized_padding_is_rejected() {
        for function in [StringFn::PadLeft, StringFn::PadRight] {
            assert_matches!(
                eval(function, "x", &[ResolvedValue::int(i64::MAX)]),
                Err(EvalError::InvalidArgument { .. })
            );
        }
        let limit = MAX_STRING_LENGTH as i64;
        assert_matches!(
            eval(StringFn::PadLeft, "x", &[ResolvedValue::int(limit + 1)]),
            Err(EvalError::InvalidArgument { function: "padLeft", .. })
        );
    }

    #[test]
    fn test_oversized_repeat_is_rejected() {
        assert_matches!(
            eval(StringFn::Repeat, "ab", &[ResolvedValue::int(i64::MAX)]),
            Err(EvalError::InvalidArgument { function: "repeat", .. })
        );
        assert_matches!(
            eval(StringFn::Repeat, "ab", &[ResolvedValue::int(1), ResolvedValue::int(i64::MAX)]),
            Err(EvalError::InvalidArgument { function: "repeat", .. })
        );
        let half = (MAX_STRING_LENGTH / 2 + 1) as i64;
        assert!(eval(StringFn::Repeat, "ab", &[ResolvedValue::int(half)]).is_err());
        assert_eq!(text(StringFn::Repeat, "", &[ResolvedValue::int(i64::MAX)]), "");
    }

    #[test]
    fn test_repeat() {
        assert_eq!(text(StringFn::Repeat, "ab", &[ResolvedValue::int(3)]), "ababab");
        let ranged = text(StringFn::Repeat, "x", &[ResolvedValue::int(1), ResolvedValue::int(3)]);
        assert!((1..=3).contains(&ranged.len()));
        assert_matches!(
            eval(StringFn::Repeat, "x", &[ResolvedValue::int(3), ResolvedValue::int(1)]),
            Err(EvalError::InvalidArgument { function: "repeat", .. })
        );
    }

    #[test]
    fn test_delimited_fields() {
        let record = "a,\"b,c\",d\\,e";
        assert_eq!(text(StringFn::GetDelimitedField, record, &[ResolvedValue::int(1)]), "a");
        assert_eq!(text(StringFn::GetDelimitedField, record, &[ResolvedValue::int(2)]), "\"b,c\"");
        assert_eq!(text(StringFn::GetDelimitedField, record, &[ResolvedValue::int(3)]), "d\\,e");
        assert_eq!(text(StringFn::GetDelimitedField, record, &[ResolvedValue::int(9)]), "");
        assert_eq!(
            text(
                StringFn::GetDelimitedField,
                record,
                &[ResolvedValue::int(2), ",".into(), "\"".into(), "\\".into(), true.into()]
            ),
            "b,c"
        );
        assert_eq!(text(StringFn::GetDelimitedField, "x|y", &[ResolvedValue::int(2), "|".into()]), "y");
        assert!(eval(StringFn::GetDelimitedField, "x", &[ResolvedValue::int(0)]).is_err());
    }

    #[test]
    fn test_evaluate_nested_source() {
        let env = AttributeEnvironment::from_pairs([("name", "world")]);
        let ctx = EvalContext::new(&env, Utc.fix());
        let value = call(StringFn::EvaluateElString, &"hello ${name}".into(), &[], &ctx).unwrap();
        assert_eq!(value, ResolvedValue::str("hello world"));
        assert_matches!(
            call(StringFn::EvaluateElString, &"${x:".into(), &[], &ctx),
            Err(EvalError::NestedCompile(_))
        );
    }
}
