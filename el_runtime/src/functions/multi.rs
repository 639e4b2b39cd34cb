//! Multi-value producers and reducers
//!
//! Producers read the environment directly and yield `Multi`; the `any*`
//! forms produce the same values and differ only in how the evaluator
//! reduces a boolean result.

use super::coercion::to_string;
use super::{arg, compile_full_regex, EvalContext};
use crate::types::{EvalResult, ResolvedValue};
use el_compiler::catalog::MultiFn;

pub fn call(
    function: MultiFn,
    subject: &ResolvedValue,
    args: &[ResolvedValue],
    ctx: &EvalContext<'_>,
) -> EvalResult<ResolvedValue> {
    match function {
        MultiFn::AllAttributes | MultiFn::AnyAttribute => Ok(ResolvedValue::Multi(
            args.iter()
                .map(|name| match ctx.env.attribute(&to_string(name)) {
                    Some(value) => ResolvedValue::str(value),
                    None => ResolvedValue::Null,
                })
                .collect(),
        )),
        MultiFn::AllMatchingAttributes | MultiFn::AnyMatchingAttribute => {
            let patterns = args
                .iter()
                .map(|p| compile_full_regex(&to_string(p)))
                .collect::<EvalResult<Vec<_>>>()?;
            // Environment iteration is ordered by name
            Ok(ResolvedValue::Multi(
                ctx.env
                    .attributes()
                    .filter(|(name, _)| patterns.iter().any(|p| p.is_match(name)))
                    .map(|(_, value)| ResolvedValue::str(value))
                    .collect(),
            ))
        }
        MultiFn::AllDelineatedValues | MultiFn::AnyDelineatedValue => {
            let value = to_string(arg(args, 0));
            let delimiter = to_string(arg(args, 1));
            if delimiter.is_empty() {
                return Ok(ResolvedValue::Multi(vec![ResolvedValue::Str(value)]));
            }
            Ok(ResolvedValue::Multi(value.split(delimiter.as_str()).map(ResolvedValue::str).collect()))
        }
        MultiFn::Join => Ok(match subject {
            ResolvedValue::Multi(values) => {
                let parts: Vec<String> = values.iter().map(to_string).collect();
                ResolvedValue::Str(parts.join(&to_string(arg(args, 0))))
            }
            single => ResolvedValue::Str(to_string(single)),
        }),
        MultiFn::Count => Ok(ResolvedValue::int(match subject {
            ResolvedValue::Multi(values) => values.len() as i64,
            _ => 1,
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttributeEnvironment, EvalError};
    use assert_matches::assert_matches;
    use chrono::{Offset, Utc};

    fn env() -> AttributeEnvironment {
        AttributeEnvironment::from_pairs([("a", "1"), ("b", "2"), ("abc", "3"), ("z", "")])
    }

    fn produce(function: MultiFn, args: &[ResolvedValue]) -> EvalResult<ResolvedValue> {
        let env = env();
        call(function, &ResolvedValue::Null, args, &EvalContext::new(&env, Utc.fix()))
    }

    #[test]
    fn test_all_attributes_keeps_declared_order() {
        let values = produce(MultiFn::AllAttributes, &["b".into(), "missing".into(), "a".into()]).unwrap();
        assert_eq!(
            values,
            ResolvedValue::Multi(vec!["2".into(), ResolvedValue::Null, "1".into()])
        );
    }

    #[test]
    fn test_matching_attributes_use_full_match() {
        let values = produce(MultiFn::AllMatchingAttributes, &["a.*".into()]).unwrap();
        assert_eq!(values, ResolvedValue::Multi(vec!["1".into(), "3".into()]));

        let exact = produce(MultiFn::AnyMatchingAttribute, &["b".into()]).unwrap();
        assert_eq!(exact, ResolvedValue::Multi(vec!["2".into()]));

        assert_matches!(
            produce(MultiFn::AllMatchingAttributes, &["(".into()]),
            Err(EvalError::InvalidRegex { .. })
        );
    }

    #[test]
    fn test_delineated_values() {
        let values = produce(MultiFn::AllDelineatedValues, &["x;y;;z".into(), ";".into()]).unwrap();
        assert_eq!(values.as_multi().map(|v| v.len()), Some(4));
        let whole = produce(MultiFn::AnyDelineatedValue, &["x;y".into(), "".into()]).unwrap();
        assert_eq!(whole, ResolvedValue::Multi(vec!["x;y".into()]));
    }

    #[test]
    fn test_reducers() {
        let env = env();
        let ctx = EvalContext::new(&env, Utc.fix());
        let multi = ResolvedValue::Multi(vec!["1".into(), ResolvedValue::Null, ResolvedValue::int(3)]);

        assert_eq!(call(MultiFn::Join, &multi, &[",".into()], &ctx).unwrap(), ResolvedValue::str("1,,3"));
        assert_eq!(call(MultiFn::Count, &multi, &[], &ctx).unwrap(), ResolvedValue::int(3));
        assert_eq!(call(MultiFn::Join, &"solo".into(), &["-".into()], &ctx).unwrap(), ResolvedValue::str("solo"));
        assert_eq!(call(MultiFn::Count, &"solo".into(), &[], &ctx).unwrap(), ResolvedValue::int(1));
    }
}
