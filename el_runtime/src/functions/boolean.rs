use super::coercion::{to_bool, to_string};
use super::{arg, compile_full_regex, compile_regex};
use crate::types::{EvalResult, ResolvedValue};
use el_compiler::catalog::BooleanFn;

pub fn call(
    function: BooleanFn,
    subject: &ResolvedValue,
    args: &[ResolvedValue],
) -> EvalResult<ResolvedValue> {
    let s = || to_string(subject);
    let text = |i: usize| to_string(arg(args, i));

    Ok(match function {
        BooleanFn::IsNull => subject.is_null().into(),
        BooleanFn::NotNull => (!subject.is_null()).into(),
        BooleanFn::IsEmpty => s().trim().is_empty().into(),
        BooleanFn::Equals => (s() == text(0)).into(),
        BooleanFn::EqualsIgnoreCase => (s().to_lowercase() == text(0).to_lowercase()).into(),
        BooleanFn::StartsWith => s().starts_with(&text(0)).into(),
        BooleanFn::EndsWith => s().ends_with(&text(0)).into(),
        BooleanFn::Contains => s().contains(&text(0)).into(),
        BooleanFn::In => {
            let subject = s();
            args.iter().any(|candidate| to_string(candidate) == subject).into()
        }
        BooleanFn::Matches => compile_full_regex(&text(0))?.is_match(&s()).into(),
        BooleanFn::Find => compile_regex(&text(0))?.is_match(&s()).into(),
        BooleanFn::Not => (!to_bool(subject)?).into(),
        BooleanFn::And => {
            let (left, right) = (to_bool(subject)?, to_bool(arg(args, 0))?);
            (left && right).into()
        }
        BooleanFn::Or => {
            let (left, right) = (to_bool(subject)?, to_bool(arg(args, 0))?);
            (left || right).into()
        }
        BooleanFn::IfElse => {
            if to_bool(subject)? {
                arg(args, 0).clone()
            } else {
                arg(args, 1).clone()
            }
        }
    })
}
