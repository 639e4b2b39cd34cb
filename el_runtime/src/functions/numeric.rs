use super::arg;
use super::coercion::{to_int, to_number, to_string};
use crate::types::{EvalError, EvalResult, Number, ResolvedValue};
use el_compiler::catalog::NumericFn;
use std::cmp::Ordering;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn call(
    function: NumericFn,
    subject: &ResolvedValue,
    args: &[ResolvedValue],
) -> EvalResult<ResolvedValue> {
    match function {
        NumericFn::Plus => arithmetic(subject, arg(args, 0), Operator::Plus),
        NumericFn::Minus => arithmetic(subject, arg(args, 0), Operator::Minus),
        NumericFn::Multiply => arithmetic(subject, arg(args, 0), Operator::Multiply),
        NumericFn::Divide => arithmetic(subject, arg(args, 0), Operator::Divide),
        NumericFn::Mod => arithmetic(subject, arg(args, 0), Operator::Mod),
        NumericFn::Gt => compare(subject, arg(args, 0), |o| o == Ordering::Greater),
        NumericFn::Ge => compare(subject, arg(args, 0), |o| o != Ordering::Less),
        NumericFn::Lt => compare(subject, arg(args, 0), |o| o == Ordering::Less),
        NumericFn::Le => compare(subject, arg(args, 0), |o| o != Ordering::Greater),
        NumericFn::ToNumber => Ok(ResolvedValue::Num(to_number(subject)?)),
        NumericFn::ToDecimal => Ok(ResolvedValue::float(to_number(subject)?.as_f64())),
        NumericFn::Math => math(subject, &to_string(arg(args, 0)), args.get(1)),
        NumericFn::ToRadix => to_radix(subject, arg(args, 0), args.get(1)),
        NumericFn::FromRadix => from_radix(subject, arg(args, 0)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Mod,
}

/// Integer arithmetic wraps on overflow; a decimal operand promotes both sides
fn arithmetic(left: &ResolvedValue, right: &ResolvedValue, op: Operator) -> EvalResult<ResolvedValue> {
    let result = match (to_number(left)?, to_number(right)?) {
        (Number::Int(a), Number::Int(b)) => Number::Int(integer_op(a, b, op)?),
        (a, b) => Number::Float(float_op(a.as_f64(), b.as_f64(), op)),
    };
    Ok(ResolvedValue::Num(result))
}

fn integer_op(a: i64, b: i64, op: Operator) -> EvalResult<i64> {
    if b == 0 && matches!(op, Operator::Divide | Operator::Mod) {
        return Err(EvalError::Arithmetic {
            message: format!("{} by zero", if op == Operator::Divide { "division" } else { "modulo" }),
        });
    }
    Ok(match op {
        Operator::Plus => a.wrapping_add(b),
        Operator::Minus => a.wrapping_sub(b),
        Operator::Multiply => a.wrapping_mul(b),
        Operator::Divide => a.wrapping_div(b),
        Operator::Mod => a.wrapping_rem(b),
    })
}

fn float_op(a: f64, b: f64, op: Operator) -> f64 {
    match op {
        Operator::Plus => a + b,
        Operator::Minus => a - b,
        Operator::Multiply => a * b,
        Operator::Divide => a / b,
        Operator::Mod => a % b,
    }
}

fn compare(
    left: &ResolvedValue,
    right: &ResolvedValue,
    test: impl Fn(Ordering) -> bool,
) -> EvalResult<ResolvedValue> {
    let ordering = match (to_number(left)?, to_number(right)?) {
        (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
        (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
    };
    // NaN compares false against everything
    Ok(ordering.is_some_and(test).into())
}

fn math(subject: &ResolvedValue, op: &str, operand: Option<&ResolvedValue>) -> EvalResult<ResolvedValue> {
    let x = to_number(subject)?;
    let v = x.as_f64();
    let unary = |result: f64| Ok(ResolvedValue::float(result));

    match op {
        "abs" => Ok(match x {
            Number::Int(i) => ResolvedValue::int(i.wrapping_abs()),
            Number::Float(d) => ResolvedValue::float(d.abs()),
        }),
        "ceil" => unary(v.ceil()),
        "floor" => unary(v.floor()),
        "round" => Ok(ResolvedValue::int((v + 0.5).floor() as i64)),
        "sqrt" => unary(v.sqrt()),
        "cbrt" => unary(v.cbrt()),
        "signum" => unary(if v > 0.0 {
            1.0
        } else if v < 0.0 {
            -1.0
        } else {
            0.0
        }),
        "exp" => unary(v.exp()),
        "log" => unary(v.ln()),
        "log10" => unary(v.log10()),
        "sin" => unary(v.sin()),
        "cos" => unary(v.cos()),
        "tan" => unary(v.tan()),
        "pow" | "max" | "min" => {
            let operand = operand.ok_or_else(|| {
                EvalError::invalid_argument("math", format!("{} needs a second argument", op))
            })?;
            let y = to_number(operand)?;
            Ok(match (op, x, y) {
                ("pow", _, _) => ResolvedValue::float(v.powf(y.as_f64())),
                ("max", Number::Int(a), Number::Int(b)) => ResolvedValue::int(a.max(b)),
                ("min", Number::Int(a), Number::Int(b)) => ResolvedValue::int(a.min(b)),
                ("max", _, _) => ResolvedValue::float(v.max(y.as_f64())),
                _ => ResolvedValue::float(v.min(y.as_f64())),
            })
        }
        other => Err(EvalError::Unsupported {
            name: format!("math:{}", other),
        }),
    }
}

fn check_radix(radix: i64) -> EvalResult<u32> {
    match u32::try_from(radix) {
        Ok(r) if (2..=36).contains(&r) => Ok(r),
        _ => Err(EvalError::invalid_argument("radix", format!("{} is outside 2-36", radix))),
    }
}

fn to_radix(
    subject: &ResolvedValue,
    radix: &ResolvedValue,
    padding: Option<&ResolvedValue>,
) -> EvalResult<ResolvedValue> {
    let n = to_int(subject)?;
    let r = u64::from(check_radix(to_int(radix)?)?);

    let mut digits = Vec::new();
    let mut m = n.unsigned_abs();
    loop {
        digits.push(DIGITS[(m % r) as usize] as char);
        m /= r;
        if m == 0 {
            break;
        }
    }
    if let Some(padding) = padding {
        let width = usize::try_from(to_int(padding)?).unwrap_or(0);
        while digits.len() < width {
            digits.push('0');
        }
    }
    let mut text: String = digits.into_iter().rev().collect();
    if n < 0 {
        text.insert(0, '-');
    }
    Ok(ResolvedValue::Str(text))
}

fn from_radix(subject: &ResolvedValue, radix: &ResolvedValue) -> EvalResult<ResolvedValue> {
    let r = check_radix(to_int(radix)?)?;
    let text = to_string(subject);
    let parsed = i64::from_str_radix(text.trim(), r)
        .map_err(|_| EvalError::coercion(text.clone(), "number"))?;
    Ok(ResolvedValue::int(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn eval(function: NumericFn, subject: ResolvedValue, args: &[ResolvedValue]) -> ResolvedValue {
        call(function, &subject, args).unwrap()
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(eval(NumericFn::Plus, "5".into(), &[ResolvedValue::int(3)]), ResolvedValue::int(8));
        assert_eq!(eval(NumericFn::Minus, ResolvedValue::int(5), &["7".into()]), ResolvedValue::int(-2));
        assert_eq!(eval(NumericFn::Divide, ResolvedValue::int(7), &[ResolvedValue::int(2)]), ResolvedValue::int(3));
        assert_eq!(eval(NumericFn::Divide, ResolvedValue::int(-7), &[ResolvedValue::int(2)]), ResolvedValue::int(-3));
        assert_eq!(eval(NumericFn::Mod, ResolvedValue::int(-7), &[ResolvedValue::int(2)]), ResolvedValue::int(-1));
        assert_eq!(
            eval(NumericFn::Plus, ResolvedValue::int(i64::MAX), &[ResolvedValue::int(1)]),
            ResolvedValue::int(i64::MIN)
        );
    }

    #[test]
    fn test_decimal_promotion() {
        assert_eq!(eval(NumericFn::Plus, "1.5".into(), &[ResolvedValue::int(1)]), ResolvedValue::float(2.5));
        assert_eq!(eval(NumericFn::Divide, ResolvedValue::int(7), &["2.0".into()]), ResolvedValue::float(3.5));
        assert_eq!(eval(NumericFn::ToDecimal, "4".into(), &[]), ResolvedValue::float(4.0));
        assert_eq!(eval(NumericFn::ToNumber, " 42 ".into(), &[]), ResolvedValue::int(42));
    }

    #[test]
    fn test_division_by_zero() {
        assert_matches!(
            call(NumericFn::Divide, &ResolvedValue::int(1), &[ResolvedValue::int(0)]),
            Err(EvalError::Arithmetic { .. })
        );
        assert_matches!(
            call(NumericFn::Mod, &ResolvedValue::int(1), &["0".into()]),
            Err(EvalError::Arithmetic { .. })
        );
        let inf = eval(NumericFn::Divide, ResolvedValue::float(1.0), &[ResolvedValue::int(0)]);
        assert_eq!(inf.to_string(), "Infinity");
        let nan = eval(NumericFn::Mod, ResolvedValue::float(1.0), &[ResolvedValue::int(0)]);
        assert_eq!(nan.to_string(), "NaN");
    }

    #[test]
    fn test_comparisons() {
        let yes = ResolvedValue::Bool(true);
        assert_eq!(eval(NumericFn::Gt, "10".into(), &["9".into()]), yes);
        assert_eq!(eval(NumericFn::Ge, ResolvedValue::int(3), &["3.0".into()]), yes);
        assert_eq!(eval(NumericFn::Lt, "-1".into(), &[ResolvedValue::int(0)]), yes);
        assert_eq!(eval(NumericFn::Le, ResolvedValue::float(f64::NAN), &[ResolvedValue::int(0)]), ResolvedValue::Bool(false));
        assert_matches!(
            call(NumericFn::Gt, &"ten".into(), &[ResolvedValue::int(1)]),
            Err(EvalError::TypeCoercion { .. })
        );
    }

    #[test]
    fn test_math_operations() {
        let m = |x: ResolvedValue, op: &str| eval(NumericFn::Math, x, &[op.into()]);
        assert_eq!(m(ResolvedValue::int(-4), "abs"), ResolvedValue::int(4));
        assert_eq!(m(ResolvedValue::int(16), "sqrt"), ResolvedValue::float(4.0));
        assert_eq!(m("2.5".into(), "round"), ResolvedValue::int(3));
        assert_eq!(m("-2.5".into(), "round"), ResolvedValue::int(-2));
        assert_eq!(m(ResolvedValue::float(1.2), "ceil"), ResolvedValue::float(2.0));
        assert_eq!(m(ResolvedValue::int(0), "signum"), ResolvedValue::float(0.0));
        assert_eq!(
            eval(NumericFn::Math, ResolvedValue::int(2), &["pow".into(), ResolvedValue::int(10)]),
            ResolvedValue::float(1024.0)
        );
        assert_eq!(
            eval(NumericFn::Math, ResolvedValue::int(2), &["max".into(), ResolvedValue::int(7)]),
            ResolvedValue::int(7)
        );
        assert_matches!(
            call(NumericFn::Math, &ResolvedValue::int(1), &["gamma".into()]),
            Err(EvalError::Unsupported { name }) if name == "math:gamma"
        );
        assert_matches!(
            call(NumericFn::Math, &ResolvedValue::int(1), &["pow".into()]),
            Err(EvalError::InvalidArgument { .. })
        );
    }

    #[test]
    fn test_radix_conversion() {
        let to = |n: i64, radix: i64| eval(NumericFn::ToRadix, ResolvedValue::int(n), &[ResolvedValue::int(radix)]);
        assert_eq!(to(255, 16), ResolvedValue::str("ff"));
        assert_eq!(to(-5, 2), ResolvedValue::str("-101"));
        assert_eq!(to(0, 36), ResolvedValue::str("0"));
        assert_eq!(
            eval(NumericFn::ToRadix, ResolvedValue::int(5), &[ResolvedValue::int(2), ResolvedValue::int(8)]),
            ResolvedValue::str("00000101")
        );
        assert_eq!(eval(NumericFn::FromRadix, "ff".into(), &[ResolvedValue::int(16)]), ResolvedValue::int(255));
        assert_eq!(eval(NumericFn::FromRadix, "-101".into(), &[ResolvedValue::int(2)]), ResolvedValue::int(-5));
        assert_matches!(
            call(NumericFn::ToRadix, &ResolvedValue::int(5), &[ResolvedValue::int(37)]),
            Err(EvalError::InvalidArgument { .. })
        );
        assert_matches!(
            call(NumericFn::FromRadix, &"zz".into(), &[ResolvedValue::int(10)]),
            Err(EvalError::TypeCoercion { .. })
        );
    }

    #[test]
    fn test_from_radix_rejects_values_wider_than_64_bits() {
        assert_matches!(
            call(NumericFn::FromRadix, &"ffffffffffffffffff".into(), &[ResolvedValue::int(16)]),
            Err(EvalError::TypeCoercion { expected_kind: "number", .. })
        );
        assert_matches!(
            call(NumericFn::FromRadix, &"8000000000000000".into(), &[ResolvedValue::int(16)]),
            Err(EvalError::TypeCoercion { .. })
        );
        assert_eq!(
            eval(NumericFn::FromRadix, "7fffffffffffffff".into(), &[ResolvedValue::int(16)]),
            ResolvedValue::int(i64::MAX)
        );
        assert_eq!(
            eval(NumericFn::FromRadix, "-8000000000000000".into(), &[ResolvedValue::int(16)]),
            ResolvedValue::int(i64::MIN)
        );
    }
}
