//! Randomized checks over generated attribute sets
//!
//! Seeds are fixed so failures reproduce.

use el_compiler::compile;
use el_runtime::{evaluate, AttributeEnvironment, ResolvedValue};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ROUNDS: usize = 200;
const TEXT_ALPHABET: &[u8] = b"abcdefxyzABCXYZ0123456789 _-";

fn random_text(rng: &mut StdRng, max_len: usize) -> String {
    let len = rng.random_range(0..=max_len);
    (0..len)
        .map(|_| TEXT_ALPHABET[rng.random_range(0..TEXT_ALPHABET.len())] as char)
        .collect()
}

fn random_name(rng: &mut StdRng) -> String {
    let len = rng.random_range(1..=6);
    let suffix: String = (0..len).map(|_| rng.random_range(b'a'..=b'z') as char).collect();
    format!("attr_{suffix}")
}

fn random_environment(rng: &mut StdRng) -> AttributeEnvironment {
    let count = rng.random_range(0..6);
    let mut env = AttributeEnvironment::new();
    for _ in 0..count {
        let name = random_name(rng);
        let value = random_text(rng, 12);
        env = env.with_attribute(name, value);
    }
    env
}

fn eval(source: &str, env: &AttributeEnvironment) -> ResolvedValue {
    let compiled = compile(source).unwrap_or_else(|e| panic!("{source}: {e}"));
    evaluate(&compiled, env).unwrap_or_else(|e| panic!("{source}: {e}"))
}

#[test]
fn absent_attributes_read_as_empty_text() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..ROUNDS {
        let env = random_environment(&mut rng);
        let name = random_name(&mut rng);
        if env.has_attribute(&name) {
            continue;
        }
        assert_eq!(eval(&format!("${{{name}}}"), &env), ResolvedValue::str(""));
        assert_eq!(eval(&format!("${{{name}:isEmpty()}}"), &env), ResolvedValue::Bool(true));
        assert_eq!(eval(&format!("${{{name}:isNull()}}"), &env), ResolvedValue::Bool(true));
        assert_eq!(eval(&format!("${{{name}:toUpper()}}"), &env), ResolvedValue::str(""));
    }
}

#[test]
fn missing_delimiter_returns_subject_unchanged() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..ROUNDS {
        let value = random_text(&mut rng, 16);
        let env = AttributeEnvironment::new().with_attribute("attr_value", value.clone());
        for function in ["substringBefore", "substringAfter", "substringBeforeLast", "substringAfterLast"] {
            let source = format!("${{attr_value:{function}('|')}}");
            assert_eq!(eval(&source, &env), ResolvedValue::str(value.clone()), "{source}");
        }
    }
}

#[test]
fn substring_split_reassembles_subject() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..ROUNDS {
        let value = format!("{}|{}", random_text(&mut rng, 8), random_text(&mut rng, 8));
        let env = AttributeEnvironment::new().with_attribute("attr_value", value.clone());
        let before = eval("${attr_value:substringBefore('|')}", &env).to_string();
        let after = eval("${attr_value:substringAfter('|')}", &env).to_string();
        assert_eq!(format!("{before}|{after}"), value);
    }
}

#[test]
fn chained_calls_compose() {
    const STEPS: &[&str] = &[
        "toUpper()",
        "toLower()",
        "trim()",
        "append('_z')",
        "prepend('q_')",
        "substringAfter('a')",
        "replace('0', 'o')",
    ];
    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..ROUNDS {
        let first = STEPS[rng.random_range(0..STEPS.len())];
        let second = STEPS[rng.random_range(0..STEPS.len())];
        let env = AttributeEnvironment::new().with_attribute("attr_value", random_text(&mut rng, 12));

        let chained = eval(&format!("${{attr_value:{first}:{second}}}"), &env);
        let intermediate = eval(&format!("${{attr_value:{first}}}"), &env).to_string();
        let staged = eval(
            &format!("${{attr_step:{second}}}"),
            &AttributeEnvironment::new().with_attribute("attr_step", intermediate),
        );
        assert_eq!(chained, staged, "{first} then {second}");
    }
}

#[test]
fn integer_arithmetic_stays_integral() {
    let mut rng = StdRng::seed_from_u64(19);
    for _ in 0..ROUNDS {
        let a = rng.random_range(-10_000i64..10_000);
        let b = rng.random_range(-10_000i64..10_000);
        let env = AttributeEnvironment::new().with_attribute("attr_n", a.to_string());

        assert_eq!(eval(&format!("${{attr_n:plus({b})}}"), &env), ResolvedValue::int(a + b));
        assert_eq!(eval(&format!("${{attr_n:minus({b})}}"), &env), ResolvedValue::int(a - b));
        assert_eq!(eval(&format!("${{attr_n:multiply({b})}}"), &env), ResolvedValue::int(a * b));
        if b != 0 {
            assert_eq!(eval(&format!("${{attr_n:divide({b})}}"), &env), ResolvedValue::int(a / b));
        }
        assert_eq!(eval(&format!("${{attr_n:gt({b})}}"), &env), ResolvedValue::Bool(a > b));
    }
}

#[test]
fn decimal_operand_makes_result_decimal() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..ROUNDS {
        let a = rng.random_range(-1_000i64..1_000);
        let env = AttributeEnvironment::new().with_attribute("attr_n", a.to_string());
        let value = eval("${attr_n:plus(0.5)}", &env);
        assert_eq!(value, ResolvedValue::float(a as f64 + 0.5));
        assert_eq!(value.type_name(), "decimal");
    }
}

#[test]
fn compilation_is_deterministic() {
    const SOURCES: &[&str] = &[
        "${attr_a:toUpper():append(${attr_b})}",
        "file_${attr_a:substringBefore('.')}.${attr_b:toLower()}",
        "${attr_a:length():plus(${attr_b:length()})}",
        "${attr_a:isEmpty():ifElse('empty', ${attr_a})}",
        "${anyAttribute('attr_a', 'attr_b'):isEmpty()}",
    ];
    let mut rng = StdRng::seed_from_u64(29);
    for source in SOURCES {
        let first = compile(source).unwrap();
        let second = compile(source).unwrap();
        assert_eq!(first.expression(), second.expression());
        for _ in 0..ROUNDS / 10 {
            let env = AttributeEnvironment::new()
                .with_attribute("attr_a", random_text(&mut rng, 8))
                .with_attribute("attr_b", random_text(&mut rng, 8));
            assert_eq!(evaluate(&first, &env), evaluate(&second, &env), "{source}");
        }
    }
}

#[test]
fn escaped_references_stay_literal() {
    let mut rng = StdRng::seed_from_u64(31);
    for _ in 0..ROUNDS {
        let name = random_name(&mut rng);
        let env = random_environment(&mut rng).with_attribute(name.clone(), random_text(&mut rng, 6));
        let source = format!("pre_$${{{name}}}_post");
        assert_eq!(eval(&source, &env), ResolvedValue::str(format!("pre_${{{name}}}_post")));
    }
}
