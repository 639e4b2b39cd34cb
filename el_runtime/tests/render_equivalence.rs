use el_compiler::render::python_prelude;
use el_compiler::{compile, render_source, Dialect};
use el_runtime::replay::types::matches_expected;
use el_runtime::{evaluate, render, AttributeEnvironment, RenderTarget};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::io::Write;
use std::process::Command;

const CORPUS: &[&str] = &[
    "${filename}",
    "${filename:toUpper()}",
    "${filename:substringBefore('.'):append('.bak')}",
    "report-${filename:substringAfterLast('.')}",
    "${filename:equals(${expected})}",
    "${size:plus(1):multiply(2)}",
    "${size:toNumber():gt(10):ifElse('large', 'small')}",
    "${missing:replaceNull('n/a')}",
    "${filename:replaceAll('[aeiou]', '_')}",
    "${filename:replaceAll('(a)', '$10')}",
    "${filename:replaceFirst('(\\w)(\\w)', '$2$1')}",
    "${filename:length():mod(3)}",
    "${allAttributes('filename', 'expected'):join('+')}",
    "${anyAttribute('filename', 'expected'):contains('.')}",
    "${allMatchingAttributes('f.*'):isEmpty()}",
    "${literal('x'):append(${size})}",
    "${#{env}:toLower()}",
    "${'quoted name':trim()}",
    "$${kept} ${size:toRadix(16, 4)}",
    "${size:toRadix(2):fromRadix(2)}",
    "${filename:escapeJson():base64Encode():base64Decode()}",
    "${size:math('sqrt')}",
    "${filename:padLeft(12, '*'):padRight(14)}",
    "${filename:padLeft(9223372036854775807)}",
    "${filename:repeat(2)}",
    "${size:multiply(3600000):format('yyyy-MM-dd HH:mm:ss zzz', '+02:00'):toDate('yyyy-MM-dd HH:mm:ss zzz'):toNumber()}",
];

const NAMES: &[&str] = &["a.txt", "ARCHIVE.tar.gz", "noext", "", "  spaced . name  "];

#[derive(Debug)]
struct Inputs {
    attributes: BTreeMap<String, String>,
    parameters: BTreeMap<String, String>,
}

impl Inputs {
    fn random(rng: &mut StdRng) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("filename".to_string(), NAMES[rng.random_range(0..NAMES.len())].to_string());
        attributes.insert("expected".to_string(), NAMES[rng.random_range(0..NAMES.len())].to_string());
        attributes.insert("size".to_string(), rng.random_range(0..64).to_string());
        if rng.random_bool(0.5) {
            attributes.insert("quoted name".to_string(), " padded ".to_string());
        }
        let parameters = BTreeMap::from([("env".to_string(), "PROD".to_string())]);
        Self { attributes, parameters }
    }

    fn environment(&self) -> AttributeEnvironment {
        let env = AttributeEnvironment::from_pairs(self.attributes.clone());
        self.parameters
            .iter()
            .fold(env, |env, (name, value)| env.with_parameter(name.as_str(), value.as_str()))
    }
}

fn environment(rng: &mut StdRng) -> AttributeEnvironment {
    Inputs::random(rng).environment()
}

#[test]
fn canonical_rendering_evaluates_identically() {
    let mut rng = StdRng::seed_from_u64(42);
    for source in CORPUS {
        let compiled = compile(source).unwrap_or_else(|e| panic!("{source}: {e}"));
        let canonical = render_source(&compiled, Dialect::Canonical).unwrap();
        let recompiled = compile(&canonical).unwrap_or_else(|e| panic!("{canonical}: {e}"));
        assert_eq!(compiled.expression(), recompiled.expression(), "{source} -> {canonical}");

        for _ in 0..10 {
            let env = environment(&mut rng);
            assert_eq!(evaluate(&compiled, &env), evaluate(&recompiled, &env), "{source} -> {canonical}");
        }
    }
}

#[test]
fn evaluator_artifact_matches_direct_evaluation() {
    let mut rng = StdRng::seed_from_u64(43);
    for source in CORPUS {
        let compiled = compile(source).unwrap();
        let artifact = render(&compiled, RenderTarget::Evaluator).unwrap();
        for _ in 0..10 {
            let env = environment(&mut rng);
            assert_eq!(artifact.call(&env), Some(evaluate(&compiled, &env)), "{source}");
        }
    }
}

const PYTHON_DRIVER: &str = r#"

import json as _json
import sys as _sys


def _plain(v):
    if isinstance(v, datetime):
        return el_str(v)
    if isinstance(v, list):
        return [_plain(x) for x in v]
    if isinstance(v, float) and (v != v or math.isinf(v)):
        return el_str(v)
    return v


with open(_sys.argv[1]) as _cases:
    for _case in _json.load(_cases):
        try:
            _value = EXPRESSIONS[_case['expression']](_case['attributes'], _case['parameters'])
            _result = {'value': _plain(_value)}
        except Exception as _e:
            _result = {'error': type(_e).__name__}
        print(_json.dumps(_result))
"#;

fn python3_available() -> bool {
    Command::new("python3")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

#[test]
fn python_rendering_evaluates_identically() {
    if !python3_available() {
        eprintln!("python3 not found, skipping executed Python comparison");
        return;
    }

    let mut script = String::from(python_prelude());
    script.push_str("\n\nEXPRESSIONS = [\n");
    let mut compiled = Vec::with_capacity(CORPUS.len());
    for source in CORPUS {
        let expression = compile(source).unwrap();
        let python = render_source(&expression, Dialect::Python).unwrap_or_else(|e| panic!("{source}: {e}"));
        script.push_str(&format!("    lambda attributes, parameters: ({}),\n", python));
        compiled.push(expression);
    }
    script.push_str("]\n");
    script.push_str(PYTHON_DRIVER);

    let mut rng = StdRng::seed_from_u64(44);
    let mut cases = Vec::new();
    let mut expected = Vec::new();
    for (index, expression) in compiled.iter().enumerate() {
        for _ in 0..8 {
            let inputs = Inputs::random(&mut rng);
            expected.push((index, evaluate(expression, &inputs.environment()), inputs.attributes.clone()));
            cases.push(serde_json::json!({
                "expression": index,
                "attributes": inputs.attributes,
                "parameters": inputs.parameters,
            }));
        }
    }

    let mut script_file = tempfile::NamedTempFile::new().unwrap();
    script_file.write_all(script.as_bytes()).unwrap();
    let mut cases_file = tempfile::NamedTempFile::new().unwrap();
    serde_json::to_writer(&mut cases_file, &cases).unwrap();
    cases_file.flush().unwrap();

    let output = Command::new("python3")
        .arg(script_file.path())
        .arg(cases_file.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let results: Vec<serde_json::Value> = stdout.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
    assert_eq!(results.len(), expected.len());

    for ((index, evaluated, attributes), python) in expected.iter().zip(&results) {
        let source = CORPUS[*index];
        match (evaluated, python.get("value")) {
            (Ok(value), Some(rendered)) => assert!(
                matches_expected(value, rendered),
                "{source} with {attributes:?}: evaluated {value:?}, python gave {rendered}"
            ),
            (Err(_), None) => {}
            (evaluated, _) => panic!("{source} with {attributes:?}: evaluated {evaluated:?}, python gave {python}"),
        }
    }
}
