use super::error::ReplayError;
use super::types::{matches_expected, ErrorDetail, ReplayReport, Sample, SampleOutcome, SampleStatus};
use crate::execution::evaluate;
use crate::logging::{log_consumer_error, log_consumer_info, log_consumer_success, with_consumer_context};
use crate::types::ResolvedValue;
use el_compiler::logging::codes;
use std::collections::HashSet;
use std::path::Path;

/// Load a JSON array of samples; sample ids must be unique
pub fn load_corpus(path: &Path) -> Result<Vec<Sample>, ReplayError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| ReplayError::CorpusUnreadable {
        path: display.clone(),
        reason: e.to_string(),
    })?;
    parse_corpus(&content, &display)
}

pub fn parse_corpus(content: &str, origin: &str) -> Result<Vec<Sample>, ReplayError> {
    let samples: Vec<Sample> = serde_json::from_str(content).map_err(|e| ReplayError::CorpusInvalid {
        path: origin.to_string(),
        reason: e.to_string(),
    })?;

    let mut seen = HashSet::new();
    for sample in &samples {
        if !seen.insert(sample.id.as_str()) {
            return Err(ReplayError::DuplicateSampleId {
                path: origin.to_string(),
                id: sample.id.clone(),
            });
        }
    }
    Ok(samples)
}

/// Load and replay a corpus file
pub fn replay_file(path: &Path) -> Result<ReplayReport, ReplayError> {
    let samples = load_corpus(path).inspect_err(|e| {
        log_consumer_error(e.error_code(), &e.to_string(), &[("corpus", &path.display().to_string())]);
    })?;
    Ok(replay_samples(&path.display().to_string(), &samples))
}

/// Replay every sample; one failing sample never stops the others
pub fn replay_samples(corpus: &str, samples: &[Sample]) -> ReplayReport {
    log_consumer_info(
        "Replaying sample corpus",
        &[("corpus", corpus), ("samples", &samples.len().to_string())],
    );

    let mut report = ReplayReport::new(corpus);
    for (index, sample) in samples.iter().enumerate() {
        let outcome = with_consumer_context(&sample.id, index, || replay_sample(sample));
        report.add_outcome(outcome);
    }
    report.finalize();

    log_consumer_success(
        codes::success::REPLAY_COMPLETE,
        "Sample replay complete",
        &[
            ("corpus", corpus),
            ("passed", &report.passed.to_string()),
            ("total", &report.total.to_string()),
        ],
    );
    report
}

pub fn replay_sample(sample: &Sample) -> SampleOutcome {
    let mut outcome = SampleOutcome {
        id: sample.id.clone(),
        description: sample.description.clone(),
        expression: sample.expression.clone(),
        status: SampleStatus::Passed,
        expected: sample.expected.clone(),
        actual: None,
        actual_type: None,
        error: None,
        detail: None,
    };

    let compiled = match el_compiler::compile_cached(&sample.expression) {
        Ok(compiled) => compiled,
        Err(e) => {
            let detail = ErrorDetail {
                kind: e.kind().as_str().to_string(),
                code: e.error_code().to_string(),
                message: e.to_string(),
            };
            return expect_error(outcome, sample, detail, SampleStatus::CompileError);
        }
    };

    let value = match evaluate(&compiled, &sample.environment()) {
        Ok(value) => value,
        Err(e) => {
            let detail = ErrorDetail {
                kind: e.kind().to_string(),
                code: e.error_code().to_string(),
                message: e.to_string(),
            };
            return expect_error(outcome, sample, detail, SampleStatus::EvaluationError);
        }
    };

    outcome.actual = Some(value.to_json());
    outcome.actual_type = Some(value.type_name().to_string());

    if let Some(kind) = &sample.expected_error {
        return mismatch(outcome, format!("expected {} but evaluation succeeded", kind));
    }
    if !matches_expected(&value, &sample.expected) {
        let detail = format!("expected {} but got {}", sample.expected, describe(&value));
        return mismatch(outcome, detail);
    }
    if let Some(expected_type) = &sample.result_type {
        let static_type = compiled.result_type().to_string();
        let type_matches = expected_type.eq_ignore_ascii_case(value.type_name())
            || expected_type.eq_ignore_ascii_case(&static_type);
        if !type_matches {
            let detail = format!("expected type {} but got {} ({})", expected_type, value.type_name(), static_type);
            return mismatch(outcome, detail);
        }
    }
    outcome
}

fn describe(value: &ResolvedValue) -> String {
    format!("{} ({})", value.to_json(), value.type_name())
}

fn mismatch(mut outcome: SampleOutcome, detail: String) -> SampleOutcome {
    log_consumer_error(
        codes::replay::SAMPLE_MISMATCH,
        "Sample output differs from capture",
        &[("sample", &outcome.id), ("detail", &detail)],
    );
    outcome.status = SampleStatus::Mismatch;
    outcome.detail = Some(detail);
    outcome
}

/// A failure counts as a pass when the sample expects exactly that kind
fn expect_error(
    mut outcome: SampleOutcome,
    sample: &Sample,
    detail: ErrorDetail,
    status: SampleStatus,
) -> SampleOutcome {
    let expected = sample.expected_error.as_deref() == Some(detail.kind.as_str());
    if !expected {
        outcome.status = status;
        outcome.detail = Some(match &sample.expected_error {
            Some(kind) => format!("expected {} but failed with {}", kind, detail.kind),
            None => detail.message.clone(),
        });
    }
    outcome.error = Some(detail);
    outcome
}
