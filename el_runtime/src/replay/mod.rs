//! # Sample Replay
//!
//! Replays captured samples (an expression, the attribute snapshot it ran
//! against and the value it produced) through the evaluator and reports
//! every difference.
//!
//! ## Usage
//! ```no_run
//! use el_runtime::replay::replay_file;
//!
//! let report = replay_file(std::path::Path::new("samples.json")).unwrap();
//! println!("{}", report.summary());
//! ```

pub mod error;
pub mod runner;
pub mod types;

pub use error::ReplayError;
pub use runner::{load_corpus, parse_corpus, replay_file, replay_sample, replay_samples};
pub use types::{ErrorDetail, ReplayReport, Sample, SampleOutcome, SampleStatus};
