pub mod environment;
pub mod error;
pub mod value;

pub use environment::{parse_assignment, AttributeEnvironment};
pub use error::{EvalError, EvalResult};
pub use value::{format_float, Number, ResolvedValue};
