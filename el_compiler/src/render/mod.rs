//! Rendering compiled expressions into target dialects
//!
//! The canonical dialect is normalized EL text. The Python dialect is an
//! expression over `attributes`/`parameters` dicts that relies on the helper
//! module returned by [`python_prelude`].

pub mod canonical;
mod prelude;
mod python;

pub use prelude::python_prelude;
pub use python::{py_str, PythonRenderer};

use crate::grammar::ast::Expression;
use crate::logging::{codes, Code};
use crate::pipeline::CompiledExpression;
use crate::{log_error, log_success};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Canonical,
    Python,
}

impl Dialect {
    pub const ALL: [Dialect; 2] = [Dialect::Canonical, Dialect::Python];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Canonical => "canonical",
            Dialect::Python => "python",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "canonical" | "el" => Some(Dialect::Canonical),
            "python" | "py" => Some(Dialect::Python),
            _ => None,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("'{function}' cannot be rendered in the {dialect} dialect")]
    UnsupportedInDialect { function: String, dialect: Dialect },
}

impl RenderError {
    pub fn error_code(&self) -> Code {
        match self {
            RenderError::UnsupportedInDialect { .. } => codes::render::UNSUPPORTED_IN_DIALECT,
        }
    }
}

pub fn render_expression(expr: &Expression, dialect: Dialect) -> Result<String, RenderError> {
    let rendered = match dialect {
        Dialect::Canonical => Ok(canonical::render(expr)),
        Dialect::Python => PythonRenderer::new().render(expr),
    };

    match &rendered {
        Ok(text) => {
            log_success!(
                codes::success::RENDER_COMPLETE,
                "Expression rendered",
                "dialect" => dialect,
                "output_bytes" => text.len()
            );
        }
        Err(e) => {
            log_error!(e.error_code(), &e.to_string(), "dialect" => dialect);
        }
    }
    rendered
}

/// Render a compiled expression in the requested dialect
pub fn render_source(
    compiled: &CompiledExpression,
    dialect: Dialect,
) -> Result<String, RenderError> {
    render_expression(compiled.expression(), dialect)
}
