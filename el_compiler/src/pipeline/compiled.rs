use crate::catalog::ValueType;
use crate::grammar::ast::Expression;
use std::fmt;
use std::sync::Arc;

/// A resolved expression together with the source it came from.
///
/// Cheap to clone and safe to share between threads; evaluating it never
/// changes it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    source: Arc<str>,
    expression: Arc<Expression>,
    result_type: ValueType,
}

impl CompiledExpression {
    pub fn new(source: &str, expression: Expression, result_type: ValueType) -> Self {
        Self {
            source: Arc::from(source),
            expression: Arc::new(expression),
            result_type,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn shared_expression(&self) -> Arc<Expression> {
        Arc::clone(&self.expression)
    }

    /// Statically known result type; `Any` when it depends on the values
    pub fn result_type(&self) -> ValueType {
        self.result_type
    }

    /// True when the source had no `${...}` or `#{...}` at all
    pub fn is_plain_text(&self) -> bool {
        matches!(
            self.expression.as_ref(),
            Expression::Literal(crate::grammar::ast::Literal::Str(_))
        )
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.result_type)
    }
}
