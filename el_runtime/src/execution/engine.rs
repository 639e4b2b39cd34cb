//! # Evaluation Engine
//!
//! Post-order walk over a resolved expression tree. Arguments are evaluated
//! before the call that receives them; chains run strictly left to right.
use crate::functions::{self, coercion, EvalContext};
use crate::types::{AttributeEnvironment, EvalError, EvalResult, ResolvedValue};
use chrono::FixedOffset;
use el_compiler::catalog::{self, FunctionSignature};
use el_compiler::utils::guarded;
use el_compiler::{Expression, FunctionCall, Literal, Quantifier};

/// Evaluates expressions against one attribute environment
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    ctx: EvalContext<'a>,
}

impl<'a> Evaluator<'a> {
    /// Evaluator using the configured default time zone
    pub fn new(env: &'a AttributeEnvironment) -> Self {
        Self::with_zone(env, super::default_zone())
    }

    pub fn with_zone(env: &'a AttributeEnvironment, zone: FixedOffset) -> Self {
        Self {
            ctx: EvalContext::new(env, zone),
        }
    }

    pub(crate) fn from_context(ctx: EvalContext<'a>) -> Self {
        Self { ctx }
    }

    pub fn evaluate(&self, expr: &Expression) -> EvalResult<ResolvedValue> {
        guarded(|| self.evaluate_node(expr))
    }

    fn evaluate_node(&self, expr: &Expression) -> EvalResult<ResolvedValue> {
        match expr {
            Expression::AttributeReference(name) => Ok(self.attribute_or_empty(name)),
            Expression::DynamicAttributeReference(inner) => {
                let name = coercion::to_string(&self.evaluate(inner)?);
                Ok(self.attribute_or_empty(&name))
            }
            Expression::ParameterReference(name) => Ok(ResolvedValue::str(
                self.ctx.env.parameter(name).unwrap_or_default(),
            )),
            Expression::Literal(literal) => Ok(literal_value(literal)),
            Expression::StandaloneCall(call) => {
                if signature(call).is_some_and(|sig| sig.produces_multi) {
                    return Err(EvalError::UnreducedMultiValue {
                        name: call.name.clone(),
                    });
                }
                self.apply(call, &ResolvedValue::Null)
            }
            Expression::Chain {
                subject,
                calls,
                reduce,
            } => self.chain(subject, calls, *reduce),
            Expression::Embedded(inner) => self.evaluate(inner),
            Expression::Template(parts) => {
                let mut text = String::new();
                for part in parts {
                    text.push_str(&coercion::to_string(&self.evaluate(part)?));
                }
                Ok(ResolvedValue::Str(text))
            }
        }
    }

    fn attribute_or_empty(&self, name: &str) -> ResolvedValue {
        ResolvedValue::str(self.ctx.env.attribute(name).unwrap_or_default())
    }

    fn chain(
        &self,
        subject: &Expression,
        calls: &[FunctionCall],
        reduce: Option<Quantifier>,
    ) -> EvalResult<ResolvedValue> {
        let first_null_safe = calls
            .first()
            .and_then(signature)
            .is_some_and(|sig| sig.null_safe);

        let (mut current, producer) = match subject {
            Expression::AttributeReference(name) if first_null_safe => {
                let value = match self.ctx.env.attribute(name) {
                    Some(value) => ResolvedValue::str(value),
                    None => ResolvedValue::Null,
                };
                (value, None)
            }
            Expression::StandaloneCall(head) if signature(head).is_some_and(|sig| sig.produces_multi) => {
                (self.apply(head, &ResolvedValue::Null)?, Some(head.name.as_str()))
            }
            other => (self.evaluate(other)?, None),
        };
        let mut multi = producer.is_some();

        for call in calls {
            let reducing = signature(call).is_some_and(|sig| sig.is_reducing);
            current = match current {
                ResolvedValue::Multi(values) if multi && !reducing => {
                    let args = self.arguments(call)?;
                    let mut applied = Vec::with_capacity(values.len());
                    for value in &values {
                        applied.push(functions::call(call.function, value, &args, &self.ctx)?);
                    }
                    ResolvedValue::Multi(applied)
                }
                single => {
                    multi = false;
                    self.apply(call, &single)?
                }
            };
        }

        match reduce {
            Some(quantifier) => reduce_booleans(&current, quantifier).map(ResolvedValue::Bool),
            None if multi && current.is_multi() => Err(EvalError::UnreducedMultiValue {
                name: producer.unwrap_or_default().to_string(),
            }),
            None => Ok(current),
        }
    }

    fn arguments(&self, call: &FunctionCall) -> EvalResult<Vec<ResolvedValue>> {
        call.args.iter().map(|arg| self.evaluate(arg)).collect()
    }

    fn apply(&self, call: &FunctionCall, subject: &ResolvedValue) -> EvalResult<ResolvedValue> {
        let args = self.arguments(call)?;
        functions::call(call.function, subject, &args, &self.ctx)
    }
}

fn signature(call: &FunctionCall) -> Option<&'static FunctionSignature> {
    catalog::signature_of(call.function)
}

fn literal_value(literal: &Literal) -> ResolvedValue {
    match literal {
        Literal::Str(s) => ResolvedValue::str(s.as_str()),
        Literal::Integer(i) => ResolvedValue::int(*i),
        Literal::Decimal(d) => ResolvedValue::float(*d),
        Literal::Bool(b) => ResolvedValue::Bool(*b),
        Literal::Null => ResolvedValue::Null,
    }
}

fn reduce_booleans(value: &ResolvedValue, quantifier: Quantifier) -> EvalResult<bool> {
    let values = match value {
        ResolvedValue::Multi(values) => values.as_slice(),
        single => std::slice::from_ref(single),
    };
    let mut result = quantifier == Quantifier::All;
    for value in values {
        let b = coercion::to_bool(value)?;
        match quantifier {
            Quantifier::All => result &= b,
            Quantifier::Any => result |= b,
        }
    }
    Ok(result)
}
