//! Concrete syntax tree to typed expression
//!
//! Every call is bound to its catalog signature here, so arity, subject,
//! support and multi-value problems surface before anything is evaluated.

use super::error::{ResolveError, ResolveResult};
use crate::catalog::{self, Function, FunctionSignature, MultiFn, NumericFn, StandaloneFn, ValueType};
use crate::grammar::ast::{Expression, FunctionCall, Literal, Quantifier};
use crate::grammar::cst::{CstArg, CstCall, CstExpr, CstPart, CstSubject, CstTemplate};
use crate::log_debug;
use crate::tokens::NumberLiteral;
use crate::utils::guarded;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionMetrics {
    pub expressions: usize,
    pub calls: usize,
    pub multi_value_chains: usize,
    pub longest_chain: usize,
}

/// Whether the value flowing through a chain is one value or several
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Single,
    Multi {
        quantifier: Quantifier,
        element: ValueType,
    },
}

#[derive(Debug, Default)]
pub struct Resolver {
    metrics: ResolutionMetrics,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> &ResolutionMetrics {
        &self.metrics
    }

    pub fn resolve_template(&mut self, template: &CstTemplate) -> ResolveResult<Expression> {
        match template.parts.as_slice() {
            [] => Ok(Expression::string("")),
            [CstPart::Expr(expr)] => self.resolve_expression(expr),
            [CstPart::Param(name)] => Ok(Expression::ParameterReference(name.value.clone())),
            parts if parts.iter().all(|p| matches!(p, CstPart::Text(_))) => {
                let text: String = parts
                    .iter()
                    .filter_map(|p| match p {
                        CstPart::Text(t) => Some(t.value.as_str()),
                        _ => None,
                    })
                    .collect();
                Ok(Expression::string(text))
            }
            parts => {
                let mut resolved = Vec::with_capacity(parts.len());
                for part in parts {
                    resolved.push(match part {
                        CstPart::Text(text) => Expression::string(text.value.clone()),
                        CstPart::Param(name) => Expression::ParameterReference(name.value.clone()),
                        CstPart::Expr(expr) => {
                            Expression::Embedded(Box::new(self.resolve_expression(expr)?))
                        }
                    });
                }
                Ok(Expression::Template(resolved))
            }
        }
    }

    fn resolve_expression(&mut self, expr: &CstExpr) -> ResolveResult<Expression> {
        guarded(|| self.resolve_expression_body(expr))
    }

    fn resolve_expression_body(&mut self, expr: &CstExpr) -> ResolveResult<Expression> {
        self.metrics.expressions += 1;
        self.metrics.longest_chain = self.metrics.longest_chain.max(expr.calls.len());

        let (subject, mut shape, producer) = match &expr.subject {
            CstSubject::Name(name) | CstSubject::Quoted(name) => (
                Expression::AttributeReference(name.value.clone()),
                Shape::Single,
                None,
            ),
            CstSubject::Param(name) => (
                Expression::ParameterReference(name.value.clone()),
                Shape::Single,
                None,
            ),
            CstSubject::Nested(inner) => (
                Expression::DynamicAttributeReference(Box::new(self.resolve_expression(inner)?)),
                Shape::Single,
                None,
            ),
            CstSubject::Call(call) => {
                let (signature, resolved) = self.resolve_call(call, false)?;
                let shape = match quantifier_of(signature.function) {
                    Some(quantifier) if signature.produces_multi => Shape::Multi {
                        quantifier,
                        element: ValueType::String,
                    },
                    _ => Shape::Single,
                };
                (Expression::StandaloneCall(resolved), shape, Some(call))
            }
        };

        if expr.calls.is_empty() {
            if let (Shape::Multi { .. }, Some(head)) = (shape, producer) {
                return Err(unreduced(head));
            }
            return Ok(subject);
        }

        if matches!(shape, Shape::Multi { .. }) {
            self.metrics.multi_value_chains += 1;
        }

        let mut calls = Vec::with_capacity(expr.calls.len());
        for call in &expr.calls {
            let (signature, resolved) = self.resolve_call(call, true)?;
            if let Shape::Multi { quantifier, .. } = shape {
                shape = if signature.is_reducing {
                    Shape::Single
                } else if signature.multi_aware {
                    Shape::Multi {
                        quantifier,
                        element: signature.output,
                    }
                } else {
                    return Err(unreduced(call));
                };
            }
            calls.push(resolved);
        }

        let reduce = match (shape, producer) {
            (Shape::Single, _) => None,
            (
                Shape::Multi {
                    quantifier,
                    element: ValueType::Boolean,
                },
                _,
            ) => Some(quantifier),
            (Shape::Multi { .. }, Some(head)) => return Err(unreduced(head)),
            (Shape::Multi { .. }, None) => None,
        };

        Ok(Expression::Chain {
            subject: Box::new(subject),
            calls,
            reduce,
        })
    }

    /// Bind a call to the catalog and resolve its arguments
    fn resolve_call(
        &mut self,
        call: &CstCall,
        has_subject: bool,
    ) -> ResolveResult<(&'static FunctionSignature, FunctionCall)> {
        let name = call.name.value.as_str();
        let signature = catalog::lookup(name).ok_or_else(|| ResolveError::UnknownFunction {
            name: name.to_string(),
            span: call.name.span,
        })?;

        if !signature.accepts_arity(call.args.len()) {
            return Err(ResolveError::ArityMismatch {
                name: name.to_string(),
                got: call.args.len(),
                expected_min: signature.min_args,
                expected_max: signature.max_args,
                span: call.span,
            });
        }

        if signature.requires_subject && !has_subject {
            return Err(ResolveError::SubjectRequired {
                name: name.to_string(),
                span: call.name.span,
            });
        }
        if !signature.requires_subject && has_subject {
            return Err(ResolveError::SubjectNotAllowed {
                name: name.to_string(),
                span: call.name.span,
            });
        }

        if !signature.supported {
            return Err(ResolveError::UnsupportedFeature {
                name: name.to_string(),
                span: call.name.span,
            });
        }

        if signature.function == Function::Numeric(NumericFn::Math) {
            if let Some(CstArg::Str(op)) = call.args.first() {
                if !catalog::is_supported_math_operation(&op.value) {
                    return Err(ResolveError::UnsupportedFeature {
                        name: format!("math:{}", op.value),
                        span: op.span,
                    });
                }
            }
        }

        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.resolve_argument(arg)?);
        }

        self.metrics.calls += 1;
        log_debug!("Resolved call", "function" => signature.name, "args" => args.len());

        Ok((signature, FunctionCall::new(name, signature.function, args)))
    }

    fn resolve_argument(&mut self, arg: &CstArg) -> ResolveResult<Expression> {
        Ok(match arg {
            CstArg::Str(s) => Expression::string(s.value.clone()),
            CstArg::Number(n) => Expression::Literal(match n.value {
                NumberLiteral::Integer(i) => Literal::Integer(i),
                NumberLiteral::Decimal(d) => Literal::Decimal(d),
            }),
            CstArg::Bool(b) => Expression::Literal(Literal::Bool(b.value)),
            CstArg::Null(_) => Expression::Literal(Literal::Null),
            CstArg::Param(name) => Expression::ParameterReference(name.value.clone()),
            CstArg::Nested(inner) => Expression::Embedded(Box::new(self.resolve_expression(inner)?)),
        })
    }
}

fn quantifier_of(function: Function) -> Option<Quantifier> {
    match function {
        Function::Multi(
            MultiFn::AllAttributes | MultiFn::AllMatchingAttributes | MultiFn::AllDelineatedValues,
        ) => Some(Quantifier::All),
        Function::Multi(
            MultiFn::AnyAttribute | MultiFn::AnyMatchingAttribute | MultiFn::AnyDelineatedValue,
        ) => Some(Quantifier::Any),
        _ => None,
    }
}

fn unreduced(call: &CstCall) -> ResolveError {
    ResolveError::MultiValueUnreduced {
        name: call.name.value.clone(),
        span: call.span,
    }
}

/// Result type of an expression when it can be known without evaluating it
pub fn static_type(expr: &Expression) -> ValueType {
    guarded(|| infer_type(expr))
}

fn infer_type(expr: &Expression) -> ValueType {
    match expr {
        Expression::AttributeReference(_)
        | Expression::DynamicAttributeReference(_)
        | Expression::ParameterReference(_)
        | Expression::Template(_) => ValueType::String,
        Expression::Literal(literal) => match literal {
            Literal::Str(_) => ValueType::String,
            Literal::Integer(_) | Literal::Decimal(_) => ValueType::Number,
            Literal::Bool(_) => ValueType::Boolean,
            Literal::Null => ValueType::Any,
        },
        Expression::Embedded(inner) => static_type(inner),
        Expression::StandaloneCall(call) => call_type(call),
        Expression::Chain { reduce: Some(_), .. } => ValueType::Boolean,
        Expression::Chain { subject, calls, .. } => {
            calls.last().map(call_type).unwrap_or_else(|| static_type(subject))
        }
    }
}

fn call_type(call: &FunctionCall) -> ValueType {
    let declared = catalog::signature_of(call.function)
        .map(|sig| sig.output)
        .unwrap_or(ValueType::Any);
    match (call.function, call.args.as_slice()) {
        (Function::Standalone(StandaloneFn::Literal), [arg]) => static_type(arg),
        (Function::Boolean(catalog::BooleanFn::IfElse), [then, otherwise]) => {
            let (a, b) = (static_type(then), static_type(otherwise));
            if a == b {
                a
            } else {
                ValueType::Any
            }
        }
        _ => declared,
    }
}
