//! Python expression text
//!
//! Generated code reads `attributes` and `parameters` dicts and calls the
//! `el_*` helpers defined by [`super::prelude::python_prelude`].

use super::RenderError;
use super::Dialect;
use crate::catalog::{self, BooleanFn, DateTimeFn, Function, StandaloneFn, StringFn};
use crate::date_pattern;
use crate::grammar::ast::{Expression, FunctionCall, Literal, Quantifier};
use crate::utils::guarded;

#[derive(Debug, Default)]
pub struct PythonRenderer {
    next_var: usize,
}

impl PythonRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, expr: &Expression) -> Result<String, RenderError> {
        match expr {
            Expression::Template(parts) => self.template(parts),
            other => self.expression(other),
        }
    }

    fn template(&mut self, parts: &[Expression]) -> Result<String, RenderError> {
        let mut rendered = Vec::with_capacity(parts.len());
        for part in parts {
            rendered.push(match part {
                Expression::Literal(Literal::Str(text)) => py_str(text),
                other => format!("el_str({})", self.expression(other)?),
            });
        }
        Ok(format!("''.join([{}])", rendered.join(", ")))
    }

    fn expression(&mut self, expr: &Expression) -> Result<String, RenderError> {
        guarded(|| self.expression_body(expr))
    }

    fn expression_body(&mut self, expr: &Expression) -> Result<String, RenderError> {
        Ok(match expr {
            Expression::AttributeReference(name) => format!("attributes.get({}, '')", py_str(name)),
            Expression::DynamicAttributeReference(inner) => {
                format!("attributes.get(el_str({}), '')", self.expression(inner)?)
            }
            Expression::ParameterReference(name) => {
                format!("parameters.get({}, '')", py_str(name))
            }
            Expression::Literal(literal) => py_literal(literal),
            Expression::StandaloneCall(call) => self.call(call, None)?,
            Expression::Chain {
                subject,
                calls,
                reduce,
            } => self.chain(subject, calls, *reduce)?,
            Expression::Embedded(inner) => self.expression(inner)?,
            Expression::Template(parts) => self.template(parts)?,
        })
    }

    fn chain(
        &mut self,
        subject: &Expression,
        calls: &[FunctionCall],
        reduce: Option<Quantifier>,
    ) -> Result<String, RenderError> {
        let first_null_safe = calls
            .first()
            .and_then(|c| catalog::signature_of(c.function))
            .is_some_and(|sig| sig.null_safe);

        let mut current = match subject {
            Expression::AttributeReference(name) if first_null_safe => {
                format!("attributes.get({})", py_str(name))
            }
            other => self.expression(other)?,
        };

        let mut multi = matches!(subject, Expression::StandaloneCall(head)
            if catalog::signature_of(head.function).is_some_and(|sig| sig.produces_multi));

        for call in calls {
            let reducing = catalog::signature_of(call.function).is_some_and(|sig| sig.is_reducing);
            if multi && !reducing {
                let var = self.fresh_var();
                let applied = self.call(call, Some(var.clone()))?;
                current = format!("[{} for {} in {}]", applied, var, current);
            } else {
                current = self.call(call, Some(current))?;
                multi = false;
            }
        }

        Ok(match reduce {
            Some(Quantifier::All) => format!("all({})", current),
            Some(Quantifier::Any) => format!("any({})", current),
            None => current,
        })
    }

    fn call(&mut self, call: &FunctionCall, subject: Option<String>) -> Result<String, RenderError> {
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.expression(arg)?);
        }
        let s = subject.unwrap_or_default();
        let arg = |i: usize| args.get(i).cloned().unwrap_or_else(|| "None".to_string());

        let inline = match call.function {
            Function::String(StringFn::ToUpper) => Some(format!("el_str({}).upper()", s)),
            Function::String(StringFn::ToLower) => Some(format!("el_str({}).lower()", s)),
            Function::String(StringFn::Trim) => Some(format!("el_str({}).strip()", s)),
            Function::String(StringFn::Length) => Some(format!("len(el_str({}))", s)),
            Function::String(StringFn::Append) => {
                Some(format!("(el_str({}) + el_str({}))", s, arg(0)))
            }
            Function::String(StringFn::Prepend) => {
                Some(format!("(el_str({}) + el_str({}))", arg(0), s))
            }
            Function::Boolean(BooleanFn::IsNull) => Some(format!("({} is None)", s)),
            Function::Boolean(BooleanFn::NotNull) => Some(format!("({} is not None)", s)),
            Function::Boolean(BooleanFn::Equals) => {
                Some(format!("(el_str({}) == el_str({}))", s, arg(0)))
            }
            Function::Boolean(BooleanFn::Contains) => {
                Some(format!("(el_str({}) in el_str({}))", arg(0), s))
            }
            Function::Boolean(BooleanFn::StartsWith) => {
                Some(format!("el_str({}).startswith(el_str({}))", s, arg(0)))
            }
            Function::Boolean(BooleanFn::EndsWith) => {
                Some(format!("el_str({}).endswith(el_str({}))", s, arg(0)))
            }
            Function::Boolean(BooleanFn::Not) => Some(format!("(not el_bool({}))", s)),
            Function::Standalone(StandaloneFn::Uuid) => Some("str(uuid.uuid4())".to_string()),
            Function::Standalone(StandaloneFn::Literal) => Some(arg(0)),
            Function::String(StringFn::EvaluateElString) => {
                return Err(RenderError::UnsupportedInDialect {
                    function: call.name.clone(),
                    dialect: Dialect::Python,
                })
            }
            _ => None,
        };
        if let Some(code) = inline {
            return Ok(code);
        }

        if let Function::DateTime(f) = call.function {
            return self.date_call(call, f, s, &args);
        }

        let signature = catalog::signature_of(call.function);
        let mut params = Vec::with_capacity(args.len() + 1);
        match signature {
            Some(sig) if sig.produces_multi => params.push("attributes".to_string()),
            Some(sig) if !sig.requires_subject => {}
            _ => params.push(s),
        }
        params.extend(args);
        Ok(format!("el_{}({})", call.function.name(), params.join(", ")))
    }

    /// Patterns are translated here, so they must be literal text
    fn date_call(
        &mut self,
        call: &FunctionCall,
        function: DateTimeFn,
        subject: String,
        args: &[String],
    ) -> Result<String, RenderError> {
        let mut params = vec![subject];
        match call.args.first() {
            None => params.push("None".to_string()),
            Some(pattern) => match pattern.as_string_literal() {
                Some(text) => params.push(py_str(&date_pattern::translate(text))),
                None => {
                    return Err(RenderError::UnsupportedInDialect {
                        function: format!("{} with a computed pattern", call.name),
                        dialect: Dialect::Python,
                    })
                }
            },
        }
        params.extend(args.iter().skip(1).cloned());
        Ok(format!("el_{}({})", function.as_str(), params.join(", ")))
    }

    fn fresh_var(&mut self) -> String {
        self.next_var += 1;
        format!("_v{}", self.next_var)
    }
}

fn py_literal(literal: &Literal) -> String {
    match literal {
        Literal::Str(s) => py_str(s),
        Literal::Integer(i) => i.to_string(),
        Literal::Decimal(d) => format!("{:?}", d),
        Literal::Bool(true) => "True".to_string(),
        Literal::Bool(false) => "False".to_string(),
        Literal::Null => "None".to_string(),
    }
}

/// Python string literal; JSON string syntax is a subset Python accepts
pub fn py_str(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "''".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::compile;
    use assert_matches::assert_matches;

    fn python(source: &str) -> Result<String, RenderError> {
        PythonRenderer::new().render(compile(source).unwrap().expression())
    }

    #[test]
    fn test_attribute_and_chain() {
        assert_eq!(python("${filename}").unwrap(), "attributes.get(\"filename\", '')");
        assert_eq!(
            python("${filename:toUpper()}").unwrap(),
            "el_str(attributes.get(\"filename\", '')).upper()"
        );
        assert_eq!(
            python("${filename:substringBefore('.')}").unwrap(),
            "el_substringBefore(attributes.get(\"filename\", ''), \".\")"
        );
    }

    #[test]
    fn test_null_safe_subject_reads_raw_attribute() {
        assert_eq!(
            python("${x:isNull()}").unwrap(),
            "(attributes.get(\"x\") is None)"
        );
    }

    #[test]
    fn test_template_and_parameters() {
        assert_eq!(
            python("a_${x}_#{env}").unwrap(),
            "''.join([\"a_\", el_str(attributes.get(\"x\", '')), \"_\", el_str(parameters.get(\"env\", ''))])"
        );
    }

    #[test]
    fn test_multi_value_chain() {
        assert_eq!(
            python("${allAttributes('a','b'):toUpper():join(',')}").unwrap(),
            "el_join([el_str(_v1).upper() for _v1 in el_allAttributes(attributes, \"a\", \"b\")], \",\")"
        );
        assert_eq!(
            python("${anyAttribute('a','b'):contains('x')}").unwrap(),
            "any([(el_str(\"x\") in el_str(_v1)) for _v1 in el_anyAttribute(attributes, \"a\", \"b\")])"
        );
    }

    #[test]
    fn test_date_patterns_are_translated() {
        assert_eq!(
            python("${now():format('yyyy-MM-dd', 'UTC')}").unwrap(),
            "el_format(el_now(), \"%Y-%m-%d\", \"UTC\")"
        );
        assert_eq!(python("${x:toDate()}").unwrap(), "el_toDate(attributes.get(\"x\", ''), None)");
        assert_matches!(
            python("${x:format(${p})}"),
            Err(RenderError::UnsupportedInDialect { .. })
        );
    }

    #[test]
    fn test_unsupported_in_python() {
        assert_matches!(
            python("${x:evaluateELString()}"),
            Err(RenderError::UnsupportedInDialect { function, .. }) if function == "evaluateELString"
        );
    }
}
