//! Normalized EL text
//!
//! Output compiles back to an expression that evaluates identically. Spacing
//! and quoting are normalized, aliases are kept as written.

use crate::grammar::ast::{Expression, FunctionCall, Literal};
use crate::tokens::is_bare_identifier;
use crate::utils::guarded;

pub fn render(expr: &Expression) -> String {
    match expr {
        Expression::Literal(Literal::Str(text)) => escape_text(text),
        Expression::ParameterReference(name) => format!("#{{{}}}", name),
        Expression::Template(parts) => render_template(parts),
        Expression::Embedded(inner) => wrap(inner),
        other => wrap(other),
    }
}

fn render_template(parts: &[Expression]) -> String {
    let mut out = String::new();
    for part in parts {
        match part {
            Expression::Literal(Literal::Str(text)) => out.push_str(&escape_text(text)),
            // `#` directly before `#{` would read as the `##{` escape
            Expression::ParameterReference(name) if out.ends_with('#') => {
                out.push_str(&format!("${{#{{{}}}}}", name))
            }
            Expression::ParameterReference(name) => out.push_str(&format!("#{{{}}}", name)),
            Expression::Embedded(inner) => out.push_str(&wrap(inner)),
            other => out.push_str(&wrap(other)),
        }
    }
    out
}

fn wrap(expr: &Expression) -> String {
    guarded(|| format!("${{{}}}", body(expr)))
}

/// Expression text between `${` and `}`
fn body(expr: &Expression) -> String {
    match expr {
        Expression::AttributeReference(name) => attribute_name(name),
        Expression::DynamicAttributeReference(inner) => wrap(inner),
        Expression::ParameterReference(name) => format!("#{{{}}}", name),
        Expression::Literal(literal) => format!("literal({})", literal_text(literal)),
        Expression::StandaloneCall(call) => render_call(call),
        Expression::Chain { subject, calls, .. } => {
            let mut out = body(subject);
            for call in calls {
                out.push(':');
                out.push_str(&render_call(call));
            }
            out
        }
        Expression::Embedded(inner) => body(inner),
        Expression::Template(parts) => {
            let mut out = String::from("literal('')");
            for part in parts {
                out.push_str(&format!(":append({})", argument(part)));
            }
            out
        }
    }
}

fn render_call(call: &FunctionCall) -> String {
    let args: Vec<String> = call.args.iter().map(argument).collect();
    format!("{}({})", call.name, args.join(", "))
}

fn argument(expr: &Expression) -> String {
    match expr {
        Expression::Literal(literal) => literal_text(literal),
        Expression::ParameterReference(name) => format!("#{{{}}}", name),
        Expression::Embedded(inner) => wrap(inner),
        other => wrap(other),
    }
}

fn literal_text(literal: &Literal) -> String {
    match literal {
        Literal::Str(s) => quote(s),
        Literal::Integer(i) => i.to_string(),
        Literal::Decimal(d) => format!("{:?}", d),
        Literal::Bool(b) => b.to_string(),
        Literal::Null => "null".to_string(),
    }
}

fn attribute_name(name: &str) -> String {
    if is_bare_identifier(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

/// Single-quoted string literal using the lexer's escapes
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Template text with `$` and `#{` escaped
fn escape_text(text: &str) -> String {
    text.replace('$', "$$").replace("#{", "##{")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::compile;

    fn canonical(source: &str) -> String {
        render(compile(source).unwrap().expression())
    }

    #[test]
    fn test_normalizes_spacing_and_quotes() {
        assert_eq!(
            canonical("${ filename : substringBefore( \".\" ) :toUpper() }"),
            "${filename:substringBefore('.'):toUpper()}"
        );
        assert_eq!(canonical("${'a b':trim()}"), "${'a b':trim()}");
        assert_eq!(canonical("${x:plus( 1.5 )}"), "${x:plus(1.5)}");
    }

    #[test]
    fn test_escapes_survive() {
        assert_eq!(canonical("pre_$${attr}_post"), "pre_$${attr}_post");
        assert_eq!(canonical("cost $5"), "cost $$5");
        assert_eq!(canonical("##{p} and #{q}"), "##{p} and #{q}");
        assert_eq!(canonical("${x:replaceAll('\\d+', 'it\\'s')}"), "${x:replaceAll('\\\\d+', 'it\\'s')}");
    }

    #[test]
    fn test_hash_before_parameter() {
        use crate::grammar::ast::Expression as E;
        let expr = E::Template(vec![E::string("a#"), E::ParameterReference("p".into())]);
        let text = render(&expr);
        assert_eq!(text, "a#${#{p}}");
        assert_eq!(
            compile(&text).unwrap().expression(),
            &E::Template(vec![
                E::string("a#"),
                E::Embedded(Box::new(E::ParameterReference("p".into())))
            ])
        );
    }

    #[test]
    fn test_render_is_a_fixed_point() {
        for source in [
            "${filename:equals(${expected})}",
            "${allAttributes('a','b'):join(',')}",
            "${${attr:trim()}:toUpper()}",
            "file_${uuid()}_${now():format('yyyy-MM-dd')}.txt",
            "${x:isNull():ifElse(#{yes}, null)}",
            "${literal(-3):plus(2)}",
            "#{only}",
            "",
        ] {
            let once = canonical(source);
            assert_eq!(canonical(&once), once, "{source}");
            assert_eq!(compile(&once).unwrap().expression(), compile(source).unwrap().expression());
        }
    }

    #[test]
    fn test_deep_nesting_on_small_stack() {
        let depth = 5_000;
        let rendered = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || {
                let source = format!("{}'x'{}", "${x:append(".repeat(depth), ")}".repeat(depth));
                canonical(&source)
            })
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(rendered.matches("append(").count(), depth);
    }
}
