pub mod nodes;

pub use nodes::{Expression, FunctionCall, Literal, Quantifier};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Function, StringFn};

    fn call(name: &str, function: Function, args: Vec<Expression>) -> FunctionCall {
        FunctionCall::new(name, function, args)
    }

    #[test]
    fn test_walk_visits_nested_arguments() {
        let inner = Expression::Embedded(Box::new(Expression::AttributeReference(
            "expected".into(),
        )));
        let expr = Expression::Chain {
            subject: Box::new(Expression::AttributeReference("filename".into())),
            calls: vec![
                call("trim", Function::String(StringFn::Trim), vec![]),
                call("append", Function::String(StringFn::Append), vec![inner]),
            ],
            reduce: None,
        };

        assert_eq!(expr.referenced_attributes(), vec!["filename", "expected"]);
        assert_eq!(expr.function_calls().len(), 2);
        assert_eq!(expr.node_count(), 4);
        assert_eq!(expr.depth(), 3);
    }

    #[test]
    fn test_unwrap_embedded() {
        let expr = Expression::Embedded(Box::new(Expression::Embedded(Box::new(
            Expression::string("x"),
        ))));
        assert_eq!(expr.as_string_literal(), Some("x"));
        assert_eq!(Literal::Decimal(6.0).to_string(), "6.0");
        assert_eq!(Quantifier::Any.as_str(), "any");
    }
}
