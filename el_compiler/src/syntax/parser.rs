//! Recursive-descent parser building the concrete syntax tree
//!
//! One token of lookahead suffices everywhere except the subject position,
//! where a name followed by `(` starts a call instead of an attribute
//! reference.

use crate::grammar::cst::{CstArg, CstCall, CstExpr, CstPart, CstSubject, CstTemplate};
use crate::syntax::error::{SyntaxError, SyntaxResult};
use crate::tokens::{Token, TokenStream};
use crate::utils::{guarded, Span, Spanned};

const SUBJECT_EXPECTED: &str = "attribute name, function call or nested expression";
const ARGUMENT_EXPECTED: &str = "string, number, boolean, null or nested expression";

pub struct ElParser {
    tokens: TokenStream,
    depth: usize,
    max_depth: usize,
}

impl ElParser {
    pub fn new(tokens: TokenStream) -> Self {
        Self {
            tokens,
            depth: 0,
            max_depth: 0,
        }
    }

    /// Deepest `${` nesting seen so far
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn parse_template(&mut self) -> SyntaxResult<CstTemplate> {
        let start = self.tokens.current_span();
        let mut parts = Vec::new();

        loop {
            let current = self.tokens.current().clone();
            match current.value {
                Token::Text(text) => {
                    self.tokens.advance();
                    parts.push(CstPart::Text(Spanned::new(text, current.span)));
                }
                Token::Parameter(name) => {
                    self.tokens.advance();
                    parts.push(CstPart::Param(Spanned::new(name, current.span)));
                }
                Token::ExprStart => parts.push(CstPart::Expr(self.parse_expression()?)),
                Token::Eof => break,
                other => {
                    return Err(SyntaxError::unexpected_token(
                        "text or '${'",
                        &other.describe(),
                        current.span,
                    ))
                }
            }
        }

        let end = self.tokens.current_span();
        Ok(CstTemplate {
            parts,
            span: start.to(end),
        })
    }

    /// `${ subject (':' call)* }`
    fn parse_expression(&mut self) -> SyntaxResult<CstExpr> {
        let open = self.expect(&Token::ExprStart, "'${'")?;
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);

        let result = guarded(|| self.parse_expression_body(open));
        self.depth -= 1;
        result
    }

    fn parse_expression_body(&mut self, open: Span) -> SyntaxResult<CstExpr> {
        let subject = self.parse_subject(open)?;
        let mut calls = Vec::new();

        loop {
            let current = self.tokens.current().clone();
            match current.value {
                Token::Colon => {
                    self.tokens.advance();
                    calls.push(self.parse_call(open)?);
                }
                Token::ExprEnd => {
                    self.tokens.advance();
                    return Ok(CstExpr {
                        span: open.to(current.span),
                        subject,
                        calls,
                    });
                }
                Token::Eof => {
                    return Err(SyntaxError::unexpected_end_of_input(
                        "':' or '}'",
                        current.span,
                    ))
                }
                other => {
                    return Err(SyntaxError::unexpected_token(
                        "':' or '}'",
                        &other.describe(),
                        current.span,
                    ))
                }
            }
        }
    }

    fn parse_subject(&mut self, open: Span) -> SyntaxResult<CstSubject> {
        let current = self.tokens.current().clone();
        match current.value {
            Token::Identifier(_) if self.tokens.peek_ahead(1) == &Token::LeftParen => {
                Ok(CstSubject::Call(self.parse_call(open)?))
            }
            Token::Identifier(name) => {
                self.tokens.advance();
                Ok(CstSubject::Name(Spanned::new(name, current.span)))
            }
            Token::StringLiteral(name) => {
                self.tokens.advance();
                Ok(CstSubject::Quoted(Spanned::new(name, current.span)))
            }
            Token::Parameter(name) => {
                self.tokens.advance();
                Ok(CstSubject::Param(Spanned::new(name, current.span)))
            }
            Token::ExprStart => {
                let inner = self
                    .parse_expression()
                    .map_err(|e| SyntaxError::nested(open.start, e))?;
                Ok(CstSubject::Nested(Box::new(inner)))
            }
            Token::ExprEnd => Err(SyntaxError::EmptyExpression {
                span: open.to(current.span),
            }),
            Token::Eof => Err(SyntaxError::unexpected_end_of_input(
                SUBJECT_EXPECTED,
                current.span,
            )),
            other => Err(SyntaxError::unexpected_token(
                SUBJECT_EXPECTED,
                &other.describe(),
                current.span,
            )),
        }
    }

    /// `name '(' [arg (',' arg)*] ')'`
    fn parse_call(&mut self, open: Span) -> SyntaxResult<CstCall> {
        let current = self.tokens.current().clone();
        let name = match current.value {
            Token::Identifier(name) => {
                self.tokens.advance();
                Spanned::new(name, current.span)
            }
            Token::Eof => {
                return Err(SyntaxError::unexpected_end_of_input(
                    "function name",
                    current.span,
                ))
            }
            other => {
                return Err(SyntaxError::unexpected_token(
                    "function name",
                    &other.describe(),
                    current.span,
                ))
            }
        };

        self.expect(&Token::LeftParen, "'('")?;
        let mut args = Vec::new();

        if !self.tokens.check(&Token::RightParen) {
            loop {
                args.push(self.parse_argument(open)?);
                if !self.tokens.advance_if_matches(&Token::Comma) {
                    break;
                }
            }
        }

        let close = self.expect(&Token::RightParen, "',' or ')'")?;
        Ok(CstCall {
            span: name.span.to(close),
            name,
            args,
        })
    }

    fn parse_argument(&mut self, open: Span) -> SyntaxResult<CstArg> {
        let current = self.tokens.current().clone();
        let span = current.span;
        let arg = match current.value {
            Token::StringLiteral(s) => CstArg::Str(Spanned::new(s, span)),
            Token::Number(n) => CstArg::Number(Spanned::new(n, span)),
            Token::Parameter(name) => CstArg::Param(Spanned::new(name, span)),
            Token::Identifier(word) if word == "true" => CstArg::Bool(Spanned::new(true, span)),
            Token::Identifier(word) if word == "false" => CstArg::Bool(Spanned::new(false, span)),
            Token::Identifier(word) if word == "null" => CstArg::Null(span),
            Token::ExprStart => {
                let inner = self
                    .parse_expression()
                    .map_err(|e| SyntaxError::nested(open.start, e))?;
                return Ok(CstArg::Nested(Box::new(inner)));
            }
            Token::Eof => {
                return Err(SyntaxError::unexpected_end_of_input(
                    ARGUMENT_EXPECTED,
                    span,
                ))
            }
            other => {
                return Err(SyntaxError::unexpected_token(
                    ARGUMENT_EXPECTED,
                    &other.describe(),
                    span,
                ))
            }
        };
        self.tokens.advance();
        Ok(arg)
    }

    fn expect(&mut self, expected: &Token, description: &str) -> SyntaxResult<Span> {
        let current = self.tokens.current();
        if &current.value == expected {
            let span = current.span;
            self.tokens.advance();
            return Ok(span);
        }
        if current.value.is_eof() {
            return Err(SyntaxError::unexpected_end_of_input(description, current.span));
        }
        Err(SyntaxError::unexpected_token(
            description,
            &current.value.describe(),
            current.span,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use crate::tokens::NumberLiteral;
    use assert_matches::assert_matches;

    fn parse(source: &str) -> SyntaxResult<CstTemplate> {
        ElParser::new(tokenize(source).unwrap()).parse_template()
    }

    fn single_expr(source: &str) -> CstExpr {
        let template = parse(source).unwrap();
        assert_eq!(template.parts.len(), 1, "{source}");
        match template.parts.into_iter().next() {
            Some(CstPart::Expr(expr)) => expr,
            other => panic!("expected expression, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_chain() {
        let expr = single_expr("${filename:substringBefore('.'):toUpper()}");
        assert_matches!(&expr.subject, CstSubject::Name(n) if n.value == "filename");
        assert_eq!(expr.calls.len(), 2);
        assert_eq!(expr.calls[0].name.value, "substringBefore");
        assert_matches!(&expr.calls[0].args[..], [CstArg::Str(s)] if s.value == ".");
        assert!(expr.calls[1].args.is_empty());
        assert_eq!(expr.span.start.offset, 0);
        assert_eq!(expr.span.end.offset, 42);
    }

    #[test]
    fn test_parse_subject_forms() {
        assert_matches!(&single_expr("${now()}").subject, CstSubject::Call(c) if c.name.value == "now");
        assert_matches!(&single_expr("${'a b'}").subject, CstSubject::Quoted(q) if q.value == "a b");
        assert_matches!(&single_expr("${#{env}}").subject, CstSubject::Param(p) if p.value == "env");
        assert_matches!(&single_expr("${${x}:trim()}").subject, CstSubject::Nested(_));
        assert_matches!(&single_expr("${true}").subject, CstSubject::Name(n) if n.value == "true");
    }

    #[test]
    fn test_parse_arguments() {
        let expr = single_expr("${x:f('s', 3, -1.5, true, null, ${y}, #{p})}");
        let args = &expr.calls[0].args;
        assert_eq!(args.len(), 7);
        assert_matches!(&args[1], CstArg::Number(n) if n.value == NumberLiteral::Integer(3));
        assert_matches!(&args[2], CstArg::Number(n) if n.value == NumberLiteral::Decimal(-1.5));
        assert_matches!(&args[3], CstArg::Bool(b) if b.value);
        assert_matches!(&args[4], CstArg::Null(_));
        assert_matches!(&args[5], CstArg::Nested(_));
        assert_matches!(&args[6], CstArg::Param(_));
    }

    #[test]
    fn test_parse_template_parts() {
        let template = parse("file_${uuid()}_#{env}.txt").unwrap();
        assert_eq!(template.parts.len(), 4);
        assert_eq!(template.expression_count(), 1);
        assert_matches!(&template.parts[0], CstPart::Text(t) if t.value == "file_");
        assert_matches!(&template.parts[2], CstPart::Param(p) if p.value == "env");
    }

    #[test]
    fn test_parse_errors() {
        assert_matches!(parse("${}"), Err(SyntaxError::EmptyExpression { .. }));
        assert_matches!(
            parse("${x:toUpper}"),
            Err(SyntaxError::UnexpectedToken { expected, .. }) if expected == "'('"
        );
        assert_matches!(parse("${x y}"), Err(SyntaxError::UnexpectedToken { .. }));
        assert_matches!(parse("${x:f(bare)}"), Err(SyntaxError::UnexpectedToken { .. }));
        assert_matches!(parse("${x:f('a' 'b')}"), Err(SyntaxError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_nested_error_annotated_with_outer_start() {
        let err = parse("ab${x:equals(${y:f(,)})}").unwrap_err();
        assert_matches!(err, SyntaxError::Nested { outer_offset: 2, .. });
        assert_eq!(err.outer_offsets(), vec![2]);
        assert_eq!(err.position().offset, 19);
    }

    #[test]
    fn test_deep_nesting_is_unbounded() {
        let depth = 200;
        let source = format!("{}x{}", "${".repeat(depth), "}".repeat(depth));
        let mut parser = ElParser::new(tokenize(&source).unwrap());
        parser.parse_template().unwrap();
        assert_eq!(parser.max_depth(), depth);
    }

    #[test]
    fn test_very_deep_nesting_on_small_stack() {
        let depth = 50_000;
        let handle = std::thread::Builder::new()
            .stack_size(512 * 1024)
            .spawn(move || {
                let subjects = format!("{}x{}", "${".repeat(depth), "}".repeat(depth));
                let mut parser = ElParser::new(tokenize(&subjects).unwrap());
                parser.parse_template().unwrap();
                assert_eq!(parser.max_depth(), depth);

                let arguments = format!("{}y{}", "${x:append(".repeat(depth), ")}".repeat(depth));
                ElParser::new(tokenize(&arguments).unwrap()).parse_template().unwrap();

                let malformed = format!("{}x:f(,){}", "${".repeat(depth), "}".repeat(depth));
                let err = parse(&malformed).unwrap_err();
                assert_eq!(err.outer_offsets().len(), depth - 1);
            })
            .unwrap();
        handle.join().unwrap();
    }
}
