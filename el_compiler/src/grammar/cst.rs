//! Concrete syntax tree produced by the parser
//!
//! Mirrors the source closely: names are still strings, quoted subjects are
//! kept apart from bare ones, and every node carries its span. The resolver
//! turns this into the typed `Expression` tree.

use crate::tokens::NumberLiteral;
use crate::utils::{Span, Spanned};
use serde::{Deserialize, Serialize};

/// A whole property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CstTemplate {
    pub parts: Vec<CstPart>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CstPart {
    Text(Spanned<String>),
    Expr(CstExpr),
    Param(Spanned<String>),
}

/// One `${subject:call():call()}` span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CstExpr {
    pub span: Span,
    pub subject: CstSubject,
    pub calls: Vec<CstCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CstSubject {
    /// Bare attribute name
    Name(Spanned<String>),
    /// Quoted attribute name, `${'a b'}`
    Quoted(Spanned<String>),
    /// Subject-less function call, `${now()}`
    Call(CstCall),
    /// Attribute named by another expression, `${${x}}`
    Nested(Box<CstExpr>),
    Param(Spanned<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CstCall {
    pub name: Spanned<String>,
    pub args: Vec<CstArg>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CstArg {
    Str(Spanned<String>),
    Number(Spanned<NumberLiteral>),
    Bool(Spanned<bool>),
    Null(Span),
    Nested(Box<CstExpr>),
    Param(Spanned<String>),
}

impl CstArg {
    pub fn span(&self) -> Span {
        match self {
            CstArg::Str(s) | CstArg::Param(s) => s.span,
            CstArg::Number(n) => n.span,
            CstArg::Bool(b) => b.span,
            CstArg::Null(span) => *span,
            CstArg::Nested(expr) => expr.span,
        }
    }
}

impl CstExpr {
    /// Move every directly nested expression out into `pending`
    fn detach_nested(&mut self, pending: &mut Vec<CstExpr>) {
        let placeholder = CstSubject::Name(Spanned::new(String::new(), self.span));
        match std::mem::replace(&mut self.subject, placeholder) {
            CstSubject::Nested(inner) => pending.push(*inner),
            CstSubject::Call(mut call) => detach_args(&mut call, pending),
            other => self.subject = other,
        }
        for call in &mut self.calls {
            detach_args(call, pending);
        }
    }
}

fn detach_args(call: &mut CstCall, pending: &mut Vec<CstExpr>) {
    for arg in call.args.drain(..) {
        if let CstArg::Nested(inner) = arg {
            pending.push(*inner);
        }
    }
}

// Dropping nested boxes recursively would use one stack frame per level.
impl Drop for CstExpr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_nested(&mut pending);
        while let Some(mut expr) = pending.pop() {
            expr.detach_nested(&mut pending);
        }
    }
}

impl CstTemplate {
    /// Number of `${...}` spans at the top level
    pub fn expression_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, CstPart::Expr(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Position;

    fn nested_subjects(depth: usize) -> CstExpr {
        let span = Span::point(Position::start());
        let mut expr = CstExpr {
            span,
            subject: CstSubject::Name(Spanned::new("x".to_string(), span)),
            calls: Vec::new(),
        };
        for _ in 0..depth {
            let call = CstCall {
                name: Spanned::new("append".to_string(), span),
                args: vec![CstArg::Str(Spanned::new("y".to_string(), span))],
                span,
            };
            expr = CstExpr {
                span,
                subject: CstSubject::Nested(Box::new(expr)),
                calls: vec![call],
            };
        }
        expr
    }

    #[test]
    fn test_deep_tree_drops_on_small_stack() {
        std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| drop(nested_subjects(200_000)))
            .unwrap()
            .join()
            .unwrap();
    }

    #[test]
    fn test_clone_keeps_structure() {
        let expr = nested_subjects(3);
        assert_eq!(expr.clone(), expr);
        assert_matches::assert_matches!(&expr.subject, CstSubject::Nested(inner) if inner.calls.len() == 1);
    }
}
