//! Typed expression tree
//!
//! Built by the resolver from the concrete syntax tree. Every function call is
//! bound to its catalog entry, so later stages dispatch on `Function` rather
//! than on names. Trees are immutable once built and never share nodes.

use crate::catalog::Function;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// `${name}`; absent attributes read as the empty string
    AttributeReference(String),
    /// `${${inner}}`: the attribute named by the value of `inner`
    DynamicAttributeReference(Box<Expression>),
    /// `#{name}`
    ParameterReference(String),
    Literal(Literal),
    /// A subject-less call with nothing chained after it
    StandaloneCall(FunctionCall),
    /// Subject followed by calls applied left to right
    Chain {
        subject: Box<Expression>,
        calls: Vec<FunctionCall>,
        /// Set when the chain starts with a multi-value producer and ends boolean
        reduce: Option<Quantifier>,
    },
    /// `${...}` appearing inside an argument or a template
    Embedded(Box<Expression>),
    /// Literal text interleaved with expressions; evaluates to the concatenation
    Template(Vec<Expression>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Str(String),
    Integer(i64),
    Decimal(f64),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name as written in source (aliases preserved)
    pub name: String,
    pub function: Function,
    pub args: Vec<Expression>,
}

/// How a multi-value boolean result collapses to one boolean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantifier {
    All,
    Any,
}

impl Quantifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Any => "any",
        }
    }
}

impl Expression {
    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal(Literal::Str(value.into()))
    }

    /// Strip any number of `Embedded` wrappers
    pub fn unwrap_embedded(&self) -> &Expression {
        let mut current = self;
        while let Expression::Embedded(inner) = current {
            current = inner;
        }
        current
    }

    pub fn as_string_literal(&self) -> Option<&str> {
        match self.unwrap_embedded() {
            Expression::Literal(Literal::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Visit this node and every descendant, parents first
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Expression)) {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            visit(node);
            let first = pending.len();
            node.for_each_child(|child| pending.push(child));
            pending[first..].reverse();
        }
    }

    /// Direct children in source order
    fn for_each_child<'a>(&'a self, mut visit: impl FnMut(&'a Expression)) {
        match self {
            Expression::AttributeReference(_)
            | Expression::ParameterReference(_)
            | Expression::Literal(_) => {}
            Expression::DynamicAttributeReference(inner) | Expression::Embedded(inner) => {
                visit(inner)
            }
            Expression::StandaloneCall(call) => call.args.iter().for_each(visit),
            Expression::Chain { subject, calls, .. } => {
                visit(subject);
                for call in calls {
                    call.args.iter().for_each(&mut visit);
                }
            }
            Expression::Template(parts) => parts.iter().for_each(visit),
        }
    }

    /// Every function call in the tree
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        let mut calls = Vec::new();
        self.walk(&mut |node| match node {
            Expression::StandaloneCall(call) => calls.push(call),
            Expression::Chain { calls: chain, .. } => calls.extend(chain.iter()),
            _ => {}
        });
        calls
    }

    /// Names of attributes read directly by name
    pub fn referenced_attributes(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.walk(&mut |node| {
            if let Expression::AttributeReference(name) = node {
                if !names.contains(&name.as_str()) {
                    names.push(name.as_str());
                }
            }
        });
        names
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    /// Nodes on the longest path from here down to a leaf
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((node, level)) = pending.pop() {
            deepest = deepest.max(level);
            node.for_each_child(|child| pending.push((child, level + 1)));
        }
        deepest
    }

    /// Move every direct child out into `pending`, leaving this node shallow
    fn detach_children(&mut self, pending: &mut Vec<Expression>) {
        match self {
            Expression::AttributeReference(_)
            | Expression::ParameterReference(_)
            | Expression::Literal(_) => {}
            Expression::DynamicAttributeReference(inner) | Expression::Embedded(inner) => {
                pending.push(std::mem::replace(inner.as_mut(), Expression::Literal(Literal::Null)))
            }
            Expression::StandaloneCall(call) => pending.append(&mut call.args),
            Expression::Chain { subject, calls, .. } => {
                pending.push(std::mem::replace(subject.as_mut(), Expression::Literal(Literal::Null)));
                for call in calls {
                    pending.append(&mut call.args);
                }
            }
            Expression::Template(parts) => pending.append(parts),
        }
    }
}

// Trees may nest far deeper than the stack allows; tear them down iteratively.
impl Drop for Expression {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_children(&mut pending);
        }
    }
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, function: Function, args: Vec<Expression>) -> Self {
        Self {
            name: name.into(),
            function,
            args,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => write!(f, "'{}'", s),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Decimal(d) => write!(f, "{:?}", d),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Null => f.write_str("null"),
        }
    }
}
