//! Syntax trees for EL property values
//!
//! `cst` is what the parser builds; `ast` is the typed tree the resolver
//! produces from it.

pub mod ast;
pub mod cst;

pub use ast::{Expression, FunctionCall, Literal, Quantifier};
pub use cst::{CstArg, CstCall, CstExpr, CstPart, CstSubject, CstTemplate};
