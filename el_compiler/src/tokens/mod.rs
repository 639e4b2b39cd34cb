//! Token system for EL lexical analysis
//!
//! The lexer turns a property value into a flat stream of tokens:
//!
//! - **Template tokens**: `Text` runs and `Parameter` references found outside
//!   any expression, plus `ExprStart`/`ExprEnd` delimiting each `${...}` span.
//! - **Expression tokens**: names, quoted strings, numbers and the punctuation
//!   `:` `(` `)` `,`.
//!
//! Nested `${` inside an expression produces another `ExprStart`, so the parser
//! sees embedded expressions as ordinary token sequences and recurses.

pub mod token;
pub mod token_stream;

pub use token::{is_bare_identifier, is_reserved_literal, NumberLiteral, Token};
pub use token_stream::{SpannedToken, TokenStream};

pub use crate::utils::{Position, Span, Spanned};
