//! Syntax analysis: token stream to concrete syntax tree

mod error;
mod parser;

pub use error::{SyntaxError, SyntaxResult};
pub use parser::ElParser;

use crate::grammar::cst::CstTemplate;
use crate::logging::codes;
use crate::tokens::TokenStream;
use crate::{log_debug, log_error, log_success};

/// Parse a lexed property value
pub fn parse_tokens(token_stream: TokenStream) -> SyntaxResult<CstTemplate> {
    log_debug!("Starting syntax analysis", "tokens" => token_stream.len());

    let mut parser = ElParser::new(token_stream);
    let result = parser.parse_template();

    match &result {
        Ok(template) => {
            log_success!(
                codes::success::CST_CONSTRUCTION_COMPLETE,
                "Concrete syntax tree built",
                "parts" => template.parts.len(),
                "expressions" => template.expression_count(),
                "max_depth" => parser.max_depth()
            );
        }
        Err(error) => {
            log_error!(error.error_code(), &error.to_string(),
                span = error.span(),
                "detail" => error.detail()
            );
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;

    #[test]
    fn test_parse_tokens_empty() {
        let template = parse_tokens(tokenize("").unwrap()).unwrap();
        assert!(template.parts.is_empty());
    }
}
