//! Lexical analysis for EL property values

pub mod analyzer;

use crate::tokens::TokenStream;

pub use analyzer::{LexerError, LexicalAnalyzer, LexicalMetrics};

/// Tokenize a property value with a fresh analyzer
pub fn tokenize(source: &str) -> Result<TokenStream, LexerError> {
    LexicalAnalyzer::new().tokenize(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::Token;

    #[test]
    fn test_tokenize_empty_source() {
        let stream = tokenize("").unwrap();
        assert_eq!(stream.len(), 1);
        assert_eq!(stream.current_token(), &Token::Eof);
    }
}
