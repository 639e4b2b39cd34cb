//! Token stream with lookahead for the recursive-descent parser

use super::token::Token;
use crate::utils::{Position, Span, Spanned};

pub type SpannedToken = Spanned<Token>;

/// Cursor over lexed tokens. The last token is always `Eof`.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<SpannedToken>,
    position: usize,
}

impl TokenStream {
    pub fn new(mut tokens: Vec<SpannedToken>) -> Self {
        if !tokens.last().is_some_and(|t| t.value.is_eof()) {
            let end = tokens
                .last()
                .map(|t| t.span.end)
                .unwrap_or_else(Position::start);
            tokens.push(Spanned::new(Token::Eof, Span::point(end)));
        }
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn current(&self) -> &SpannedToken {
        let last = self.tokens.len() - 1;
        &self.tokens[self.position.min(last)]
    }

    pub fn current_token(&self) -> &Token {
        &self.current().value
    }

    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Token `n` places after the current one
    pub fn peek_ahead(&self, n: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + n).min(last)].value
    }

    /// Consume the current token; `Eof` is never consumed
    pub fn advance(&mut self) -> SpannedToken {
        let token = self.current().clone();
        if !token.value.is_eof() {
            self.position += 1;
        }
        token
    }

    pub fn check(&self, expected: &Token) -> bool {
        self.current_token() == expected
    }

    pub fn advance_if_matches(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.current_token().is_eof()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.len() <= 1
    }

    pub fn all_tokens(&self) -> &[SpannedToken] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spanned(token: Token, start: usize, end: usize) -> SpannedToken {
        Spanned::new(
            token,
            Span::new(
                Position::new(start, 1, start as u32 + 1),
                Position::new(end, 1, end as u32 + 1),
            ),
        )
    }

    #[test]
    fn test_eof_is_appended_and_sticky() {
        let mut stream = TokenStream::new(vec![
            spanned(Token::ExprStart, 0, 2),
            spanned(Token::Identifier("a".into()), 2, 3),
        ]);
        assert_eq!(stream.len(), 3);
        assert_eq!(stream.peek_ahead(1), &Token::Identifier("a".into()));

        stream.advance();
        stream.advance();
        assert!(stream.is_at_end());
        assert_eq!(stream.advance().value, Token::Eof);
        assert_eq!(stream.current_span().start.offset, 3);
    }

    #[test]
    fn test_advance_if_matches() {
        let mut stream = TokenStream::new(vec![spanned(Token::Colon, 0, 1)]);
        assert!(!stream.advance_if_matches(&Token::Comma));
        assert!(stream.advance_if_matches(&Token::Colon));
        assert!(stream.is_at_end());
    }
}
