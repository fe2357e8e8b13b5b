//! Scanner implementation using logos

use super::token::{Token, TokenKind};
use crate::common::LineIndex;
use logos::Logos;

/// Scanner for tiny source code
///
/// Yields every token with its location, ending with a single `EOF` token.
/// Characters that start no token come out as [`TokenKind::Invalid`] tokens so
/// the parser can report them in order with everything else.
pub struct Scanner<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    lines: LineIndex<'a>,
    at_eof: bool,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given source code
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            lines: LineIndex::new(source),
            at_eof: false,
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        if self.at_eof {
            return self.eof();
        }

        match self.inner.next() {
            Some(result) => {
                let kind = result.unwrap_or(TokenKind::Invalid);
                let location = self.lines.location(self.inner.span());
                Token::new(kind, location, self.inner.slice())
            }
            None => {
                self.at_eof = true;
                self.eof()
            }
        }
    }

    fn eof(&self) -> Token {
        let len = self.inner.source().len();
        Token::new(TokenKind::Eof, self.lines.location(len..len), "")
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize_all(self) -> Vec<Token> {
        self.collect()
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.at_eof {
            return None;
        }
        Some(self.next_token())
    }
}
