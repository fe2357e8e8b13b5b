//! Token kinds, their integer codes and display names

use std::fmt;

use logos::Logos;

use crate::common::{InternalFault, SourceLocation};

/// Raw token code as stored in parser tables. `0` is end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenCode(pub u16);

impl fmt::Display for TokenCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token as handed from the scanner to the parser
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub code: TokenCode,
    pub location: SourceLocation,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, location: SourceLocation, text: impl Into<String>) -> Self {
        Self {
            code: kind.code(),
            location,
            text: text.into(),
        }
    }

    /// Token carrying a raw code, which need not belong to [`TokenKind`]
    pub fn from_code(code: TokenCode, location: SourceLocation, text: impl Into<String>) -> Self {
        Self {
            code,
            location,
            text: text.into(),
        }
    }

    /// `None` when the code is outside the known set
    pub fn kind(&self) -> Option<TokenKind> {
        TokenKind::from_code(self.code)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.code == kind.code()
    }
}

/// Every token the tiny language has.
///
/// Variant order defines the token codes, so new kinds go at the end.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\n\r\f]+")] // Skip whitespace
#[logos(skip r"#[^\n]*")] // Skip comments
pub enum TokenKind {
    // Special
    Eof,
    Invalid,

    // === Keywords ===
    #[token("let")]
    Let,
    #[token("print")]
    Print,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("end")]
    End,
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,
    #[token("true")]
    True,
    #[token("false")]
    False,

    // === Identifiers and literals ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier,
    #[regex(r"[0-9]+")]
    Number,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semi,
}

impl TokenKind {
    /// All kinds, indexed by code
    pub const ALL: [TokenKind; 33] = [
        TokenKind::Eof,
        TokenKind::Invalid,
        TokenKind::Let,
        TokenKind::Print,
        TokenKind::If,
        TokenKind::Then,
        TokenKind::Else,
        TokenKind::While,
        TokenKind::Do,
        TokenKind::End,
        TokenKind::And,
        TokenKind::Or,
        TokenKind::Not,
        TokenKind::True,
        TokenKind::False,
        TokenKind::Identifier,
        TokenKind::Number,
        TokenKind::Str,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Star,
        TokenKind::Slash,
        TokenKind::Percent,
        TokenKind::Eq,
        TokenKind::EqEq,
        TokenKind::NotEq,
        TokenKind::Lt,
        TokenKind::LtEq,
        TokenKind::Gt,
        TokenKind::GtEq,
        TokenKind::LParen,
        TokenKind::RParen,
        TokenKind::Semi,
    ];

    pub fn code(self) -> TokenCode {
        TokenCode(self as u16)
    }

    pub fn from_code(code: TokenCode) -> Option<Self> {
        Self::ALL.get(usize::from(code.0)).copied()
    }

    /// Canonical display name, for embedding in messages
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Invalid => "INVALID",
            TokenKind::Let => "LET",
            TokenKind::Print => "PRINT",
            TokenKind::If => "IF",
            TokenKind::Then => "THEN",
            TokenKind::Else => "ELSE",
            TokenKind::While => "WHILE",
            TokenKind::Do => "DO",
            TokenKind::End => "END",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Number => "NUMBER",
            TokenKind::Str => "STRING",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Eq => "=",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Semi => ";",
        }
    }

    /// Check if this token closes a statement list
    pub fn ends_block(self) -> bool {
        matches!(self, TokenKind::End | TokenKind::Else | TokenKind::Eof)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.name())
    }
}

/// Display name of a raw token code.
///
/// A code outside [`TokenKind`] means the scanner and the parser tables
/// disagree, which is an internal fault rather than a user error.
pub fn name_of(code: TokenCode) -> Result<&'static str, InternalFault> {
    TokenKind::from_code(code)
        .map(TokenKind::name)
        .ok_or(InternalFault::UnknownTokenKind(code.0))
}
