//! Lexer module for tokenizing tiny source code

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{name_of, Token, TokenCode, TokenKind};
