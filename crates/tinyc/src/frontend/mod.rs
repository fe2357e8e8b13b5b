//! Tiny language frontend
//!
//! The frontend is responsible for:
//! 1. Scanning source code into located tokens
//! 2. Parsing tokens into an AST, merging locations on every reduction
//! 3. Performing semantic analysis
//!
//! Every phase reports user errors through the shared
//! [`DiagnosticReporter`](crate::common::DiagnosticReporter) and only returns
//! `Err` for internal faults.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod sema;

pub use lexer::{name_of, Scanner, Token, TokenCode, TokenKind};
pub use parser::Parser;
pub use sema::SemanticAnalyzer;

/// Configuration options passed to the frontend
#[derive(Debug, Clone, Default)]
pub struct FrontendConfig {
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub verbose: bool,
    /// Stop parsing after this many diagnostics. `None` reports them all.
    pub error_limit: Option<usize>,
}
