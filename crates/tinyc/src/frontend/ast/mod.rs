//! Abstract Syntax Tree definitions
//!
//! Every node records the location of everything it was reduced from.

mod expr;
mod stmt;

pub use expr::*;
pub use stmt::*;

use crate::common::SourceLocation;

/// A complete compilation unit
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub location: SourceLocation,
}

impl Program {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        let location = SourceLocation::merge_all(stmts.iter().map(|s| s.location));
        Self { stmts, location }
    }
}

/// Identifier occurrence
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub location: SourceLocation,
}

impl Ident {
    pub fn new(name: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            name: name.into(),
            location,
        }
    }
}
