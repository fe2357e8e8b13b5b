//! Statement AST nodes

use super::{Expr, Ident};
use crate::common::SourceLocation;

/// Statement node
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub location: SourceLocation,
}

impl Stmt {
    pub fn new(kind: StmtKind, location: SourceLocation) -> Self {
        Self { kind, location }
    }
}

/// Statement kinds
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Declaration: let x = expr;
    Let { name: Ident, value: Expr },

    /// Assignment: x = expr;
    Assign { target: Ident, value: Expr },

    /// Output: print expr;
    Print(Expr),

    /// Conditional: if cond then ... [else ...] end
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },

    /// Loop: while cond do ... end
    While { condition: Expr, body: Vec<Stmt> },
}
