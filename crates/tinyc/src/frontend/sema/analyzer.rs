//! Semantic analyzer - name resolution and type checking
//!
//! Reports every problem it finds instead of stopping at the first one.
//! Expressions that already failed get [`ValueType::Unknown`], which no check
//! reports again.

use codespan_reporting::term::termcolor::WriteColor;

use super::scope::{Scope, Symbol, ValueType};
use crate::common::{DiagnosticReporter, InternalFault};
use crate::frontend::ast::*;
use crate::report;

/// Semantic analyzer for a parsed program
pub struct SemanticAnalyzer<'r, W: WriteColor> {
    scope: Scope,
    reporter: &'r mut DiagnosticReporter<W>,
}

impl<'r, W: WriteColor> SemanticAnalyzer<'r, W> {
    pub fn new(reporter: &'r mut DiagnosticReporter<W>) -> Self {
        Self {
            scope: Scope::new(),
            reporter,
        }
    }

    /// Analyze a program
    pub fn analyze(&mut self, program: &Program) -> Result<(), InternalFault> {
        self.analyze_block(&program.stmts)
    }

    fn analyze_block(&mut self, stmts: &[Stmt]) -> Result<(), InternalFault> {
        for stmt in stmts {
            self.analyze_stmt(stmt)?;
        }
        Ok(())
    }

    fn analyze_nested(&mut self, stmts: &[Stmt]) -> Result<(), InternalFault> {
        self.scope.push();
        let result = self.analyze_block(stmts);
        self.scope.pop();
        result
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) -> Result<(), InternalFault> {
        match &stmt.kind {
            StmtKind::Let { name, value } => {
                let ty = self.analyze_expr(value)?;
                let symbol = Symbol {
                    ty,
                    declared_at: name.location,
                };
                if let Err(previous) = self.scope.define(&name.name, symbol) {
                    report!(
                        self.reporter,
                        name.location,
                        "redeclaration of '{}' (first declared at {})",
                        name.name,
                        previous.declared_at
                    )?;
                }
            }

            StmtKind::Assign { target, value } => {
                let ty = self.analyze_expr(value)?;
                match self.scope.lookup(&target.name).copied() {
                    None => report!(
                        self.reporter,
                        target.location,
                        "assignment to undeclared variable '{}'",
                        target.name
                    )?,
                    Some(symbol) if symbol.ty.is_known() && ty.is_known() && symbol.ty != ty => {
                        report!(
                            self.reporter,
                            value.location,
                            "cannot assign {} to variable '{}' of type {}",
                            ty,
                            target.name,
                            symbol.ty
                        )?;
                    }
                    Some(_) => {}
                }
            }

            StmtKind::Print(value) => {
                self.analyze_expr(value)?;
            }

            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_condition(condition)?;
                self.analyze_nested(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.analyze_nested(else_branch)?;
                }
            }

            StmtKind::While { condition, body } => {
                self.check_condition(condition)?;
                self.analyze_nested(body)?;
            }
        }
        Ok(())
    }

    fn check_condition(&mut self, condition: &Expr) -> Result<(), InternalFault> {
        let ty = self.analyze_expr(condition)?;
        if ty.is_known() && ty != ValueType::Bool {
            report!(
                self.reporter,
                condition.location,
                "condition must be bool, found {}",
                ty
            )?;
        }
        Ok(())
    }

    fn analyze_expr(&mut self, expr: &Expr) -> Result<ValueType, InternalFault> {
        match &expr.kind {
            ExprKind::Int(_) => Ok(ValueType::Int),
            ExprKind::Str(_) => Ok(ValueType::Str),
            ExprKind::Bool(_) => Ok(ValueType::Bool),

            ExprKind::Variable(ident) => match self.scope.lookup(&ident.name) {
                Some(symbol) => Ok(symbol.ty),
                None => {
                    report!(
                        self.reporter,
                        ident.location,
                        "use of undeclared variable '{}'",
                        ident.name
                    )?;
                    Ok(ValueType::Unknown)
                }
            },

            ExprKind::Unary { op, operand } => {
                let ty = self.analyze_expr(operand)?;
                let expected = match op {
                    UnaryOp::Neg => ValueType::Int,
                    UnaryOp::Not => ValueType::Bool,
                };
                if !ty.is_known() {
                    return Ok(ValueType::Unknown);
                }
                if ty != expected {
                    report!(
                        self.reporter,
                        expr.location,
                        "operator '{}' cannot be applied to {}",
                        op,
                        ty
                    )?;
                    return Ok(ValueType::Unknown);
                }
                Ok(expected)
            }

            ExprKind::Binary { op, left, right } => {
                let lhs = self.analyze_expr(left)?;
                let rhs = self.analyze_expr(right)?;
                self.check_binary(expr, *op, lhs, rhs, right)
            }
        }
    }

    fn check_binary(
        &mut self,
        expr: &Expr,
        op: BinaryOp,
        lhs: ValueType,
        rhs: ValueType,
        right: &Expr,
    ) -> Result<ValueType, InternalFault> {
        if !lhs.is_known() || !rhs.is_known() {
            return Ok(ValueType::Unknown);
        }

        let result = match op {
            BinaryOp::Add if lhs == ValueType::Str && rhs == ValueType::Str => Some(ValueType::Str),
            _ if op.is_arithmetic() => {
                (lhs == ValueType::Int && rhs == ValueType::Int).then_some(ValueType::Int)
            }
            _ if op.is_ordering() => {
                (lhs == ValueType::Int && rhs == ValueType::Int).then_some(ValueType::Bool)
            }
            _ if op.is_logical() => {
                (lhs == ValueType::Bool && rhs == ValueType::Bool).then_some(ValueType::Bool)
            }
            _ => {
                // == and !=
                if lhs != rhs {
                    report!(self.reporter, expr.location, "cannot compare {} with {}", lhs, rhs)?;
                    return Ok(ValueType::Unknown);
                }
                Some(ValueType::Bool)
            }
        };

        let Some(ty) = result else {
            report!(
                self.reporter,
                expr.location,
                "operator '{}' cannot be applied to {} and {}",
                op,
                lhs,
                rhs
            )?;
            return Ok(ValueType::Unknown);
        };

        if matches!(op, BinaryOp::Div | BinaryOp::Mod) && right.kind == ExprKind::Int(0) {
            report!(self.reporter, right.location, "division by zero")?;
        }
        Ok(ty)
    }
}
