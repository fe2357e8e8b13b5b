//! Recursive descent parser for tiny

use codespan_reporting::term::termcolor::WriteColor;

use crate::common::{CompileError, CompileResult, DiagnosticReporter, InternalFault, SourceLocation};
use crate::frontend::ast::*;
use crate::frontend::lexer::{name_of, Token, TokenKind};

/// Recursive descent parser for tiny
///
/// Syntax errors are reported through the reporter as they are found; the
/// parser then skips to the next statement boundary and carries on, so one
/// run finds every malformed statement. Only internal faults end a parse.
pub struct Parser<'r, I, W: WriteColor> {
    tokens: I,
    current: Token,
    consumed: usize,
    reporter: &'r mut DiagnosticReporter<W>,
    error_limit: Option<usize>,
    stopped: bool,
}

impl<'r, I, W> Parser<'r, I, W>
where
    I: Iterator<Item = Token>,
    W: WriteColor,
{
    /// Create a new parser over a token stream
    pub fn new(
        tokens: impl IntoIterator<IntoIter = I>,
        reporter: &'r mut DiagnosticReporter<W>,
    ) -> Self {
        let mut tokens = tokens.into_iter();
        let current = tokens
            .next()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, SourceLocation::point(1, 1), ""));
        Self {
            tokens,
            current,
            consumed: 0,
            reporter,
            error_limit: None,
            stopped: false,
        }
    }

    /// Stop consuming input once `limit` diagnostics have been reported
    pub fn with_error_limit(mut self, limit: Option<usize>) -> Self {
        self.error_limit = limit;
        self
    }

    /// Whether parsing ended early because of the error limit
    pub fn stopped_early(&self) -> bool {
        self.stopped
    }

    /// Parse a complete program
    pub fn parse(&mut self) -> Result<Program, InternalFault> {
        let mut stmts = Vec::new();

        while !self.check(TokenKind::Eof) && !self.stopped {
            if self.check(TokenKind::End) || self.check(TokenKind::Else) {
                let err = self.unexpected("statement");
                self.recover(err)?;
                self.advance();
                continue;
            }
            if let Some(stmt) = self.statement_with_recovery()? {
                stmts.push(stmt);
            }
        }

        Ok(Program::new(stmts))
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    fn advance(&mut self) -> Token {
        if self.check(TokenKind::Eof) {
            return self.current.clone();
        }
        let end = self.current.location.end;
        let next = self.tokens.next().unwrap_or_else(|| {
            Token::new(
                TokenKind::Eof,
                SourceLocation::point(end.line, end.column + 1),
                "",
            )
        });
        self.consumed += 1;
        std::mem::replace(&mut self.current, next)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.is(kind)
    }

    fn match_token(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind) -> CompileResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&kind.to_string()))
        }
    }

    /// Syntax error hook: the current token was not what the grammar allows
    fn unexpected(&self, expected: &str) -> CompileError {
        let location = self.current.location;
        if self.check(TokenKind::Invalid) {
            return CompileError::lexer(
                format!("unexpected character '{}'", self.current.text),
                location,
            );
        }
        match name_of(self.current.code) {
            Ok(name) => CompileError::syntax(
                format!("unexpected token '{name}', expected {expected}"),
                location,
            ),
            Err(fault) => fault.into(),
        }
    }

    /// Report a user error, or hand an internal fault back to the caller.
    ///
    /// Once the error limit is reached, user errors are dropped: they can only
    /// come from unwinding the statements that enclose the last report.
    fn recover(&mut self, err: CompileError) -> Result<(), InternalFault> {
        let diagnostic = err.into_diagnostic()?;
        if self.stopped {
            return Ok(());
        }
        self.reporter.emit(&diagnostic)?;
        if let Some(limit) = self.error_limit {
            if self.reporter.error_count() >= limit {
                self.stopped = true;
            }
        }
        Ok(())
    }

    fn statement_with_recovery(&mut self) -> Result<Option<Stmt>, InternalFault> {
        let start = self.consumed;
        let opens_block = matches!(self.current.kind(), Some(TokenKind::If | TokenKind::While));
        match self.parse_statement() {
            Ok(stmt) => Ok(Some(stmt)),
            Err(err) => {
                self.recover(err)?;
                if self.stopped {
                    return Ok(None);
                }
                if opens_block {
                    self.skip_block();
                } else {
                    self.synchronize();
                }
                if self.consumed == start && !self.check(TokenKind::Eof) {
                    self.advance();
                }
                Ok(None)
            }
        }
    }

    /// Skip to the next statement boundary.
    ///
    /// Consumes a `;`, stops before a statement keyword or block terminator.
    /// Codes outside the token set also stop the skip so they reach the
    /// syntax error hook instead of vanishing.
    fn synchronize(&mut self) {
        loop {
            match self.current.kind() {
                Some(TokenKind::Semi) => {
                    self.advance();
                    return;
                }
                Some(kind) if kind.ends_block() => return,
                Some(TokenKind::Let | TokenKind::Print | TokenKind::If | TokenKind::While) => {
                    return;
                }
                None => return,
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Skip the rest of an `if` or `while` that failed, through its matching
    /// `end`, so its body and terminator are not reported again at the outer
    /// level. Errors inside a body are recovered there and never reach this.
    fn skip_block(&mut self) {
        let mut depth = 1usize;
        loop {
            match self.current.kind() {
                Some(TokenKind::If | TokenKind::While) => depth += 1,
                Some(TokenKind::End) => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                Some(TokenKind::Eof) | None => return,
                Some(_) => {}
            }
            self.advance();
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_statement(&mut self) -> CompileResult<Stmt> {
        match self.current.kind() {
            Some(TokenKind::Let) => self.parse_let(),
            Some(TokenKind::Print) => self.parse_print(),
            Some(TokenKind::If) => self.parse_if(),
            Some(TokenKind::While) => self.parse_while(),
            Some(TokenKind::Identifier) => self.parse_assign(),
            _ => Err(self.unexpected("statement")),
        }
    }

    fn parse_let(&mut self) -> CompileResult<Stmt> {
        let let_tok = self.expect(TokenKind::Let)?;
        let name = self.parse_ident()?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expr()?;
        let semi = self.expect(TokenKind::Semi)?;

        let location = let_tok.location.merge(semi.location);
        Ok(Stmt::new(StmtKind::Let { name, value }, location))
    }

    fn parse_assign(&mut self) -> CompileResult<Stmt> {
        let target = self.parse_ident()?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expr()?;
        let semi = self.expect(TokenKind::Semi)?;

        let location = target.location.merge(semi.location);
        Ok(Stmt::new(StmtKind::Assign { target, value }, location))
    }

    fn parse_print(&mut self) -> CompileResult<Stmt> {
        let print_tok = self.expect(TokenKind::Print)?;
        let value = self.parse_expr()?;
        let semi = self.expect(TokenKind::Semi)?;

        let location = print_tok.location.merge(semi.location);
        Ok(Stmt::new(StmtKind::Print(value), location))
    }

    fn parse_if(&mut self) -> CompileResult<Stmt> {
        let if_tok = self.expect(TokenKind::If)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::Then)?;
        let then_branch = self.parse_block()?;

        let else_branch = if self.match_token(TokenKind::Else).is_some() {
            Some(self.parse_block()?)
        } else {
            None
        };

        let end = self.expect(TokenKind::End)?;
        let location = if_tok.location.merge(end.location);
        Ok(Stmt::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            location,
        ))
    }

    fn parse_while(&mut self) -> CompileResult<Stmt> {
        let while_tok = self.expect(TokenKind::While)?;
        let condition = self.parse_expr()?;
        self.expect(TokenKind::Do)?;
        let body = self.parse_block()?;
        let end = self.expect(TokenKind::End)?;

        let location = while_tok.location.merge(end.location);
        Ok(Stmt::new(StmtKind::While { condition, body }, location))
    }

    /// Statements up to (not including) `end`, `else` or end of input
    fn parse_block(&mut self) -> Result<Vec<Stmt>, InternalFault> {
        let mut stmts = Vec::new();
        while !self.current.kind().is_some_and(TokenKind::ends_block) && !self.stopped {
            if let Some(stmt) = self.statement_with_recovery()? {
                stmts.push(stmt);
            }
        }
        Ok(stmts)
    }

    fn parse_ident(&mut self) -> CompileResult<Ident> {
        let tok = self.expect(TokenKind::Identifier)?;
        Ok(Ident::new(tok.text, tok.location))
    }

    // =========================================================================
    // Expressions (lowest to highest precedence)
    // =========================================================================

    fn parse_expr(&mut self) -> CompileResult<Expr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_and()?;
        while self.match_token(TokenKind::Or).is_some() {
            let right = self.parse_and()?;
            left = Expr::binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_comparison()?;
        while self.match_token(TokenKind::And).is_some() {
            let right = self.parse_comparison()?;
            left = Expr::binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    /// Comparisons do not chain: `a < b < c` is a syntax error
    fn parse_comparison(&mut self) -> CompileResult<Expr> {
        let left = self.parse_additive()?;
        let op = match self.current.kind() {
            Some(TokenKind::EqEq) => BinaryOp::Eq,
            Some(TokenKind::NotEq) => BinaryOp::Ne,
            Some(TokenKind::Lt) => BinaryOp::Lt,
            Some(TokenKind::LtEq) => BinaryOp::Le,
            Some(TokenKind::Gt) => BinaryOp::Gt,
            Some(TokenKind::GtEq) => BinaryOp::Ge,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_additive()?;
        Ok(Expr::binary(op, left, right))
    }

    fn parse_additive(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current.kind() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> CompileResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current.kind() {
                Some(TokenKind::Star) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                Some(TokenKind::Percent) => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> CompileResult<Expr> {
        let op = match self.current.kind() {
            Some(TokenKind::Minus) => UnaryOp::Neg,
            Some(TokenKind::Not) => UnaryOp::Not,
            _ => return self.parse_primary(),
        };
        let op_tok = self.advance();
        let operand = self.parse_unary()?;
        let location = op_tok.location.merge(operand.location);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            location,
        ))
    }

    fn parse_primary(&mut self) -> CompileResult<Expr> {
        let kind = match self.current.kind() {
            Some(TokenKind::Number) => {
                let value = self.current.text.parse::<i64>().map_err(|_| {
                    CompileError::lexer(
                        format!("integer literal '{}' is out of range", self.current.text),
                        self.current.location,
                    )
                })?;
                ExprKind::Int(value)
            }
            Some(TokenKind::Str) => ExprKind::Str(unescape(&self.current.text)),
            Some(TokenKind::True) => ExprKind::Bool(true),
            Some(TokenKind::False) => ExprKind::Bool(false),
            Some(TokenKind::Identifier) => ExprKind::Variable(Ident::new(
                self.current.text.clone(),
                self.current.location,
            )),
            Some(TokenKind::LParen) => {
                let open = self.advance();
                let inner = self.parse_expr()?;
                let close = self.expect(TokenKind::RParen)?;
                return Ok(Expr::new(inner.kind, open.location.merge(close.location)));
            }
            _ => return Err(self.unexpected("expression")),
        };
        let tok = self.advance();
        Ok(Expr::new(kind, tok.location))
    }
}

/// Contents of a string literal token, quotes removed and escapes resolved
fn unescape(text: &str) -> String {
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Position, ReporterConfig};
    use crate::frontend::lexer::{Scanner, TokenCode};
    use codespan_reporting::term::termcolor::NoColor;
    use pretty_assertions::assert_eq;

    type TestReporter = DiagnosticReporter<NoColor<Vec<u8>>>;

    fn reporter() -> TestReporter {
        DiagnosticReporter::with_writer(NoColor::new(Vec::new()), ReporterConfig::default())
    }

    fn output(reporter: &TestReporter) -> String {
        String::from_utf8(reporter.writer().get_ref().clone()).unwrap()
    }

    fn parse(source: &str) -> (Program, TestReporter) {
        let mut reporter = reporter();
        let program = Parser::new(Scanner::new(source), &mut reporter)
            .parse()
            .unwrap();
        (program, reporter)
    }

    fn loc(sl: u32, sc: u32, el: u32, ec: u32) -> SourceLocation {
        SourceLocation::span(Position::new(sl, sc), Position::new(el, ec))
    }

    #[test]
    fn test_valid_program_reports_nothing() {
        let source = "let x = 1;\nwhile x < 10 do\n  x = x + 1;\nend\nprint x;\n";
        let (program, reporter) = parse(source);
        assert_eq!(program.stmts.len(), 3);
        assert!(!reporter.had_error());
        assert_eq!(output(&reporter), "");
    }

    #[test]
    fn test_locations_merge_over_productions() {
        let (program, _) = parse("let total = 1 + 2 * 3;");
        let stmt = &program.stmts[0];
        assert_eq!(stmt.location, loc(1, 1, 1, 22));

        let StmtKind::Let { name, value } = &stmt.kind else {
            panic!("expected let, got {:?}", stmt.kind);
        };
        assert_eq!(name.location, loc(1, 5, 1, 9));
        assert_eq!(value.location, loc(1, 13, 1, 21));

        let ExprKind::Binary { op, right, .. } = &value.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert_eq!(right.location, loc(1, 17, 1, 21));
    }

    #[test]
    fn test_block_location_spans_to_end_keyword() {
        let (program, _) = parse("if true then\n  print 1;\nelse\n  print 2;\nend");
        assert_eq!(program.stmts[0].location, loc(1, 1, 5, 3));
        assert_eq!(program.location, loc(1, 1, 5, 3));
    }

    #[test]
    fn test_parenthesized_expression_covers_parens() {
        let (program, _) = parse("print (1 + 2) * 3;");
        let StmtKind::Print(value) = &program.stmts[0].kind else {
            panic!("expected print");
        };
        let ExprKind::Binary { left, .. } = &value.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(left.location, loc(1, 7, 1, 13));
        assert_eq!(value.location, loc(1, 7, 1, 17));
    }

    #[test]
    fn test_single_malformed_statement() {
        let source = "let x = 1;\nprint x;\nlet = 3;\n";
        let (program, reporter) = parse(source);
        let text = output(&reporter);
        assert_eq!(text, "3:5: unexpected token '=', expected 'IDENTIFIER'\n");
        assert_eq!(text.lines().count(), 1);
        assert!(reporter.had_error());
        assert_eq!(program.stmts.len(), 2);
    }

    #[test]
    fn test_independent_errors_reported_in_order() {
        let source = "let a = 1;\nprint a +;\nlet b = 2;\nif a < b then\n  print b;\nend\nb = = 4;\n";
        let (program, reporter) = parse(source);
        assert_eq!(
            output(&reporter),
            "2:10: unexpected token ';', expected expression\n\
             7:5: unexpected token '=', expected expression\n"
        );
        assert_eq!(reporter.error_count(), 2);
        assert_eq!(program.stmts.len(), 3);
    }

    #[test]
    fn test_recovery_inside_block() {
        let source = "while true do\n  print );\n  print 2;\nend\nprint 3;";
        let (program, reporter) = parse(source);
        assert_eq!(output(&reporter), "2:9: unexpected token ')', expected expression\n");
        assert_eq!(program.stmts.len(), 2);
        let StmtKind::While { body, .. } = &program.stmts[0].kind else {
            panic!("expected while");
        };
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn test_malformed_if_header_is_one_error() {
        let source = "let x = 1;\nprint x;\nif x ) then\n  print x;\nend\nprint 2;\n";
        let (program, reporter) = parse(source);
        assert_eq!(output(&reporter), "3:6: unexpected token ')', expected 'THEN'\n");
        assert_eq!(reporter.error_count(), 1);
        assert_eq!(program.stmts.len(), 3);
    }

    #[test]
    fn test_malformed_while_header_skips_nested_blocks() {
        let source = "while 1 2 do\n  if true then\n    print 1;\n  end\nend\nprint 2;";
        let (program, reporter) = parse(source);
        assert_eq!(output(&reporter), "1:9: unexpected token 'NUMBER', expected 'DO'\n");
        assert_eq!(program.stmts.len(), 1);
        assert!(matches!(program.stmts[0].kind, StmtKind::Print(_)));
    }

    #[test]
    fn test_missing_end_reported_at_end_of_input() {
        let (_, reporter) = parse("if true then\n  print 1;\n");
        assert_eq!(output(&reporter), "3:1: unexpected token 'EOF', expected 'END'\n");
    }

    #[test]
    fn test_stray_end_at_top_level() {
        let (program, reporter) = parse("print 1;\nend\nprint 2;");
        assert_eq!(output(&reporter), "2:1: unexpected token 'END', expected statement\n");
        assert_eq!(program.stmts.len(), 2);
    }

    #[test]
    fn test_stray_character() {
        let (_, reporter) = parse("let x = 1 @ 2;");
        assert_eq!(output(&reporter), "1:11: unexpected character '@'\n");
    }

    #[test]
    fn test_integer_out_of_range() {
        let (_, reporter) = parse("print 99999999999999999999;");
        assert_eq!(
            output(&reporter),
            "1:7: integer literal '99999999999999999999' is out of range\n"
        );
    }

    #[test]
    fn test_comparisons_do_not_chain() {
        let (_, reporter) = parse("print 1 < 2 < 3;");
        assert_eq!(output(&reporter), "1:13: unexpected token '<', expected ';'\n");
    }

    #[test]
    fn test_string_escapes() {
        let (program, _) = parse(r#"print "a\"b\n";"#);
        let StmtKind::Print(value) = &program.stmts[0].kind else {
            panic!("expected print");
        };
        assert_eq!(value.kind, ExprKind::Str("a\"b\n".to_string()));
    }

    #[test]
    fn test_error_limit_stops_parsing() {
        let mut reporter = reporter();
        let source = "let = 1;\nlet = 2;\nlet = 3;\n";
        let mut parser = Parser::new(Scanner::new(source), &mut reporter).with_error_limit(Some(2));
        parser.parse().unwrap();
        assert!(parser.stopped_early());
        assert_eq!(reporter.error_count(), 2);
        assert_eq!(output(&reporter).lines().count(), 2);
    }

    #[test]
    fn test_error_limit_reached_inside_block() {
        let mut reporter = reporter();
        let source = "while true do\n  let = 1;\n  print 2;\nend\nlet = 5;\n";
        let mut parser = Parser::new(Scanner::new(source), &mut reporter).with_error_limit(Some(1));
        parser.parse().unwrap();
        assert!(parser.stopped_early());
        assert_eq!(reporter.error_count(), 1);
        assert_eq!(
            output(&reporter),
            "2:7: unexpected token '=', expected 'IDENTIFIER'\n"
        );
    }

    #[test]
    fn test_unknown_token_code_is_internal_fault() {
        let mut reporter = reporter();
        let tokens = vec![
            Token::new(TokenKind::Print, SourceLocation::point(1, 1), "print"),
            Token::from_code(TokenCode(999), SourceLocation::point(1, 7), "?"),
            Token::new(TokenKind::Semi, SourceLocation::point(1, 8), ";"),
        ];
        let result = Parser::new(tokens, &mut reporter).parse();
        assert!(matches!(result, Err(InternalFault::UnknownTokenKind(999))));
        assert!(!reporter.had_error());
        assert_eq!(output(&reporter), "");
    }

    #[test]
    fn test_exhausted_token_stream_behaves_as_end_of_input() {
        let mut reporter = reporter();
        let tokens = vec![
            Token::new(TokenKind::Print, SourceLocation::point(1, 1), "print"),
            Token::new(TokenKind::Number, SourceLocation::point(1, 7), "5"),
        ];
        let program = Parser::new(tokens, &mut reporter).parse().unwrap();
        assert!(program.stmts.is_empty());
        assert_eq!(output(&reporter), "1:8: unexpected token 'EOF', expected ';'\n");
    }
}
