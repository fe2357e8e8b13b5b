//! Compilation driver and pipeline orchestration
//!
//! Runs the frontend phases for one unit and decides, from the reporter's
//! error state, whether the next phase may run.

use std::fmt::Write as _;

use codespan_reporting::term::termcolor::WriteColor;

use crate::common::{DiagnosticReporter, InternalFault};
use crate::frontend::ast::Program;
use crate::frontend::{name_of, FrontendConfig, Parser, Scanner, SemanticAnalyzer};

/// Result of compiling one unit
#[derive(Debug)]
pub enum CompileOutcome {
    /// Parsed and analyzed without errors; later phases may run
    Checked(Program),
    /// At least one diagnostic was reported
    Failed { errors: usize },
}

impl CompileOutcome {
    /// Whether later phases may run
    pub fn proceed(&self) -> bool {
        matches!(self, Self::Checked(_))
    }
}

/// Frontend pipeline: scan, parse, analyze
pub struct Pipeline {
    config: FrontendConfig,
}

impl Pipeline {
    pub fn new(config: FrontendConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrontendConfig {
        &self.config
    }

    /// Compile one unit.
    ///
    /// Starts a fresh unit on `reporter`, so its error state only reflects
    /// this source. `Err` means an internal fault; user errors are already on
    /// the reporter's sink and show up as [`CompileOutcome::Failed`].
    pub fn compile_source<W: WriteColor>(
        &self,
        source: &str,
        filename: &str,
        reporter: &mut DiagnosticReporter<W>,
    ) -> Result<CompileOutcome, InternalFault> {
        reporter.begin_unit(filename, source);

        if self.config.verbose {
            eprintln!("Parsing {filename}...");
        }

        let mut parser =
            Parser::new(Scanner::new(source), reporter).with_error_limit(self.config.error_limit);
        let program = parser.parse()?;
        let stopped_early = parser.stopped_early();

        if self.config.verbose && stopped_early {
            eprintln!("Stopped after {} errors", reporter.error_count());
        }
        if reporter.had_error() {
            return Ok(CompileOutcome::Failed {
                errors: reporter.error_count(),
            });
        }

        if self.config.verbose {
            eprintln!("Analyzing...");
        }

        SemanticAnalyzer::new(reporter).analyze(&program)?;
        if reporter.had_error() {
            return Ok(CompileOutcome::Failed {
                errors: reporter.error_count(),
            });
        }

        Ok(CompileOutcome::Checked(program))
    }

    /// One line per token: location range, display name and source text
    pub fn dump_tokens(&self, source: &str) -> Result<String, InternalFault> {
        let mut out = String::new();
        for token in Scanner::new(source) {
            let name = name_of(token.code)?;
            writeln!(
                out,
                "{}-{} {} {:?}",
                token.location.start, token.location.end, name, token.text
            )
            .map_err(|_| InternalFault::MessageFormat)?;
        }
        Ok(out)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(FrontendConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{emit_fault, ReporterConfig, SourceLocation};
    use crate::frontend::{Token, TokenCode, TokenKind};
    use codespan_reporting::term::termcolor::NoColor;
    use pretty_assertions::assert_eq;

    type TestReporter = DiagnosticReporter<NoColor<Vec<u8>>>;

    fn reporter() -> TestReporter {
        DiagnosticReporter::with_writer(NoColor::new(Vec::new()), ReporterConfig::default())
    }

    fn output(reporter: &TestReporter) -> String {
        String::from_utf8(reporter.writer().get_ref().clone()).unwrap()
    }

    fn compile(source: &str) -> (CompileOutcome, String, bool) {
        let mut reporter = reporter();
        let outcome = Pipeline::default()
            .compile_source(source, "test.tiny", &mut reporter)
            .unwrap();
        (outcome, output(&reporter), reporter.had_error())
    }

    #[test]
    fn test_single_error_stops_pipeline() {
        let source = "let x = 1;\nprint x;\nlet = 3;\nprint x;\n";
        let (outcome, text, had_error) = compile(source);

        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("3:5:"));
        assert!(text.ends_with('\n'));
        assert!(had_error);
        assert!(!outcome.proceed());
    }

    #[test]
    fn test_two_errors_in_call_order() {
        let source = "let a = 1;\nprint a +;\nlet b = 2;\nprint b;\nprint a;\nprint b;\nb = = 4;\n";
        let (outcome, text, had_error) = compile(source);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("2:"));
        assert!(lines[1].starts_with("7:"));
        assert!(had_error);
        assert!(matches!(outcome, CompileOutcome::Failed { errors: 2 }));
    }

    #[test]
    fn test_clean_source_proceeds() {
        let source = "let x = 2;\nif x > 1 then\n  print \"big\";\nend\n";
        let (outcome, text, had_error) = compile(source);

        assert_eq!(text, "");
        assert!(!had_error);
        let CompileOutcome::Checked(program) = outcome else {
            panic!("expected a checked program");
        };
        assert_eq!(program.stmts.len(), 2);
    }

    #[test]
    fn test_semantic_errors_fail_the_unit() {
        let (outcome, text, had_error) = compile("print y;\n");
        assert_eq!(text, "1:7: use of undeclared variable 'y'\n");
        assert!(had_error);
        assert!(!outcome.proceed());
    }

    #[test]
    fn test_syntax_errors_skip_semantic_pass() {
        // `y` is undeclared too, but analysis never runs on a broken parse
        let (_, text, _) = compile("print y;\nlet = 1;\n");
        assert_eq!(text, "2:5: unexpected token '=', expected 'IDENTIFIER'\n");
    }

    #[test]
    fn test_units_do_not_share_error_state() {
        let pipeline = Pipeline::default();
        let mut reporter = reporter();

        let first = pipeline
            .compile_source("let = 1;", "a.tiny", &mut reporter)
            .unwrap();
        assert!(!first.proceed());
        assert!(reporter.had_error());

        let second = pipeline
            .compile_source("print 1;", "b.tiny", &mut reporter)
            .unwrap();
        assert!(second.proceed());
        assert!(!reporter.had_error());
    }

    #[test]
    fn test_error_limit() {
        let config = FrontendConfig {
            error_limit: Some(1),
            ..Default::default()
        };
        let mut reporter = reporter();
        let outcome = Pipeline::new(config)
            .compile_source("let = 1;\nlet = 2;\n", "test.tiny", &mut reporter)
            .unwrap();
        assert!(matches!(outcome, CompileOutcome::Failed { errors: 1 }));
        assert_eq!(output(&reporter).lines().count(), 1);
    }

    #[test]
    fn test_corrupt_token_table_faults_with_one_line() {
        let mut reporter = reporter();
        let tokens = vec![
            Token::new(TokenKind::Let, SourceLocation::point(1, 1), "let"),
            Token::from_code(TokenCode(4096), SourceLocation::point(1, 5), "x"),
        ];
        let fault = Parser::new(tokens, &mut reporter).parse().unwrap_err();
        assert_eq!(output(&reporter), "");

        let mut sink = Vec::new();
        emit_fault(&mut sink, &fault).unwrap();
        assert_eq!(
            String::from_utf8(sink).unwrap(),
            "internal error: unknown token kind 4096\n"
        );
    }

    #[test]
    fn test_dump_tokens() {
        let dump = Pipeline::default().dump_tokens("print x;").unwrap();
        assert_eq!(
            dump,
            "1:1-1:5 PRINT \"print\"\n1:7-1:7 IDENTIFIER \"x\"\n1:8-1:8 ; \";\"\n1:9-1:9 EOF \"\"\n"
        );
    }
}
