//! User-facing diagnostic reporting
//!
//! The reporter owns the per-unit error state. The driver creates one, hands
//! it to the parser and the semantic pass by `&mut`, and asks
//! [`DiagnosticReporter::had_error`] between phases.
//!
//! In the default [`DiagnosticFormat::Short`] every call to
//! [`DiagnosticReporter::report`] writes exactly one line,
//! `<line>:<col>: <message>`, in call order. Error-scraping tools depend on
//! that shape.

use std::fmt;

use codespan_reporting::diagnostic::{Diagnostic as CodespanDiagnostic, Label};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};

use super::location::{Position, SourceLocation};
use super::InternalFault;

/// A located user diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub location: SourceLocation,
    pub message: String,
}

impl Diagnostic {
    /// Line breaks inside `message` are folded into spaces
    pub fn new(location: SourceLocation, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.contains(['\n', '\r']) {
            message
                .split(['\n', '\r'])
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            message
        };
        Self { location, message }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// How diagnostics are rendered on the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagnosticFormat {
    /// `line:col: message`, one line per diagnostic
    #[default]
    Short,
    /// Multi-line report with a source snippet
    Rich,
}

#[derive(Debug, Clone, Copy)]
pub struct ReporterConfig {
    pub format: DiagnosticFormat,
    pub color: ColorChoice,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            format: DiagnosticFormat::Short,
            color: ColorChoice::Auto,
        }
    }
}

/// Report a located diagnostic with `format!`-style arguments.
///
/// ```ignore
/// report!(reporter, token.location, "unexpected token '{}'", name)?;
/// ```
#[macro_export]
macro_rules! report {
    ($reporter:expr, $location:expr, $($arg:tt)+) => {
        $reporter.report($location, format_args!($($arg)+))
    };
}

/// Writes diagnostics for one compilation unit at a time
pub struct DiagnosticReporter<W: WriteColor = StandardStream> {
    writer: W,
    config: ReporterConfig,
    files: SimpleFiles<String, String>,
    current_file: Option<usize>,
    had_error: bool,
    error_count: usize,
}

impl DiagnosticReporter<StandardStream> {
    /// Reporter writing to standard error
    pub fn stderr(config: ReporterConfig) -> Self {
        Self::with_writer(StandardStream::stderr(config.color), config)
    }
}

impl<W: WriteColor> DiagnosticReporter<W> {
    pub fn with_writer(writer: W, config: ReporterConfig) -> Self {
        Self {
            writer,
            config,
            files: SimpleFiles::new(),
            current_file: None,
            had_error: false,
            error_count: 0,
        }
    }

    /// Start a new compilation unit. Clears the error state and registers the
    /// source so rich diagnostics can quote it.
    pub fn begin_unit(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        let file_id = self.files.add(name.into(), source.into());
        self.current_file = Some(file_id);
        self.had_error = false;
        self.error_count = 0;
        file_id
    }

    /// Whether any diagnostic was reported in the current unit
    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Format and emit one diagnostic at `location`.
    ///
    /// Only fails with an [`InternalFault`]: a message that cannot be
    /// formatted, a location that is unknown or outside the current file, or
    /// a sink that cannot be written.
    pub fn report(
        &mut self,
        location: SourceLocation,
        args: fmt::Arguments<'_>,
    ) -> Result<(), InternalFault> {
        let mut message = String::new();
        fmt::write(&mut message, args).map_err(|_| InternalFault::MessageFormat)?;
        self.emit(&Diagnostic::new(location, message))
    }

    /// Emit a prebuilt diagnostic
    pub fn emit(&mut self, diagnostic: &Diagnostic) -> Result<(), InternalFault> {
        if diagnostic.location.is_unknown() {
            return Err(crate::internal_fault!(
                "diagnostic without a source location: {}",
                diagnostic.message
            ));
        }

        match (self.config.format, self.current_file) {
            (DiagnosticFormat::Rich, Some(file_id)) => self.emit_rich(file_id, diagnostic)?,
            _ => {
                writeln!(self.writer, "{diagnostic}")?;
                self.writer.flush()?;
            }
        }

        self.had_error = true;
        self.error_count += 1;
        Ok(())
    }

    fn emit_rich(&mut self, file_id: usize, diagnostic: &Diagnostic) -> Result<(), InternalFault> {
        let start = self.byte_offset(file_id, diagnostic.location, diagnostic.location.start)?;
        let last = self.byte_offset(file_id, diagnostic.location, diagnostic.location.end)?;
        let source = self.source(file_id)?;
        let end = source[last..]
            .chars()
            .next()
            .map_or(last, |c| last + c.len_utf8());

        let report = CodespanDiagnostic::error()
            .with_message(&diagnostic.message)
            .with_labels(vec![Label::primary(file_id, start..end)]);

        term::emit(&mut self.writer, &term::Config::default(), &self.files, &report)
            .map_err(|e| match e {
                codespan_reporting::files::Error::Io(io) => InternalFault::Sink(io),
                other => crate::internal_fault!("cannot render diagnostic: {other}"),
            })?;
        self.writer.flush()?;
        Ok(())
    }

    fn source(&self, file_id: usize) -> Result<&str, InternalFault> {
        self.files
            .get(file_id)
            .map(|file| file.source().as_str())
            .map_err(|e| crate::internal_fault!("unregistered file {file_id}: {e}"))
    }

    /// Byte offset of `pos` within the registered file
    fn byte_offset(
        &self,
        file_id: usize,
        location: SourceLocation,
        pos: Position,
    ) -> Result<usize, InternalFault> {
        let invalid = || InternalFault::InvalidLocation {
            location,
            file: self
                .files
                .name(file_id)
                .map(|name| name.to_string())
                .unwrap_or_default(),
        };

        let line = pos.line.checked_sub(1).ok_or_else(invalid)? as usize;
        let column = pos.column.checked_sub(1).ok_or_else(invalid)? as usize;
        let range = self.files.line_range(file_id, line).map_err(|_| invalid())?;
        let text = &self.source(file_id)?[range.clone()];

        match text.char_indices().nth(column) {
            Some((i, _)) => Ok(range.start + i),
            // one past the last character: end of input
            None if text.chars().count() == column => Ok(range.start + text.len()),
            None => Err(invalid()),
        }
    }
}
