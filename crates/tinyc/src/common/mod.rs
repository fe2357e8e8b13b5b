//! Diagnostic infrastructure shared by every phase (locations, errors, reporting)

pub mod diagnostic;
mod error;
pub mod fault;
pub mod location;

pub use diagnostic::{Diagnostic, DiagnosticFormat, DiagnosticReporter, ReporterConfig};
pub use error::{CompileError, CompileResult, InternalFault};
pub use fault::{emit_fault, fault};
pub use location::{LineIndex, Position, SourceLocation};
