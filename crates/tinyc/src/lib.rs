//! tinyc - front end for the tiny statement language
//!
//! The interesting part is the diagnostic layer every phase shares:
//!
//! - **Locations** (`common::location`): line/column ranges created by the
//!   scanner and merged by the parser on every reduction
//! - **Token names** (`frontend::lexer`): stable display names for raw token
//!   codes, with unknown codes treated as internal faults
//! - **Diagnostics** (`common::diagnostic`): one `line:col: message` line per
//!   reported error, plus the per-unit error state the driver checks
//! - **Internal faults** (`common::fault`): compiler bugs, reported once as
//!   `internal error: ...` by the single top-level handler
//!
//! The scanner, parser and semantic pass live in `frontend/`, the phase
//! sequencing in `driver/`.

pub mod common;
pub mod driver;
pub mod frontend;

// Re-exports for convenience
pub use common::{
    CompileError, CompileResult, Diagnostic, DiagnosticFormat, DiagnosticReporter, InternalFault,
    ReporterConfig, SourceLocation,
};
pub use driver::{CompileOutcome, Pipeline};
pub use frontend::{name_of, FrontendConfig, TokenCode, TokenKind};
