//! Error types
//!
//! Two disjoint kinds: user diagnostics, which always carry the location they
//! are attributed to, and [`InternalFault`]s, which mean the compiler's own
//! state can no longer be trusted.

use std::io;

use thiserror::Error;

use super::diagnostic::Diagnostic;
use super::SourceLocation;

/// A violated compiler invariant. Never attributable to the user's source.
#[derive(Error, Debug)]
pub enum InternalFault {
    #[error("unknown token kind {0}")]
    UnknownTokenKind(u16),

    #[error("failed to format diagnostic message")]
    MessageFormat,

    #[error("cannot write to diagnostic sink: {0}")]
    Sink(#[from] io::Error),

    #[error("location {location} is outside of '{file}'")]
    InvalidLocation {
        location: SourceLocation,
        file: String,
    },

    #[error("{0}")]
    Invariant(String),
}

/// Compile error raised by a grammar action or semantic check
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("{location}: {message}")]
    Lexer {
        message: String,
        location: SourceLocation,
    },

    #[error("{location}: {message}")]
    Syntax {
        message: String,
        location: SourceLocation,
    },

    #[error("{location}: {message}")]
    Semantic {
        message: String,
        location: SourceLocation,
    },

    #[error("internal error: {0}")]
    Internal(#[from] InternalFault),
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Lexer {
            message: message.into(),
            location,
        }
    }

    pub fn syntax(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Syntax {
            message: message.into(),
            location,
        }
    }

    pub fn semantic(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Semantic {
            message: message.into(),
            location,
        }
    }

    /// Split a user diagnostic from an internal fault.
    ///
    /// User errors become a [`Diagnostic`] ready for the reporter; faults come
    /// back as `Err` so they keep propagating to the top-level handler.
    pub fn into_diagnostic(self) -> Result<Diagnostic, InternalFault> {
        match self {
            Self::Lexer { message, location }
            | Self::Syntax { message, location }
            | Self::Semantic { message, location } => Ok(Diagnostic::new(location, message)),
            Self::Internal(fault) => Err(fault),
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
