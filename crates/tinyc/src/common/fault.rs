//! Internal fault reporting
//!
//! Internal logic returns [`InternalFault`] as an ordinary error. Only the
//! top-level handler calls [`fault`], which is the one place the compiler
//! ends the process.

use std::io::{self, Write};
use std::process;

use super::InternalFault;

/// Exit status for an internal fault. Distinct from the status of a run that
/// merely found errors in the user's source.
pub const FAULT_EXIT_CODE: i32 = 70;

/// Exit status when the source had errors
pub const ERROR_EXIT_CODE: i32 = 1;

/// Write the single `internal error:` line for `fault` and flush
pub fn emit_fault(writer: &mut impl Write, fault: &InternalFault) -> io::Result<()> {
    let message = fault.to_string().replace(['\n', '\r'], " ");
    writeln!(writer, "internal error: {message}")?;
    writer.flush()
}

/// Report `fault` on standard error and terminate
pub fn fault(fault: &InternalFault) -> ! {
    let mut stderr = io::stderr().lock();
    // nothing left to report a failed write to
    let _ = emit_fault(&mut stderr, fault);
    process::exit(FAULT_EXIT_CODE)
}

/// The internal fault behind a top-level error, looking through any context
/// added on the way up
pub fn find_fault(error: &anyhow::Error) -> Option<&InternalFault> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<InternalFault>())
}

/// Build an [`InternalFault::Invariant`] with `format!`-style arguments
#[macro_export]
macro_rules! internal_fault {
    ($($arg:tt)+) => {
        $crate::common::InternalFault::Invariant(format!($($arg)+))
    };
}
