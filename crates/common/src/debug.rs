//! Stack trace printing helpers

use crate::rtti;
use std::backtrace::Backtrace;
use std::io::Write;
use tracing::info;

/// Upper bound for `print_stack_trace` output
pub const MAX_STACK_TRACE_BYTES: usize = 2048;

const STACK_BANNER: &str = "------------------------------STACK------------------------------";
const END_BANNER: &str = "-------------------------------END-------------------------------";

/// Capture the current stack trace as text, regardless of `RUST_BACKTRACE`
pub fn stack_trace() -> String {
    Backtrace::force_capture().to_string()
}

/// Write up to `MAX_STACK_TRACE_BYTES` of the current stack trace
///
/// Returns the number of bytes written, or 0 if there is no writer or the
/// write fails.
pub fn print_stack_trace(writer: Option<&mut dyn Write>) -> usize {
    let Some(writer) = writer else {
        return 0;
    };

    let trace = stack_trace();
    let bytes = &trace.as_bytes()[..trace.len().min(MAX_STACK_TRACE_BYTES)];

    match writer.write_all(bytes).and_then(|()| writer.flush()) {
        Ok(()) => bytes.len(),
        Err(_) => 0,
    }
}

/// Up to `size` bytes of the current stack trace framed by banner lines
///
/// Returns an empty string when `size` is 0.
pub fn pretty_stack_trace_string(size: usize) -> String {
    if size == 0 {
        return String::new();
    }

    let trace = stack_trace();
    let bytes = &trace.as_bytes()[..trace.len().min(size)];

    format!(
        "{STACK_BANNER}\n{}\n{END_BANNER}",
        String::from_utf8_lossy(bytes)
    )
}

/// Log `"<function name> called!"`
pub fn print_called_func<F: ?Sized>(function: &F) {
    info!("{} called!", rtti::function_name(function));
}
