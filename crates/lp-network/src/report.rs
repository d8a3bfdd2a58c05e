//! Plain-text rendering of the collected continuity warnings.

use std::fmt::Write;

use crate::warning::Warning;

/// Render the warning list into a human-readable log, one line per warning.
/// Pure formatting; an empty list yields an empty string.
pub fn render_log(warnings: &[Warning]) -> String {
    let mut out = String::new();
    for warning in warnings {
        // String formatting is infallible
        let _ = writeln!(out, "{warning}");
    }
    out
}
