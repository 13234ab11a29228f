//! Terminal output for `fppt-ctl`.
//!
//! Produced paths go to stdout unstyled, one per line, so the output can be
//! consumed by build scripts. Diagnostics go to stderr; `anstream` strips the
//! styling when stderr is not a terminal.

mod styles;

use std::io::Write;

pub(crate) use styles::clap_styles;

use styles::ERROR;

/// Print an error diagnostic to stderr as a single `[ERROR]` line.
pub(crate) fn error(msg: impl std::fmt::Display) {
    let line = single_line(&msg.to_string());
    let mut out = anstream::stderr().lock();
    writeln!(out, "{ERROR}[ERROR]{ERROR:#} {line}").ok();
}

/// Print plain text to stdout.
pub(crate) fn plain(msg: impl std::fmt::Display) {
    let mut out = anstream::stdout().lock();
    writeln!(out, "{msg}").ok();
}

/// Collapse multi-line messages (e.g. template parse errors) onto one line.
fn single_line(msg: &str) -> String {
    msg.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
