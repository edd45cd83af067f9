//! Diagnostics written to stderr.

use crate::cli::USAGE;
use crate::errors::CliError;
use std::path::Path;

/// Base name of the running executable, `zabbix_get` if unknown.
#[must_use]
pub fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map_or_else(
            || "zabbix_get".to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
}

/// Formats one diagnostic line as `<progname> [<pid>]: <message>`.
#[must_use]
pub fn error_line(progname: &str, message: &str) -> String {
    format!("{progname} [{}]: {message}", std::process::id())
}

/// The lines to print for `err`, in order.
#[must_use]
pub fn render(progname: &str, err: &CliError) -> Vec<String> {
    match err {
        CliError::Usage {
            missing_required,
            problems,
        } => {
            let mut lines = Vec::new();
            if *missing_required {
                lines.push(format!("usage: {USAGE}"));
            }
            lines.extend(problems.iter().map(|p| error_line(progname, p)));
            lines
        }
        // Signals end the run silently.
        CliError::Interrupted(_) => Vec::new(),
        other => vec![error_line(progname, &other.to_string())],
    }
}

/// Prints `err` to stderr.
pub fn report(progname: &str, err: &CliError) {
    for line in render(progname, err) {
        eprintln!("{line}");
    }
}
