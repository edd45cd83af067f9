//! Errors that end a `zabbix_get` run with a failure status.

use passive_check::GetError;
use thiserror::Error;

/// Message printed when the exchange deadline elapses.
pub const TIMEOUT_MESSAGE: &str = "Timeout while executing operation";

/// Errors that end a `zabbix_get` run with a failure status.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid command line; nothing was sent.
    #[error("{}", .problems.join("\n"))]
    Usage {
        /// Host or key was not given.
        missing_required: bool,
        /// One line per problem found.
        problems: Vec<String>,
    },

    /// Invalid setting taken from the environment.
    #[error("invalid value \"{value}\" in {name}: {reason}")]
    Config {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// The exchange deadline elapsed.
    #[error("{}", TIMEOUT_MESSAGE)]
    Timeout,

    /// Interrupted by a termination signal.
    #[error("Interrupted by {0}")]
    Interrupted(&'static str),

    /// The exchange with the agent failed.
    #[error("Get value error: {0}")]
    Get(GetError),

    /// Writing the value to stdout failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<GetError> for CliError {
    fn from(e: GetError) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Get(e)
        }
    }
}
