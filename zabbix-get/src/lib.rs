//! `zabbix_get`: ask a Zabbix agent for one item value and print it.

/// Command-line parsing and validation.
pub mod cli;
/// Timeout and limit resolution.
pub mod config;
/// Diagnostic formatting.
pub mod diag;
/// Errors that end a run.
pub mod errors;
/// Termination signal handling.
pub mod signals;

use cli::Invocation;
use errors::CliError;
use passive_check::{DecodedResult, PassiveCheck};
use signals::Signals;

/// Runs one validated invocation.
///
/// A termination signal received while the exchange is in flight abandons
/// it; the connection is dropped with the exchange future.
///
/// # Errors
/// [`CliError::Timeout`] when the deadline elapses, [`CliError::Interrupted`]
/// on SIGINT/SIGTERM/SIGQUIT and [`CliError::Get`] for transport failures.
pub async fn run(invocation: Invocation) -> Result<DecodedResult, CliError> {
    let config = config::check_config(invocation.timeout)?;
    let client = PassiveCheck::new(config);
    let registered = Signals::register();

    tokio::select! {
        result = client.get(&invocation.request) => Ok(result?),
        signal = signals::termination(registered) => Err(CliError::Interrupted(signal)),
    }
}
