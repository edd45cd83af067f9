//! Resolves runtime settings from flags and the environment.

use crate::errors::CliError;
use passive_check::{CheckConfig, DEFAULT_TIMEOUT};
use std::time::Duration;

/// Environment variable overriding the default timeout, in seconds.
pub const TIMEOUT_ENV_VAR: &str = "ZABBIX_GET_TIMEOUT";

/// Largest timeout accepted from any source, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 600;

/// Builds the exchange limits.
///
/// Resolution order for the timeout:
/// 1. `flag` (`-t` on the command line).
/// 2. The `ZABBIX_GET_TIMEOUT` environment variable.
/// 3. 60 seconds.
pub fn check_config(flag: Option<Duration>) -> Result<CheckConfig, CliError> {
    check_config_from(flag, std::env::var(TIMEOUT_ENV_VAR).ok())
}

fn check_config_from(
    flag: Option<Duration>,
    env_value: Option<String>,
) -> Result<CheckConfig, CliError> {
    let timeout = match (flag, env_value) {
        (Some(timeout), _) => timeout,
        (None, Some(value)) => parse_timeout(&value)?,
        (None, None) => DEFAULT_TIMEOUT,
    };

    Ok(CheckConfig::new().with_timeout(timeout))
}

fn parse_timeout(value: &str) -> Result<Duration, CliError> {
    let invalid = |reason: &str| CliError::Config {
        name: TIMEOUT_ENV_VAR,
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| invalid("expected a whole number of seconds"))?;

    if !(1..=MAX_TIMEOUT_SECS).contains(&secs) {
        return Err(invalid(&format!("must be between 1 and {MAX_TIMEOUT_SECS}")));
    }

    Ok(Duration::from_secs(secs))
}
