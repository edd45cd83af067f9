//! Command-line surface of `zabbix_get`.
//!
//! Every option is collected as a list so repeated options can be reported
//! by name instead of letting the last one win.

use crate::config::MAX_TIMEOUT_SECS;
use crate::errors::CliError;
use clap::Parser;
use passive_check::{Request, DEFAULT_AGENT_PORT};
use std::time::Duration;

/// One-line synopsis shown in usage errors and help.
pub const USAGE: &str =
    "zabbix_get [-hV] -s <host name or IP> [-p <port>] [-I <IP address>] -k <key> [-t <seconds>]";

/// Example appended to the help text.
pub const EXAMPLE: &str =
    "Example: zabbix_get -s 127.0.0.1 -p 10050 -k \"system.cpu.load[all,avg1]\"";

#[derive(Debug, Parser)]
#[command(
    name = "zabbix_get",
    version,
    about = "Retrieve one item value from a Zabbix agent",
    long_about = None,
    override_usage = USAGE,
    after_help = EXAMPLE
)]
pub struct Cli {
    /// Specify host name or IP address of a host
    #[arg(short = 's', long = "host", value_name = "host name or IP")]
    pub host: Vec<String>,

    /// Specify port number of agent running on the host [default: 10050]
    #[arg(
        short = 'p',
        long = "port",
        value_name = "port number",
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub port: Vec<u16>,

    /// Specify source IP address
    #[arg(short = 'I', long = "source-address", value_name = "IP address")]
    pub source_address: Vec<String>,

    /// Specify key of item to retrieve value for
    #[arg(short = 'k', long = "key", value_name = "key of metric")]
    pub key: Vec<String>,

    /// Give up after this many seconds [default: 60]
    #[arg(
        short = 't',
        long = "timeout",
        value_name = "seconds",
        value_parser = clap::value_parser!(u64).range(1..=MAX_TIMEOUT_SECS)
    )]
    pub timeout: Vec<u64>,

    /// Stray arguments, rejected during validation.
    #[arg(hide = true, value_name = "PARAMETER")]
    pub parameters: Vec<String>,
}

/// A validated invocation, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub request: Request,
    /// Timeout given with `-t`, if any.
    pub timeout: Option<Duration>,
}

impl Cli {
    /// Checks option counts and required options, reporting every problem
    /// at once.
    ///
    /// # Errors
    /// [`CliError::Usage`] listing each problem found.
    pub fn validate(self) -> Result<Invocation, CliError> {
        let missing_required = self.host.is_empty() || self.key.is_empty();
        let mut problems = Vec::new();

        for (flag, count) in [
            ("-k", self.key.len()),
            ("-p", self.port.len()),
            ("-s", self.host.len()),
            ("-I", self.source_address.len()),
            ("-t", self.timeout.len()),
        ] {
            if count > 1 {
                problems.push(format!("option \"{flag}\" specified multiple times"));
            }
        }

        for parameter in &self.parameters {
            problems.push(format!("invalid parameter \"{parameter}\""));
        }

        if missing_required || !problems.is_empty() {
            return Err(CliError::Usage {
                missing_required,
                problems,
            });
        }

        let mut host = self.host;
        let mut key = self.key;
        let port = self.port.first().copied().unwrap_or(DEFAULT_AGENT_PORT);

        let mut request = Request::new(host.remove(0), port, key.remove(0))?;
        if let Some(source) = self.source_address.into_iter().next() {
            request = request.with_source_address(source);
        }

        Ok(Invocation {
            request,
            timeout: self.timeout.first().copied().map(Duration::from_secs),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("zabbix_get").chain(args.iter().copied())).unwrap()
    }

    fn usage_problems(args: &[&str]) -> (bool, Vec<String>) {
        match parse(args).validate() {
            Err(CliError::Usage {
                missing_required,
                problems,
            }) => (missing_required, problems),
            other => panic!("expected usage error, got {other:?}"),
        }
    }

    #[test]
    fn test_minimal_invocation() {
        let invocation = parse(&["-s", "127.0.0.1", "-k", "agent.ping"]).validate().unwrap();

        assert_eq!(invocation.request.host(), "127.0.0.1");
        assert_eq!(invocation.request.port(), 10050);
        assert_eq!(invocation.request.key(), "agent.ping");
        assert_eq!(invocation.request.source_address(), None);
        assert_eq!(invocation.timeout, None);
    }

    #[test]
    fn test_long_options() {
        let invocation = parse(&[
            "--host",
            "agent.example",
            "--port",
            "10051",
            "--source-address",
            "10.0.0.5",
            "--key",
            "system.cpu.load[all,avg1]",
            "--timeout",
            "5",
        ])
        .validate()
        .unwrap();

        assert_eq!(invocation.request.host(), "agent.example");
        assert_eq!(invocation.request.port(), 10051);
        assert_eq!(invocation.request.source_address(), Some("10.0.0.5"));
        assert_eq!(invocation.request.key(), "system.cpu.load[all,avg1]");
        assert_eq!(invocation.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_missing_key() {
        let (missing_required, problems) = usage_problems(&["-s", "127.0.0.1"]);
        assert!(missing_required);
        assert!(problems.is_empty());
    }

    #[test]
    fn test_missing_host() {
        let (missing_required, _) = usage_problems(&["-k", "agent.ping"]);
        assert!(missing_required);
    }

    #[test]
    fn test_repeated_options_are_reported() {
        let (missing_required, problems) = usage_problems(&[
            "-s", "a", "-s", "b", "-k", "agent.ping", "-k", "agent.version",
        ]);

        assert!(!missing_required);
        assert_eq!(
            problems,
            vec![
                "option \"-k\" specified multiple times".to_string(),
                "option \"-s\" specified multiple times".to_string(),
            ]
        );
    }

    #[test]
    fn test_positional_parameters_are_rejected() {
        let (_, problems) =
            usage_problems(&["-s", "127.0.0.1", "-k", "agent.ping", "extra", "more"]);

        assert_eq!(
            problems,
            vec![
                "invalid parameter \"extra\"".to_string(),
                "invalid parameter \"more\"".to_string(),
            ]
        );
    }

    #[test]
    fn test_port_out_of_range_is_a_parse_error() {
        let result = Cli::try_parse_from(["zabbix_get", "-s", "h", "-k", "k", "-p", "70000"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_port_zero_is_a_parse_error() {
        let result = Cli::try_parse_from(["zabbix_get", "-s", "h", "-k", "k", "-p", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_timeout_above_limit_is_a_parse_error() {
        let over = (MAX_TIMEOUT_SECS + 1).to_string();
        let result = Cli::try_parse_from(["zabbix_get", "-s", "h", "-k", "k", "-t", &over]);
        assert!(result.is_err());

        let at_limit = MAX_TIMEOUT_SECS.to_string();
        let cli = Cli::try_parse_from(["zabbix_get", "-s", "h", "-k", "k", "-t", &at_limit]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_empty_key_is_invalid() {
        let err = parse(&["-s", "127.0.0.1", "-k", ""]).validate().unwrap_err();
        assert!(matches!(err, CliError::Get(_)), "got {err:?}");
    }

    #[test]
    fn test_help_and_version_are_not_errors_to_report() {
        let help = Cli::try_parse_from(["zabbix_get", "-h"]).unwrap_err();
        assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);

        let version = Cli::try_parse_from(["zabbix_get", "-V"]).unwrap_err();
        assert_eq!(version.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
