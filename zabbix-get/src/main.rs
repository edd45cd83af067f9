//! The `zabbix_get` binary.

use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use zabbix_get::cli::Cli;
use zabbix_get::{diag, run};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let progname = diag::program_name();

    // Logs go to stderr so stdout only ever carries the value.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Nowhere left to report a failed write to stderr.
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let outcome = match cli.validate() {
        Ok(invocation) => run(invocation).await,
        Err(e) => Err(e),
    };

    // Values go out as the agent's raw bytes, not through `Display`.
    let outcome = outcome.and_then(|result| {
        let mut stdout = std::io::stdout().lock();
        result.write_to(&mut stdout)?;
        stdout.flush()?;
        Ok(())
    });

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "zabbix_get failed");
            diag::report(&progname, &e);
            ExitCode::FAILURE
        }
    }
}
