//! Client for Zabbix agent passive checks.
//!
//! A passive check opens one TCP connection to the agent, writes the item key
//! followed by a newline and reads the answer until the agent closes the
//! connection. The whole exchange is bounded by a single deadline.
//!
//! ```no_run
//! use passive_check::{CheckConfig, PassiveCheck, Request, DEFAULT_AGENT_PORT};
//!
//! # async fn demo() -> Result<(), passive_check::GetError> {
//! let request = Request::new("127.0.0.1", DEFAULT_AGENT_PORT, "system.cpu.load[all,avg1]")?;
//! let result = PassiveCheck::new(CheckConfig::default()).get(&request).await?;
//! println!("{result}");
//! # Ok(())
//! # }
//! ```

/// Request line encoding and reply decoding.
pub mod codec;
/// TCP connection setup with optional source address binding.
pub mod connect;
/// Exchange-wide deadline.
pub mod deadline;
/// Error types returned by the client.
pub mod error;
/// Exchange orchestration.
pub mod requester;
/// Requests, limits and decoded results.
pub mod types;

pub use codec::NOT_SUPPORTED;
pub use deadline::TimeoutGuard;
pub use error::GetError;
pub use requester::{get_value, Stage};
pub use types::*;

/// High-level client holding the limits applied to each exchange.
#[derive(Debug, Clone, Default)]
pub struct PassiveCheck {
    /// Limits used for every request.
    pub config: CheckConfig,
}

impl PassiveCheck {
    #[must_use]
    pub const fn new(config: CheckConfig) -> Self {
        Self { config }
    }

    /// Performs one exchange for `request`.
    ///
    /// # Errors
    ///
    /// Returns `GetError` if the agent cannot be reached, the request cannot
    /// be sent, the reply cannot be read, or the deadline elapses.
    pub async fn get(&self, request: &Request) -> Result<DecodedResult, GetError> {
        get_value(request, &self.config).await
    }
}
