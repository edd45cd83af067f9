//! Error type shared by every stage of an exchange.

use crate::requester::Stage;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by a passive check exchange.
///
/// An agent answering `ZBX_NOTSUPPORTED` is not an error; it decodes to
/// [`crate::DecodedResult::Unsupported`].
#[derive(Debug, Error)]
pub enum GetError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("cannot resolve [{target}]: {source}")]
    Resolve {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot bind to source address [{address}]: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot connect to [{target}]: {source}")]
    Connect {
        target: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot send request: {source}")]
    Send {
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read response: {source}")]
    Receive {
        #[source]
        source: std::io::Error,
    },

    #[error("response exceeds the limit of {limit} bytes")]
    ResponseTooLarge { limit: usize },

    #[error("Timeout while executing operation (limit {limit:?})")]
    Timeout { limit: Duration },
}

impl GetError {
    /// The exchange stage the failure belongs to.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        match self {
            Self::InvalidRequest(_) => Stage::Idle,
            Self::Resolve { .. } | Self::Bind { .. } | Self::Connect { .. } => Stage::Connecting,
            Self::Send { .. } => Stage::Sending,
            Self::Receive { .. } | Self::ResponseTooLarge { .. } => Stage::Receiving,
            Self::Timeout { .. } => Stage::Failed,
        }
    }

    /// Whether the failure was the exchange deadline elapsing.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
