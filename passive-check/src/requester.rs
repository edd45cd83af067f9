//! Drives one request/response exchange with an agent.
//!
//! The exchange moves through [`Stage`]s exactly once, never revisiting one:
//!
//! ```text
//! Idle -> Connecting -> Sending -> Receiving -> Decoded -> Done
//!            |             |           |
//!            +-------------+-----------+--> Failed -> Done
//! ```

use crate::codec::{decode, read_until_close, write_request};
use crate::connect::connect;
use crate::deadline::TimeoutGuard;
use crate::error::GetError;
use crate::types::{CheckConfig, DecodedResult, Request};
use std::fmt;

/// Position of an exchange in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing has happened yet.
    Idle,
    /// Resolving the agent and opening the connection.
    Connecting,
    /// Writing the request line.
    Sending,
    /// Reading until the agent closes.
    Receiving,
    /// The reply has been decoded.
    Decoded,
    /// The exchange was abandoned.
    Failed,
    /// Connection released and deadline disarmed.
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Sending => "sending",
            Self::Receiving => "receiving",
            Self::Decoded => "decoded",
            Self::Failed => "failed",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Requests one item value and decodes the reply.
///
/// The whole exchange runs under a single deadline of `config.timeout`. The
/// connection is owned by the exchange and is closed on every path, as soon
/// as the reply is read or the exchange fails or times out.
///
/// # Errors
/// Returns the [`GetError`] of the first stage that failed, or
/// [`GetError::Timeout`] when the deadline elapsed first.
#[tracing::instrument(
    skip(request, config),
    fields(host = %request.host(), port = request.port(), key = %request.key())
)]
pub async fn get_value(
    request: &Request,
    config: &CheckConfig,
) -> Result<DecodedResult, GetError> {
    let guard = TimeoutGuard::arm(config.timeout);
    let result = guard
        .run(exchange(request, config.max_response_bytes))
        .await;
    let elapsed = guard.disarm();
    let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match &result {
        Ok(_) => tracing::debug!(stage = %Stage::Done, elapsed_ms, "Exchange complete"),
        Err(e) => tracing::debug!(
            stage = %Stage::Failed,
            failed_in = %e.stage(),
            elapsed_ms,
            error = %e,
            "Exchange failed"
        ),
    }

    result
}

async fn exchange(request: &Request, limit: usize) -> Result<DecodedResult, GetError> {
    tracing::debug!(stage = %Stage::Connecting, source = ?request.source_address());
    let mut stream = connect(request.host(), request.port(), request.source_address()).await?;

    tracing::debug!(stage = %Stage::Sending);
    let sent = write_request(&mut stream, request.key()).await?;

    tracing::debug!(stage = %Stage::Receiving, bytes_sent = sent);
    let buffer = read_until_close(&mut stream, limit).await?;
    drop(stream);

    tracing::debug!(stage = %Stage::Decoded, bytes_received = buffer.len());
    if buffer.is_empty() {
        tracing::warn!(key = %request.key(), "Agent closed the connection without a reply");
    }

    Ok(decode(&buffer))
}
