//! Request, configuration and result types for a passive check.

use crate::error::GetError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

/// Port a Zabbix agent listens on for passive checks.
pub const DEFAULT_AGENT_PORT: u16 = 10050;

/// Upper bound for a whole exchange when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Largest response accepted before the read is aborted.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 128 * 1024 * 1024; // 128 MiB

/// A single item request addressed to one agent.
///
/// Deserializing goes through [`Request::new`], so an empty host or key is
/// rejected there too.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawRequest")]
pub struct Request {
    host: String,
    port: u16,
    source_address: Option<String>,
    key: String,
}

impl Request {
    /// Builds a request for `key` on `host:port`.
    ///
    /// # Errors
    /// Returns [`GetError::InvalidRequest`] if the host or key is empty.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        key: impl Into<String>,
    ) -> Result<Self, GetError> {
        let host = host.into();
        let key = key.into();

        if host.is_empty() {
            return Err(GetError::InvalidRequest("host must not be empty".to_string()));
        }
        if key.is_empty() {
            return Err(GetError::InvalidRequest("key must not be empty".to_string()));
        }

        Ok(Self {
            host,
            port,
            source_address: None,
            key,
        })
    }

    /// Binds the local end of the connection to `address` before connecting.
    #[must_use]
    pub fn with_source_address(mut self, address: impl Into<String>) -> Self {
        self.source_address = Some(address.into());
        self
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn source_address(&self) -> Option<&str> {
        self.source_address.as_deref()
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[derive(Deserialize)]
struct RawRequest {
    host: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default)]
    source_address: Option<String>,
    key: String,
}

const fn default_port() -> u16 {
    DEFAULT_AGENT_PORT
}

impl TryFrom<RawRequest> for Request {
    type Error = GetError;

    fn try_from(raw: RawRequest) -> Result<Self, Self::Error> {
        let request = Self::new(raw.host, raw.port, raw.key)?;
        Ok(match raw.source_address {
            Some(address) => request.with_source_address(address),
            None => request,
        })
    }
}

/// Limits applied to every exchange made by a [`crate::PassiveCheck`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Deadline for the whole exchange: connect, send and read.
    ///
    /// Default: 60 seconds
    pub timeout: Duration,

    /// Maximum number of response bytes buffered before giving up.
    ///
    /// Default: 128 MiB
    pub max_response_bytes: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl CheckConfig {
    /// Equivalent to `CheckConfig::default()`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }
}

/// What the agent answered.
///
/// Payloads are kept as the bytes the agent sent; agents may answer in any
/// encoding. `Display` is lossy and meant for logs, use
/// [`DecodedResult::write_to`] for output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecodedResult {
    /// The item value with trailing line endings removed.
    Value(Vec<u8>),
    /// The agent cannot provide the item.
    Unsupported {
        /// Always [`crate::codec::NOT_SUPPORTED`].
        label: String,
        /// Agent supplied reason, trailing line endings removed.
        message: Vec<u8>,
    },
}

impl DecodedResult {
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Writes the result followed by a newline, payload bytes unchanged.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            Self::Value(value) => writer.write_all(value)?,
            Self::Unsupported { label, message } => {
                writer.write_all(label.as_bytes())?;
                writer.write_all(b": ")?;
                writer.write_all(message)?;
            }
        }
        writer.write_all(b"\n")
    }
}

impl fmt::Display for DecodedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.write_str(&String::from_utf8_lossy(value)),
            Self::Unsupported { label, message } => {
                write!(f, "{label}: {}", String::from_utf8_lossy(message))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_request_rejects_empty_key() {
        let err = Request::new("127.0.0.1", DEFAULT_AGENT_PORT, "").unwrap_err();
        assert!(matches!(err, GetError::InvalidRequest(_)));
    }

    #[test]
    fn test_request_rejects_empty_host() {
        let err = Request::new("", DEFAULT_AGENT_PORT, "agent.ping").unwrap_err();
        assert!(matches!(err, GetError::InvalidRequest(_)));
    }

    #[test]
    fn test_request_source_address() {
        let request = Request::new("agent.example", 10051, "agent.ping")
            .unwrap()
            .with_source_address("10.0.0.5");

        assert_eq!(request.host(), "agent.example");
        assert_eq!(request.port(), 10051);
        assert_eq!(request.key(), "agent.ping");
        assert_eq!(request.source_address(), Some("10.0.0.5"));
    }

    #[test]
    fn test_default_config() {
        let config = CheckConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_response_bytes, 128 * 1024 * 1024);
    }

    #[test]
    fn test_display_value() {
        let result = DecodedResult::Value(b"0.15".to_vec());
        assert_eq!(result.to_string(), "0.15");
        assert!(!result.is_unsupported());
    }

    #[test]
    fn test_display_unsupported() {
        let result = DecodedResult::Unsupported {
            label: "ZBX_NOTSUPPORTED".to_string(),
            message: b"Unsupported item key".to_vec(),
        };
        assert_eq!(result.to_string(), "ZBX_NOTSUPPORTED: Unsupported item key");
        assert!(result.is_unsupported());
    }

    #[test]
    fn test_write_to_keeps_non_utf8_bytes() {
        let mut out = Vec::new();
        DecodedResult::Value(b"caf\xe9".to_vec())
            .write_to(&mut out)
            .unwrap();
        assert_eq!(out, b"caf\xe9\n");
    }

    #[test]
    fn test_write_to_unsupported() {
        let mut out = Vec::new();
        DecodedResult::Unsupported {
            label: "ZBX_NOTSUPPORTED".to_string(),
            message: b"Nie obs\xb3ugiwany klucz".to_vec(),
        }
        .write_to(&mut out)
        .unwrap();
        assert_eq!(out, b"ZBX_NOTSUPPORTED: Nie obs\xb3ugiwany klucz\n");
    }

    #[test]
    fn test_deserialize_goes_through_validation() {
        let err = serde_json::from_str::<Request>(r#"{"host":"","key":""}"#).unwrap_err();
        assert!(err.to_string().contains("must not be empty"), "got {err}");
    }

    #[test]
    fn test_deserialize_valid_request() {
        let request: Request = serde_json::from_str(
            r#"{"host":"agent.example","key":"agent.ping","source_address":"10.0.0.5"}"#,
        )
        .unwrap();

        assert_eq!(request.port(), DEFAULT_AGENT_PORT);
        assert_eq!(request.source_address(), Some("10.0.0.5"));
        assert_eq!(request.key(), "agent.ping");
    }
}
