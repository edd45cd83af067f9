//! Passive check wire format.
//!
//! The client writes the item key followed by a newline. The agent answers
//! with arbitrary bytes and closes the connection; there is no length field,
//! so the end of the connection is the end of the message.
//!
//! An agent that cannot provide an item answers with [`NOT_SUPPORTED`], a NUL
//! byte and a human readable reason:
//!
//! ```text
//! ZBX_NOTSUPPORTED\0Unsupported item key\r\n
//! ```

use crate::error::GetError;
use crate::types::DecodedResult;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Label an agent prefixes "item not supported" replies with.
pub const NOT_SUPPORTED: &str = "ZBX_NOTSUPPORTED";

/// Separates [`NOT_SUPPORTED`] from the agent's reason.
const NOT_SUPPORTED_TERMINATOR: u8 = b'\0';

const READ_CHUNK_BYTES: usize = 4096;

/// Builds the request line for `key`.
#[must_use]
pub fn encode_request(key: &str) -> Vec<u8> {
    let mut request = Vec::with_capacity(key.len() + 1);
    request.extend_from_slice(key.as_bytes());
    request.push(b'\n');
    request
}

/// Sends the request line for `key` in a single write.
pub async fn write_request<W>(writer: &mut W, key: &str) -> Result<usize, GetError>
where
    W: AsyncWrite + Unpin,
{
    let request = encode_request(key);
    writer
        .write_all(&request)
        .await
        .map_err(|source| GetError::Send { source })?;
    writer
        .flush()
        .await
        .map_err(|source| GetError::Send { source })?;
    Ok(request.len())
}

/// Reads until the peer closes the stream.
///
/// # Errors
/// [`GetError::Receive`] if a read fails before end of stream and
/// [`GetError::ResponseTooLarge`] once more than `limit` bytes arrive.
pub async fn read_until_close<R>(reader: &mut R, limit: usize) -> Result<Vec<u8>, GetError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    let mut chunk = [0u8; READ_CHUNK_BYTES];

    loop {
        let n = match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => return Err(GetError::Receive { source }),
        };

        if buffer.len() + n > limit {
            return Err(GetError::ResponseTooLarge { limit });
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    Ok(buffer)
}

/// Interprets a complete agent reply.
///
/// The reply is only treated as unsupported when the sentinel is followed by
/// its terminator and at least one more byte. Anything else, including the
/// bare sentinel and an empty reply, is a plain value.
#[must_use]
pub fn decode(buffer: &[u8]) -> DecodedResult {
    let header_len = NOT_SUPPORTED.len() + 1;

    if buffer.len() > header_len
        && buffer.starts_with(NOT_SUPPORTED.as_bytes())
        && buffer[NOT_SUPPORTED.len()] == NOT_SUPPORTED_TERMINATOR
    {
        let message = trim_line_endings(&buffer[header_len..]);
        return DecodedResult::Unsupported {
            label: NOT_SUPPORTED.to_string(),
            message: message.to_vec(),
        };
    }

    DecodedResult::Value(trim_line_endings(buffer).to_vec())
}

/// Strips every trailing `\r` and `\n`.
#[must_use]
pub fn trim_line_endings(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| *b != b'\r' && *b != b'\n')
        .map_or(0, |i| i + 1);
    &bytes[..end]
}
