//! Opens the TCP connection to the agent.

use crate::error::GetError;
use std::io;
use std::net::{IpAddr, SocketAddr};
use tokio::net::{lookup_host, TcpSocket, TcpStream};

/// Connects to `host:port`, binding the local end to `source_address` first
/// when one is given.
///
/// Every resolved target address is tried in order and the first one that
/// accepts wins. The connect itself is not timed here; callers run it under
/// a [`crate::TimeoutGuard`].
///
/// # Errors
/// [`GetError::Resolve`] if the target or source cannot be resolved,
/// [`GetError::Bind`] if binding the source address fails, and
/// [`GetError::Connect`] if no address accepted the connection.
pub async fn connect(
    host: &str,
    port: u16,
    source_address: Option<&str>,
) -> Result<TcpStream, GetError> {
    let target = format!("{host}:{port}");

    let addrs: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|source| GetError::Resolve {
            target: target.clone(),
            source,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(GetError::Resolve {
            target,
            source: io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
        });
    }

    let sources = match source_address {
        Some(address) => Some(resolve_source(address).await?),
        None => None,
    };

    let mut last_error = None;
    for addr in addrs {
        tracing::debug!(%addr, source = ?source_address, "Connecting to agent");

        match connect_addr(addr, sources.as_deref()).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!(%addr, error = %e, "Connect attempt failed");
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| GetError::Connect {
        target,
        source: io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
    }))
}

/// Resolves the local source address to candidate IPs.
async fn resolve_source(address: &str) -> Result<Vec<SocketAddr>, GetError> {
    if let Ok(ip) = address.parse::<IpAddr>() {
        return Ok(vec![SocketAddr::new(ip, 0)]);
    }

    let resolved: Vec<SocketAddr> = lookup_host((address, 0))
        .await
        .map_err(|source| GetError::Bind {
            address: address.to_string(),
            source,
        })?
        .collect();

    if resolved.is_empty() {
        return Err(GetError::Bind {
            address: address.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
        });
    }

    Ok(resolved)
}

async fn connect_addr(
    addr: SocketAddr,
    sources: Option<&[SocketAddr]>,
) -> Result<TcpStream, GetError> {
    let Some(sources) = sources else {
        return TcpStream::connect(addr)
            .await
            .map_err(|source| GetError::Connect {
                target: addr.to_string(),
                source,
            });
    };

    let local = sources
        .iter()
        .find(|s| s.is_ipv4() == addr.is_ipv4())
        .ok_or_else(|| GetError::Connect {
            target: addr.to_string(),
            source: io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "source address family does not match target",
            ),
        })?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()
    } else {
        TcpSocket::new_v6()
    }
    .map_err(|source| GetError::Connect {
        target: addr.to_string(),
        source,
    })?;

    socket.bind(*local).map_err(|source| GetError::Bind {
        address: local.ip().to_string(),
        source,
    })?;

    socket
        .connect(addr)
        .await
        .map_err(|source| GetError::Connect {
            target: addr.to_string(),
            source,
        })
}
