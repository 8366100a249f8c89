use std::{
    io,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs},
    time::{Duration, Instant},
};

use crate::errors::UdpPingError;

/// Commands that control the pong server behavior.
#[derive(Debug, Clone)]
pub enum ServerCommand {
    Stop,
}

/// Resolves `host:port` to the first matching socket address.
pub(crate) fn resolve_peer(host: &str, port: u16) -> Result<SocketAddr, UdpPingError> {
    (host, port)
        .to_socket_addrs()
        .map_err(|source| UdpPingError::ResolveFailed {
            host: host.to_string(),
            source,
        })?
        .next()
        .ok_or_else(|| UdpPingError::NoAddress(host.to_string()))
}

/// Ephemeral local address of the same family as `peer`.
pub(crate) fn local_bind_addr(peer: &SocketAddr) -> SocketAddr {
    let ip = match peer.ip() {
        IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    };
    SocketAddr::new(ip, 0)
}

/// Time left before `deadline`, or `None` once it has passed.
pub(crate) fn remaining_until(deadline: Instant) -> Option<Duration> {
    deadline
        .checked_duration_since(Instant::now())
        .filter(|d| !d.is_zero())
}

/// Read timeouts surface as `WouldBlock` on unix and `TimedOut` on windows.
pub(crate) fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}
