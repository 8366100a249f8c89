//! Pong server: the echo peer the ping client talks to.
//!
//! This module provides [`PongServer`]: a UDP server that answers every
//! well-formed ping with the same datagram, its kind digit switched to pong.
//! Anything else is logged and dropped.

use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use log::{debug, info, warn};

use crate::errors::UdpPingError;
use crate::utils::net_utils::{ServerCommand, is_timeout};
use crate::utils::probe_data::{KIND_OFFSET, MessageKind, ProbeMessage, RECV_BUFFER_SIZE};

/// How often the server loop checks its control channel.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct PongServer {
    sock: UdpSocket,
    control_rx: Receiver<ServerCommand>,
}

impl PongServer {
    /// Creates a new [`PongServer`] that binds to the given socket address.
    ///
    /// - `addr`: The IP and port to bind to (port 0 picks a free one).
    /// - `control_rx`: A channel receiver to stop the server.
    ///
    /// # Errors
    ///
    /// Returns [`UdpPingError::BindFailed`] if the socket could not be bound.
    pub fn new(addr: SocketAddr, control_rx: Receiver<ServerCommand>) -> Result<Self, UdpPingError> {
        let sock = UdpSocket::bind(addr).map_err(UdpPingError::BindFailed)?;
        sock.set_read_timeout(Some(POLL_INTERVAL))
            .map_err(UdpPingError::BindFailed)?;

        Ok(Self { sock, control_rx })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, UdpPingError> {
        self.sock.local_addr().map_err(UdpPingError::BindFailed)
    }

    /// Runs the pong server loop.
    ///
    /// The loop terminates when:
    /// - A `Stop` command is received.
    /// - The control channel disconnects.
    ///
    /// Returns the number of pongs sent.
    ///
    /// # Errors
    ///
    /// Returns [`UdpPingError::RecvFailed`] or [`UdpPingError::SendFailed`] on socket errors.
    pub fn run(&mut self) -> Result<u64, UdpPingError> {
        info!("pong server listening on {}", self.local_addr()?);

        let mut buf = [0u8; RECV_BUFFER_SIZE];
        let mut served = 0u64;

        loop {
            // Check control messages
            match self.control_rx.try_recv() {
                Ok(ServerCommand::Stop) => {
                    debug!("Received stop command");
                    break;
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    debug!("Control channel closed");
                    break;
                }
            }

            let (len, from) = match self.sock.recv_from(&mut buf) {
                Ok(received) => received,
                Err(e) if is_timeout(&e) || is_peer_reset(&e) => continue,
                Err(e) => return Err(UdpPingError::RecvFailed(e)),
            };

            let Some(reply) = pong_reply(&buf[..len]) else {
                warn!("dropping {len} byte datagram from {from}: not a ping");
                continue;
            };

            self.sock
                .send_to(&reply, from)
                .map_err(UdpPingError::SendFailed)?;
            served += 1;
        }

        info!("pong server stopped after {served} replies");
        Ok(served)
    }
}

/// Pong answering `datagram`, `None` unless it decodes as a ping.
pub fn pong_reply(datagram: &[u8]) -> Option<Vec<u8>> {
    let message = ProbeMessage::decode(datagram).ok()?;
    if message.kind != MessageKind::Ping {
        return None;
    }

    let mut reply = datagram.to_vec();
    reply[KIND_OFFSET] = b'0' + MessageKind::Pong.digit();
    Some(reply)
}

// windows reports an earlier ICMP port unreachable on the next recv_from
pub(crate) fn is_peer_reset(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::ConnectionReset
}
