//! Async pong server.
//!
//! This module provides [`AsyncPongServer`]: the `tokio` version of
//! [`crate::PongServer`], stopped through an async control channel.

use std::net::SocketAddr;

use log::{debug, info, warn};
use tokio::{net::UdpSocket, sync::mpsc::Receiver};

use crate::{
    errors::UdpPingError,
    server::{is_peer_reset, pong_reply},
    utils::{net_utils::ServerCommand, probe_data::RECV_BUFFER_SIZE},
};

/// Asynchronous echo peer for the ping client.
#[derive(Debug)]
pub struct AsyncPongServer {
    sock: UdpSocket,
    /// Async receiver for the `Stop` command from another task.
    control_rx: Receiver<ServerCommand>,
}

impl AsyncPongServer {
    /// Creates a new [`AsyncPongServer`] that binds to the given socket address.
    ///
    /// # Errors
    ///
    /// Returns [`UdpPingError::BindFailed`] if the socket could not be bound.
    pub async fn new(
        addr: SocketAddr,
        control_rx: Receiver<ServerCommand>,
    ) -> Result<Self, UdpPingError> {
        let sock = UdpSocket::bind(addr)
            .await
            .map_err(UdpPingError::BindFailed)?;
        Ok(Self { sock, control_rx })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, UdpPingError> {
        self.sock.local_addr().map_err(UdpPingError::BindFailed)
    }

    /// Runs the async pong server loop until `Stop` arrives or the control
    /// channel closes, and returns the number of pongs sent.
    ///
    /// # Errors
    ///
    /// Returns [`UdpPingError::RecvFailed`] or [`UdpPingError::SendFailed`] on socket errors.
    pub async fn run(&mut self) -> Result<u64, UdpPingError> {
        info!("async pong server listening on {}", self.local_addr()?);

        let mut buf = [0u8; RECV_BUFFER_SIZE];
        let mut served = 0u64;

        loop {
            let (len, from) = tokio::select! {
                cmd = self.control_rx.recv() => {
                    match cmd {
                        Some(ServerCommand::Stop) => debug!("Received stop command"),
                        None => debug!("Control channel closed"),
                    }
                    break;
                }
                received = self.sock.recv_from(&mut buf) => match received {
                    Ok(received) => received,
                    Err(e) if is_peer_reset(&e) => continue,
                    Err(e) => return Err(UdpPingError::RecvFailed(e)),
                },
            };

            let Some(reply) = pong_reply(&buf[..len]) else {
                warn!("dropping {len} byte datagram from {from}: not a ping");
                continue;
            };

            self.sock
                .send_to(&reply, from)
                .await
                .map_err(UdpPingError::SendFailed)?;
            served += 1;
        }

        info!("async pong server stopped after {served} replies");
        Ok(served)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::probe_data::{IDENTITY_TAG, ProbeMessage, Tick};
    use std::time::Duration;
    use tokio::sync::mpsc::channel;

    #[tokio::test]
    async fn test_async_server_echoes_and_stops() {
        let (tx, rx) = channel(1);
        let mut server = AsyncPongServer::new("127.0.0.1:0".parse().unwrap(), rx)
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        let handle = tokio::spawn(async move { server.run().await });

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let ping = ProbeMessage::ping(7, Tick::new(999).unwrap(), IDENTITY_TAG)
            .encode()
            .unwrap();
        client.send_to(&ping, addr).await.unwrap();

        let mut buf = [0u8; 64];
        let (len, _) = tokio::time::timeout(Duration::from_secs(1), client.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buf[..len], b"0000710999SOPHIE DILHON");

        tx.send(ServerCommand::Stop).await.unwrap();
        assert_eq!(handle.await.unwrap().unwrap(), 1);
    }
}
