//! Asynchronous UDP ping client.
//!
//! This module provides [`AsyncPingClient`]: the `tokio` version of
//! [`crate::PingClient`]. It runs the same sequential probe loop on a single
//! task, with `tokio::time::timeout` as the bounded wait for each reply.

use tokio::{
    net::{UdpSocket, lookup_host},
    time::{Instant, timeout_at},
};

use log::info;

use crate::{
    config::PingConfig,
    errors::UdpPingError,
    probe::{PingReport, Prober, ReplyStep},
    utils::{
        clock::{Clock, SystemClock},
        net_utils::local_bind_addr,
        probe_data::RECV_BUFFER_SIZE,
        ui::print_report,
    },
};

/// Asynchronous ping client for a single pong peer.
#[derive(Debug)]
pub struct AsyncPingClient<C = SystemClock> {
    /// Peer, probe count, timeout and identity tag.
    config: PingConfig,
    /// Tick source for send timestamps and arrival times.
    clock: C,
}

impl AsyncPingClient<SystemClock> {
    /// Creates a new async ping client that reads the system clock.
    pub fn new(config: PingConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> AsyncPingClient<C> {
    pub fn with_clock(config: PingConfig, clock: C) -> Self {
        Self { config, clock }
    }

    /// Runs one ping session against the configured peer.
    ///
    /// Returns:
    /// - [`UdpPingError::InvalidConfig`] if the configuration is unusable.
    /// - [`UdpPingError::ResolveFailed`] / [`UdpPingError::NoAddress`] if the host does not resolve.
    /// - [`UdpPingError::BindFailed`] / [`UdpPingError::ConnectFailed`] if the socket cannot be set up.
    pub async fn run(&self) -> Result<PingReport, UdpPingError> {
        self.config.validate()?;

        let host = self.config.host.as_str();
        let peer = lookup_host((host, self.config.port))
            .await
            .map_err(|source| UdpPingError::ResolveFailed {
                host: host.to_string(),
                source,
            })?
            .next()
            .ok_or_else(|| UdpPingError::NoAddress(host.to_string()))?;

        let sock = UdpSocket::bind(local_bind_addr(&peer))
            .await
            .map_err(UdpPingError::BindFailed)?;
        sock.connect(peer)
            .await
            .map_err(UdpPingError::ConnectFailed)?;
        info!("pinging {} (async)", peer);

        self.probe(&sock).await
    }

    /// Runs the probe loop over an already connected socket.
    pub async fn probe(&self, sock: &UdpSocket) -> Result<PingReport, UdpPingError> {
        self.config.validate()?;

        let mut prober = Prober::new(&self.config, &self.clock);
        let mut buf = [0u8; RECV_BUFFER_SIZE];

        for _ in 0..prober.package_count() {
            let (seq, datagram) = prober.prepare_ping()?;

            if let Err(e) = sock.send(&datagram).await {
                prober.on_unreachable(seq, &e);
                continue;
            }

            let deadline = Instant::now() + self.config.timeout;
            loop {
                match timeout_at(deadline, sock.recv(&mut buf)).await {
                    Ok(Ok(len)) => {
                        if prober.on_datagram(seq, &buf[..len]) == ReplyStep::Resolved {
                            break;
                        }
                    }
                    Ok(Err(e)) => {
                        prober.on_unreachable(seq, &e);
                        break;
                    }
                    Err(_elapsed) => {
                        prober.on_timeout(seq);
                        break;
                    }
                }
            }
        }

        let report = prober.finish();
        print_report(&report.host, &report.statistics);
        Ok(report)
    }
}
