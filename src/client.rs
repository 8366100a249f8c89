//! UDP ping client.
//!
//! This module provides [`PingClient`]: a client that sends one sequenced
//! ping per sequence number to a single pong peer, waits a bounded time for
//! each reply and reports round-trip statistics at the end.

use std::{net::UdpSocket, time::Instant};

use log::info;

use crate::{
    config::PingConfig,
    errors::UdpPingError,
    probe::{PingReport, Prober, ReplyStep},
    utils::{
        clock::{Clock, SystemClock},
        net_utils::{is_timeout, local_bind_addr, remaining_until, resolve_peer},
        probe_data::RECV_BUFFER_SIZE,
        ui::print_report,
    },
};

#[derive(Debug)]
pub struct PingClient<C = SystemClock> {
    /// Peer, probe count, timeout and identity tag.
    config: PingConfig,

    /// Tick source for send timestamps and arrival times.
    clock: C,
}

impl PingClient<SystemClock> {
    /// Creates a new ping client that reads the system clock.
    ///
    /// # Parameters
    /// - `config`: Peer address, number of probes and per-probe timeout.
    ///
    /// # Returns
    /// A new [`PingClient`] ready to ping using [`PingClient::run`].
    pub fn new(config: PingConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> PingClient<C> {
    pub fn with_clock(config: PingConfig, clock: C) -> Self {
        Self { config, clock }
    }

    /// Runs one ping session against the configured peer.
    ///
    /// - Resolves the peer and binds an ephemeral local socket connected to it.
    /// - Sends `package_count` pings, one at a time.
    /// - Prints every per-packet line and the final summary.
    ///
    /// The socket lives for the duration of this call only.
    ///
    /// Returns:
    /// - [`UdpPingError::InvalidConfig`] if the configuration is unusable.
    /// - [`UdpPingError::ResolveFailed`] / [`UdpPingError::NoAddress`] if the host does not resolve.
    /// - [`UdpPingError::BindFailed`] / [`UdpPingError::ConnectFailed`] if the socket cannot be set up.
    pub fn run(&self) -> Result<PingReport, UdpPingError> {
        self.config.validate()?;

        let peer = resolve_peer(&self.config.host, self.config.port)?;
        let sock = UdpSocket::bind(local_bind_addr(&peer)).map_err(UdpPingError::BindFailed)?;
        sock.connect(peer).map_err(UdpPingError::ConnectFailed)?;
        info!(
            "pinging {} from {:?}",
            peer,
            sock.local_addr().map_err(UdpPingError::BindFailed)?
        );

        self.probe(&sock)
    }

    /// Runs the probe loop over an already connected socket.
    ///
    /// Per-packet failures are reported and never abort the loop.
    pub fn probe(&self, sock: &UdpSocket) -> Result<PingReport, UdpPingError> {
        self.config.validate()?;

        let mut prober = Prober::new(&self.config, &self.clock);
        let mut buf = [0u8; RECV_BUFFER_SIZE];

        for _ in 0..prober.package_count() {
            let (seq, datagram) = prober.prepare_ping()?;

            if let Err(e) = sock.send(&datagram) {
                prober.on_unreachable(seq, &e);
                continue;
            }

            // delayed replies for other sequence numbers are drained until the deadline
            let deadline = Instant::now() + self.config.timeout;
            loop {
                let Some(remaining) = remaining_until(deadline) else {
                    prober.on_timeout(seq);
                    break;
                };
                if let Err(e) = sock.set_read_timeout(Some(remaining)) {
                    prober.on_unreachable(seq, &e);
                    break;
                }

                match sock.recv(&mut buf) {
                    Ok(len) => {
                        if prober.on_datagram(seq, &buf[..len]) == ReplyStep::Resolved {
                            break;
                        }
                    }
                    Err(e) if is_timeout(&e) => {
                        prober.on_timeout(seq);
                        break;
                    }
                    Err(e) => {
                        prober.on_unreachable(seq, &e);
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

#[cfg(test)]
mod ping_client_tests {
    use super::*;
    use crate::{
        probe::ProbeOutcome,
        utils::probe_data::{KIND_OFFSET, MessageKind, ProbeMessage, Tick},
        validator::Verdict,
    };
    use std::net::SocketAddr;
    use std::thread;
    use std::time::Duration;

    /// Binds a loopback peer socket and returns it with its address
    fn create_peer() -> (UdpSocket, SocketAddr) {
        let peer = UdpSocket::bind("127.0.0.1:0").expect("Failed to bind peer socket");
        let addr = peer.local_addr().unwrap();
        (peer, addr)
    }

    fn create_client(addr: SocketAddr, count: u32, timeout: Duration) -> PingClient {
        let config = PingConfig::new("127.0.0.1", addr.port(), count).with_timeout(timeout);
        PingClient::new(config)
    }

    /// Turns a received ping into its pong
    fn as_pong(ping: &[u8]) -> Vec<u8> {
        let mut pong = ping.to_vec();
        pong[KIND_OFFSET] = b'1';
        pong
    }

    /// Echo peer that answers `count` pings then exits
    fn spawn_echo(peer: UdpSocket, count: u32) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let mut buf = [0u8; 64];
            for _ in 0..count {
                let (len, from) = peer.recv_from(&mut buf).unwrap();
                peer.send_to(&as_pong(&buf[..len]), from).unwrap();
            }
        })
    }

    #[test]
    fn test_echo_peer_all_received() {
        let (peer, addr) = create_peer();
        let handle = spawn_echo(peer, 10);

        let report = create_client(addr, 10, Duration::from_secs(1))
            .run()
            .unwrap();
        handle.join().unwrap();

        assert_eq!(report.statistics.transmitted, 10);
        assert_eq!(report.statistics.received, 10);
        assert_eq!(report.rtt_history.len(), 10);
        assert_eq!(report.statistics.loss_percent, 0);
        assert!(report.outcomes.iter().all(|o| matches!(
            o,
            ProbeOutcome::Reply(c) if c.verdict == Verdict::Valid && !c.delayed
        )));
        assert!(report.outcomes[0]
            .report()
            .starts_with(&format!("23 bytes from 127.0.0.1:{}: udp_seq=1 time=", addr.port())));
    }

    #[test]
    fn test_silent_peer_times_out() {
        // keep the socket bound so nothing is refused
        let (_peer, addr) = create_peer();

        let report = create_client(addr, 4, Duration::from_millis(50))
            .run()
            .unwrap();

        assert_eq!(report.outcomes.len(), 4);
        for (i, outcome) in report.outcomes.iter().enumerate() {
            assert_eq!(
                outcome.report(),
                format!(
                    "From 127.0.0.1:{}: udp_seq={} Connection time out",
                    addr.port(),
                    i + 1
                )
            );
        }
        assert_eq!(report.statistics.received, 0);
        assert_eq!(report.statistics.loss_percent, 100);
        assert_eq!(report.statistics.max_ms, 0.0);
        assert_eq!(report.statistics.mdev_ms, 0.0);
    }

    #[test]
    fn test_delayed_reply_is_drained() {
        let (peer, addr) = create_peer();

        // drop ping 0, then answer ping 1 with the late pong 0 followed by pong 1
        let handle = thread::spawn(move || {
            let mut buf = [0u8; 64];
            let (len, _) = peer.recv_from(&mut buf).unwrap();
            let first = as_pong(&buf[..len]);
            let (len, from) = peer.recv_from(&mut buf).unwrap();
            let second = as_pong(&buf[..len]);
            peer.send_to(&first, from).unwrap();
            peer.send_to(&second, from).unwrap();
        });

        let report = create_client(addr, 2, Duration::from_millis(300))
            .run()
            .unwrap();
        handle.join().unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert!(matches!(report.outcomes[0], ProbeOutcome::TimedOut { seq: 0, .. }));
        assert!(report.outcomes[1].is_delayed());
        assert!(report.outcomes[1].report().contains("udp_seq=1 time="));
        assert!(report.outcomes[1].report().ends_with(" (Packet delay)"));
        assert!(matches!(
            &report.outcomes[2],
            ProbeOutcome::Reply(c) if c.seq == 1 && c.verdict == Verdict::Valid && !c.delayed
        ));
        assert_eq!(report.statistics.received, 2);
        assert_eq!(report.rtt_history.len(), 2);
        assert_eq!(report.statistics.loss_percent, 0);
    }

    #[test]
    fn test_duplicate_reply_is_not_counted_twice() {
        let (peer, addr) = create_peer();

        // answer ping 0, then answer ping 1 with pong 0 again before pong 1
        let handle = thread::spawn(move || {
            let mut buf = [0u8; 64];
            let (len, from) = peer.recv_from(&mut buf).unwrap();
            let first = as_pong(&buf[..len]);
            peer.send_to(&first, from).unwrap();
            let (len, from) = peer.recv_from(&mut buf).unwrap();
            let second = as_pong(&buf[..len]);
            peer.send_to(&first, from).unwrap();
            peer.send_to(&second, from).unwrap();
        });

        let report = create_client(addr, 2, Duration::from_secs(1))
            .run()
            .unwrap();
        handle.join().unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert!(!report.outcomes[0].is_delayed());
        assert!(report.outcomes[1].is_delayed());
        assert!(report.outcomes[1].report().contains("udp_seq=1 time="));
        assert!(matches!(
            &report.outcomes[2],
            ProbeOutcome::Reply(c) if c.seq == 1 && c.verdict == Verdict::Valid && !c.delayed
        ));
        assert_eq!(report.statistics.received, 2);
        assert_eq!(report.rtt_history.len(), 2);
        assert_eq!(report.statistics.consistent, 2);
    }

    #[test]
    fn test_bad_replies_are_classified() {
        let (peer, addr) = create_peer();

        let handle = thread::spawn(move || {
            let mut buf = [0u8; 64];

            // echoed back as a ping
            let (len, from) = peer.recv_from(&mut buf).unwrap();
            peer.send_to(&buf[..len], from).unwrap();

            // wrong identity tag
            let (len, from) = peer.recv_from(&mut buf).unwrap();
            let mut reply = as_pong(&buf[..len]);
            reply[10..23].copy_from_slice(b"WRONG TAG HER");
            peer.send_to(&reply, from).unwrap();

            // wrong timestamp
            let (len, from) = peer.recv_from(&mut buf).unwrap();
            let ping = ProbeMessage::decode(&buf[..len]).unwrap();
            let mut pong = ping.clone();
            pong.kind = MessageKind::Pong;
            pong.timestamp = Tick::from_micros(ping.timestamp.value() as u128 + 1);
            peer.send_to(&pong.encode().unwrap(), from).unwrap();

            // garbage
            let (_, from) = peer.recv_from(&mut buf).unwrap();
            peer.send_to(b"not a pong", from).unwrap();
        });

        let report = create_client(addr, 4, Duration::from_secs(1))
            .run()
            .unwrap();
        handle.join().unwrap();

        let verdicts: Vec<Option<Verdict>> = report
            .outcomes
            .iter()
            .map(|o| match o {
                ProbeOutcome::Reply(c) => Some(c.verdict),
                _ => None,
            })
            .collect();
        assert_eq!(
            verdicts,
            vec![
                Some(Verdict::PingPongError),
                Some(Verdict::MessageError),
                Some(Verdict::TimestampError),
                None,
            ]
        );
        assert!(matches!(report.outcomes[3], ProbeOutcome::Malformed { seq: 3, .. }));
        assert_eq!(report.statistics.received, 4);
        assert_eq!(report.statistics.consistent, 0);
        assert!(report.rtt_history.is_empty());
    }

    #[test]
    fn test_closed_port_never_resolves() {
        let (peer, addr) = create_peer();
        drop(peer);

        let report = create_client(addr, 3, Duration::from_millis(100))
            .run()
            .unwrap();

        assert_eq!(report.outcomes.len(), 3);
        assert!(report.outcomes.iter().all(|o| matches!(
            o,
            ProbeOutcome::Unreachable { .. } | ProbeOutcome::TimedOut { .. }
        )));
        assert_eq!(report.statistics.received, 0);
    }

    #[test]
    fn test_invalid_config_aborts_before_sending() {
        let (peer, addr) = create_peer();
        peer.set_read_timeout(Some(Duration::from_millis(50))).unwrap();

        let result = create_client(addr, 0, Duration::from_secs(1)).run();
        assert!(matches!(result, Err(UdpPingError::InvalidConfig(_))));

        let mut buf = [0u8; 64];
        assert!(peer.recv_from(&mut buf).is_err(), "nothing should be sent");
    }
}
