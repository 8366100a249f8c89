//! Per-sequence state machine shared by the sync and async clients.
//!
//! The clients own the socket and the waiting; [`Prober`] owns everything
//! else: building pings, classifying what arrives, updating the session and
//! emitting the report lines.

use std::io;

use log::{debug, warn};

use crate::{
    config::PingConfig,
    errors::{DecodeError, UdpPingError},
    result::PingStatistics,
    session::SessionState,
    utils::{
        clock::Clock,
        probe_data::{MessageKind, ProbeMessage, encode},
        ui::{error_line, print_line, timeout_line, unreachable_line},
    },
    validator::{Classification, MessageValidator, ReceivedReply, Verdict},
};

/// What happened to one probe, or to one stray reply seen while waiting.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// A decoded reply, resolving the probe unless it is delayed.
    Reply(Classification),
    /// A datagram that could not be decoded; resolves the probe.
    Malformed {
        seq: u32,
        error: DecodeError,
        report: String,
    },
    TimedOut { seq: u32, report: String },
    Unreachable { seq: u32, report: String },
}

impl ProbeOutcome {
    pub fn report(&self) -> &str {
        match self {
            ProbeOutcome::Reply(c) => &c.report,
            ProbeOutcome::Malformed { report, .. }
            | ProbeOutcome::TimedOut { report, .. }
            | ProbeOutcome::Unreachable { report, .. } => report,
        }
    }

    /// True for a reply to some other sequence number.
    pub fn is_delayed(&self) -> bool {
        matches!(self, ProbeOutcome::Reply(c) if c.delayed)
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct PingReport {
    pub host: String,
    pub port: u16,
    /// Outcomes in the order they were reported.
    pub outcomes: Vec<ProbeOutcome>,
    pub rtt_history: Vec<f64>,
    pub statistics: PingStatistics,
}

/// Whether the probe loop keeps waiting for the current sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReplyStep {
    Resolved,
    KeepListening,
}

pub(crate) struct Prober<C> {
    host: String,
    port: u16,
    tag: String,
    validator: MessageValidator,
    session: SessionState,
    clock: C,
    outcomes: Vec<ProbeOutcome>,
}

impl<C: Clock> Prober<C> {
    pub(crate) fn new(config: &PingConfig, clock: C) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            tag: config.tag.clone(),
            validator: MessageValidator::new(config.host.clone(), config.port, config.tag.clone()),
            session: SessionState::new(config.package_count),
            clock,
            outcomes: Vec::with_capacity(config.package_count as usize),
        }
    }

    /// Builds the ping for the next sequence number and records its send tick.
    pub(crate) fn prepare_ping(&mut self) -> Result<(u32, Vec<u8>), UdpPingError> {
        let seq = self.session.next_seq();
        let tick = self.clock.now_ticks();
        let datagram = encode(seq, MessageKind::Ping, tick, &self.tag)?;
        self.session.record_sent(tick);
        debug!("udp_seq={} sent at tick {:04}", seq + 1, tick.value());
        Ok((seq, datagram))
    }

    /// Handles one datagram received while waiting for `expected`.
    pub(crate) fn on_datagram(&mut self, expected: u32, data: &[u8]) -> ReplyStep {
        let arrival = self.clock.now_ticks();

        let message = match ProbeMessage::decode(data) {
            Ok(message) => message,
            Err(error) => {
                warn!("udp_seq={}: undecodable reply: {}", expected + 1, error);
                let report = error_line(
                    &self.host,
                    self.port,
                    expected,
                    Verdict::MessageError.label().unwrap_or_default(),
                    0.0,
                );
                self.session.resolve_unparsed(expected);
                self.emit(ProbeOutcome::Malformed {
                    seq: expected,
                    error,
                    report,
                });
                return ReplyStep::Resolved;
            }
        };

        let reply = ReceivedReply {
            rtt: message.timestamp.rtt_ms(arrival),
            message,
            byte_len: data.len(),
        };
        let classification = self
            .validator
            .classify(&reply, expected, &self.session, false);
        debug!(
            "udp_seq={}: reply for seq {} classified {:?} (delayed: {})",
            expected + 1,
            classification.seq + 1,
            classification.verdict,
            classification.delayed
        );

        let step = if classification.needs_another_receive() {
            ReplyStep::KeepListening
        } else {
            ReplyStep::Resolved
        };
        self.session.resolve(expected, &classification);
        self.emit(ProbeOutcome::Reply(classification));
        step
    }

    pub(crate) fn on_timeout(&mut self, seq: u32) {
        let report = timeout_line(&self.host, self.port, seq);
        self.emit(ProbeOutcome::TimedOut { seq, report });
    }

    pub(crate) fn on_unreachable(&mut self, seq: u32, error: &io::Error) {
        debug!("udp_seq={}: transport failure: {}", seq + 1, error);
        let report = unreachable_line(&self.host, self.port, seq);
        self.emit(ProbeOutcome::Unreachable { seq, report });
    }

    pub(crate) fn package_count(&self) -> u32 {
        self.session.package_count()
    }

    pub(crate) fn finish(self) -> PingReport {
        PingReport {
            statistics: PingStatistics::from_session(&self.session),
            rtt_history: self.session.rtt_history().to_vec(),
            host: self.host,
            port: self.port,
            outcomes: self.outcomes,
        }
    }

    fn emit(&mut self, outcome: ProbeOutcome) {
        print_line(outcome.report());
        self.outcomes.push(outcome);
    }
}
