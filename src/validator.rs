//! Classification of pong replies.
//!
//! A reply is checked against the session in a fixed order and the first
//! failing check decides the verdict:
//!
//! 1. sequence number inside `0..package_count`
//! 2. sequence number equal to the one being waited for (otherwise the reply
//!    is re-checked once as a delayed packet)
//! 3. kind is pong
//! 4. payload matches the identity tag, ignoring ASCII case
//! 5. timestamp equals the send tick recorded for that sequence number

use crate::{
    session::SessionState,
    utils::{
        probe_data::{MessageKind, ProbeMessage},
        ui::{DELAY_SUFFIX, error_line, success_line},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    NumberError,
    PingPongError,
    MessageError,
    TimestampError,
}

impl Verdict {
    /// Report label, `None` for a valid reply.
    pub fn label(self) -> Option<&'static str> {
        match self {
            Verdict::Valid => None,
            Verdict::NumberError => Some("Number Error"),
            Verdict::PingPongError => Some("Ping/Pong Error"),
            Verdict::MessageError => Some("Message Error"),
            Verdict::TimestampError => Some("Timestamp Error"),
        }
    }
}

/// A decoded datagram together with what the receiver measured.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedReply {
    pub message: ProbeMessage,
    /// Datagram length as received.
    pub byte_len: usize,
    /// Round-trip time in milliseconds.
    pub rtt: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub verdict: Verdict,
    /// Sequence number carried by the reply, not the one being waited for.
    pub seq: u32,
    pub rtt: f64,
    /// The reply belongs to another sequence number.
    pub delayed: bool,
    pub report: String,
}

impl Classification {
    /// True when the reply for the expected sequence number is still in flight.
    pub fn needs_another_receive(&self) -> bool {
        self.delayed
    }
}

#[derive(Debug, Clone)]
pub struct MessageValidator {
    host: String,
    port: u16,
    tag: String,
}

impl MessageValidator {
    pub fn new(host: impl Into<String>, port: u16, tag: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            tag: tag.into(),
        }
    }

    /// Classifies `reply` while waiting for sequence number `expected`.
    ///
    /// With `is_delay_recheck` set the sequence comparison is skipped; the
    /// mismatch path sets it itself, so a reply is re-checked at most once.
    pub fn classify(
        &self,
        reply: &ReceivedReply,
        expected: u32,
        session: &SessionState,
        is_delay_recheck: bool,
    ) -> Classification {
        let seq = reply.message.seq;

        if seq >= session.package_count() {
            return self.verdict(reply, Verdict::NumberError);
        }

        if !is_delay_recheck && seq != expected {
            let mut delayed = self.classify(reply, expected, session, true);
            delayed.delayed = true;
            delayed.report.push_str(DELAY_SUFFIX);
            return delayed;
        }

        if reply.message.kind != MessageKind::Pong {
            return self.verdict(reply, Verdict::PingPongError);
        }

        if !reply.message.carries_tag(&self.tag) {
            return self.verdict(reply, Verdict::MessageError);
        }

        // an unsent sequence number has no send tick to match
        if session.sent_timestamp(seq) != Some(reply.message.timestamp) {
            return self.verdict(reply, Verdict::TimestampError);
        }

        self.verdict(reply, Verdict::Valid)
    }

    fn verdict(&self, reply: &ReceivedReply, verdict: Verdict) -> Classification {
        let seq = reply.message.seq;
        let report = match verdict.label() {
            None => success_line(reply.byte_len, &self.host, self.port, seq, reply.rtt),
            Some(label) => error_line(&self.host, self.port, seq, label, reply.rtt),
        };
        Classification {
            verdict,
            seq,
            rtt: reply.rtt,
            delayed: false,
            report,
        }
    }
}
