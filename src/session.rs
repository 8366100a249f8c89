//! Mutable state of one ping run.

use crate::{
    utils::probe_data::Tick,
    validator::{Classification, Verdict},
};

#[derive(Debug, Clone)]
pub struct SessionState {
    package_count: u32,
    /// Send tick of every probe, indexed by sequence number.
    sent_timestamps: Vec<Tick>,
    /// RTTs (ms) of the replies that passed every check.
    rtt_history: Vec<f64>,
    /// Whether a reply was already counted for each sent sequence number.
    resolved: Vec<bool>,
    received_count: u32,
}

impl SessionState {
    pub fn new(package_count: u32) -> Self {
        Self {
            package_count,
            sent_timestamps: Vec::with_capacity(package_count as usize),
            rtt_history: Vec::with_capacity(package_count as usize),
            resolved: Vec::with_capacity(package_count as usize),
            received_count: 0,
        }
    }

    pub fn package_count(&self) -> u32 {
        self.package_count
    }

    /// Next sequence number to send.
    pub fn next_seq(&self) -> u32 {
        self.sent_timestamps.len() as u32
    }

    /// Records the send tick of the next sequence number and returns that number.
    pub fn record_sent(&mut self, tick: Tick) -> u32 {
        let seq = self.next_seq();
        self.sent_timestamps.push(tick);
        self.resolved.push(false);
        seq
    }

    /// Send tick of `seq`, `None` if it was never sent.
    pub fn sent_timestamp(&self, seq: u32) -> Option<Tick> {
        self.sent_timestamps.get(seq as usize).copied()
    }

    pub fn rtt_history(&self) -> &[f64] {
        &self.rtt_history
    }

    pub fn received_count(&self) -> u32 {
        self.received_count
    }

    /// True once a reply has been counted for `seq`.
    pub fn is_resolved(&self, seq: u32) -> bool {
        self.resolved.get(seq as usize).copied().unwrap_or(false)
    }

    /// Applies a classified reply received while waiting for `expected`.
    ///
    /// A non-delayed verdict resolves `expected`. A delayed one resolves the
    /// sequence number it carries, provided that number was sent and no reply
    /// was counted for it yet; duplicates leave the counters untouched.
    pub fn resolve(&mut self, expected: u32, classification: &Classification) {
        let seq = if classification.delayed {
            classification.seq
        } else {
            expected
        };
        if !self.mark_resolved(seq) {
            return;
        }
        if classification.verdict == Verdict::Valid {
            self.rtt_history.push(classification.rtt);
        }
    }

    /// Counts a reply that resolved `expected` without a verdict worth an RTT
    /// sample (an undecodable datagram).
    pub fn resolve_unparsed(&mut self, expected: u32) {
        self.mark_resolved(expected);
    }

    fn mark_resolved(&mut self, seq: u32) -> bool {
        match self.resolved.get_mut(seq as usize) {
            Some(done) if !*done => {
                *done = true;
                self.received_count += 1;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(seq: u32, verdict: Verdict, delayed: bool, rtt: f64) -> Classification {
        Classification {
            verdict,
            seq,
            rtt,
            delayed,
            report: String::new(),
        }
    }

    #[test]
    fn test_record_sent_appends_in_order() {
        let mut session = SessionState::new(3);
        assert_eq!(session.record_sent(Tick::new(10).unwrap()), 0);
        assert_eq!(session.record_sent(Tick::new(20).unwrap()), 1);
        assert_eq!(session.sent_timestamp(1), Tick::new(20));
        assert_eq!(session.sent_timestamp(2), None);
        assert_eq!(session.next_seq(), 2);
    }

    #[test]
    fn test_resolve_counts_and_records_only_valid() {
        let mut session = SessionState::new(4);
        for t in [10, 20, 30, 40] {
            session.record_sent(Tick::new(t).unwrap());
        }
        session.resolve(0, &classification(0, Verdict::Valid, false, 1.5));
        session.resolve(1, &classification(1, Verdict::TimestampError, false, 2.0));
        session.resolve_unparsed(2);

        assert_eq!(session.received_count(), 3);
        assert_eq!(session.rtt_history(), &[1.5]);
        assert!(session.is_resolved(2));
        assert!(!session.is_resolved(3));
    }

    #[test]
    fn test_late_reply_resolves_its_own_sequence() {
        let mut session = SessionState::new(2);
        session.record_sent(Tick::new(10).unwrap());
        session.record_sent(Tick::new(20).unwrap());

        // pong 0 shows up while waiting for 1
        session.resolve(1, &classification(0, Verdict::Valid, true, 0.8));
        assert_eq!(session.received_count(), 1);
        assert!(session.is_resolved(0));
        assert!(!session.is_resolved(1));

        session.resolve(1, &classification(1, Verdict::Valid, false, 0.7));
        assert_eq!(session.received_count(), 2);
        assert_eq!(session.rtt_history(), &[0.8, 0.7]);
    }

    #[test]
    fn test_duplicates_and_unsent_are_ignored() {
        let mut session = SessionState::new(3);
        session.record_sent(Tick::new(10).unwrap());
        session.record_sent(Tick::new(20).unwrap());

        session.resolve(0, &classification(0, Verdict::Valid, false, 1.0));
        // same pong again, then a reply for a number never sent
        session.resolve(1, &classification(0, Verdict::Valid, true, 1.0));
        session.resolve(1, &classification(2, Verdict::TimestampError, true, 1.0));
        session.resolve(1, &classification(1, Verdict::Valid, false, 2.0));
        session.resolve(1, &classification(1, Verdict::Valid, true, 2.0));

        assert_eq!(session.received_count(), 2);
        assert_eq!(session.rtt_history(), &[1.0, 2.0]);
        assert!(session.rtt_history().len() as u32 <= session.received_count());
        assert!(session.received_count() <= session.package_count());
    }
}
