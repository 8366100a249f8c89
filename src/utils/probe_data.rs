//! Fixed-width ASCII probe message.
//!
//! ```text
//! offset  0..5   sequence number, zero-padded decimal
//! offset  5      kind digit, '0' = ping, '1' = pong
//! offset  6..10  timestamp ticks, zero-padded decimal (mod 10000)
//! offset 10..23  identity payload
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

use crate::errors::{DecodeError, EncodeError};

pub const SEQ_WIDTH: usize = 5;
pub const KIND_OFFSET: usize = 5;
pub const TIMESTAMP_OFFSET: usize = 6;
pub const TIMESTAMP_WIDTH: usize = 4;
pub const PAYLOAD_OFFSET: usize = 10;
pub const PAYLOAD_LEN: usize = 13;
pub const MESSAGE_LEN: usize = PAYLOAD_OFFSET + PAYLOAD_LEN; // 23 bytes
pub const RECV_BUFFER_SIZE: usize = 40;

/// First sequence number that no longer fits in the 5-digit field.
pub const MAX_SEQUENCE: u32 = 100_000;
pub const TICK_MODULUS: u16 = 10_000;

/// Identity tag the pong peer echoes back.
pub const IDENTITY_TAG: &str = "SOPHIE DILHON";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Ping,
    Pong,
    /// Any other decimal digit found in the kind slot.
    Unknown(u8),
}

impl MessageKind {
    pub fn from_digit(digit: u8) -> Self {
        match digit {
            0 => MessageKind::Ping,
            1 => MessageKind::Pong,
            d => MessageKind::Unknown(d),
        }
    }

    pub fn digit(self) -> u8 {
        match self {
            MessageKind::Ping => 0,
            MessageKind::Pong => 1,
            MessageKind::Unknown(d) => d,
        }
    }
}

/// A 4-digit timestamp: microseconds since the epoch, truncated mod 10000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tick(u16);

impl Tick {
    /// Returns `None` when `value` does not fit in four digits.
    pub fn new(value: u16) -> Option<Self> {
        (value < TICK_MODULUS).then_some(Self(value))
    }

    pub fn from_micros(micros: u128) -> Self {
        Self((micros % TICK_MODULUS as u128) as u16)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// Absolute tick distance to `arrival`, in milliseconds.
    pub fn rtt_ms(self, arrival: Tick) -> f64 {
        (arrival.0 as f64 - self.0 as f64).abs() / 1000.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeMessage {
    pub seq: u32,
    pub kind: MessageKind,
    pub timestamp: Tick,
    pub payload: String,
}

impl ProbeMessage {
    pub fn new(seq: u32, kind: MessageKind, timestamp: Tick, payload: impl Into<String>) -> Self {
        Self {
            seq,
            kind,
            timestamp,
            payload: payload.into(),
        }
    }

    pub fn ping(seq: u32, timestamp: Tick, payload: impl Into<String>) -> Self {
        Self::new(seq, MessageKind::Ping, timestamp, payload)
    }

    pub fn pong(seq: u32, timestamp: Tick, payload: impl Into<String>) -> Self {
        Self::new(seq, MessageKind::Pong, timestamp, payload)
    }

    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        encode(self.seq, self.kind, self.timestamp, &self.payload)
    }

    /// Parses the first 23 bytes of `buf`; anything after them is ignored.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < MESSAGE_LEN {
            return Err(DecodeError::TooShort(buf.len()));
        }

        let seq = parse_digits(&buf[0..SEQ_WIDTH], 0, "sequence")?;
        let kind = parse_digits(&buf[KIND_OFFSET..TIMESTAMP_OFFSET], KIND_OFFSET, "kind")?;
        let timestamp = parse_digits(
            &buf[TIMESTAMP_OFFSET..TIMESTAMP_OFFSET + TIMESTAMP_WIDTH],
            TIMESTAMP_OFFSET,
            "timestamp",
        )?;
        let payload = String::from_utf8_lossy(&buf[PAYLOAD_OFFSET..MESSAGE_LEN]).into_owned();

        Ok(Self {
            seq,
            kind: MessageKind::from_digit(kind as u8),
            // four digits are always below the modulus
            timestamp: Tick(timestamp as u16),
            payload,
        })
    }

    /// Case-insensitive comparison against the identity tag.
    pub fn carries_tag(&self, tag: &str) -> bool {
        self.payload.eq_ignore_ascii_case(tag)
    }
}

/// Encodes one probe datagram.
///
/// # Errors
/// - [`EncodeError::SequenceOutOfRange`] if `seq` needs more than 5 digits.
/// - [`EncodeError::PayloadLength`] if `payload` is not exactly 13 bytes.
/// - [`EncodeError::KindOutOfRange`] if the kind digit is above 9.
pub fn encode(
    seq: u32,
    kind: MessageKind,
    timestamp: Tick,
    payload: &str,
) -> Result<Vec<u8>, EncodeError> {
    if seq >= MAX_SEQUENCE {
        return Err(EncodeError::SequenceOutOfRange(seq));
    }
    if payload.len() != PAYLOAD_LEN {
        return Err(EncodeError::PayloadLength(payload.len()));
    }
    let digit = kind.digit();
    if digit > 9 {
        return Err(EncodeError::KindOutOfRange(digit));
    }

    let mut buf = Vec::with_capacity(MESSAGE_LEN);
    buf.extend_from_slice(format!("{seq:05}{digit}{:04}", timestamp.value()).as_bytes());
    buf.extend_from_slice(payload.as_bytes());
    Ok(buf)
}

fn parse_digits(field: &[u8], base: usize, name: &'static str) -> Result<u32, DecodeError> {
    field.iter().enumerate().try_fold(0u32, |acc, (i, b)| {
        if b.is_ascii_digit() {
            Ok(acc * 10 + (b - b'0') as u32)
        } else {
            Err(DecodeError::NonDigit {
                field: name,
                offset: base + i,
            })
        }
    })
}

// helper functions

pub fn now_micros() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros())
        .unwrap_or(0)
}
