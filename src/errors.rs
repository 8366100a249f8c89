use std::io;

use thiserror::Error;

/// Errors raised while building a probe datagram.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("sequence number {0} does not fit in 5 digits")]
    SequenceOutOfRange(u32),
    #[error("payload must be 13 bytes, got {0}")]
    PayloadLength(usize),
    #[error("kind digit {0} is not a single decimal digit")]
    KindOutOfRange(u8),
}

/// Errors raised while parsing a received datagram.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("datagram too short: {0} bytes, need 23")]
    TooShort(usize),
    #[error("non-digit byte in {field} field at offset {offset}")]
    NonDigit { field: &'static str, offset: usize },
}

#[derive(Debug, Error)]
pub enum UdpPingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to resolve {host}: {source}")]
    ResolveFailed { host: String, source: io::Error },
    #[error("No address found for {0}")]
    NoAddress(String),

    #[error("Failed to bind socket address: {0}")]
    BindFailed(io::Error),
    #[error("Client failed to connect: {0}")]
    ConnectFailed(io::Error),
    #[error("Udp socket failed to send data: {0}")]
    SendFailed(io::Error),
    #[error("Udp socket failed to receive data: {0}")]
    RecvFailed(io::Error),

    #[error("Failed to encode probe: {0}")]
    Encode(#[from] EncodeError),
}
