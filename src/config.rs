use std::time::Duration;

use crate::{
    errors::UdpPingError,
    utils::probe_data::{IDENTITY_TAG, MAX_SEQUENCE, PAYLOAD_LEN},
};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 30000;
pub const DEFAULT_PACKAGE_COUNT: u32 = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Settings for one ping session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingConfig {
    /// Peer host name or address.
    pub host: String,
    /// Peer UDP port.
    pub port: u16,
    /// Number of probes to send, one per sequence number.
    pub package_count: u32,
    /// How long to wait for the reply of each probe.
    pub timeout: Duration,
    /// 13-byte identity payload sent with every ping.
    pub tag: String,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            package_count: DEFAULT_PACKAGE_COUNT,
            timeout: DEFAULT_TIMEOUT,
            tag: IDENTITY_TAG.to_string(),
        }
    }
}

impl PingConfig {
    pub fn new(host: impl Into<String>, port: u16, package_count: u32) -> Self {
        Self {
            host: host.into(),
            port,
            package_count,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// # Errors
    ///
    /// Returns [`UdpPingError::InvalidConfig`] when the count is zero or does not
    /// fit the 5-digit sequence field, the tag is not 13 bytes, or the timeout is zero.
    pub fn validate(&self) -> Result<(), UdpPingError> {
        if self.package_count == 0 || self.package_count > MAX_SEQUENCE {
            return Err(UdpPingError::InvalidConfig(format!(
                "package count must be between 1 and {MAX_SEQUENCE}, got {}",
                self.package_count
            )));
        }
        if self.tag.len() != PAYLOAD_LEN {
            return Err(UdpPingError::InvalidConfig(format!(
                "identity tag must be {PAYLOAD_LEN} bytes, got {}",
                self.tag.len()
            )));
        }
        if self.timeout.is_zero() {
            return Err(UdpPingError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
