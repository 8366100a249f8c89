use clap::Parser;

use crate::config::{DEFAULT_HOST, DEFAULT_PACKAGE_COUNT, DEFAULT_PORT, PingConfig};

/// Send sequenced UDP pings to a pong server and report round-trip times
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "udpping")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Peer host name or address
    #[arg(default_value = DEFAULT_HOST)]
    pub host: String,

    /// Peer UDP port
    #[arg(default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Number of pings to send
    #[arg(default_value_t = DEFAULT_PACKAGE_COUNT)]
    pub count: u32,
}

impl Args {
    pub fn to_config(&self) -> PingConfig {
        PingConfig::new(self.host.clone(), self.port, self.count)
    }
}
