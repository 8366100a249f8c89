//! A small UDP ping client: it sends sequenced probes to a pong peer, waits a
//! bounded time for each echoed reply, checks it and reports round-trip
//! statistics, in the style of `ping`.
//!
//!
//! # Details
//!
//! - Every probe is a 23 byte ASCII datagram:
//!
//! ```text
//!  00003 0 4242 SOPHIE DILHON
//!  |     | |    +-- identity tag (13 bytes, case-insensitive)
//!  |     | +------- send tick, microseconds mod 10000
//!  |     +--------- kind, 0 = ping, 1 = pong
//!  +--------------- sequence number
//! ```
//!
//! - Use `udpping::PingClient` to run a session against a peer. A
//!   `udpping::PongServer` on the other side answers every ping.
//!
//! ```no_run
//! use std::sync::mpsc;
//! use std::thread;
//! use udpping::{PingClient, PingConfig, PongServer, ServerCommand};
//!
//! fn main() {
//!     let (tx, rx) = mpsc::channel();
//!     let mut server = PongServer::new("127.0.0.1:30000".parse().unwrap(), rx).unwrap();
//!     let handle = thread::spawn(move || server.run());
//!
//!     // 10 pings to 127.0.0.1:30000, 1 second timeout each
//!     let client = PingClient::new(PingConfig::default());
//!     let report = client.run().unwrap();
//!     println!("loss: {}%", report.statistics.loss_percent);
//!
//!     tx.send(ServerCommand::Stop).unwrap();
//!     handle.join().unwrap().unwrap();
//! }
//! ```
//!
//! - Each reply prints one line, and the session ends with a summary:
//!
//! ```console
//! 23 bytes from 127.0.0.1:30000: udp_seq=1 time=0.412
//! From 127.0.0.1:30000: udp_seq=2 Connection time out
//! ...
//!
//! --- 127.0.0.1 ping statistics ---
//! 10 packets transmitted, 9 received, 10.00% packet loss, 9 consistent packet
//! rtt min/avg/max/mdev = 0.31 / 0.42 / 0.57 / 0.07 ms
//! ```
//!
//! - [`PingStatistics`] can also be computed directly from a [`SessionState`]:
//!
//! ```rust
//! use udpping::{PingStatistics, SessionState};
//!
//! let session = SessionState::new(4);
//! let stats = PingStatistics::from_session(&session);
//! assert_eq!(stats.loss_percent, 100);
//! assert_eq!(stats.avg_ms, 0.0);
//! ```

pub mod cli;
pub mod config;
pub use config::PingConfig;

mod client;
pub use client::PingClient;

mod errors;
pub use errors::{DecodeError, EncodeError, UdpPingError};
mod probe;
pub use probe::{PingReport, ProbeOutcome};
mod result;
pub use result::{PingStatistics, loss_percent, mean, population_std_dev};
mod server;
pub use server::{PongServer, pong_reply};
mod session;
pub use session::SessionState;
mod validator;
pub use validator::{Classification, MessageValidator, ReceivedReply, Verdict};
pub mod utils;
pub use utils::clock::{Clock, ScriptedClock, SystemClock};
pub use utils::net_utils::ServerCommand;
pub use utils::probe_data::{IDENTITY_TAG, MessageKind, ProbeMessage, Tick};
pub use utils::ui;

// async part
mod async_client;
pub use async_client::AsyncPingClient;
mod async_server;
pub use async_server::AsyncPongServer;
