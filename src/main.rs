//! `udpping`: pings a pong server over UDP and prints the statistics.
//!
//! `udpping [host] [port] [count]`, with defaults `127.0.0.1 30000 10`.
//! Set `RUST_LOG=debug` to trace every send and receive.

use anyhow::{Context, Result};
use clap::Parser;

use udpping::{PingClient, cli::Args};

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    println!("Host: {}", args.host);

    let client = PingClient::new(args.to_config());
    client
        .run()
        .with_context(|| format!("ping session to {}:{} failed", args.host, args.port))?;

    Ok(())
}
