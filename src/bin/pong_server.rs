//! `udpping-pong`: echo peer for `udpping`. Runs until killed.

use std::{net::SocketAddr, sync::mpsc};

use anyhow::{Context, Result};
use clap::Parser;

use udpping::PongServer;

/// Answer udpping probes with pongs
#[derive(Parser, Debug)]
#[command(name = "udpping-pong")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Local address to bind
    #[arg(short, long, default_value = "127.0.0.1:30000")]
    bind: SocketAddr,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    // the sender stays alive for the whole process, so only a signal stops the server
    let (_control_tx, control_rx) = mpsc::channel();
    let mut server = PongServer::new(cli.bind, control_rx)
        .with_context(|| format!("cannot listen on {}", cli.bind))?;
    log::info!("Starting pong server on {}", cli.bind);

    let served = server.run()?;
    println!("served {served} pongs");
    Ok(())
}
