// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! lift-remote: reference backend for the liftlog sync protocol.
//!
//! Stores workouts and sets in SQLite and answers each request with the
//! confirmed record, an acknowledgement, or a rejection.

mod server;
#[cfg(test)]
mod server_tests;
mod state;
mod store;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// lift-remote: liftlog sync backend
#[derive(Parser, Debug)]
#[command(name = "lift-remote")]
#[command(about = "WebSocket backend that confirms liftlog workouts and sets")]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "0.0.0.0:7890")]
    bind: SocketAddr,

    /// Directory for database storage
    #[arg(short, long, default_value = ".")]
    data: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting lift-remote server");
    info!("  Bind address: {}", args.bind);
    info!("  Data directory: {}", args.data.display());

    let state = state::ServerState::new(&args.data)?;
    server::run(args.bind, state).await?;

    Ok(())
}
