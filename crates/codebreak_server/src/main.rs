//! Codebreak - match server CLI
//!
//! Serves matches over HTTP or plays an automated match locally.

#![warn(missing_docs)]

mod cli;
mod simulate;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use codebreak_server::{MatchService, ServerConfig, http};
use std::path::PathBuf;
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, port } => run_server(config, port).await,
        Command::Simulate {
            mode,
            seed,
            max_moves,
        } => {
            init_tracing("info");
            simulate::run(mode, seed, max_moves).await
        }
    }
}

fn init_tracing(fallback: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .init();
}

/// Run the HTTP match server
#[instrument(skip_all)]
async fn run_server(config_path: Option<PathBuf>, port: Option<u16>) -> Result<()> {
    let config = match &config_path {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    let config = match port {
        Some(port) => config.with_port(port),
        None => config,
    };
    init_tracing(config.log_filter());

    info!(config = ?config_path, "Starting codebreak server");
    let store = config.open_store()?;
    let service = MatchService::new(store, config.service_settings());
    let resumed = service.resume_turn_timers()?;
    info!(resumed, "Turn timers restored");

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!("Server ready at http://{}:{}/", config.host(), config.port());
    http::serve(listener, service).await?;
    Ok(())
}
