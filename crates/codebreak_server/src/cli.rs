//! Command-line interface for codebreak.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use codebreak_engine::GameMode;

/// Codebreak - two-player code-breaking and battleship server
#[derive(Parser, Debug)]
#[command(name = "codebreak")]
#[command(about = "Authoritative server for numbers, words and battleship matches", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP match server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Port to bind to, overriding the config
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Play one automated match between two random bots
    Simulate {
        /// numbers, words or battleship
        #[arg(short, long, default_value = "numbers")]
        mode: GameMode,

        /// Seed for reproducible games
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Give up after this many moves
        #[arg(long, default_value = "500")]
        max_moves: u32,
    },
}
