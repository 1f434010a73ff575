//! CLI argument parsing for slotstore

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ss")]
#[command(author, version, about = "Inspect durable JSON slots", long_about = None)]
pub struct Cli {
    /// Store directory (default: <data_dir>/emotional-compass)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List populated slots
    List,

    /// Print the JSON document held in a slot
    Get {
        /// Slot name
        #[arg(required = true)]
        slot: String,
    },

    /// Remove a slot
    Remove {
        /// Slot name
        #[arg(required = true)]
        slot: String,
    },
}

/// Default store directory shared with the `ec` binary
pub fn default_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("emotional-compass")
}
