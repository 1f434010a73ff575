use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;

use slotstore::SlotStore;
use slotstore::cli::{Cli, Command, default_dir};

fn setup_logging() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    let dir = cli.dir.unwrap_or_else(default_dir);
    let store = SlotStore::open(&dir).context(format!("Failed to open store at {}", dir.display()))?;

    info!("slotstore opened at {}", dir.display());

    match cli.command {
        Command::List => {
            let slots = store.list()?;
            if slots.is_empty() {
                println!("No slots found");
            } else {
                for slot in slots {
                    println!("{}", slot);
                }
            }
        }
        Command::Get { slot } => match store.load_value(&slot)? {
            Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
            None => println!("{} Slot is empty: {}", "-".dimmed(), slot.cyan()),
        },
        Command::Remove { slot } => {
            if store.remove(&slot)? {
                println!("{} Removed slot: {}", "✓".green(), slot);
            } else {
                println!("{} Slot is empty: {}", "-".dimmed(), slot.cyan());
            }
        }
    }

    Ok(())
}
