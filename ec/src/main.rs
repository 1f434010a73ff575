//! Emotional Compass - guided self-reflection
//!
//! CLI entry point: runs the wizard or inspects the journal.

use std::fs;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use compass::cli::{Cli, Command, OutputFormat, get_log_path};
use compass::config::Config;
use compass::console;
use compass::i18n::{Phrase, translate};
use compass::llm::create_client;
use compass::prompts::PromptLoader;
use compass::reasoning::{LlmReasoner, OfflineReasoner, ReasoningService};
use compass::store::Storage;
use compass::wizard::{GroundingTiming, Wizard};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > default (INFO)
    let level_str = cli_log_level.or(config_log_level);
    let level = if let Some(s) = level_str {
        match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        }
    } else {
        tracing::Level::INFO
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(model = %config.llm.model, "Emotional Compass loaded config");

    let storage = Storage::open_or_memory(&config.storage.dir);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Journal { limit, format }) => cmd_journal(&storage, limit, format),
        Some(Command::Forget) => cmd_forget(&storage),
        None => cmd_wizard(&config, storage).await,
    }
}

/// Print the journal, newest first
fn cmd_journal(storage: &Storage, limit: Option<usize>, format: OutputFormat) -> Result<()> {
    debug!(?limit, ?format, "cmd_journal: called");
    let language = storage.load_state().language.unwrap_or_default();
    let mut entries = storage.load_journal().context("Failed to read journal")?;
    if let Some(limit) = limit {
        entries.truncate(limit);
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("{}", translate(Phrase::JournalEmpty, language));
                return Ok(());
            }
            println!("{}", translate(Phrase::JournalTitle, language));
            for entry in &entries {
                println!();
                print!("{}", console::format_entry(entry, language));
            }
        }
    }
    Ok(())
}

/// Clear the onboarding slots so the next run asks again
fn cmd_forget(storage: &Storage) -> Result<()> {
    debug!("cmd_forget: called");
    let removed = storage.forget_onboarding().context("Failed to clear onboarding")?;
    info!(removed, "Cleared onboarding slots");
    if removed == 0 {
        println!("Nothing to forget; language and name were not set.");
    } else {
        println!("Language and name cleared. Your journal is untouched.");
    }
    Ok(())
}

async fn cmd_wizard(config: &Config, storage: Storage) -> Result<()> {
    debug!("cmd_wizard: called");
    let service: Arc<dyn ReasoningService> = match create_client(&config.llm) {
        Ok(client) => {
            let prompts = PromptLoader::new(config.prompts_dir.clone());
            Arc::new(LlmReasoner::new(client, prompts))
        }
        Err(e) => {
            warn!(error = %e, "Reasoning service unavailable, using built-in questions");
            Arc::new(OfflineReasoner::new(e.to_string()))
        }
    };

    let wizard = Wizard::new(storage, service, GroundingTiming::from(&config.grounding));
    console::run(wizard).await
}

