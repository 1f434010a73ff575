//! Interactive terminal front end for the wizard
//!
//! A line-based loop in the style of a REPL: each phase prints its screen,
//! reads one line with rustyline and turns it into wizard events. Slash
//! commands (`/back`, `/home`, `/help`, `/quit`) work on every screen.

mod grounding;
mod input;
mod render;

pub use input::{Command, interpret};
pub use render::{format_entry, screen};

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info};

use crate::i18n::{Phrase, translate};
use crate::wizard::{Event, Phase, Wizard};

/// Run the wizard until the user quits
pub async fn run(mut wizard: Wizard) -> Result<()> {
    let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;
    println!("{}", "Type /help for commands, /quit to exit".dimmed());

    loop {
        if wizard.phase() == Phase::Grounding {
            grounding::run(&mut wizard).await?;
            continue;
        }

        println!();
        print!("{}", render::screen(wizard.machine()));

        let line = match rl.readline(&format!("{} ", ">".bright_green())) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(eyre::eyre!("Readline error: {}", e)),
        };
        if !line.trim().is_empty() {
            let _ = rl.add_history_entry(line.as_str());
        }

        match interpret(wizard.phase(), &line) {
            Command::Quit => break,
            Command::Help => print!("{}", render::help(wizard.machine().language())),
            Command::Unrecognized => debug!(%line, "console: input not understood"),
            Command::Events(events) => {
                for event in events {
                    if matches!(event, Event::SubmitAnswer(_)) {
                        println!(
                            "{}",
                            translate(Phrase::AnalyzingText, wizard.machine().language())
                                .dimmed()
                                .italic()
                        );
                    }
                    wizard.dispatch(event).await;
                }
            }
        }
    }

    info!("Wizard closed");
    println!("{}", "Goodbye!".dimmed());
    Ok(())
}
