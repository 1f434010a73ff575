//! Turning a typed line into wizard events

use tracing::debug;

use crate::domain::{Emotion, Signal};
use crate::i18n::Language;
use crate::wizard::{Event, Phase};

/// What the user asked for with one line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Events(Vec<Event>),
    Help,
    Quit,
    /// Nothing sensible for this screen; the screen is shown again
    Unrecognized,
}

/// Interpret a line typed on the screen for `phase`
pub fn interpret(phase: Phase, line: &str) -> Command {
    let line = line.trim();
    debug!(%phase, %line, "interpret: called");

    if let Some(cmd) = line.strip_prefix('/') {
        return match cmd.trim().to_lowercase().as_str() {
            "back" | "b" => Command::Events(vec![Event::Back]),
            "home" | "journal" => Command::Events(vec![Event::Home]),
            "help" | "h" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unrecognized,
        };
    }

    match phase {
        Phase::ChoosingLanguage => pick_language(line),
        Phase::ChoosingName => Command::Events(vec![Event::EditName(line.to_string()), Event::Continue]),
        Phase::SelectingEmotion => pick_emotion(line),
        Phase::AdjustingIntensity => set_intensity(line),
        Phase::SelectingUnsureSignals => unsure_input(line),
        Phase::Reflecting if !line.is_empty() => Command::Events(vec![Event::SubmitAnswer(line.to_string())]),
        Phase::Reframing if line.is_empty() || line.eq_ignore_ascii_case("g") => {
            Command::Events(vec![Event::BeginGrounding])
        }
        Phase::Journaling if line.is_empty() || line.eq_ignore_ascii_case("n") => {
            Command::Events(vec![Event::StartNew])
        }
        _ => Command::Unrecognized,
    }
}

fn pick_language(line: &str) -> Command {
    let language = match line.parse::<usize>() {
        Ok(n) if (1..=Language::ALL.len()).contains(&n) => Some(Language::ALL[n - 1]),
        _ => Language::from_code(line),
    };
    match language {
        Some(language) => Command::Events(vec![Event::PickLanguage(language)]),
        None => Command::Unrecognized,
    }
}

fn pick_emotion(line: &str) -> Command {
    let unsure_index = Emotion::ALL.len() + 1;
    match line.parse::<usize>() {
        Ok(n) if (1..=Emotion::ALL.len()).contains(&n) => Command::Events(vec![Event::PickEmotion(Emotion::ALL[n - 1])]),
        Ok(n) if n == unsure_index => Command::Events(vec![Event::ChooseUnsure]),
        _ if line.eq_ignore_ascii_case("unsure") => Command::Events(vec![Event::ChooseUnsure]),
        _ => match Emotion::from_slug(&line.to_lowercase()) {
            Some(emotion) => Command::Events(vec![Event::PickEmotion(emotion)]),
            None => Command::Unrecognized,
        },
    }
}

/// A level sets intensity and continues; an empty line keeps the current level
fn set_intensity(line: &str) -> Command {
    if line.is_empty() {
        return Command::Events(vec![Event::Continue]);
    }
    match line.parse::<u8>() {
        Ok(level) => Command::Events(vec![Event::SetIntensity(level), Event::Continue]),
        Err(_) => Command::Unrecognized,
    }
}

/// Numbers toggle signals, other text becomes free text, an empty line continues
fn unsure_input(line: &str) -> Command {
    if line.is_empty() {
        return Command::Events(vec![Event::Continue]);
    }

    let picks: Option<Vec<Signal>> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| match s.parse::<usize>() {
            Ok(n) if (1..=Signal::ALL.len()).contains(&n) => Some(Signal::ALL[n - 1]),
            _ => None,
        })
        .collect();

    match picks {
        Some(signals) => Command::Events(signals.into_iter().map(Event::ToggleSignal).collect()),
        None => Command::Events(vec![Event::EditFreeText(line.to_string())]),
    }
}
