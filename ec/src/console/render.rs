//! Screen rendering
//!
//! Every screen is built as a string from phrase lookups so it can be
//! printed by the console or checked in tests.

use colored::Colorize;

use crate::domain::{Emotion, JournalEntry, MAX_INTENSITY, MentorshipResult, Signal};
use crate::i18n::{Language, Phrase, translate};
use crate::wizard::{Breath, Phase, SessionMachine};

const APP_TITLE: &str = "Emotional Compass";

/// The screen for the machine's current phase
pub fn screen(machine: &SessionMachine) -> String {
    let lang = machine.language();
    let t = |p: Phrase| translate(p, lang);
    let mut out = String::new();

    match machine.phase() {
        Phase::ChoosingLanguage => {
            out.push_str(&format!("{}\n", APP_TITLE.bright_cyan().bold()));
            for (i, language) in Language::ALL.iter().enumerate() {
                out.push_str(&format!("  {} {}\n", format!("{})", i + 1).yellow(), language.native_name()));
            }
        }
        Phase::ChoosingName => {
            title(&mut out, t(Phrase::OnboardingNameTitle));
            out.push_str(&format!("{}\n", t(Phrase::OnboardingNameSubtitle).dimmed()));
            out.push_str(&format!("{}\n", format!("({})", t(Phrase::OnboardingNamePlaceholder)).dimmed()));
        }
        Phase::SelectingEmotion => {
            title(&mut out, t(Phrase::EmotionSelectionTitle));
            out.push_str(&format!("{}\n", t(Phrase::EmotionSelectionSubtitle).dimmed()));
            for (i, emotion) in Emotion::ALL.iter().enumerate() {
                out.push_str(&format!("  {} {}\n", format!("{})", i + 1).yellow(), emotion.label(lang)));
            }
            out.push_str(&format!("  {} {}\n", format!("{})", Emotion::ALL.len() + 1).yellow(), t(Phrase::UnsureButton)));
        }
        Phase::AdjustingIntensity => {
            if let Some(emotion) = machine.session().selected_emotion() {
                out.push_str(&format!("{}\n", emotion.label(lang).bright_magenta().bold()));
            }
            title(&mut out, t(Phrase::IntensityTitle));
            out.push_str(&format!("{}\n", t(Phrase::IntensitySubtitle).dimmed()));
            out.push_str(&format!("  {}\n", intensity_bar(machine.session().intensity)));
            continue_hint(&mut out, lang);
        }
        Phase::SelectingUnsureSignals => {
            title(&mut out, t(Phrase::UnsurePathTitle));
            out.push_str(&format!("{}\n", t(Phrase::UnsurePathSubtitle).dimmed()));
            let chosen = machine.session().unsure_signals();
            for (i, signal) in Signal::ALL.iter().enumerate() {
                let mark = if chosen.contains(signal) { "[x]".green() } else { "[ ]".normal() };
                out.push_str(&format!("  {} {} {}\n", format!("{})", i + 1).yellow(), mark, signal.label(lang)));
            }
            let free_text = machine.session().free_text();
            if free_text.trim().is_empty() {
                out.push_str(&format!("{}\n", t(Phrase::UnsurePathPlaceholder).dimmed()));
            } else {
                out.push_str(&format!("  \"{}\"\n", free_text.italic()));
            }
            if machine.session().unsure_ready() {
                continue_hint(&mut out, lang);
            }
        }
        Phase::Reflecting | Phase::Analyzing => {
            for turn in machine.session().conversation.turns() {
                match &turn.answer {
                    Some(answer) => {
                        out.push_str(&format!("{}\n", turn.question.dimmed()));
                        out.push_str(&format!("  {}\n", answer.dimmed()));
                    }
                    None => {
                        out.push_str(&format!("{}\n", turn.question.bright_white().bold()));
                    }
                }
            }
            if machine.is_awaiting() || machine.phase() == Phase::Analyzing {
                out.push_str(&format!("{}\n", t(Phrase::AnalyzingText).dimmed().italic()));
            }
        }
        Phase::Reframing => {
            title(&mut out, t(Phrase::ReframeTitle));
            match &machine.session().final_response {
                Some(result) => reframe(&mut out, result, lang),
                None => {
                    out.push_str(&format!("{}\n", t(Phrase::AnalyzingText).dimmed().italic()));
                }
            }
            out.push_str(&format!("{} {}\n", t(Phrase::GroundingButton).bright_green(), "[Enter]".dimmed()));
        }
        Phase::Grounding => {
            title(&mut out, t(Phrase::GroundingTitle));
            let instruction = machine
                .session()
                .final_response
                .as_ref()
                .map(|r| r.grounding_instruction.get(lang))
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| t(Phrase::GroundingInstruction));
            out.push_str(&format!("{}\n", instruction));
            out.push_str(&format!("{}\n", t(Phrase::GroundingSubInstruction).dimmed()));
            out.push_str(&format!("{}\n", format!("({}: any key)", t(Phrase::SkipButton)).dimmed()));
        }
        Phase::Journaling => {
            title(&mut out, t(Phrase::JournalTitle));
            if machine.journal().is_empty() {
                out.push_str(&format!("{}\n", t(Phrase::JournalEmpty).dimmed()));
            } else {
                for entry in machine.journal() {
                    out.push_str(&format_entry(entry, lang));
                    out.push('\n');
                }
                out.push_str(&format!("{}\n", t(Phrase::JournalSavePrompt).dimmed()));
            }
            out.push_str(&format!("{} {}\n", t(Phrase::JournalNewButton).bright_green(), "[Enter]".dimmed()));
        }
    }

    navigation(&mut out, machine);
    out
}

/// One journal entry as shown on the journal screen and by `ec journal`
pub fn format_entry(entry: &JournalEntry, language: Language) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", format!("── {} ──", entry.display_date).dimmed()));
    let label = if entry.emotion_label.is_empty() {
        "…".to_string()
    } else {
        entry.emotion_label.clone()
    };
    out.push_str(&format!(
        "{} {}\n",
        label.bright_magenta().bold(),
        format!("{}/{}", entry.intensity, MAX_INTENSITY).dimmed()
    ));
    for turn in &entry.conversation {
        out.push_str(&format!("  {}\n", turn.question.dimmed()));
        if let Some(answer) = &turn.answer {
            out.push_str(&format!("    {}\n", answer));
        }
    }
    out.push_str(&format!("{}\n", entry.mentorship_result.summary.get(language)));
    out
}

/// Slash command help
pub fn help(language: Language) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Commands:".bright_cyan()));
    out.push_str(&format!("  {:10} {}\n", "/back".yellow(), translate(Phrase::BackButton, language)));
    out.push_str(&format!("  {:10} {}\n", "/home".yellow(), translate(Phrase::HomeButton, language)));
    out.push_str(&format!("  {:10} Show this help\n", "/help".yellow()));
    out.push_str(&format!("  {:10} Exit\n", "/quit".yellow()));
    out
}

/// A single line for the breathing cue and the time left
pub fn grounding_status(breath: Breath, remaining: u64, language: Language) -> String {
    let cue = match breath {
        Breath::Inhale => translate(Phrase::BreatheInInstruction, language).bright_cyan(),
        Breath::Exhale => translate(Phrase::BreatheOutInstruction, language).bright_blue(),
    };
    format!("{}  {}", cue, format!("{remaining}s").dimmed())
}

fn reframe(out: &mut String, result: &MentorshipResult, lang: Language) {
    if !result.secondary_emotions.is_empty() || !result.primary_needs.is_empty() {
        out.push_str(&format!(
            "{} → {}\n",
            result.secondary_emotions.join(", ").yellow(),
            result.primary_needs.join(", ").bright_magenta()
        ));
    }
    out.push_str(&format!("{}\n", result.bridge_text.get(lang).italic()));
    out.push('\n');
    out.push_str(&format!("{}\n", result.summary.get(lang)));
    out.push('\n');
    out.push_str(&format!("{}\n", result.grounding_instruction.get(lang).bright_cyan()));
}

fn intensity_bar(level: u8) -> String {
    let filled = "#".repeat(level as usize);
    let empty = "-".repeat(MAX_INTENSITY.saturating_sub(level) as usize);
    format!("[{}{}] {}", filled.bright_magenta(), empty.dimmed(), level)
}

fn title(out: &mut String, text: &str) {
    out.push_str(&format!("{}\n", text.bright_cyan().bold()));
}

fn continue_hint(out: &mut String, lang: Language) {
    out.push_str(&format!("{}\n", format!("{} [Enter]", translate(Phrase::ContinueButton, lang)).dimmed()));
}

fn navigation(out: &mut String, machine: &SessionMachine) {
    let phase = machine.phase();
    let lang = machine.language();
    let mut hints = Vec::new();
    if phase.back_target(true).is_some() {
        hints.push(format!("/back {}", translate(Phrase::BackButton, lang)));
    }
    if phase.has_home() {
        hints.push(format!("/home {}", translate(Phrase::HomeButton, lang)));
    }
    if !hints.is_empty() {
        out.push_str(&format!("{}\n", hints.join("  ").dimmed()));
    }
}
