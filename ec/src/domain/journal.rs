//! Journal entries - the persisted record of a completed session

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{MentorshipResult, Session, Signal, Turn, join_signal_labels};
use crate::i18n::Language;

/// An immutable record of one completed reflection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// `created_at` formatted for the language active at assembly time
    pub display_date: String,
    /// Translated emotion name, or the joined unsure-signal labels
    pub emotion_label: String,
    pub intensity: u8,
    #[serde(default)]
    pub unsure_signals: Vec<Signal>,
    pub conversation: Vec<Turn>,
    pub mentorship_result: MentorshipResult,
}

impl JournalEntry {
    /// Build the record for a finalized session, stamped now
    pub fn assemble(session: &Session, result: MentorshipResult, language: Language) -> Self {
        Self::assemble_at(session, result, language, Utc::now())
    }

    /// Build the record for a finalized session with an explicit timestamp
    pub fn assemble_at(
        session: &Session,
        result: MentorshipResult,
        language: Language,
        created_at: DateTime<Utc>,
    ) -> Self {
        let emotion_label = resolve_emotion_label(session, language);
        let id = uuid::Uuid::now_v7().to_string();
        debug!(%id, %emotion_label, "JournalEntry::assemble_at: called");

        Self {
            id,
            created_at,
            display_date: language.format_datetime(&created_at.with_timezone(&Local)),
            emotion_label,
            intensity: session.intensity,
            unsure_signals: session.unsure_signals().to_vec(),
            conversation: session.conversation.turns().to_vec(),
            mentorship_result: result,
        }
    }
}

/// The label shown for a session in the journal
///
/// The chosen emotion's name wins; otherwise the unsure signals are joined.
/// A session driven only by free text resolves to an empty label.
pub fn resolve_emotion_label(session: &Session, language: Language) -> String {
    match session.selected_emotion() {
        Some(emotion) => emotion.label(language).to_string(),
        None => join_signal_labels(session.unsure_signals(), language),
    }
}
