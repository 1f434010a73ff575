//! The in-progress reflection session

use serde::{Deserialize, Serialize};

use super::{Conversation, Emotion, MentorshipResult, Signal};

pub const MIN_INTENSITY: u8 = 1;
pub const MAX_INTENSITY: u8 = 10;
pub const DEFAULT_INTENSITY: u8 = 5;

/// How the user described what they feel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "path", rename_all = "kebab-case")]
pub enum Descriptor {
    /// Picked a named emotion
    Named { emotion: Emotion },
    /// Could not name it; described signals and/or free text instead
    Unsure { signals: Vec<Signal>, free_text: String },
}

impl Descriptor {
    pub fn unsure() -> Self {
        Descriptor::Unsure {
            signals: Vec::new(),
            free_text: String::new(),
        }
    }
}

/// Data accumulated over one pass through the wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub descriptor: Option<Descriptor>,
    pub intensity: u8,
    pub conversation: Conversation,
    pub final_response: Option<MentorshipResult>,
    /// A reasoning-service call is outstanding
    pub awaiting_service: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            descriptor: None,
            intensity: DEFAULT_INTENSITY,
            conversation: Conversation::new(),
            final_response: None,
            awaiting_service: false,
        }
    }
}

impl Session {
    pub fn selected_emotion(&self) -> Option<Emotion> {
        match &self.descriptor {
            Some(Descriptor::Named { emotion }) => Some(*emotion),
            _ => None,
        }
    }

    /// Signals chosen on the unsure path, in selection order
    pub fn unsure_signals(&self) -> &[Signal] {
        match &self.descriptor {
            Some(Descriptor::Unsure { signals, .. }) => signals,
            _ => &[],
        }
    }

    pub fn free_text(&self) -> &str {
        match &self.descriptor {
            Some(Descriptor::Unsure { free_text, .. }) => free_text,
            _ => "",
        }
    }

    /// The unsure path has something to explore
    pub fn unsure_ready(&self) -> bool {
        !self.unsure_signals().is_empty() || !self.free_text().trim().is_empty()
    }

    /// Add or remove a signal; returns false off the unsure path
    pub fn toggle_signal(&mut self, signal: Signal) -> bool {
        match &mut self.descriptor {
            Some(Descriptor::Unsure { signals, .. }) => {
                if let Some(pos) = signals.iter().position(|s| *s == signal) {
                    signals.remove(pos);
                } else {
                    signals.push(signal);
                }
                true
            }
            _ => false,
        }
    }

    pub fn set_free_text(&mut self, text: &str) -> bool {
        match &mut self.descriptor {
            Some(Descriptor::Unsure { free_text, .. }) => {
                *free_text = text.to_string();
                true
            }
            _ => false,
        }
    }
}
