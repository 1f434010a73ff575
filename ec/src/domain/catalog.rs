//! Emotions and unsure-path signals offered to the user

use serde::{Deserialize, Serialize};

use crate::i18n::{Language, Phrase, translate};

/// A named emotion the user can pick directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Emotion {
    Anger,
    Anxiety,
    Sadness,
    GuiltShame,
    Irritated,
    Overwhelmed,
    NumbBlank,
    Joy,
}

impl Emotion {
    pub const ALL: [Emotion; 8] = [
        Emotion::Anger,
        Emotion::Anxiety,
        Emotion::Sadness,
        Emotion::GuiltShame,
        Emotion::Irritated,
        Emotion::Overwhelmed,
        Emotion::NumbBlank,
        Emotion::Joy,
    ];

    pub fn phrase(&self) -> Phrase {
        match self {
            Emotion::Anger => Phrase::Anger,
            Emotion::Anxiety => Phrase::Anxiety,
            Emotion::Sadness => Phrase::Sadness,
            Emotion::GuiltShame => Phrase::GuiltShame,
            Emotion::Irritated => Phrase::Irritated,
            Emotion::Overwhelmed => Phrase::Overwhelmed,
            Emotion::NumbBlank => Phrase::NumbBlank,
            Emotion::Joy => Phrase::Joy,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Emotion::Anger => "anger",
            Emotion::Anxiety => "anxiety",
            Emotion::Sadness => "sadness",
            Emotion::GuiltShame => "guilt-shame",
            Emotion::Irritated => "irritated",
            Emotion::Overwhelmed => "overwhelmed",
            Emotion::NumbBlank => "numb-blank",
            Emotion::Joy => "joy",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.slug() == slug)
    }

    /// Translated display name
    pub fn label(&self, language: Language) -> &'static str {
        translate(self.phrase(), language)
    }
}

/// A bodily sensation or situation chosen on the unsure path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Signal {
    ChestTight,
    WantToCry,
    Restless,
    Exhausted,
    FeelNothing,
    WasCriticized,
    FeltIgnored,
}

impl Signal {
    pub const ALL: [Signal; 7] = [
        Signal::ChestTight,
        Signal::WantToCry,
        Signal::Restless,
        Signal::Exhausted,
        Signal::FeelNothing,
        Signal::WasCriticized,
        Signal::FeltIgnored,
    ];

    pub fn phrase(&self) -> Phrase {
        match self {
            Signal::ChestTight => Phrase::ChestTight,
            Signal::WantToCry => Phrase::WantToCry,
            Signal::Restless => Phrase::Restless,
            Signal::Exhausted => Phrase::Exhausted,
            Signal::FeelNothing => Phrase::FeelNothing,
            Signal::WasCriticized => Phrase::WasCriticized,
            Signal::FeltIgnored => Phrase::FeltIgnored,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Signal::ChestTight => "chest-tight",
            Signal::WantToCry => "want-to-cry",
            Signal::Restless => "restless",
            Signal::Exhausted => "exhausted",
            Signal::FeelNothing => "feel-nothing",
            Signal::WasCriticized => "was-criticized",
            Signal::FeltIgnored => "felt-ignored",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.slug() == slug)
    }

    pub fn label(&self, language: Language) -> &'static str {
        translate(self.phrase(), language)
    }
}

/// Join translated signal labels with the display separator
pub fn join_signal_labels(signals: &[Signal], language: Language) -> String {
    signals
        .iter()
        .map(|s| s.label(language))
        .collect::<Vec<_>>()
        .join(", ")
}
