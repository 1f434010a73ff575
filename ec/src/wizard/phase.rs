//! Wizard phases and the events that drive them

use std::fmt;

use crate::domain::{Emotion, Signal};
use crate::i18n::Language;
use crate::store::StoredState;

/// The single active step of a reflection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    ChoosingLanguage,
    ChoosingName,
    SelectingEmotion,
    SelectingUnsureSignals,
    AdjustingIntensity,
    Reflecting,
    Analyzing,
    Reframing,
    Grounding,
    Journaling,
}

impl Phase {
    pub const ALL: [Phase; 10] = [
        Phase::ChoosingLanguage,
        Phase::ChoosingName,
        Phase::SelectingEmotion,
        Phase::SelectingUnsureSignals,
        Phase::AdjustingIntensity,
        Phase::Reflecting,
        Phase::Analyzing,
        Phase::Reframing,
        Phase::Grounding,
        Phase::Journaling,
    ];

    /// Where a fresh process starts, given what storage already holds
    pub fn initial(stored: &StoredState) -> Self {
        if stored.language.is_none() {
            Phase::ChoosingLanguage
        } else if stored.preferred_name.is_none() {
            Phase::ChoosingName
        } else {
            Phase::SelectingEmotion
        }
    }

    /// Target of the back event; `named_path` picks Reflecting's target
    pub fn back_target(self, named_path: bool) -> Option<Phase> {
        match self {
            Phase::ChoosingLanguage | Phase::Journaling => None,
            Phase::ChoosingName => Some(Phase::ChoosingLanguage),
            Phase::SelectingEmotion => Some(Phase::ChoosingName),
            Phase::AdjustingIntensity | Phase::SelectingUnsureSignals => Some(Phase::SelectingEmotion),
            Phase::Reflecting if named_path => Some(Phase::AdjustingIntensity),
            Phase::Reflecting => Some(Phase::SelectingUnsureSignals),
            Phase::Analyzing | Phase::Reframing => Some(Phase::Reflecting),
            Phase::Grounding => Some(Phase::Reframing),
        }
    }

    /// Whether the journal shortcut is offered
    pub fn has_home(self) -> bool {
        !matches!(self, Phase::ChoosingLanguage | Phase::ChoosingName | Phase::Journaling)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Everything the user (or a timer) can do to the wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PickLanguage(Language),
    EditName(String),
    Continue,
    PickEmotion(Emotion),
    ChooseUnsure,
    SetIntensity(u8),
    ToggleSignal(Signal),
    EditFreeText(String),
    SubmitAnswer(String),
    BeginGrounding,
    GroundingElapsed,
    SkipGrounding,
    StartNew,
    Back,
    Home,
}
