//! Bilingual reasoning-service output and its fallbacks

use serde::{Deserialize, Serialize};

use crate::i18n::Language;

/// Text carried in both supported languages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bilingual {
    pub en: String,
    pub ja: String,
}

impl Bilingual {
    pub fn new(en: impl Into<String>, ja: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            ja: ja.into(),
        }
    }

    /// The rendering for the given language
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::En => &self.en,
            Language::Ja => &self.ja,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.en.trim().is_empty() || self.ja.trim().is_empty()
    }
}

/// A next question for the reflective conversation
pub type BilingualQuestion = Bilingual;

/// Asked when the unsure-path opening question cannot be generated
pub fn opening_fallback() -> BilingualQuestion {
    Bilingual::new(
        "Thank you for sharing. What was happening right before you started to feel this way?",
        "共有してくれてありがとう。そう感じ始める直前、何が起きていましたか？",
    )
}

/// Asked when a follow-up question cannot be generated
pub fn follow_up_fallback() -> BilingualQuestion {
    Bilingual::new(
        "Thank you for sharing that. Could you tell me a little more?",
        "教えてくれてありがとう。もう少し詳しく聞かせてもらえますか？",
    )
}

/// The closing reflection produced at the end of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentorshipResult {
    /// Likely surface emotions (e.g. irritation, overwhelm)
    pub secondary_emotions: Vec<String>,
    /// Likely core emotions or unmet needs underneath
    pub primary_needs: Vec<String>,
    /// One validating sentence linking the two
    pub bridge_text: Bilingual,
    pub grounding_instruction: Bilingual,
    pub summary: Bilingual,
}

impl MentorshipResult {
    /// Committed in place of a real result when the service cannot be reached
    pub fn fallback() -> Self {
        let trouble = Bilingual::new(
            "I'm having a little trouble connecting right now. Let's take a deep breath together. Please try again in a moment.",
            "現在、接続に問題が発生しています。一緒に深呼吸しましょう。しばらくしてからもう一度お試しください。",
        );
        Self {
            secondary_emotions: Vec::new(),
            primary_needs: Vec::new(),
            bridge_text: trouble.clone(),
            grounding_instruction: Bilingual::new("Breathe.", "呼吸して。"),
            summary: trouble,
        }
    }
}
