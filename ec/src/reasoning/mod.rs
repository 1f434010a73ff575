//! Reasoning service
//!
//! The three asynchronous questions the wizard puts to a language model:
//! an opening question for the unsure path, a follow-up question after each
//! answer, and the final mentorship result. Callers treat every error as
//! "service unavailable" and substitute their fallback text.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::domain::{BilingualQuestion, MentorshipResult, Signal, Turn};
use crate::i18n::Language;
use crate::llm::LlmError;

mod llm;

pub use llm::LlmReasoner;

/// Why a reasoning call produced nothing usable
#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error("Reasoning service unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Malformed service output: {0}")]
    Malformed(String),

    #[error("Prompt rendering failed: {0}")]
    Prompt(String),
}

/// Everything the service sees when summarizing a finished reflection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentorshipContext {
    /// Translated emotion name; `None` on the unsure path
    pub emotion_label: Option<String>,
    pub intensity: u8,
    pub unsure_signals: Vec<Signal>,
    pub conversation: Vec<Turn>,
}

#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// First question on the unsure path, seeded by signals and free text
    async fn opening_question(&self, signals: &[Signal], free_text: &str)
    -> Result<BilingualQuestion, ReasoningError>;

    /// Next question given every turn so far
    async fn follow_up_question(&self, turns: &[Turn], language: Language)
    -> Result<BilingualQuestion, ReasoningError>;

    /// Closing reflection; a non-empty `preferred_name` is woven into the summary
    async fn mentorship(
        &self,
        context: &MentorshipContext,
        preferred_name: Option<&str>,
    ) -> Result<MentorshipResult, ReasoningError>;
}

/// Stand-in used when no LLM client could be configured
///
/// Every call fails, so the session runs on fallback text end to end.
#[derive(Debug, Clone, Default)]
pub struct OfflineReasoner {
    reason: String,
}

impl OfflineReasoner {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    fn unavailable(&self) -> ReasoningError {
        debug!(reason = %self.reason, "OfflineReasoner: refusing call");
        ReasoningError::Unavailable(self.reason.clone())
    }
}

#[async_trait]
impl ReasoningService for OfflineReasoner {
    async fn opening_question(&self, _: &[Signal], _: &str) -> Result<BilingualQuestion, ReasoningError> {
        Err(self.unavailable())
    }

    async fn follow_up_question(&self, _: &[Turn], _: Language) -> Result<BilingualQuestion, ReasoningError> {
        Err(self.unavailable())
    }

    async fn mentorship(&self, _: &MentorshipContext, _: Option<&str>) -> Result<MentorshipResult, ReasoningError> {
        Err(self.unavailable())
    }
}
