//! LLM-backed reasoning service

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use super::{MentorshipContext, ReasoningError, ReasoningService};
use crate::domain::{Bilingual, BilingualQuestion, MentorshipResult, Signal, Turn, join_signal_labels};
use crate::i18n::Language;
use crate::llm::{CompletionRequest, LlmClient, Message};
use crate::prompts::{PromptLoader, PromptTurn};

const QUESTION_MAX_TOKENS: u32 = 512;
const MENTORSHIP_MAX_TOKENS: u32 = 2048;

/// Asks an [`LlmClient`] for questions and mentorship, one request per call
pub struct LlmReasoner {
    client: Arc<dyn LlmClient>,
    prompts: PromptLoader,
}

impl LlmReasoner {
    pub fn new(client: Arc<dyn LlmClient>, prompts: PromptLoader) -> Self {
        debug!("LlmReasoner::new: called");
        Self { client, prompts }
    }

    fn render<C: Serialize>(&self, template: &str, context: &C) -> Result<String, ReasoningError> {
        self.prompts
            .render(template, context)
            .map_err(|e| ReasoningError::Prompt(e.to_string()))
    }

    /// Send one rendered prompt and return the bare JSON text of the reply
    async fn ask(&self, template: &str, prompt: String, max_tokens: u32) -> Result<String, ReasoningError> {
        debug!(%template, prompt_len = prompt.len(), "LlmReasoner::ask: called");
        let system_prompt = self
            .prompts
            .load_template("system")
            .map_err(|e| ReasoningError::Prompt(e.to_string()))?;

        let request = CompletionRequest {
            system_prompt,
            messages: vec![Message::user(prompt)],
            max_tokens,
        };

        let response = self.client.complete(request).await.map_err(|e| {
            warn!(%template, error = %e, "LlmReasoner::ask: completion failed");
            ReasoningError::from(e)
        })?;
        info!(
            %template,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "Reasoning call complete"
        );

        let content = response
            .content
            .ok_or_else(|| ReasoningError::Malformed("empty response".to_string()))?;
        Ok(strip_code_fence(&content).to_string())
    }
}

/// Remove a surrounding Markdown code fence (```json ... ```), if any
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[derive(Debug, Deserialize)]
struct QuestionWire {
    question_en: String,
    question_ja: String,
}

impl TryFrom<QuestionWire> for BilingualQuestion {
    type Error = ReasoningError;

    fn try_from(wire: QuestionWire) -> Result<Self, Self::Error> {
        let question = Bilingual::new(wire.question_en.trim(), wire.question_ja.trim());
        if question.is_blank() {
            return Err(ReasoningError::Malformed("blank question".to_string()));
        }
        Ok(question)
    }
}

#[derive(Debug, Deserialize)]
struct MentorshipWire {
    #[serde(default)]
    secondary: Vec<String>,
    #[serde(default)]
    primary: Vec<String>,
    #[serde(rename = "bridgeText_en")]
    bridge_text_en: String,
    #[serde(rename = "bridgeText_ja")]
    bridge_text_ja: String,
    grounding_en: String,
    grounding_ja: String,
    summary_en: String,
    summary_ja: String,
}

impl TryFrom<MentorshipWire> for MentorshipResult {
    type Error = ReasoningError;

    fn try_from(wire: MentorshipWire) -> Result<Self, Self::Error> {
        let result = MentorshipResult {
            secondary_emotions: clean_list(wire.secondary),
            primary_needs: clean_list(wire.primary),
            bridge_text: Bilingual::new(wire.bridge_text_en.trim(), wire.bridge_text_ja.trim()),
            grounding_instruction: Bilingual::new(wire.grounding_en.trim(), wire.grounding_ja.trim()),
            summary: Bilingual::new(wire.summary_en.trim(), wire.summary_ja.trim()),
        };
        if result.bridge_text.is_blank() || result.grounding_instruction.is_blank() || result.summary.is_blank() {
            return Err(ReasoningError::Malformed("blank mentorship text".to_string()));
        }
        Ok(result)
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse<W: for<'de> Deserialize<'de>>(text: &str) -> Result<W, ReasoningError> {
    serde_json::from_str(text).map_err(|e| {
        warn!(error = %e, "parse: service returned malformed JSON");
        ReasoningError::Malformed(e.to_string())
    })
}

#[async_trait]
impl ReasoningService for LlmReasoner {
    async fn opening_question(
        &self,
        signals: &[Signal],
        free_text: &str,
    ) -> Result<BilingualQuestion, ReasoningError> {
        debug!(signal_count = signals.len(), "LlmReasoner::opening_question: called");
        let prompt = self.render(
            "opening",
            &json!({
                "signals": join_signal_labels(signals, Language::En),
                "free_text": free_text.trim(),
            }),
        )?;
        let text = self.ask("opening", prompt, QUESTION_MAX_TOKENS).await?;
        parse::<QuestionWire>(&text)?.try_into()
    }

    async fn follow_up_question(
        &self,
        turns: &[Turn],
        language: Language,
    ) -> Result<BilingualQuestion, ReasoningError> {
        debug!(turn_count = turns.len(), %language, "LlmReasoner::follow_up_question: called");
        let last_answer = turns.iter().rev().find_map(|t| t.answer.clone()).unwrap_or_default();
        let prompt = self.render(
            "follow-up",
            &json!({
                "turns": turns.iter().map(PromptTurn::from).collect::<Vec<_>>(),
                "last_answer": last_answer,
                "language": language.native_name(),
            }),
        )?;
        let text = self.ask("follow-up", prompt, QUESTION_MAX_TOKENS).await?;
        parse::<QuestionWire>(&text)?.try_into()
    }

    async fn mentorship(
        &self,
        context: &MentorshipContext,
        preferred_name: Option<&str>,
    ) -> Result<MentorshipResult, ReasoningError> {
        debug!(intensity = context.intensity, "LlmReasoner::mentorship: called");
        let preferred_name = preferred_name.map(str::trim).filter(|n| !n.is_empty());
        let prompt = self.render(
            "mentorship",
            &json!({
                "emotion_label": context.emotion_label.as_deref().filter(|l| !l.is_empty()),
                "intensity": context.intensity,
                "unsure_signals": join_signal_labels(&context.unsure_signals, Language::En),
                "turns": context.conversation.iter().map(PromptTurn::from).collect::<Vec<_>>(),
                "preferred_name": preferred_name,
            }),
        )?;
        let text = self.ask("mentorship", prompt, MENTORSHIP_MAX_TOKENS).await?;
        parse::<MentorshipWire>(&text)?.try_into()
    }
}
