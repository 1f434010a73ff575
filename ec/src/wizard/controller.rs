//! Conversation controller: the turn-taking protocol with the reasoning service
//!
//! The state machine decides *what* to ask for and emits a [`ServiceRequest`];
//! the controller runs it and always comes back with a usable
//! [`ServiceReply`], substituting the fixed bilingual fallback when the
//! service fails.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{
    BilingualQuestion, Conversation, MentorshipResult, Signal, Turn, follow_up_fallback, opening_fallback,
};
use crate::i18n::Language;
use crate::reasoning::{MentorshipContext, ReasoningService};

/// Answered turns after which the conversation is finalized
pub const COMPLETION_THRESHOLD: usize = 3;

/// The conversation has enough answers to be finalized
pub fn is_complete(conversation: &Conversation) -> bool {
    conversation.answered_count() >= COMPLETION_THRESHOLD
}

/// A reasoning call the state machine is waiting on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceRequest {
    OpeningQuestion {
        signals: Vec<Signal>,
        free_text: String,
    },
    FollowUpQuestion {
        turns: Vec<Turn>,
        language: Language,
    },
    Mentorship {
        context: MentorshipContext,
        preferred_name: Option<String>,
    },
}

impl ServiceRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceRequest::OpeningQuestion { .. } => "opening",
            ServiceRequest::FollowUpQuestion { .. } => "follow-up",
            ServiceRequest::Mentorship { .. } => "mentorship",
        }
    }
}

/// The settled outcome of a [`ServiceRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceReply {
    Question(BilingualQuestion),
    Mentorship(MentorshipResult),
}

/// Runs reasoning calls one at a time and never fails
pub struct ConversationController {
    service: Arc<dyn ReasoningService>,
}

impl ConversationController {
    pub fn new(service: Arc<dyn ReasoningService>) -> Self {
        Self { service }
    }

    /// Run one request, falling back on any service error
    pub async fn fulfil(&self, request: ServiceRequest) -> ServiceReply {
        let kind = request.kind();
        debug!(%kind, "ConversationController::fulfil: called");
        match request {
            ServiceRequest::OpeningQuestion { signals, free_text } => {
                match self.service.opening_question(&signals, &free_text).await {
                    Ok(question) => ServiceReply::Question(question),
                    Err(e) => {
                        warn!(%kind, error = %e, "Reasoning service failed, using fallback question");
                        ServiceReply::Question(opening_fallback())
                    }
                }
            }
            ServiceRequest::FollowUpQuestion { turns, language } => {
                match self.service.follow_up_question(&turns, language).await {
                    Ok(question) => ServiceReply::Question(question),
                    Err(e) => {
                        warn!(%kind, error = %e, "Reasoning service failed, using fallback question");
                        ServiceReply::Question(follow_up_fallback())
                    }
                }
            }
            ServiceRequest::Mentorship {
                context,
                preferred_name,
            } => match self.service.mentorship(&context, preferred_name.as_deref()).await {
                Ok(result) => {
                    info!("Mentorship result received");
                    ServiceReply::Mentorship(result)
                }
                Err(e) => {
                    warn!(%kind, error = %e, "Reasoning service failed, committing fallback mentorship");
                    ServiceReply::Mentorship(MentorshipResult::fallback())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reasoning::OfflineReasoner;

    fn offline() -> ConversationController {
        ConversationController::new(Arc::new(OfflineReasoner::new("offline")))
    }

    #[test]
    fn test_completion_threshold() {
        let mut conv = Conversation::opened_with("Q1");
        for (i, answer) in ["a", "b", "c"].iter().enumerate() {
            assert!(!is_complete(&conv));
            conv.answer_open(answer);
            if i < 2 {
                conv.ask(format!("Q{}", i + 2));
            }
        }
        assert!(is_complete(&conv));
    }

    #[tokio::test]
    async fn test_opening_fallback() {
        let reply = offline()
            .fulfil(ServiceRequest::OpeningQuestion {
                signals: vec![Signal::Restless],
                free_text: String::new(),
            })
            .await;
        assert_eq!(reply, ServiceReply::Question(opening_fallback()));
    }

    #[tokio::test]
    async fn test_follow_up_fallback() {
        let reply = offline()
            .fulfil(ServiceRequest::FollowUpQuestion {
                turns: vec![],
                language: Language::Ja,
            })
            .await;
        assert_eq!(reply, ServiceReply::Question(follow_up_fallback()));
    }

    #[tokio::test]
    async fn test_mentorship_fallback() {
        let reply = offline()
            .fulfil(ServiceRequest::Mentorship {
                context: MentorshipContext {
                    emotion_label: None,
                    intensity: 5,
                    unsure_signals: vec![],
                    conversation: vec![],
                },
                preferred_name: None,
            })
            .await;
        assert_eq!(reply, ServiceReply::Mentorship(MentorshipResult::fallback()));
    }
}
