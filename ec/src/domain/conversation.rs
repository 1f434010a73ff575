//! Reflective conversation turns
//!
//! A conversation is an ordered list of question/answer turns. Only the last
//! turn may still be waiting for an answer; every earlier turn carries a
//! non-empty one. The mutators below are the only way to grow a conversation,
//! and each refuses an operation that would break that rule.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// One question and the user's answer to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub question: String,
    #[serde(default)]
    pub answer: Option<String>,
}

impl Turn {
    /// A question that has not been answered yet
    pub fn open(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: None,
        }
    }

    pub fn is_answered(&self) -> bool {
        self.answer.as_deref().is_some_and(|a| !a.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh conversation seeded with an opening question
    pub fn opened_with(question: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::open(question)],
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn answered_count(&self) -> usize {
        self.turns.iter().filter(|t| t.is_answered()).count()
    }

    /// The question currently waiting for an answer, if any
    pub fn open_question(&self) -> Option<&str> {
        self.turns
            .last()
            .filter(|t| t.answer.is_none())
            .map(|t| t.question.as_str())
    }

    /// Answer the open question
    ///
    /// Blank answers and conversations without an open question are rejected.
    pub fn answer_open(&mut self, answer: &str) -> bool {
        let answer = answer.trim();
        if answer.is_empty() {
            debug!("answer_open: blank answer rejected");
            return false;
        }
        match self.turns.last_mut() {
            Some(turn) if turn.answer.is_none() => {
                turn.answer = Some(answer.to_string());
                true
            }
            _ => {
                debug!("answer_open: no open question");
                false
            }
        }
    }

    /// Append a new open question; refused while another question is open
    pub fn ask(&mut self, question: impl Into<String>) -> bool {
        if self.open_question().is_some() {
            debug!("ask: a question is already open");
            return false;
        }
        self.turns.push(Turn::open(question));
        true
    }

    /// Check the at-most-last-turn-open rule
    pub fn is_well_formed(&self) -> bool {
        let n = self.turns.len();
        self.turns
            .iter()
            .enumerate()
            .all(|(i, t)| t.is_answered() || (i + 1 == n && t.answer.is_none()))
    }

    /// Plain-text transcript, one `Coach:`/`User:` pair per turn
    pub fn transcript(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("Coach: {}\nUser: {}", t.question, t.answer.as_deref().unwrap_or("")))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl From<Vec<Turn>> for Conversation {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}
