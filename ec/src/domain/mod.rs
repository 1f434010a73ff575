//! Domain types for a reflection session
//!
//! - [`catalog`] - emotions and unsure-path signals
//! - [`conversation`] - question/answer turns
//! - [`mentorship`] - bilingual service output and fallbacks
//! - [`session`] - the in-progress session
//! - [`journal`] - persisted journal entries and their assembly

pub mod catalog;
pub mod conversation;
pub mod journal;
pub mod mentorship;
pub mod session;

pub use catalog::{Emotion, Signal, join_signal_labels};
pub use conversation::{Conversation, Turn};
pub use journal::{JournalEntry, resolve_emotion_label};
pub use mentorship::{Bilingual, BilingualQuestion, MentorshipResult, follow_up_fallback, opening_fallback};
pub use session::{DEFAULT_INTENSITY, Descriptor, MAX_INTENSITY, MIN_INTENSITY, Session};
