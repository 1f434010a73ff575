//! The guided reflection wizard
//!
//! - [`phase`] - phases and events
//! - [`machine`] - the sans-IO session state machine
//! - [`controller`] - the turn-taking protocol with the reasoning service
//! - [`grounding`] - breathing exercise timers
//! - [`driver`] - glues the above to storage and the service

pub mod controller;
pub mod driver;
pub mod grounding;
pub mod machine;
pub mod phase;

pub use controller::{COMPLETION_THRESHOLD, ConversationController, ServiceReply, ServiceRequest, is_complete};
pub use driver::Wizard;
pub use grounding::{Breath, BreathingExercise, GroundingTick, GroundingTiming};
pub use machine::{Effect, SessionMachine};
pub use phase::{Event, Phase};
