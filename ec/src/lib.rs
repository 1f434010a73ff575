//! Emotional Compass - a guided self-reflection wizard
//!
//! A short session walks through naming a feeling (or exploring it when the
//! feeling is unclear), a three-answer conversation with an LLM reflection
//! partner, a reframing, an optional breathing exercise and a private journal.
//!
//! # Core Concepts
//!
//! - **Sans-IO wizard**: [`wizard::SessionMachine`] only records effects; the
//!   driver performs storage writes, service calls and timers
//! - **Never stuck**: every reasoning failure falls back to fixed bilingual text
//! - **Bilingual**: every displayed string exists in English and Japanese
//!
//! # Modules
//!
//! - [`domain`] - emotions, signals, sessions, conversations and journal entries
//! - [`i18n`] - languages and display text
//! - [`llm`] - LLM client trait and Anthropic implementation
//! - [`prompts`] - Handlebars prompt templates
//! - [`reasoning`] - question and mentorship generation
//! - [`store`] - persistent slots
//! - [`wizard`] - session state machine, controller, grounding timers
//! - [`console`] - interactive terminal front end
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod console;
pub mod domain;
pub mod i18n;
pub mod llm;
pub mod prompts;
pub mod reasoning;
pub mod store;
pub mod wizard;
