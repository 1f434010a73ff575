//! SlotStore - durable named JSON slots
//!
//! Keeps a handful of small, independently replaced values on disk. Every
//! slot is a single JSON document, rewritten as a whole on each store.
//!
//! # Layout
//!
//! ```text
//! <dir>/
//! ├── .lock                  # fs2 exclusive lock held during writes
//! ├── language.json
//! ├── preferred_name.json
//! └── journal_entries.json
//! ```
//!
//! # Example
//!
//! ```ignore
//! use slotstore::SlotStore;
//!
//! let store = SlotStore::open("/tmp/compass")?;
//! store.store("language", &"ja")?;
//! let lang: Option<String> = store.load("language")?;
//! ```

pub mod cli;
mod store;

pub use store::{SlotStore, validate_slot_name};

/// File extension used for slot documents
pub const SLOT_EXTENSION: &str = "json";

/// Name of the lock file guarding writes
pub const LOCK_FILE: &str = ".lock";
