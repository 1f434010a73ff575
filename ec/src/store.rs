//! Persistent slots: language, preferred name and the journal
//!
//! The wizard reads all three slots once at startup ([`Storage::load_state`])
//! and writes each one back whole whenever it changes. Storage trouble never
//! stops a session: an unreadable slot counts as empty and an unusable
//! directory falls back to [`MemoryBackend`]. An unreadable journal is set
//! aside, never overwritten, before the first new entry is written.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;

use eyre::{Context, Result, eyre};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use slotstore::SlotStore;
use tracing::{debug, info, warn};

use crate::domain::JournalEntry;
use crate::i18n::Language;

/// The three independent slots the wizard persists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Language,
    PreferredName,
    JournalEntries,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Language, Slot::PreferredName, Slot::JournalEntries];

    /// File-safe slot name
    pub fn name(&self) -> &'static str {
        match self {
            Slot::Language => "language",
            Slot::PreferredName => "preferred_name",
            Slot::JournalEntries => "journal_entries",
        }
    }
}

/// Raw JSON storage keyed by slot
pub trait SlotBackend: Send + Sync {
    fn load(&self, slot: Slot) -> Result<Option<Value>>;

    fn store(&self, slot: Slot, value: &Value) -> Result<()>;

    /// Returns true if the slot held a value
    fn remove(&self, slot: Slot) -> Result<bool>;

    /// Keep the slot's current contents under `tag` and leave the slot empty
    ///
    /// Returns where the contents went, or `None` if the slot was empty.
    fn set_aside(&self, slot: Slot, tag: &str) -> Result<Option<String>>;

    /// Short label for logs
    fn describe(&self) -> String;
}

impl SlotBackend for SlotStore {
    fn load(&self, slot: Slot) -> Result<Option<Value>> {
        self.load_value(slot.name())
    }

    fn store(&self, slot: Slot, value: &Value) -> Result<()> {
        self.store_value(slot.name(), value)
    }

    fn remove(&self, slot: Slot) -> Result<bool> {
        SlotStore::remove(self, slot.name())
    }

    fn set_aside(&self, slot: Slot, tag: &str) -> Result<Option<String>> {
        let moved = SlotStore::set_aside(self, slot.name(), tag)?;
        Ok(moved.map(|path| path.display().to_string()))
    }

    fn describe(&self) -> String {
        self.path().display().to_string()
    }
}

/// Process-lifetime storage used when the slot directory is unusable
#[derive(Debug, Default)]
pub struct MemoryBackend {
    slots: Mutex<HashMap<Slot, Value>>,
    aside: Mutex<Vec<(String, Value)>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotBackend for MemoryBackend {
    fn load(&self, slot: Slot) -> Result<Option<Value>> {
        let slots = self.slots.lock().map_err(|_| eyre!("memory store poisoned"))?;
        Ok(slots.get(&slot).cloned())
    }

    fn store(&self, slot: Slot, value: &Value) -> Result<()> {
        let mut slots = self.slots.lock().map_err(|_| eyre!("memory store poisoned"))?;
        slots.insert(slot, value.clone());
        Ok(())
    }

    fn remove(&self, slot: Slot) -> Result<bool> {
        let mut slots = self.slots.lock().map_err(|_| eyre!("memory store poisoned"))?;
        Ok(slots.remove(&slot).is_some())
    }

    fn set_aside(&self, slot: Slot, tag: &str) -> Result<Option<String>> {
        let mut slots = self.slots.lock().map_err(|_| eyre!("memory store poisoned"))?;
        let Some(value) = slots.remove(&slot) else {
            return Ok(None);
        };
        let key = format!("{}.{}", slot.name(), tag);
        let mut aside = self.aside.lock().map_err(|_| eyre!("memory store poisoned"))?;
        aside.push((key.clone(), value));
        Ok(Some(format!("memory:{key}")))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Everything read from storage at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredState {
    pub language: Option<Language>,
    pub preferred_name: Option<String>,
    /// Newest first
    pub journal: Vec<JournalEntry>,
}

/// Typed access to the wizard's slots
pub struct Storage {
    backend: Box<dyn SlotBackend>,
    /// The journal slot held data that could not be read
    journal_unreadable: AtomicBool,
}

impl Storage {
    pub fn from_backend(backend: Box<dyn SlotBackend>) -> Self {
        Self {
            backend,
            journal_unreadable: AtomicBool::new(false),
        }
    }

    pub fn in_memory() -> Self {
        Self::from_backend(Box::new(MemoryBackend::new()))
    }

    /// Open the slot directory, failing if it cannot be created
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let store = SlotStore::open(dir).context(format!("Failed to open storage at {}", dir.display()))?;
        Ok(Self::from_backend(Box::new(store)))
    }

    /// Open the slot directory, or keep everything in memory if that fails
    pub fn open_or_memory(dir: impl AsRef<Path>) -> Self {
        match Self::open(&dir) {
            Ok(storage) => {
                info!("Using storage at {}", storage.describe());
                storage
            }
            Err(e) => {
                warn!(error = %e, "Storage unavailable, journal will not outlive this session");
                Self::in_memory()
            }
        }
    }

    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    /// Read all three slots
    ///
    /// A slot that fails to load or parse is logged and treated as absent.
    /// An unreadable journal is remembered so [`Storage::save_journal`] sets
    /// it aside instead of replacing it.
    pub fn load_state(&self) -> StoredState {
        debug!("Storage::load_state: called");
        let journal = match self.load(Slot::JournalEntries) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "Journal unreadable, starting empty and keeping the old file");
                self.journal_unreadable.store(true, Ordering::SeqCst);
                Vec::new()
            }
        };
        let state = StoredState {
            language: self.load_or_absent(Slot::Language),
            preferred_name: self.load_or_absent(Slot::PreferredName),
            journal,
        };
        debug!(
            language = ?state.language,
            has_name = state.preferred_name.is_some(),
            entries = state.journal.len(),
            "Storage::load_state: loaded"
        );
        state
    }

    /// Stored journal entries, newest first
    pub fn load_journal(&self) -> Result<Vec<JournalEntry>> {
        Ok(self.load(Slot::JournalEntries)?.unwrap_or_default())
    }

    pub fn save_language(&self, language: Language) -> Result<()> {
        self.save(Slot::Language, &language)
    }

    pub fn save_preferred_name(&self, name: &str) -> Result<()> {
        self.save(Slot::PreferredName, name)
    }

    /// Replace the whole journal
    ///
    /// If the stored journal could not be read, it is set aside first; when
    /// that fails nothing is written.
    pub fn save_journal(&self, entries: &[JournalEntry]) -> Result<()> {
        if self.journal_unreadable.load(Ordering::SeqCst) {
            let tag = format!("unreadable-{}", Utc::now().format("%Y%m%d%H%M%S"));
            let moved = self
                .backend
                .set_aside(Slot::JournalEntries, &tag)
                .context("Unreadable journal could not be set aside, not overwriting it")?;
            if let Some(location) = moved {
                warn!(%location, "Unreadable journal set aside");
            }
            self.journal_unreadable.store(false, Ordering::SeqCst);
        }
        self.save(Slot::JournalEntries, entries)
    }

    /// Clear language and name so the next start re-runs onboarding
    ///
    /// Returns the number of slots that held a value.
    pub fn forget_onboarding(&self) -> Result<usize> {
        let mut removed = 0;
        for slot in [Slot::Language, Slot::PreferredName] {
            if self.backend.remove(slot)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn load<T: DeserializeOwned>(&self, slot: Slot) -> Result<Option<T>> {
        match self.backend.load(slot)? {
            Some(value) => {
                let parsed =
                    serde_json::from_value(value).context(format!("Slot {} holds unexpected data", slot.name()))?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    fn load_or_absent<T: DeserializeOwned>(&self, slot: Slot) -> Option<T> {
        match self.load(slot) {
            Ok(value) => value,
            Err(e) => {
                warn!(slot = slot.name(), error = %e, "Ignoring unreadable slot");
                None
            }
        }
    }

    fn save<T: Serialize + ?Sized>(&self, slot: Slot, value: &T) -> Result<()> {
        debug!(slot = slot.name(), "Storage::save: called");
        let value = serde_json::to_value(value).context(format!("Failed to serialize slot {}", slot.name()))?;
        self.backend.store(slot, &value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MentorshipResult, Session};
    use tempfile::TempDir;

    #[test]
    fn test_empty_state() {
        let storage = Storage::in_memory();
        assert_eq!(storage.load_state(), StoredState::default());
    }

    #[test]
    fn test_language_and_name_round_trip() {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        storage.save_language(Language::Ja).unwrap();
        storage.save_preferred_name("Yui").unwrap();

        let reopened = Storage::open(dir.path()).unwrap();
        let state = reopened.load_state();
        assert_eq!(state.language, Some(Language::Ja));
        assert_eq!(state.preferred_name.as_deref(), Some("Yui"));
    }

    #[test]
    fn test_corrupt_slot_is_absent() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("language.json"), "\"klingon\"").unwrap();
        std::fs::write(dir.path().join("preferred_name.json"), "\"Ken\"").unwrap();

        let state = Storage::open(dir.path()).unwrap().load_state();
        assert_eq!(state.language, None);
        assert_eq!(state.preferred_name.as_deref(), Some("Ken"));
    }

    #[test]
    fn test_unreadable_journal_is_set_aside_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let old = r#"[{"id":"old-1","label":"Anger"},{"id":"old-2","label":"Joy"}]"#;
        std::fs::write(dir.path().join("journal_entries.json"), old).unwrap();

        let storage = Storage::open(dir.path()).unwrap();
        assert!(storage.load_state().journal.is_empty());

        let entry = JournalEntry::assemble(&Session::default(), MentorshipResult::fallback(), Language::En);
        storage.save_journal(std::slice::from_ref(&entry)).unwrap();
        storage.save_journal(std::slice::from_ref(&entry)).unwrap();

        let set_aside: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("journal_entries.unreadable-"))
            .collect();
        assert_eq!(set_aside.len(), 1);
        assert_eq!(
            std::fs::read_to_string(dir.path().join(&set_aside[0])).unwrap(),
            old
        );
        assert_eq!(storage.load_journal().unwrap(), vec![entry]);
    }

    #[test]
    fn test_unreadable_journal_in_memory_is_kept() {
        let backend = MemoryBackend::new();
        backend
            .store(Slot::JournalEntries, &serde_json::json!(["not an entry"]))
            .unwrap();
        let storage = Storage::from_backend(Box::new(backend));
        assert!(storage.load_state().journal.is_empty());

        storage.save_journal(&[]).unwrap();
        assert_eq!(storage.load_journal().unwrap(), vec![]);
    }

    #[test]
    fn test_unusable_dir_falls_back_to_memory() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();

        let storage = Storage::open_or_memory(&file);
        assert_eq!(storage.describe(), "memory");
        storage.save_language(Language::En).unwrap();
        assert_eq!(storage.load_state().language, Some(Language::En));
    }

    #[test]
    fn test_forget_keeps_journal() {
        let storage = Storage::in_memory();
        let entry = JournalEntry::assemble(&Session::default(), MentorshipResult::fallback(), Language::En);
        storage.save_language(Language::En).unwrap();
        storage.save_preferred_name("").unwrap();
        storage.save_journal(std::slice::from_ref(&entry)).unwrap();

        assert_eq!(storage.forget_onboarding().unwrap(), 2);
        let state = storage.load_state();
        assert!(state.language.is_none());
        assert!(state.preferred_name.is_none());
        assert_eq!(state.journal, vec![entry]);
    }
}
