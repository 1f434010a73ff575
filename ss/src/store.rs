//! Core SlotStore implementation

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::{LOCK_FILE, SLOT_EXTENSION};

/// Check that a slot name is safe to use as a file stem
///
/// Slot names are lowercase ASCII letters, digits, `_` and `-`.
pub fn validate_slot_name(slot: &str) -> Result<()> {
    let valid = !slot.is_empty()
        && slot
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(eyre::eyre!("Invalid slot name: '{}'", slot))
    }
}

/// A directory of named JSON slots
#[derive(Debug, Clone)]
pub struct SlotStore {
    /// Base path for storage
    base_path: PathBuf,
}

impl SlotStore {
    /// Open or create a slot store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;
        debug!(?base_path, "Opened slot store");
        Ok(Self { base_path })
    }

    /// Directory backing this store
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.base_path.join(format!("{}.{}", slot, SLOT_EXTENSION))
    }

    /// Load the raw JSON document held in a slot
    ///
    /// Returns `Ok(None)` when the slot has never been written.
    pub fn load_value(&self, slot: &str) -> Result<Option<serde_json::Value>> {
        validate_slot_name(slot)?;
        let path = self.slot_path(slot);
        if !path.exists() {
            debug!(%slot, "load_value: slot empty");
            return Ok(None);
        }

        let content = fs::read_to_string(&path).context(format!("Failed to read slot: {}", slot))?;
        let value = serde_json::from_str(&content).context(format!("Slot is not valid JSON: {}", slot))?;
        debug!(%slot, bytes = content.len(), "load_value: loaded");
        Ok(Some(value))
    }

    /// Load and deserialize a slot
    pub fn load<T: DeserializeOwned>(&self, slot: &str) -> Result<Option<T>> {
        match self.load_value(slot)? {
            Some(value) => {
                let typed = serde_json::from_value(value).context(format!("Slot has unexpected shape: {}", slot))?;
                Ok(Some(typed))
            }
            None => Ok(None),
        }
    }

    /// Replace the JSON document held in a slot
    ///
    /// The document is written to a temporary file and renamed into place
    /// while holding an exclusive lock, so readers never see a partial write.
    pub fn store_value(&self, slot: &str, value: &serde_json::Value) -> Result<()> {
        validate_slot_name(slot)?;
        let content = serde_json::to_string_pretty(value)?;

        let tmp_path = self.base_path.join(format!(".{}.{}.tmp", slot, SLOT_EXTENSION));
        self.locked(|| {
            let mut tmp = fs::File::create(&tmp_path)?;
            tmp.write_all(content.as_bytes())?;
            tmp.sync_all()?;
            fs::rename(&tmp_path, self.slot_path(slot))?;
            Ok(())
        })
        .context(format!("Failed to write slot: {}", slot))?;

        debug!(%slot, bytes = content.len(), "store_value: written");
        Ok(())
    }

    /// Move a slot's document out of the way without deleting it
    ///
    /// The file is renamed to `<slot>.<tag>.json`, which `list` does not
    /// report. Returns the new path, or `None` if the slot was empty.
    pub fn set_aside(&self, slot: &str, tag: &str) -> Result<Option<PathBuf>> {
        validate_slot_name(slot)?;
        validate_slot_name(tag)?;
        let path = self.slot_path(slot);
        if !path.exists() {
            return Ok(None);
        }

        let target = self.base_path.join(format!("{}.{}.{}", slot, tag, SLOT_EXTENSION));
        self.locked(|| Ok(fs::rename(&path, &target)?))
            .context(format!("Failed to set aside slot: {}", slot))?;

        info!(%slot, target = %target.display(), "Set aside slot");
        Ok(Some(target))
    }

    /// Run `f` while holding the store's exclusive write lock
    fn locked<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.base_path.join(LOCK_FILE))
            .context("Failed to open lock file")?;
        lock.lock_exclusive().context("Failed to lock slot store")?;

        let result = f();
        if let Err(e) = lock.unlock() {
            debug!(error = %e, "locked: unlock failed, released on close");
        }
        result
    }

    /// Serialize a value into a slot
    pub fn store<T: Serialize + ?Sized>(&self, slot: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.store_value(slot, &value)
    }

    /// Remove a slot; removing an empty slot is not an error
    pub fn remove(&self, slot: &str) -> Result<bool> {
        validate_slot_name(slot)?;
        let path = self.slot_path(slot);
        if path.exists() {
            fs::remove_file(&path).context(format!("Failed to remove slot: {}", slot))?;
            info!(%slot, "Removed slot");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// List populated slot names, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let mut slots = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let path = entry?.path();
            if path.is_file()
                && path.extension().map(|e| e == SLOT_EXTENSION).unwrap_or(false)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                && validate_slot_name(stem).is_ok()
            {
                slots.push(stem.to_string());
            }
        }

        slots.sort();
        Ok(slots)
    }
}
