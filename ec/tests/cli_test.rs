//! CLI tests for the `ec` binary

use assert_cmd::Command;
use chrono::{TimeZone, Utc};
use compass::domain::{Descriptor, Emotion, JournalEntry, MentorshipResult, Session};
use compass::i18n::Language;
use compass::store::Storage;
use predicates::prelude::*;
use tempfile::TempDir;

struct Env {
    root: TempDir,
}

impl Env {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let config = format!("storage:\n  dir: {}\n", root.path().join("slots").display());
        std::fs::write(root.path().join("config.yml"), config).unwrap();
        Self { root }
    }

    fn storage(&self) -> Storage {
        Storage::open(self.root.path().join("slots")).unwrap()
    }

    fn ec(&self) -> Command {
        let mut cmd = Command::cargo_bin("ec").expect("ec binary should build");
        cmd.arg("--config")
            .arg(self.root.path().join("config.yml"))
            .env("XDG_DATA_HOME", self.root.path().join("data"))
            .env("HOME", self.root.path());
        cmd
    }
}

fn entry(emotion: Emotion, intensity: u8, day: u32) -> JournalEntry {
    let session = Session {
        descriptor: Some(Descriptor::Named { emotion }),
        intensity,
        ..Default::default()
    };
    let at = Utc.with_ymd_and_hms(2025, 3, day, 9, 30, 0).unwrap();
    JournalEntry::assemble_at(&session, MentorshipResult::fallback(), Language::En, at)
}

#[test]
fn test_journal_empty() {
    let env = Env::new();

    env.ec()
        .arg("journal")
        .assert()
        .success()
        .stdout(predicate::str::contains("Your saved reflections will appear here."));
}

#[test]
fn test_journal_text_uses_stored_language() {
    let env = Env::new();
    let storage = env.storage();
    storage.save_language(Language::Ja).unwrap();
    storage.save_journal(&[entry(Emotion::Joy, 8, 2)]).unwrap();

    env.ec()
        .arg("journal")
        .assert()
        .success()
        .stdout(predicate::str::contains("あなたのジャーナル"))
        .stdout(predicate::str::contains("Joy"))
        .stdout(predicate::str::contains("8/10"));
}

#[test]
fn test_journal_json_respects_limit() {
    let env = Env::new();
    env.storage()
        .save_journal(&[entry(Emotion::Anger, 9, 3), entry(Emotion::Sadness, 2, 1)])
        .unwrap();

    let output = env.ec().args(["journal", "--format", "json", "-n", "1"]).output().unwrap();
    assert!(output.status.success());

    let entries: Vec<JournalEntry> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].emotion_label, "Anger");
    assert_eq!(entries[0].intensity, 9);
}

#[test]
fn test_forget_clears_onboarding_only() {
    let env = Env::new();
    let storage = env.storage();
    storage.save_language(Language::En).unwrap();
    storage.save_preferred_name("Yui").unwrap();
    storage.save_journal(&[entry(Emotion::Joy, 5, 1)]).unwrap();

    env.ec()
        .arg("forget")
        .assert()
        .success()
        .stdout(predicate::str::contains("Language and name cleared"));

    let state = env.storage().load_state();
    assert!(state.language.is_none());
    assert!(state.preferred_name.is_none());
    assert_eq!(state.journal.len(), 1);

    env.ec()
        .arg("forget")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to forget"));
}

#[test]
fn test_bad_config_path_fails() {
    let env = Env::new();

    Command::cargo_bin("ec")
        .unwrap()
        .args(["--config", "/definitely/not/here.yml", "journal"])
        .env("XDG_DATA_HOME", env.root.path().join("data"))
        .assert()
        .failure();
}
