//! Local persistence for mood and journal history
//!
//! A small key-value store backed by a directory: every key is one file holding
//! the serialized value. Record lists are JSON arrays; the theme flag is the
//! literal `dark` or `light`.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::state::{JournalEntry, MoodEntry, Theme};

pub const MOODS_KEY: &str = "askdoc_moods";
pub const JOURNALS_KEY: &str = "askdoc_journals";
pub const THEME_KEY: &str = "theme";

/// Errors that can occur while writing to the store
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Directory-backed key-value store
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "opened local store");
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }

    /// Read the raw value stored under `key`, if any.
    pub fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the value stored under `key`.
    pub fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{}.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    /// Load a record list. Absent or unreadable data yields an empty list.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "failed to read stored list");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(list) => list,
            Err(e) => {
                warn!(key, error = %e, "stored list is malformed, starting empty");
                Vec::new()
            }
        }
    }

    /// Serialize and overwrite a record list.
    pub fn save<T: Serialize>(&self, key: &str, list: &[T]) -> StorageResult<()> {
        let json = serde_json::to_string(list)?;
        self.set(key, &json)
    }

    pub fn load_theme(&self) -> Option<Theme> {
        match self.get(THEME_KEY) {
            Ok(Some(raw)) => Theme::from_str(&raw),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "failed to read theme");
                None
            }
        }
    }

    pub fn save_theme(&self, theme: Theme) -> StorageResult<()> {
        self.set(THEME_KEY, theme.as_str())
    }
}

/// In-memory copy of both record lists, mirrored to the store on every change.
///
/// Lists are newest first.
#[derive(Debug)]
pub struct History {
    store: LocalStore,
    moods: Vec<MoodEntry>,
    journals: Vec<JournalEntry>,
}

impl History {
    pub fn load(store: LocalStore) -> Self {
        let moods: Vec<MoodEntry> = store.load(MOODS_KEY);
        let journals: Vec<JournalEntry> = store.load(JOURNALS_KEY);
        debug!(
            moods = moods.len(),
            journals = journals.len(),
            "loaded history"
        );
        Self {
            store,
            moods,
            journals,
        }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn moods(&self) -> &[MoodEntry] {
        &self.moods
    }

    pub fn journals(&self) -> &[JournalEntry] {
        &self.journals
    }

    pub fn is_empty(&self) -> bool {
        self.moods.is_empty() && self.journals.is_empty()
    }

    /// Prepend a mood entry and persist the whole list.
    ///
    /// The entry stays in memory even if the write fails.
    pub fn add_mood(&mut self, entry: MoodEntry) -> StorageResult<()> {
        self.moods.insert(0, entry);
        self.store.save(MOODS_KEY, &self.moods)
    }

    /// Prepend a journal entry and persist the whole list.
    pub fn add_journal(&mut self, entry: JournalEntry) -> StorageResult<()> {
        self.journals.insert(0, entry);
        self.store.save(JOURNALS_KEY, &self.journals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, LocalStore) {
        let dir = TempDir::new().unwrap();
        let store = LocalStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_missing_key_loads_empty() {
        let (_dir, store) = store();
        let moods: Vec<MoodEntry> = store.load(MOODS_KEY);
        assert!(moods.is_empty());
    }

    #[test]
    fn test_corrupted_data_loads_empty() {
        let (_dir, store) = store();
        store.set(MOODS_KEY, "{not json").unwrap();
        store.set(JOURNALS_KEY, "{\"id\": 1}").unwrap();

        let history = History::load(store);
        assert!(history.moods().is_empty());
        assert!(history.journals().is_empty());
    }

    #[test]
    fn test_mood_entries_are_prepended_and_persisted() {
        let (dir, store) = store();
        let mut history = History::load(store);

        history
            .add_mood(MoodEntry::at("Happy", 7, "", 1_000))
            .unwrap();
        history
            .add_mood(MoodEntry::at("Sad", 3, "tired", 2_000))
            .unwrap();

        let timestamps: Vec<i64> = history.moods().iter().map(|m| m.timestamp).collect();
        assert_eq!(timestamps, vec![2_000, 1_000]);

        // A fresh load sees the same order
        let reloaded = History::load(LocalStore::open(dir.path()).unwrap());
        assert_eq!(reloaded.moods(), history.moods());
        assert_eq!(reloaded.moods()[0].note, "tired");
        assert_eq!(reloaded.moods()[1].mood, "Happy");
    }

    #[test]
    fn test_journal_entries_keep_previous_entries() {
        let (dir, store) = store();
        let mut history = History::load(store);

        for i in 0..3 {
            history
                .add_journal(JournalEntry::at("prompt", &format!("entry {}", i), i))
                .unwrap();
        }

        let reloaded = History::load(LocalStore::open(dir.path()).unwrap());
        let contents: Vec<&str> = reloaded
            .journals()
            .iter()
            .map(|j| j.content.as_str())
            .collect();
        assert_eq!(contents, vec!["entry 2", "entry 1", "entry 0"]);
        assert!(reloaded.moods().is_empty());
    }

    #[test]
    fn test_reads_records_written_by_older_clients() {
        let (_dir, store) = store();
        store
            .set(
                MOODS_KEY,
                r#"[{"id":"1718000000000","mood":"Calm","intensity":4,"note":"","timestamp":1718000000000}]"#,
            )
            .unwrap();

        let moods: Vec<MoodEntry> = store.load(MOODS_KEY);
        assert_eq!(moods.len(), 1);
        assert_eq!(moods[0].id, "1718000000000");
        assert_eq!(moods[0].intensity, 4);
    }

    #[test]
    fn test_theme_flag() {
        let (_dir, store) = store();
        assert_eq!(store.load_theme(), None);

        store.save_theme(Theme::Light).unwrap();
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("light"));
        assert_eq!(store.load_theme(), Some(Theme::Light));

        store.set(THEME_KEY, "purple").unwrap();
        assert_eq!(store.load_theme(), None);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let (_dir, store) = store();
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
