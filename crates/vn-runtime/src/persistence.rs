//! Durable reading progress and relationship history.
//!
//! Two independent records: where the reader is in each story, and every
//! recorded relationship transition. Both are whole-snapshot JSON
//! rewrites. There is no transaction across them; a crash between the two
//! writes is acceptable because each record is independently best-effort
//! and re-derivable. A missing or unparsable record loads as an empty
//! mapping, never as a fatal error.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::relationship::RelationshipLog;

/// File name of the reading-progress record.
pub const PROGRESS_FILE: &str = "progress.json";
/// File name of the relationship-history record.
pub const RELATIONSHIPS_FILE: &str = "relationships.json";

/// The last-visited location within one story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgress {
    /// The chapter the reader was in.
    pub chapter_id: String,
    /// The paragraph the reader last entered.
    pub paragraph_id: String,
}

/// Everything the runtime persists, as one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    /// Reading progress keyed by story id.
    #[serde(default)]
    pub progress: HashMap<String, ReadingProgress>,
    /// Relationship logs keyed by story id, then character id.
    #[serde(default)]
    pub relationships: HashMap<String, HashMap<String, RelationshipLog>>,
}

/// Result type for persistence operations.
pub type PersistResult<T> = Result<T, PersistError>;

/// Errors raised while writing durable state. Reads never fail; they
/// default instead.
#[derive(Debug, Error)]
pub enum PersistError {
    /// A record file could not be written.
    #[error("cannot write {path}: {source}")]
    Io {
        /// The unwritable path.
        path: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The state could not be encoded as JSON.
    #[error("cannot encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A durable home for [`SavedState`].
pub trait StateStore {
    /// Load the persisted snapshot, defaulting each record to empty if it
    /// is absent or unreadable.
    fn load(&self) -> SavedState;

    /// Rewrite the whole snapshot.
    fn persist(&self, state: &SavedState) -> PersistResult<()>;
}

/// Store backed by two JSON files in a save directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`. The directory is created on the
    /// first persist, not here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read_record<T: Default + DeserializeOwned>(path: &Path) -> T {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %err, "cannot read record");
                }
                return T::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "malformed record, starting fresh"
                );
                T::default()
            }
        }
    }

    fn write_record<T: Serialize>(&self, name: &str, value: &T) -> PersistResult<()> {
        let path = self.dir.join(name);
        let text = serde_json::to_string_pretty(value)?;
        fs::create_dir_all(&self.dir).map_err(|source| PersistError::Io {
            path: self.dir.display().to_string(),
            source,
        })?;
        fs::write(&path, text).map_err(|source| PersistError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> SavedState {
        SavedState {
            progress: Self::read_record(&self.dir.join(PROGRESS_FILE)),
            relationships: Self::read_record(&self.dir.join(RELATIONSHIPS_FILE)),
        }
    }

    fn persist(&self, state: &SavedState) -> PersistResult<()> {
        self.write_record(PROGRESS_FILE, &state.progress)?;
        self.write_record(RELATIONSHIPS_FILE, &state.relationships)
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<SavedState>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of whatever was last persisted.
    pub fn snapshot(&self) -> SavedState {
        self.state.borrow().clone()
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> SavedState {
        self.state.borrow().clone()
    }

    fn persist(&self, state: &SavedState) -> PersistResult<()> {
        *self.state.borrow_mut() = state.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_state() -> SavedState {
        let mut state = SavedState::default();
        state.progress.insert(
            "rainfall".to_string(),
            ReadingProgress {
                chapter_id: "c1".to_string(),
                paragraph_id: "p2".to_string(),
            },
        );
        state
            .relationships
            .entry("rainfall".to_string())
            .or_default()
            .insert(
                "mara".to_string(),
                RelationshipLog {
                    history: Vec::new(),
                    current_status: "friend".to_string(),
                },
            );
        state
    }

    #[test]
    fn round_trip_through_files() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());

        let state = sample_state();
        store.persist(&state).unwrap();

        let loaded = store.load();
        assert_eq!(loaded, state);
    }

    #[test]
    fn absent_records_default_to_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("never-written"));

        let loaded = store.load();
        assert!(loaded.progress.is_empty());
        assert!(loaded.relationships.is_empty());
    }

    #[test]
    fn malformed_record_defaults_without_failing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(PROGRESS_FILE), "{definitely not json").unwrap();
        std::fs::write(
            dir.path().join(RELATIONSHIPS_FILE),
            r#"{"rainfall": {"mara": {"currentStatus": "friend"}}}"#,
        )
        .unwrap();

        let store = JsonFileStore::new(dir.path());
        let loaded = store.load();

        // The broken record defaults; the good one still loads.
        assert!(loaded.progress.is_empty());
        assert_eq!(
            loaded.relationships["rainfall"]["mara"].current_status,
            "friend"
        );
    }

    #[test]
    fn persist_is_whole_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.persist(&sample_state()).unwrap();
        store.persist(&SavedState::default()).unwrap();

        let loaded = store.load();
        assert!(loaded.progress.is_empty());
        assert!(loaded.relationships.is_empty());
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        let state = sample_state();
        store.persist(&state).unwrap();
        assert_eq!(store.load(), state);
        assert_eq!(store.snapshot(), state);
    }
}
