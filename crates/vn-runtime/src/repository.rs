//! Loading the library index and story documents.
//!
//! The content source is opaque to the rest of the runtime: anything that
//! can produce a library index and a story document by id works. Every
//! call issues a fresh read; a returned [`Story`] is owned by the caller.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use vn_core::{Story, StorySummary};

/// File name of the library index inside a content directory.
pub const LIBRARY_FILE: &str = "library.json";

/// Errors raised while fetching content.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The requested document does not exist.
    #[error("story not found: {0}")]
    NotFound(String),

    /// The document exists but could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// The unreadable path or resource name.
        path: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// The document was read but is not valid JSON for its schema.
    #[error("malformed document {path}: {source}")]
    Parse {
        /// The malformed path or resource name.
        path: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },
}

/// A source of library indexes and story documents.
pub trait StoryRepository {
    /// Fetch the library index.
    fn load_library(&self) -> Result<Vec<StorySummary>, LoadError>;

    /// Fetch the full story document for `id`.
    fn load_story(&self, id: &str) -> Result<Story, LoadError>;
}

/// Repository over a directory of JSON documents: `library.json` plus one
/// `<id>.json` per story.
#[derive(Debug, Clone)]
pub struct FsRepository {
    root: PathBuf,
}

impl FsRepository {
    /// Create a repository rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The path a story document for `id` would live at.
    pub fn story_path(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
        let text = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LoadError::NotFound(path.display().to_string())
            } else {
                LoadError::Io {
                    path: path.display().to_string(),
                    source,
                }
            }
        })?;
        serde_json::from_str(&text).map_err(|source| LoadError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

impl StoryRepository for FsRepository {
    fn load_library(&self) -> Result<Vec<StorySummary>, LoadError> {
        let path = self.root.join(LIBRARY_FILE);
        tracing::debug!(path = %path.display(), "loading library index");
        Self::read_json(&path)
    }

    fn load_story(&self, id: &str) -> Result<Story, LoadError> {
        let path = self.story_path(id);
        tracing::debug!(story = id, path = %path.display(), "loading story");
        Self::read_json(&path)
    }
}

/// In-memory repository, mainly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    summaries: Vec<StorySummary>,
    stories: HashMap<String, Story>,
}

impl MemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a story, deriving a library row from its id and title.
    pub fn with_story(mut self, story: Story) -> Self {
        self.summaries.push(StorySummary {
            id: story.id.clone(),
            title: story.title.clone().unwrap_or_else(|| story.id.clone()),
            cover: None,
            description: None,
        });
        self.stories.insert(story.id.clone(), story);
        self
    }
}

impl StoryRepository for MemoryRepository {
    fn load_library(&self) -> Result<Vec<StorySummary>, LoadError> {
        Ok(self.summaries.clone())
    }

    fn load_story(&self, id: &str) -> Result<Story, LoadError> {
        self.stories
            .get(id)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_fixture(dir: &TempDir) {
        fs::write(
            dir.path().join(LIBRARY_FILE),
            r#"[{"id": "rainfall", "title": "Rainfall"}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("rainfall.json"),
            r#"{"id": "rainfall", "characters": [], "chapters": [{"id": "c1", "paragraphs": []}]}"#,
        )
        .unwrap();
    }

    #[test]
    fn loads_library_and_story() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);

        let repository = FsRepository::new(dir.path());
        let library = repository.load_library().unwrap();
        assert_eq!(library.len(), 1);
        assert_eq!(library[0].id, "rainfall");

        let story = repository.load_story("rainfall").unwrap();
        assert_eq!(story.chapters.len(), 1);
    }

    #[test]
    fn missing_story_is_not_found() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);

        let repository = FsRepository::new(dir.path());
        let err = repository.load_story("nope").unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn malformed_story_is_parse_error() {
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();

        let repository = FsRepository::new(dir.path());
        let err = repository.load_story("broken").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn missing_library_is_not_found() {
        let dir = TempDir::new().unwrap();
        let repository = FsRepository::new(dir.path());
        assert!(matches!(
            repository.load_library().unwrap_err(),
            LoadError::NotFound(_)
        ));
    }

    #[test]
    fn memory_repository_round_trips() {
        let repository = MemoryRepository::new().with_story(Story::new("rainfall"));
        assert_eq!(repository.load_library().unwrap().len(), 1);
        assert!(repository.load_story("rainfall").is_ok());
        assert!(matches!(
            repository.load_story("other").unwrap_err(),
            LoadError::NotFound(_)
        ));
    }
}
