//! Error types for the runtime.

use thiserror::Error;

use crate::persistence::PersistError;
use crate::repository::LoadError;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur while driving a session.
///
/// Lookup misses (a choice target or a speaker that resolves to nothing)
/// are not errors: they are defined empty outcomes and never appear here.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// An operation needed a loaded story and none is open.
    #[error("no story loaded")]
    NoStoryLoaded,

    /// Choice input arrived while playback was not awaiting one.
    #[error("no choice is being awaited")]
    NotAwaitingChoice,

    /// The given id does not name any of the surfaced choices.
    #[error("unknown choice: {0}")]
    UnknownChoice(String),

    /// Loading the library index or a story document failed.
    #[error("{0}")]
    Load(#[from] LoadError),

    /// Writing durable state failed.
    #[error("{0}")]
    Persist(#[from] PersistError),
}
