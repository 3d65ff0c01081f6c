//! Narrative playback runtime for branching visual novels.
//!
//! This crate walks a story graph loaded from a [`repository`], reveals
//! parts on a deterministic timeline, collects choices, evolves
//! per-character relationship state, and checkpoints progress after every
//! transition. The [`session::Session`] object ties it all together; a
//! frontend drives it by reporting elapsed time and user input, and
//! renders its transcript, choices, and notifications.

/// Pacing and session configuration.
pub mod config;
/// Error types for the runtime.
pub mod error;
/// Notification signals consumed by the frontend.
pub mod notify;
/// Durable reading progress and relationship history.
pub mod persistence;
/// The paragraph traversal and incremental-reveal state machine.
pub mod playback;
/// Choice-triggered intimacy upgrades and the relationship ledger.
pub mod relationship;
/// Library index and story document loading.
pub mod repository;
/// The deterministic, cancellable task scheduler.
pub mod scheduler;
/// The session controller composing all of the above.
pub mod session;
/// The revealed message log.
pub mod transcript;

pub use config::{PacingConfig, SessionConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use notify::Notification;
pub use persistence::{JsonFileStore, MemoryStore, ReadingProgress, SavedState, StateStore};
pub use playback::{Phase, Playback, PlaybackEvent};
pub use relationship::{IntimacyState, RelationshipLedger, RelationshipLog, RelationshipView};
pub use repository::{FsRepository, LoadError, MemoryRepository, StoryRepository};
pub use session::{Session, View};
pub use transcript::{Message, Transcript};
