//! Content data model for the visual-novel runtime.
//!
//! This crate defines the authored story format: characters with intimacy
//! upgrade rules, chapters of branching paragraphs, timed reveal parts, and
//! choices. It also carries the validation pass authoring tools run before
//! shipping content. It is independent of playback: you can construct a
//! [`Story`] programmatically or deserialize one from JSON.

/// Characters, intimacy profiles, and upgrade rules.
pub mod character;
/// Story documents: chapters, paragraphs, parts, and choices.
pub mod story;
/// Content validation for authored story documents.
pub mod validate;

pub use character::{
    Character, ConditionKind, HistoryEntry, IntimacyProfile, PROTAGONIST_SPEAKER, RelationshipSeed,
    RuleCondition, RuleTone, UpgradeRule,
};
pub use story::{Chapter, Choice, Paragraph, Part, PartKind, Story, StorySummary};
pub use validate::{ValidationIssue, validate_library, validate_story};
