//! Content validation for authored story documents.
//!
//! Playback assumes well-formed content: unique paragraph ids, resolvable
//! choice targets, and defined dialogue speakers. This pass is what makes
//! that assumption safe — authoring tools run it before shipping a story,
//! and every violation is collected rather than stopping at the first.

use std::collections::HashSet;

use thiserror::Error;

use crate::character::ConditionKind;
use crate::story::{PartKind, Story, StorySummary};

/// A single problem found in authored content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    /// Two characters share an id.
    #[error("duplicate character id: {0}")]
    DuplicateCharacterId(String),

    /// Two characters share a display name.
    #[error("duplicate character name: \"{0}\"")]
    DuplicateCharacterName(String),

    /// Two paragraphs share an id. Primary and extended paragraphs share
    /// one id space across the whole story.
    #[error("duplicate paragraph id: {0}")]
    DuplicateParagraphId(String),

    /// Two choices share an id; upgrade rules key off choice ids, so a
    /// duplicate makes rule matching ambiguous.
    #[error("duplicate choice id: {0}")]
    DuplicateChoiceId(String),

    /// A choice has an empty successor list and will dead-end silently.
    #[error("choice {0} has no successor paragraphs")]
    EmptyChoiceTargets(String),

    /// A choice references a paragraph id that does not exist.
    #[error("choice {choice} points to unknown paragraph: {target}")]
    DanglingChoiceTarget {
        /// The offending choice id.
        choice: String,
        /// The unresolvable paragraph id.
        target: String,
    },

    /// A dialogue part names a speaker that is not in the cast.
    #[error("speaker \"{speaker}\" in paragraph {paragraph} is not a defined character")]
    UnknownSpeaker {
        /// The undefined speaker name.
        speaker: String,
        /// The paragraph containing the dialogue part.
        paragraph: String,
    },

    /// An upgrade rule is conditioned on a choice id that no paragraph
    /// offers.
    #[error("character {character}: upgrade rule references unknown choice: {choice}")]
    DanglingRuleChoice {
        /// The character whose upgrade path holds the rule.
        character: String,
        /// The unresolvable choice id.
        choice: String,
    },

    /// A character's relationship seed disagrees with its intimacy
    /// baseline.
    #[error(
        "character {character}: relationship seed \"{seed}\" disagrees with intimacy status \"{intimacy}\""
    )]
    BaselineMismatch {
        /// The character id.
        character: String,
        /// The standing in the relationship seed.
        seed: String,
        /// The standing in the intimacy profile.
        intimacy: String,
    },

    /// A library row has an empty story id.
    #[error("library entry \"{0}\" has an empty story id")]
    EmptyStoryId(String),

    /// Two library rows share a story id.
    #[error("duplicate story id in library: {0}")]
    DuplicateStoryId(String),
}

/// Validate a full story document against the content invariants playback
/// relies on. Returns every issue found; an empty result means the story
/// is safe to ship.
pub fn validate_story(story: &Story, protagonist: &str) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    // Cast uniqueness.
    let mut character_ids = HashSet::new();
    let mut character_names = HashSet::new();
    for character in &story.characters {
        if !character_ids.insert(character.id.as_str()) {
            issues.push(ValidationIssue::DuplicateCharacterId(character.id.clone()));
        }
        if !character_names.insert(character.name.as_str()) {
            issues.push(ValidationIssue::DuplicateCharacterName(
                character.name.clone(),
            ));
        }
    }

    // Paragraph and choice id spaces, both story-wide.
    let mut paragraph_ids = HashSet::new();
    let mut choice_ids = HashSet::new();
    for chapter in &story.chapters {
        for paragraph in chapter.paragraphs.iter().chain(&chapter.extended_paragraphs) {
            if !paragraph_ids.insert(paragraph.id.as_str()) {
                issues.push(ValidationIssue::DuplicateParagraphId(paragraph.id.clone()));
            }
            for choice in &paragraph.choices {
                if !choice_ids.insert(choice.id.as_str()) {
                    issues.push(ValidationIssue::DuplicateChoiceId(choice.id.clone()));
                }
            }
        }
    }

    for chapter in &story.chapters {
        for paragraph in chapter.paragraphs.iter().chain(&chapter.extended_paragraphs) {
            // Choice targets must resolve.
            for choice in &paragraph.choices {
                if choice.next_paragraphs.is_empty() {
                    issues.push(ValidationIssue::EmptyChoiceTargets(choice.id.clone()));
                }
                for target in &choice.next_paragraphs {
                    if !paragraph_ids.contains(target.as_str()) {
                        issues.push(ValidationIssue::DanglingChoiceTarget {
                            choice: choice.id.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }

            // Dialogue speakers must be in the cast, protagonist aside.
            for part in &paragraph.parts {
                if part.kind != PartKind::Dialogue {
                    continue;
                }
                let Some(speaker) = &part.speaker else {
                    continue;
                };
                if speaker != protagonist && !character_names.contains(speaker.as_str()) {
                    issues.push(ValidationIssue::UnknownSpeaker {
                        speaker: speaker.clone(),
                        paragraph: paragraph.id.clone(),
                    });
                }
            }
        }
    }

    // Upgrade rules must reference real choices, and baselines must agree.
    for character in &story.characters {
        for rule in &character.intimacy.upgrade_path {
            if rule.condition.kind == ConditionKind::Choice
                && !choice_ids.contains(rule.condition.id.as_str())
            {
                issues.push(ValidationIssue::DanglingRuleChoice {
                    character: character.id.clone(),
                    choice: rule.condition.id.clone(),
                });
            }
        }
        let seed = &character.relationships.current;
        if !seed.is_empty() && *seed != character.intimacy.current_status {
            issues.push(ValidationIssue::BaselineMismatch {
                character: character.id.clone(),
                seed: seed.clone(),
                intimacy: character.intimacy.current_status.clone(),
            });
        }
    }

    issues
}

/// Validate a library index: story ids must be present and unique.
pub fn validate_library(summaries: &[StorySummary]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    for summary in summaries {
        if summary.id.is_empty() {
            issues.push(ValidationIssue::EmptyStoryId(summary.title.clone()));
        } else if !seen.insert(summary.id.as_str()) {
            issues.push(ValidationIssue::DuplicateStoryId(summary.id.clone()));
        }
    }
    issues
}
