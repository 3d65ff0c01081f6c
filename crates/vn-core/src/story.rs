//! Story documents: chapters, paragraphs, parts, and choices.
//!
//! The wire format is camelCase JSON as produced by the authoring pipeline.
//! All ids are author-assigned strings; nothing here generates identifiers.

use serde::{Deserialize, Serialize};

use crate::character::Character;

/// One row of the library index: enough to render a shelf entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorySummary {
    /// Story identifier, matching the `id` of the full story document.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Cover image reference, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    /// Short blurb shown in the library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A complete branching story: characters plus chapters.
///
/// A loaded story is immutable content. Everything that evolves during
/// playback (intimacy standing, relationship history, reading progress)
/// lives in runtime state keyed by story and character id, never in the
/// story value itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    /// Story identifier.
    pub id: String,
    /// Display title, if authored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// The cast. Character ids and names are unique within a story.
    #[serde(default)]
    pub characters: Vec<Character>,
    /// Ordered chapters.
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

impl Story {
    /// Create an empty story with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            characters: Vec::new(),
            chapters: Vec::new(),
        }
    }

    /// Add a character.
    pub fn with_character(mut self, character: Character) -> Self {
        self.characters.push(character);
        self
    }

    /// Add a chapter.
    pub fn with_chapter(mut self, chapter: Chapter) -> Self {
        self.chapters.push(chapter);
        self
    }

    /// Look up a character by id.
    pub fn character_by_id(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Look up a character by display name (the dialogue-speaker key).
    pub fn character_by_name(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.name == name)
    }

    /// Get a chapter by position.
    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    /// Find the position of a chapter by id.
    pub fn chapter_index(&self, chapter_id: &str) -> Option<usize> {
        self.chapters.iter().position(|c| c.id == chapter_id)
    }
}

/// A chapter: the primary paragraph sequence plus side branches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Chapter identifier.
    pub id: String,
    /// Display title, if authored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// The primary sequence; playback starts at the first entry.
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
    /// Paragraphs reachable only through choice targets, never by default
    /// traversal. They share one id space with [`Chapter::paragraphs`].
    #[serde(default)]
    pub extended_paragraphs: Vec<Paragraph>,
}

impl Chapter {
    /// Create an empty chapter with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            paragraphs: Vec::new(),
            extended_paragraphs: Vec::new(),
        }
    }

    /// Add a paragraph to the primary sequence.
    pub fn with_paragraph(mut self, paragraph: Paragraph) -> Self {
        self.paragraphs.push(paragraph);
        self
    }

    /// Add a choice-only side branch.
    pub fn with_extended(mut self, paragraph: Paragraph) -> Self {
        self.extended_paragraphs.push(paragraph);
        self
    }

    /// Look up a paragraph by id across the primary and extended sets.
    ///
    /// A miss means "no transition", not an error: callers stay where
    /// they are.
    pub fn paragraph(&self, id: &str) -> Option<&Paragraph> {
        self.paragraphs
            .iter()
            .chain(&self.extended_paragraphs)
            .find(|p| p.id == id)
    }

    /// The paragraph playback enters when the chapter starts.
    pub fn first_paragraph(&self) -> Option<&Paragraph> {
        self.paragraphs.first()
    }
}

/// A branch node: ordered reveal parts plus optional choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    /// Paragraph identifier, unique across the whole story.
    pub id: String,
    /// Reveal units, shown strictly in order.
    #[serde(default)]
    pub parts: Vec<Part>,
    /// Options surfaced once every part has been revealed. Empty means
    /// the paragraph is a dead end.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl Paragraph {
    /// Create an empty paragraph with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parts: Vec::new(),
            choices: Vec::new(),
        }
    }

    /// Add a reveal part.
    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Add a choice.
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }
}

/// The kind of an atomic reveal unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartKind {
    /// Scene-setting text with no speaker.
    Narration,
    /// A spoken line attributed to a speaker.
    Dialogue,
}

/// One atomic reveal unit: a narration beat or a dialogue line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// Whether this is narration or dialogue.
    #[serde(rename = "type")]
    pub kind: PartKind,
    /// The text revealed to the reader.
    pub text: String,
    /// Speaker name for dialogue. Must name a defined character, except
    /// for the protagonist marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

impl Part {
    /// Create a narration part.
    pub fn narration(text: impl Into<String>) -> Self {
        Self {
            kind: PartKind::Narration,
            text: text.into(),
            speaker: None,
        }
    }

    /// Create a dialogue part spoken by `speaker`.
    pub fn dialogue(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: PartKind::Dialogue,
            text: text.into(),
            speaker: Some(speaker.into()),
        }
    }
}

/// A user-selectable branch option.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    /// Choice identifier; intimacy upgrade rules key off it.
    pub id: String,
    /// The text shown to the reader, and echoed into the transcript as the
    /// protagonist's line once selected.
    pub text: String,
    /// Successor paragraph ids. Only the first entry is ever followed;
    /// the array shape is kept so existing content parses unchanged.
    #[serde(default)]
    pub next_paragraphs: Vec<String>,
}

impl Choice {
    /// Create a choice with no successors.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            next_paragraphs: Vec::new(),
        }
    }

    /// Append a successor paragraph id.
    pub fn with_successor(mut self, paragraph_id: impl Into<String>) -> Self {
        self.next_paragraphs.push(paragraph_id.into());
        self
    }

    /// The authoritative successor: the first entry, if any.
    pub fn successor(&self) -> Option<&str> {
        self.next_paragraphs.first().map(String::as_str)
    }
}
