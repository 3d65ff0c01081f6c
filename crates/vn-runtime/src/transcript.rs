//! The message log built up as a story plays.

use serde::{Deserialize, Serialize};

use vn_core::{Part, PartKind};

/// One revealed line of the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Narration or dialogue.
    pub kind: PartKind,
    /// The revealed text.
    pub text: String,
    /// Speaker name for dialogue lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    /// Whether this line is the reader's own picked choice rather than
    /// authored story text.
    pub from_user: bool,
}

impl Message {
    /// Build a story message from a reveal part.
    pub fn from_part(part: &Part) -> Self {
        Self {
            kind: part.kind,
            text: part.text.clone(),
            speaker: part.speaker.clone(),
            from_user: false,
        }
    }

    /// Build the reader's own message from a picked choice, spoken by the
    /// protagonist.
    pub fn player(text: impl Into<String>, protagonist: impl Into<String>) -> Self {
        Self {
            kind: PartKind::Dialogue,
            text: text.into(),
            speaker: Some(protagonist.into()),
            from_user: true,
        }
    }
}

/// Append-only log of revealed messages for the active chapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages in reveal order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recently revealed message.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of revealed messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether nothing has been revealed yet.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop all messages (a new chapter starts with a clean log).
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_part_copies_speaker() {
        let message = Message::from_part(&Part::dialogue("Mara", "Hello."));
        assert_eq!(message.kind, PartKind::Dialogue);
        assert_eq!(message.speaker.as_deref(), Some("Mara"));
        assert!(!message.from_user);
    }

    #[test]
    fn player_message_is_dialogue() {
        let message = Message::player("Offer your umbrella", "You");
        assert_eq!(message.kind, PartKind::Dialogue);
        assert_eq!(message.speaker.as_deref(), Some("You"));
        assert!(message.from_user);
    }

    #[test]
    fn append_and_clear() {
        let mut transcript = Transcript::new();
        assert!(transcript.is_empty());

        transcript.append(Message::from_part(&Part::narration("Rain.")));
        transcript.append(Message::player("Run", "You"));
        assert_eq!(transcript.len(), 2);
        assert!(transcript.last().unwrap().from_user);

        transcript.clear();
        assert!(transcript.is_empty());
    }
}
