//! The relationship engine: choice-triggered intimacy upgrades.
//!
//! Loaded stories are immutable content. Everything that evolves (a
//! character's current standing, its intimacy value, the history of
//! transitions) lives here, keyed by story id then character id, and is
//! merged with the authored baseline at read time. The ledger
//! outlives any single story: it holds state for every story the process
//! has touched and is what the persistence layer snapshots.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use vn_core::{ConditionKind, HistoryEntry, RuleTone, Story, UpgradeRule};

/// A character's current derived standing with the protagonist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntimacyState {
    /// Current categorical standing.
    pub status: String,
    /// Current numeric intimacy value.
    pub value: i32,
}

/// The durable record of a character's standing transitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipLog {
    /// Recorded transitions, most recent first. Never pruned.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    /// The standing after the most recent transition.
    #[serde(default)]
    pub current_status: String,
}

/// A character's standing merged from authored baseline and ledger state,
/// ready for profile display.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipView {
    /// Current categorical standing.
    pub current: String,
    /// Current numeric intimacy value.
    pub value: i32,
    /// Transition history, most recent first.
    pub history: Vec<HistoryEntry>,
}

/// The outcome of one matched upgrade rule.
#[derive(Debug, Clone, PartialEq)]
pub struct IntimacyUpdate {
    /// The affected character's id.
    pub character_id: String,
    /// The affected character's display name.
    pub character_name: String,
    /// Standing before the rule applied.
    pub from: String,
    /// Standing after the rule applied.
    pub to: String,
    /// Whether the standing actually transitioned (history only grows
    /// when it did).
    pub changed: bool,
    /// Emotional tone of the rule.
    pub tone: RuleTone,
    /// Ready-to-display notification text.
    pub toast: String,
}

/// Derived relationship state for every story the process has touched.
#[derive(Debug, Default)]
pub struct RelationshipLedger {
    intimacy: HashMap<String, HashMap<String, IntimacyState>>,
    logs: HashMap<String, HashMap<String, RelationshipLog>>,
}

impl RelationshipLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the transition logs wholesale with persisted state.
    /// Called once at session start, before any story is opened.
    pub fn restore(&mut self, saved: HashMap<String, HashMap<String, RelationshipLog>>) {
        self.logs = saved;
    }

    /// Ensure every character of `story` has an intimacy entry, seeding
    /// from the authored baseline and overlaying any restored log's
    /// current standing.
    pub fn seed_story(&mut self, story: &Story) {
        let story_logs = self.logs.get(&story.id);
        let story_intimacy = self.intimacy.entry(story.id.clone()).or_default();

        for character in &story.characters {
            let state = story_intimacy
                .entry(character.id.clone())
                .or_insert_with(|| IntimacyState {
                    status: character.intimacy.current_status.clone(),
                    value: character.intimacy.value,
                });
            let saved = story_logs
                .and_then(|logs| logs.get(&character.id))
                .filter(|log| !log.current_status.is_empty());
            if let Some(log) = saved {
                state.status = log.current_status.clone();
            }
        }
    }

    /// Evaluate a picked choice against every character's upgrade path.
    ///
    /// For each character the first rule conditioned on this choice id
    /// wins; characters with no matching rule are untouched. Matching a
    /// rule always produces an [`IntimacyUpdate`] (and thus a toast); a
    /// history entry is recorded only when the standing actually changes,
    /// so re-applying the same rule never grows the history.
    pub fn apply_choice(&mut self, story: &Story, choice_id: &str) -> Vec<IntimacyUpdate> {
        let mut updates = Vec::new();

        for character in &story.characters {
            let rule = character.intimacy.upgrade_path.iter().find(|rule| {
                rule.condition.kind == ConditionKind::Choice && rule.condition.id == choice_id
            });
            let Some(rule) = rule else {
                continue;
            };

            let state = self
                .intimacy
                .entry(story.id.clone())
                .or_default()
                .entry(character.id.clone())
                .or_insert_with(|| IntimacyState {
                    status: character.intimacy.current_status.clone(),
                    value: character.intimacy.value,
                });

            let previous = state.status.clone();
            state.status = rule.status.clone();
            if let Some(value) = rule.value {
                state.value = value;
            }

            let changed = previous != rule.status;
            if changed {
                let log = self
                    .logs
                    .entry(story.id.clone())
                    .or_default()
                    .entry(character.id.clone())
                    .or_default();
                log.history.insert(
                    0,
                    HistoryEntry {
                        from: previous.clone(),
                        to: rule.status.clone(),
                        description: rule.description.clone(),
                        tone: rule.tone,
                        timestamp: Utc::now(),
                    },
                );
                log.current_status = rule.status.clone();
                tracing::debug!(
                    character = %character.name,
                    from = %previous,
                    to = %rule.status,
                    "relationship status changed"
                );
            }

            updates.push(IntimacyUpdate {
                character_id: character.id.clone(),
                character_name: character.name.clone(),
                from: previous,
                to: rule.status.clone(),
                changed,
                tone: rule.tone,
                toast: toast_text(&character.name, rule),
            });
        }

        updates
    }

    /// Current derived intimacy state for a character, if seeded.
    pub fn intimacy(&self, story_id: &str, character_id: &str) -> Option<&IntimacyState> {
        self.intimacy.get(story_id)?.get(character_id)
    }

    /// Transition log for a character, if any transition ever happened.
    pub fn log(&self, story_id: &str, character_id: &str) -> Option<&RelationshipLog> {
        self.logs.get(story_id)?.get(character_id)
    }

    /// Merge authored baseline and ledger state into a displayable view.
    /// `None` if the character is not in the story's cast.
    pub fn view(&self, story: &Story, character_id: &str) -> Option<RelationshipView> {
        let character = story.character_by_id(character_id)?;
        let state = self.intimacy(&story.id, character_id);
        let log = self.log(&story.id, character_id);

        let current = state
            .map(|s| s.status.clone())
            .unwrap_or_else(|| character.intimacy.current_status.clone());
        let value = state
            .map(|s| s.value)
            .unwrap_or(character.intimacy.value);
        let history = log
            .map(|l| l.history.clone())
            .unwrap_or_else(|| character.relationships.history.clone());

        Some(RelationshipView {
            current,
            value,
            history,
        })
    }

    /// Snapshot of every transition log, for persistence.
    pub fn logs_snapshot(&self) -> HashMap<String, HashMap<String, RelationshipLog>> {
        self.logs.clone()
    }
}

/// Notification text for a matched rule, styled by its tone.
fn toast_text(name: &str, rule: &UpgradeRule) -> String {
    match rule.tone {
        RuleTone::Sweet => format!("💕 {name}: {} - {}", rule.status, rule.description),
        RuleTone::Sad => format!("💔 {name}: {} - {}", rule.status, rule.description),
        RuleTone::Neutral => format!("{name}: {} - {}", rule.status, rule.description),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vn_core::Character;

    fn test_story() -> Story {
        Story::new("rainfall")
            .with_character(
                Character::new("mara", "Mara", "stranger")
                    .with_rule(
                        UpgradeRule::on_choice("ch1", "friend", "Shared an umbrella")
                            .with_tone(RuleTone::Sweet)
                            .with_value(20),
                    )
                    .with_rule(UpgradeRule::on_choice("ch2", "estranged", "Walked away")
                        .with_tone(RuleTone::Sad)),
            )
            .with_character(Character::new("jun", "Jun", "stranger").with_rule(
                UpgradeRule::on_choice("ch1", "curious", "Watched from the doorway"),
            ))
    }

    #[test]
    fn seed_uses_authored_baseline() {
        let story = test_story();
        let mut ledger = RelationshipLedger::new();
        ledger.seed_story(&story);

        let state = ledger.intimacy("rainfall", "mara").unwrap();
        assert_eq!(state.status, "stranger");
        assert_eq!(state.value, 0);
    }

    #[test]
    fn first_match_per_character_and_multiple_characters() {
        let story = test_story();
        let mut ledger = RelationshipLedger::new();
        ledger.seed_story(&story);

        let updates = ledger.apply_choice(&story, "ch1");
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].character_id, "mara");
        assert_eq!(updates[0].to, "friend");
        assert_eq!(updates[1].character_id, "jun");
        assert_eq!(updates[1].to, "curious");

        assert_eq!(ledger.intimacy("rainfall", "mara").unwrap().value, 20);
    }

    #[test]
    fn transition_records_history_entry() {
        let story = test_story();
        let mut ledger = RelationshipLedger::new();
        ledger.seed_story(&story);

        let updates = ledger.apply_choice(&story, "ch1");
        assert!(updates[0].changed);

        let log = ledger.log("rainfall", "mara").unwrap();
        assert_eq!(log.current_status, "friend");
        assert_eq!(log.history.len(), 1);
        assert_eq!(log.history[0].from, "stranger");
        assert_eq!(log.history[0].to, "friend");
    }

    #[test]
    fn reapplying_same_rule_does_not_grow_history() {
        let story = test_story();
        let mut ledger = RelationshipLedger::new();
        ledger.seed_story(&story);

        ledger.apply_choice(&story, "ch1");
        let updates = ledger.apply_choice(&story, "ch1");

        // Still toasts, but no new transition.
        assert_eq!(updates.len(), 2);
        assert!(!updates[0].changed);
        assert_eq!(ledger.log("rainfall", "mara").unwrap().history.len(), 1);
    }

    #[test]
    fn history_is_most_recent_first() {
        let story = test_story();
        let mut ledger = RelationshipLedger::new();
        ledger.seed_story(&story);

        ledger.apply_choice(&story, "ch1");
        ledger.apply_choice(&story, "ch2");

        let log = ledger.log("rainfall", "mara").unwrap();
        assert_eq!(log.history.len(), 2);
        assert_eq!(log.history[0].to, "estranged");
        assert_eq!(log.history[1].to, "friend");
    }

    #[test]
    fn unmatched_choice_is_a_no_op() {
        let story = test_story();
        let mut ledger = RelationshipLedger::new();
        ledger.seed_story(&story);

        let updates = ledger.apply_choice(&story, "unrelated");
        assert!(updates.is_empty());
        assert_eq!(ledger.intimacy("rainfall", "mara").unwrap().status, "stranger");
        assert!(ledger.log("rainfall", "mara").is_none());
    }

    #[test]
    fn omitted_value_keeps_previous() {
        let story = test_story();
        let mut ledger = RelationshipLedger::new();
        ledger.seed_story(&story);

        ledger.apply_choice(&story, "ch1"); // sets value to 20
        ledger.apply_choice(&story, "ch2"); // rule has no value
        assert_eq!(ledger.intimacy("rainfall", "mara").unwrap().value, 20);
    }

    #[test]
    fn toast_styling_by_tone() {
        let story = test_story();
        let mut ledger = RelationshipLedger::new();
        ledger.seed_story(&story);

        let updates = ledger.apply_choice(&story, "ch1");
        assert_eq!(updates[0].toast, "💕 Mara: friend - Shared an umbrella");
        assert_eq!(updates[1].toast, "Jun: curious - Watched from the doorway");

        let updates = ledger.apply_choice(&story, "ch2");
        assert_eq!(updates[0].toast, "💔 Mara: estranged - Walked away");
    }

    #[test]
    fn restore_overlays_seed() {
        let story = test_story();
        let mut ledger = RelationshipLedger::new();

        let mut saved = HashMap::new();
        let mut by_character = HashMap::new();
        by_character.insert(
            "mara".to_string(),
            RelationshipLog {
                history: vec![HistoryEntry {
                    from: "stranger".to_string(),
                    to: "friend".to_string(),
                    description: "Shared an umbrella".to_string(),
                    tone: RuleTone::Sweet,
                    timestamp: Utc::now(),
                }],
                current_status: "friend".to_string(),
            },
        );
        saved.insert("rainfall".to_string(), by_character);

        ledger.restore(saved);
        ledger.seed_story(&story);

        assert_eq!(ledger.intimacy("rainfall", "mara").unwrap().status, "friend");
        let view = ledger.view(&story, "mara").unwrap();
        assert_eq!(view.current, "friend");
        assert_eq!(view.history.len(), 1);
    }

    #[test]
    fn view_falls_back_to_baseline() {
        let story = test_story();
        let ledger = RelationshipLedger::new();

        let view = ledger.view(&story, "mara").unwrap();
        assert_eq!(view.current, "stranger");
        assert!(view.history.is_empty());

        assert!(ledger.view(&story, "nobody").is_none());
    }
}
