//! Characters, intimacy profiles, and upgrade rules.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default speaker marker identifying the protagonist in dialogue parts.
///
/// The protagonist is never listed in a story's cast; this marker is what
/// the validator and the session treat as "the reader's own voice".
pub const PROTAGONIST_SPEAKER: &str = "You";

/// One member of a story's cast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// Character identifier, unique within the story.
    pub id: String,
    /// Display name, unique within the story; dialogue parts reference it.
    pub name: String,
    /// Avatar image reference, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Authored intimacy baseline and upgrade rules.
    pub intimacy: IntimacyProfile,
    /// Authored relationship baseline.
    #[serde(default)]
    pub relationships: RelationshipSeed,
}

impl Character {
    /// Create a character with the given baseline standing.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        let status = status.into();
        Self {
            id: id.into(),
            name: name.into(),
            avatar: None,
            intimacy: IntimacyProfile {
                current_status: status.clone(),
                value: 0,
                upgrade_path: Vec::new(),
            },
            relationships: RelationshipSeed {
                current: status,
                history: Vec::new(),
            },
        }
    }

    /// Set the avatar reference.
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Append an upgrade rule.
    pub fn with_rule(mut self, rule: UpgradeRule) -> Self {
        self.intimacy.upgrade_path.push(rule);
        self
    }
}

/// Authored intimacy state: the baseline standing plus the ordered list
/// of choice-triggered upgrade rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntimacyProfile {
    /// The standing the character starts at.
    pub current_status: String,
    /// Numeric intimacy value the character starts at.
    #[serde(default)]
    pub value: i32,
    /// Ordered upgrade rules; for any one choice, the first matching rule
    /// wins.
    #[serde(default)]
    pub upgrade_path: Vec<UpgradeRule>,
}

/// A choice-triggered standing change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeRule {
    /// What triggers this rule.
    pub condition: RuleCondition,
    /// The standing the character moves to.
    pub status: String,
    /// New intimacy value; omitted means "keep the previous value".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i32>,
    /// Authored description of the change, shown in notifications and
    /// recorded into the relationship history.
    pub description: String,
    /// Emotional tone of the change, selecting the notification styling.
    #[serde(rename = "type", default)]
    pub tone: RuleTone,
}

impl UpgradeRule {
    /// Create a rule triggered by the given choice id.
    pub fn on_choice(
        choice_id: impl Into<String>,
        status: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            condition: RuleCondition {
                kind: ConditionKind::Choice,
                id: choice_id.into(),
            },
            status: status.into(),
            value: None,
            description: description.into(),
            tone: RuleTone::Neutral,
        }
    }

    /// Set the intimacy value this rule assigns.
    pub fn with_value(mut self, value: i32) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the emotional tone.
    pub fn with_tone(mut self, tone: RuleTone) -> Self {
        self.tone = tone;
        self
    }
}

/// The trigger of an upgrade rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleCondition {
    /// The trigger kind. Only [`ConditionKind::Choice`] is matched by the
    /// relationship engine today.
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    /// The id the trigger matches against (a choice id for
    /// [`ConditionKind::Choice`]).
    pub id: String,
}

/// The kind of an upgrade-rule trigger.
///
/// Unknown kinds deserialize as [`ConditionKind::Other`] so that content
/// written for a newer runtime still loads; such rules simply never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionKind {
    /// Triggered when the reader picks a specific choice.
    Choice,
    /// A trigger kind this runtime does not evaluate.
    Other(String),
}

impl From<String> for ConditionKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "choice" => Self::Choice,
            _ => Self::Other(s),
        }
    }
}

impl From<ConditionKind> for String {
    fn from(kind: ConditionKind) -> Self {
        match kind {
            ConditionKind::Choice => "choice".to_string(),
            ConditionKind::Other(s) => s,
        }
    }
}

/// Emotional tone of a standing change.
///
/// Anything other than `sweet` or `sad` in authored content is treated as
/// neutral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleTone {
    /// An affectionate upgrade.
    Sweet,
    /// A mournful downgrade or loss.
    Sad,
    /// Everything else.
    #[default]
    Neutral,
}

impl From<String> for RuleTone {
    fn from(s: String) -> Self {
        match s.as_str() {
            "sweet" => Self::Sweet,
            "sad" => Self::Sad,
            _ => Self::Neutral,
        }
    }
}

impl From<RuleTone> for String {
    fn from(tone: RuleTone) -> Self {
        match tone {
            RuleTone::Sweet => "sweet".to_string(),
            RuleTone::Sad => "sad".to_string(),
            RuleTone::Neutral => "neutral".to_string(),
        }
    }
}

impl fmt::Display for RuleTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sweet => write!(f, "sweet"),
            Self::Sad => write!(f, "sad"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

/// Authored relationship baseline.
///
/// `history` is normally empty in shipped content; the runtime keeps the
/// evolving history in its own ledger and only merges it for display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipSeed {
    /// The standing the relationship starts at. Should agree with
    /// [`IntimacyProfile::current_status`]; the validator flags mismatches.
    #[serde(default)]
    pub current: String,
    /// Pre-authored history entries, if any.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// One recorded standing transition, most recent first in history lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The standing before the transition.
    pub from: String,
    /// The standing after the transition.
    pub to: String,
    /// Authored description of what changed.
    pub description: String,
    /// Emotional tone of the transition.
    #[serde(rename = "type", default)]
    pub tone: RuleTone,
    /// When the transition happened.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_builder() {
        let rule = UpgradeRule::on_choice("ch1", "friend", "Shared an umbrella")
            .with_value(10)
            .with_tone(RuleTone::Sweet);
        assert_eq!(rule.condition.kind, ConditionKind::Choice);
        assert_eq!(rule.condition.id, "ch1");
        assert_eq!(rule.status, "friend");
        assert_eq!(rule.value, Some(10));
        assert_eq!(rule.tone, RuleTone::Sweet);
    }

    #[test]
    fn character_baseline_is_consistent() {
        let c = Character::new("mara", "Mara", "stranger");
        assert_eq!(c.intimacy.current_status, "stranger");
        assert_eq!(c.relationships.current, "stranger");
        assert!(c.relationships.history.is_empty());
    }

    #[test]
    fn tone_parses_leniently() {
        let rule: UpgradeRule = serde_json::from_str(
            r#"{"condition": {"type": "choice", "id": "c1"},
                "status": "friend", "description": "d", "type": "bittersweet"}"#,
        )
        .unwrap();
        assert_eq!(rule.tone, RuleTone::Neutral);

        let rule: UpgradeRule = serde_json::from_str(
            r#"{"condition": {"type": "choice", "id": "c1"},
                "status": "friend", "description": "d", "type": "sweet"}"#,
        )
        .unwrap();
        assert_eq!(rule.tone, RuleTone::Sweet);
    }

    #[test]
    fn tone_defaults_to_neutral() {
        let rule: UpgradeRule = serde_json::from_str(
            r#"{"condition": {"type": "choice", "id": "c1"},
                "status": "friend", "description": "d"}"#,
        )
        .unwrap();
        assert_eq!(rule.tone, RuleTone::Neutral);
    }

    #[test]
    fn unknown_condition_kind_survives_roundtrip() {
        let cond: RuleCondition =
            serde_json::from_str(r#"{"type": "flag", "id": "met_mara"}"#).unwrap();
        assert_eq!(cond.kind, ConditionKind::Other("flag".to_string()));

        let back = serde_json::to_string(&cond).unwrap();
        assert!(back.contains("\"flag\""));
    }

    #[test]
    fn wire_format_camel_case() {
        let json = r#"{
            "currentStatus": "stranger",
            "value": 5,
            "upgradePath": [{
                "condition": {"type": "choice", "id": "c1"},
                "status": "friend",
                "value": 20,
                "description": "Walked her home",
                "type": "sweet"
            }]
        }"#;
        let profile: IntimacyProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.current_status, "stranger");
        assert_eq!(profile.upgrade_path.len(), 1);
        assert_eq!(profile.upgrade_path[0].value, Some(20));
    }
}
