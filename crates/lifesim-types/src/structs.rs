//! Value structs shared between the agent core and its drivers.
//!
//! Snapshot structs use camelCase keys and tolerate missing or unknown
//! fields on input: a snapshot written by an older build, or hand-edited,
//! still loads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{NeedType, RelationshipType};
use crate::ids::AgentId;

/// Free-form key/value metadata attached to agents and actions.
pub type Metadata = BTreeMap<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Effect bundle
// ---------------------------------------------------------------------------

/// The deltas an action applies when it completes.
///
/// Skill and relationship effects are keyed by name so a template can name
/// a skill or effect kind the receiving agent does not track; such entries
/// are skipped when the bundle is applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct EffectBundle {
    /// Need deltas, applied through need fulfillment.
    pub need_effects: BTreeMap<NeedType, f64>,
    /// Experience granted per skill name.
    pub skill_effects: BTreeMap<String, f64>,
    /// Relationship deltas keyed by effect kind (`friendship`, `romance`).
    pub relationship_effects: BTreeMap<String, f64>,
}

impl EffectBundle {
    /// Create an empty bundle.
    pub const fn new() -> Self {
        Self {
            need_effects: BTreeMap::new(),
            skill_effects: BTreeMap::new(),
            relationship_effects: BTreeMap::new(),
        }
    }

    /// Add a need delta.
    #[must_use]
    pub fn with_need(mut self, need: NeedType, delta: f64) -> Self {
        self.need_effects.insert(need, delta);
        self
    }

    /// Add a skill experience grant.
    #[must_use]
    pub fn with_skill(mut self, skill: &str, xp: f64) -> Self {
        self.skill_effects.insert(String::from(skill), xp);
        self
    }

    /// Add a relationship delta.
    #[must_use]
    pub fn with_relationship(mut self, kind: &str, delta: f64) -> Self {
        self.relationship_effects.insert(String::from(kind), delta);
        self
    }

    /// Whether the bundle carries no effects at all.
    pub fn is_empty(&self) -> bool {
        self.need_effects.is_empty()
            && self.skill_effects.is_empty()
            && self.relationship_effects.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Serialized state of a single skill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct SkillRecord {
    /// Current level.
    pub level: u32,
    /// Experience toward the next level.
    pub experience: f64,
    /// Hours spent practicing.
    pub total_practice_time: f64,
}

/// Serialized state of a relationship with one partner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(default, rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RelationshipRecord {
    /// Friendship in `[-100, 100]`.
    pub friendship: f64,
    /// Romance in `[0, 100]`.
    pub romance: f64,
    /// Whether the partner is family.
    pub is_family: bool,
    /// Family relation label (`sibling`, `parent`).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub family_relation: Option<String>,
    /// Simulation time of the first meeting, in hours.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub first_met: Option<f64>,
}

/// Full serialized agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AgentSnapshot {
    /// Agent identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Need values keyed by need name.
    #[serde(default)]
    pub needs: BTreeMap<String, f64>,
    /// Skill state keyed by skill name.
    #[serde(default)]
    pub skills: BTreeMap<String, SkillRecord>,
    /// Relationships keyed by partner id.
    #[serde(default)]
    pub relationships: BTreeMap<AgentId, RelationshipRecord>,
    /// Name of the executing action, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub current_action: Option<String>,
    /// Human-readable queue preview (executing action first).
    #[serde(default)]
    pub action_queue: Vec<String>,
    /// Total simulated hours this agent has lived.
    #[serde(default)]
    pub total_time: f64,
    /// Opaque caller metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Compact, display-oriented summary of an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AgentStatus {
    /// Agent identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Overall wellbeing rounded to two decimals.
    pub wellbeing: f64,
    /// Name of the executing action, if any.
    pub current_action: Option<String>,
    /// Number of pending actions.
    pub queued_actions: u32,
    /// Needs at or below their critical threshold.
    pub critical_needs: Vec<NeedType>,
    /// Needs at or below their warning threshold.
    pub warning_needs: Vec<NeedType>,
    /// Number of partners at friend level or above.
    pub friend_count: u32,
    /// Sum of all skill levels.
    pub total_skill_points: u32,
    /// Total simulated hours.
    pub total_time: f64,
}

/// Aggregate statistics over an agent population.
///
/// An empty population reports only `count`; every other field is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PopulationStats {
    /// Number of registered agents.
    pub count: u32,
    /// Mean wellbeing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub avg_wellbeing: Option<f64>,
    /// Lowest wellbeing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub min_wellbeing: Option<f64>,
    /// Highest wellbeing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub max_wellbeing: Option<f64>,
    /// Agents executing an action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub busy_count: Option<u32>,
    /// Agents with an empty executing slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub idle_count: Option<u32>,
}

/// Number of relationships per classification.
pub type RelationshipSummary = BTreeMap<RelationshipType, u32>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_record_omits_absent_fields() {
        let record = RelationshipRecord {
            friendship: 12.5,
            ..RelationshipRecord::default()
        };
        let json = serde_json::to_value(&record).ok();
        assert!(json.is_some());
        if let Some(json) = json {
            assert!(json.get("familyRelation").is_none());
            assert!(json.get("firstMet").is_none());
            assert_eq!(json.get("isFamily"), Some(&serde_json::Value::Bool(false)));
        }
    }

    #[test]
    fn snapshot_ignores_unknown_keys() {
        let raw = r#"{
            "id": "a1",
            "name": "Alice",
            "needs": {"hunger": 50.0, "thirst": 10.0},
            "favoriteColor": "green"
        }"#;
        let snapshot: Result<AgentSnapshot, _> = serde_json::from_str(raw);
        assert!(snapshot.is_ok());
        if let Ok(s) = snapshot {
            assert_eq!(s.needs.len(), 2);
            assert!(s.skills.is_empty());
            assert!(s.current_action.is_none());
        }
    }

    #[test]
    fn empty_population_stats_serialize_count_only() {
        let stats = PopulationStats::default();
        let json = serde_json::to_string(&stats).ok();
        assert_eq!(json.as_deref(), Some(r#"{"count":0}"#));
    }

    #[test]
    fn effect_bundle_builder() {
        let bundle = EffectBundle::new()
            .with_need(NeedType::Hunger, 40.0)
            .with_skill("cooking", 2.0)
            .with_relationship("friendship", 5.0);
        assert!(!bundle.is_empty());
        assert_eq!(bundle.need_effects.len(), 1);
        assert!(EffectBundle::new().is_empty());
    }
}
