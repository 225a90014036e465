//! Pairwise relationships between an agent and the partners it has met.
//!
//! Each agent keeps its own ledger keyed by partner [`AgentId`]. A
//! relationship holds two scores:
//!
//! - friendship in `[-100, 100]`
//! - romance in `[0, 100]`
//!
//! plus a family flag. Scores are clamped on every update and drift back
//! toward zero over time. The [`RelationshipType`] shown to players is
//! derived from these values on demand and never stored.
//!
//! Partners are referenced by id only. A partner that has left the
//! simulation still appears here under its old id.

use std::collections::{BTreeMap, VecDeque};

use lifesim_types::{AgentId, Metadata, RelationshipRecord, RelationshipSummary, RelationshipType};
use tracing::debug;

use crate::config::RelationshipConfig;
use crate::events::{EventHub, Observer, RelationshipEvent, RelationshipEventKind};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum friendship score.
pub const FRIENDSHIP_MIN: f64 = -100.0;

/// Maximum friendship score.
pub const FRIENDSHIP_MAX: f64 = 100.0;

/// Minimum romance score.
pub const ROMANCE_MIN: f64 = 0.0;

/// Maximum romance score.
pub const ROMANCE_MAX: f64 = 100.0;

/// Friendship at or below which a partner is an enemy.
pub const ENEMY_THRESHOLD: f64 = -50.0;

/// Friendship at or below which a partner is a rival.
pub const RIVAL_THRESHOLD: f64 = -20.0;

/// Friendship at or above which a partner is an acquaintance.
pub const ACQUAINTANCE_THRESHOLD: f64 = 10.0;

/// Friendship at or above which a partner is a friend.
pub const FRIEND_THRESHOLD: f64 = 30.0;

/// Friendship at or above which a partner is a good friend.
pub const GOOD_FRIEND_THRESHOLD: f64 = 60.0;

/// Friendship at or above which a partner is a best friend.
pub const BEST_FRIEND_THRESHOLD: f64 = 85.0;

/// Romance at or above which a partner is a romantic interest.
pub const ROMANTIC_THRESHOLD: f64 = 30.0;

/// Romance at or above which a partner is a partner.
pub const PARTNER_THRESHOLD: f64 = 60.0;

/// Romance at or above which a partner is a spouse.
pub const SPOUSE_THRESHOLD: f64 = 90.0;

/// Friendship floor applied when a partner is designated family.
pub const FAMILY_FRIENDSHIP_FLOOR: f64 = 50.0;

/// Friendship and romance deltas of a named interaction.
///
/// Returns `None` for interaction types without a table entry.
pub fn interaction_effect(interaction: &str) -> Option<InteractionEffect> {
    let (friendship, romance) = match interaction {
        "greet" => (2.0, 0.0),
        "chat" => (5.0, 0.0),
        "deep_conversation" => (10.0, 2.0),
        "joke" => (3.0, 1.0),
        "compliment" => (5.0, 3.0),
        "flirt" => (2.0, 8.0),
        "hug" => (8.0, 5.0),
        "kiss" => (5.0, 15.0),
        "gift" => (10.0, 5.0),
        "help" => (8.0, 2.0),
        "argue" => (-15.0, -5.0),
        "insult" => (-20.0, -10.0),
        "betray" => (-50.0, -30.0),
        "apologize" => (10.0, 3.0),
        "work_together" => (7.0, 0.0),
        "play_together" => (8.0, 2.0),
        _ => return None,
    };
    Some(InteractionEffect {
        friendship,
        romance,
    })
}

// ---------------------------------------------------------------------------
// Interaction records
// ---------------------------------------------------------------------------

/// Friendship and romance deltas applied by an interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionEffect {
    /// Friendship delta.
    pub friendship: f64,
    /// Romance delta.
    pub romance: f64,
}

/// One remembered interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionRecord {
    /// Interaction type (`chat`, `gift`).
    pub interaction_type: String,
    /// Relationship-system time of the interaction, in hours.
    pub timestamp: f64,
    /// Friendship delta requested.
    pub friendship_change: f64,
    /// Romance delta requested.
    pub romance_change: f64,
    /// Caller-defined data.
    pub metadata: Metadata,
}

// ---------------------------------------------------------------------------
// Relationship
// ---------------------------------------------------------------------------

/// This agent's relationship with one partner.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    /// The partner's id.
    pub partner_id: AgentId,
    friendship: f64,
    romance: f64,
    is_family: bool,
    family_relation: Option<String>,
    history: VecDeque<InteractionRecord>,
    first_met: f64,
}

impl Relationship {
    /// Create a neutral relationship first met at `first_met` hours.
    pub const fn new(partner_id: AgentId, first_met: f64) -> Self {
        Self {
            partner_id,
            friendship: 0.0,
            romance: 0.0,
            is_family: false,
            family_relation: None,
            history: VecDeque::new(),
            first_met,
        }
    }

    /// Friendship score.
    pub const fn friendship(&self) -> f64 {
        self.friendship
    }

    /// Romance score.
    pub const fn romance(&self) -> f64 {
        self.romance
    }

    /// Whether the partner is family.
    pub const fn is_family(&self) -> bool {
        self.is_family
    }

    /// Family relation label.
    pub fn family_relation(&self) -> Option<&str> {
        self.family_relation.as_deref()
    }

    /// When the pair first met, in relationship-system hours.
    pub const fn first_met(&self) -> f64 {
        self.first_met
    }

    /// Remembered interactions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &InteractionRecord> {
        self.history.iter()
    }

    /// Derived classification.
    ///
    /// Family wins, then romance tiers, then friendship tiers, then
    /// hostility tiers.
    pub fn relationship_type(&self) -> RelationshipType {
        if self.is_family {
            RelationshipType::Family
        } else if self.romance >= SPOUSE_THRESHOLD {
            RelationshipType::Spouse
        } else if self.romance >= PARTNER_THRESHOLD {
            RelationshipType::Partner
        } else if self.romance >= ROMANTIC_THRESHOLD {
            RelationshipType::RomanticInterest
        } else if self.friendship >= BEST_FRIEND_THRESHOLD {
            RelationshipType::BestFriend
        } else if self.friendship >= GOOD_FRIEND_THRESHOLD {
            RelationshipType::GoodFriend
        } else if self.friendship >= FRIEND_THRESHOLD {
            RelationshipType::Friend
        } else if self.friendship >= ACQUAINTANCE_THRESHOLD {
            RelationshipType::Acquaintance
        } else if self.friendship <= ENEMY_THRESHOLD {
            RelationshipType::Enemy
        } else if self.friendship <= RIVAL_THRESHOLD {
            RelationshipType::Rival
        } else {
            RelationshipType::Stranger
        }
    }

    /// Whether either score is above zero.
    pub fn is_positive(&self) -> bool {
        self.friendship > 0.0 || self.romance > 0.0
    }

    /// Whether friendship is below zero.
    pub fn is_negative(&self) -> bool {
        self.friendship < 0.0
    }

    /// Shift friendship by `delta`, clamped to `[-100, 100]`.
    pub fn modify_friendship(&mut self, delta: f64) {
        if delta.is_finite() {
            self.friendship = (self.friendship + delta).clamp(FRIENDSHIP_MIN, FRIENDSHIP_MAX);
        }
    }

    /// Shift romance by `delta`, clamped to `[0, 100]`.
    pub fn modify_romance(&mut self, delta: f64) {
        if delta.is_finite() {
            self.romance = (self.romance + delta).clamp(ROMANCE_MIN, ROMANCE_MAX);
        }
    }

    /// Remember an interaction, dropping the oldest beyond `limit`.
    pub fn record_interaction(&mut self, record: InteractionRecord, limit: usize) {
        self.history.push_back(record);
        while self.history.len() > limit {
            self.history.pop_front();
        }
    }

    /// Move both scores toward zero without crossing it.
    pub fn decay(&mut self, dt: f64, friendship_rate: f64, romance_rate: f64) {
        let dt = dt.max(0.0);
        let friendship_step = friendship_rate * dt;
        if self.friendship > 0.0 {
            self.friendship = (self.friendship - friendship_step).max(0.0);
        } else if self.friendship < 0.0 {
            self.friendship = (self.friendship + friendship_step).min(0.0);
        }
        if self.romance > 0.0 {
            self.romance = (self.romance - romance_rate * dt).max(0.0);
        }
    }

    /// Serialized form (history is not serialized).
    pub fn to_record(&self) -> RelationshipRecord {
        RelationshipRecord {
            friendship: self.friendship,
            romance: self.romance,
            is_family: self.is_family,
            family_relation: self.family_relation.clone(),
            first_met: Some(self.first_met),
        }
    }

    fn restore(&mut self, record: &RelationshipRecord) {
        self.friendship = 0.0;
        self.romance = 0.0;
        self.modify_friendship(record.friendship);
        self.modify_romance(record.romance);
        self.is_family = record.is_family;
        self.family_relation.clone_from(&record.family_relation);
        if let Some(first_met) = record.first_met {
            self.first_met = first_met;
        }
    }
}

// ---------------------------------------------------------------------------
// RelationshipSystem
// ---------------------------------------------------------------------------

/// One agent's relationships, keyed by partner id.
#[derive(Debug)]
pub struct RelationshipSystem {
    relationships: BTreeMap<AgentId, Relationship>,
    config: RelationshipConfig,
    current_time: f64,
    events: EventHub<RelationshipEvent>,
}

impl RelationshipSystem {
    /// Create an empty ledger.
    pub const fn new(config: RelationshipConfig) -> Self {
        Self {
            relationships: BTreeMap::new(),
            config,
            current_time: 0.0,
            events: EventHub::new(),
        }
    }

    /// Register an observer for one event kind.
    pub fn subscribe(&mut self, kind: RelationshipEventKind, observer: Observer<RelationshipEvent>) {
        self.events.subscribe(kind, observer);
    }

    /// Hours elapsed on this ledger's clock.
    pub const fn current_time(&self) -> f64 {
        self.current_time
    }

    /// The relationship with `partner_id`, created neutral on first access.
    pub fn get_or_create(&mut self, partner_id: &AgentId) -> &mut Relationship {
        if !self.relationships.contains_key(partner_id) {
            debug!(partner_id = %partner_id, "new relationship");
            self.relationships.insert(
                partner_id.clone(),
                Relationship::new(partner_id.clone(), self.current_time),
            );
            self.events.emit(&RelationshipEvent::NewRelationship {
                partner_id: partner_id.clone(),
            });
        }
        let now = self.current_time;
        self.relationships
            .entry(partner_id.clone())
            .or_insert_with(|| Relationship::new(partner_id.clone(), now))
    }

    /// Record an interaction and apply its effect.
    ///
    /// `custom` replaces the table lookup; interaction types with no table
    /// entry apply no change but are still recorded. Returns the resulting
    /// classification.
    pub fn interact(
        &mut self,
        partner_id: &AgentId,
        interaction: &str,
        custom: Option<InteractionEffect>,
    ) -> RelationshipType {
        let effect = custom
            .or_else(|| interaction_effect(interaction))
            .unwrap_or_default();
        let timestamp = self.current_time;
        let limit = self.config.history_limit;

        let (old, new) = {
            let rel = self.get_or_create(partner_id);
            let old = rel.relationship_type();
            rel.record_interaction(
                InteractionRecord {
                    interaction_type: String::from(interaction),
                    timestamp,
                    friendship_change: effect.friendship,
                    romance_change: effect.romance,
                    metadata: Metadata::new(),
                },
                limit,
            );
            rel.modify_friendship(effect.friendship);
            rel.modify_romance(effect.romance);
            (old, rel.relationship_type())
        };

        self.events.emit(&RelationshipEvent::Changed {
            partner_id: partner_id.clone(),
            interaction: String::from(interaction),
            friendship_change: effect.friendship,
            romance_change: effect.romance,
        });
        self.emit_type_change(partner_id, old, new);
        new
    }

    /// Shift scores without recording an interaction.
    ///
    /// Used for action side effects. Fires a type change if the
    /// classification moves.
    pub fn adjust(&mut self, partner_id: &AgentId, friendship: f64, romance: f64) {
        let (old, new) = {
            let rel = self.get_or_create(partner_id);
            let old = rel.relationship_type();
            rel.modify_friendship(friendship);
            rel.modify_romance(romance);
            (old, rel.relationship_type())
        };
        self.emit_type_change(partner_id, old, new);
    }

    /// Mark `partner_id` as family with the given relation label.
    ///
    /// Friendship is raised to at least 50.
    pub fn set_family(&mut self, partner_id: &AgentId, relation: &str) {
        let (old, new) = {
            let rel = self.get_or_create(partner_id);
            let old = rel.relationship_type();
            rel.is_family = true;
            rel.family_relation = Some(String::from(relation));
            rel.friendship = rel.friendship.max(FAMILY_FRIENDSHIP_FLOOR);
            (old, rel.relationship_type())
        };
        self.emit_type_change(partner_id, old, new);
    }

    /// Advance the clock by `dt` hours and decay every relationship.
    pub fn update(&mut self, dt: f64) {
        let dt = dt.max(0.0);
        self.current_time += dt;

        let mut transitions = Vec::new();
        for rel in self.relationships.values_mut() {
            let old = rel.relationship_type();
            rel.decay(dt, self.config.friendship_decay, self.config.romance_decay);
            let new = rel.relationship_type();
            if old != new {
                transitions.push((rel.partner_id.clone(), old, new));
            }
        }
        for (partner_id, old, new) in transitions {
            self.emit_type_change(&partner_id, old, new);
        }
    }

    fn emit_type_change(&mut self, partner_id: &AgentId, old: RelationshipType, new: RelationshipType) {
        if old == new {
            return;
        }
        debug!(partner_id = %partner_id, %old, %new, "relationship type changed");
        self.events.emit(&RelationshipEvent::TypeChanged {
            partner_id: partner_id.clone(),
            old,
            new,
        });
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The relationship with `partner_id`, if one exists.
    pub fn get(&self, partner_id: &AgentId) -> Option<&Relationship> {
        self.relationships.get(partner_id)
    }

    /// All relationships in partner-id order.
    pub fn all(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    /// Number of known partners.
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    /// Whether no partner is known.
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    fn partners_where(&self, predicate: impl Fn(&Relationship) -> bool) -> Vec<&AgentId> {
        self.relationships
            .values()
            .filter(|rel| predicate(rel))
            .map(|rel| &rel.partner_id)
            .collect()
    }

    /// Partners with friendship of at least 30.
    pub fn friends(&self) -> Vec<&AgentId> {
        self.partners_where(|rel| rel.friendship >= FRIEND_THRESHOLD)
    }

    /// Partners with friendship of -50 or lower.
    pub fn enemies(&self) -> Vec<&AgentId> {
        self.partners_where(|rel| rel.friendship <= ENEMY_THRESHOLD)
    }

    /// Partners with romance of at least 30.
    pub fn romantic_interests(&self) -> Vec<&AgentId> {
        self.partners_where(|rel| rel.romance >= ROMANTIC_THRESHOLD)
    }

    /// Partners designated as family.
    pub fn family(&self) -> Vec<&AgentId> {
        self.partners_where(|rel| rel.is_family)
    }

    /// Number of relationships per classification, every type present.
    pub fn summary(&self) -> RelationshipSummary {
        let mut summary: RelationshipSummary = RelationshipType::ALL
            .iter()
            .map(|kind| (*kind, 0))
            .collect();
        for rel in self.relationships.values() {
            let count = summary.entry(rel.relationship_type()).or_insert(0);
            *count = count.saturating_add(1);
        }
        summary
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Relationship records keyed by partner id.
    pub fn to_snapshot(&self) -> BTreeMap<AgentId, RelationshipRecord> {
        self.relationships
            .iter()
            .map(|(partner_id, rel)| (partner_id.clone(), rel.to_record()))
            .collect()
    }

    /// Load relationship records, creating partners as needed.
    pub fn restore(&mut self, snapshot: &BTreeMap<AgentId, RelationshipRecord>) {
        for (partner_id, record) in snapshot {
            self.get_or_create(partner_id).restore(record);
        }
    }
}

impl Default for RelationshipSystem {
    fn default() -> Self {
        Self::new(RelationshipConfig::default())
    }
}
