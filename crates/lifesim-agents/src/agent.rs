//! The agent: identity plus its needs, action queue, relationships, and
//! skills.
//!
//! [`Agent::update`] is the per-tick entry point. It applies time-based
//! decay to every subsystem, advances the action queue, and wires the
//! subsystems together:
//!
//! - a completed action's effect bundle flows into needs (fulfillment),
//!   skills (experience), and, when the action targets another agent,
//!   relationships (friendship and romance);
//! - a need crossing into its critical band queues the policy's critical
//!   action at the front of the queue, unless an action is already
//!   executing.
//!
//! Reactions are applied after the subsystem call that produced the
//! triggering event has returned.

use std::fmt;
use std::sync::Arc;

use lifesim_types::{AgentId, AgentSnapshot, AgentStatus, EffectBundle, Metadata, SkillType};
use tracing::debug;

use crate::actions::{Action, ActionCatalog, ActionOverrides, ActionQueue};
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::events::NeedsEvent;
use crate::needs::NeedsSystem;
use crate::policy::{AutonomyPolicy, Severity};
use crate::relationships::RelationshipSystem;
use crate::skills::SkillSystem;

/// Weight of need satisfaction in overall wellbeing.
const NEEDS_WEIGHT: f64 = 0.7;

/// Weight of skill mastery in overall wellbeing.
const SKILLS_WEIGHT: f64 = 0.3;

/// Average skill level counted as full mastery for wellbeing.
const SKILL_MASTERY_LEVEL: f64 = 5.0;

/// A simulated character.
#[derive(Debug)]
pub struct Agent {
    id: AgentId,
    name: String,
    /// Caller-defined data carried through snapshots.
    pub metadata: Metadata,
    needs: NeedsSystem,
    actions: ActionQueue,
    relationships: RelationshipSystem,
    skills: SkillSystem,
    policy: AutonomyPolicy,
    total_time: f64,
}

impl Agent {
    /// Create an agent with fresh subsystems.
    pub fn new(id: AgentId, name: &str, catalog: Arc<ActionCatalog>, config: &AgentConfig) -> Self {
        Self {
            id,
            name: String::from(name),
            metadata: Metadata::new(),
            needs: NeedsSystem::new(&config.needs),
            actions: ActionQueue::new(catalog, config.queue),
            relationships: RelationshipSystem::new(config.relationships),
            skills: SkillSystem::new(&config.skills),
            policy: config.policy.clone(),
            total_time: 0.0,
        }
    }

    /// Create an agent with the stock catalog and tuning.
    pub fn with_defaults(id: AgentId, name: &str) -> Self {
        Self::new(
            id,
            name,
            Arc::new(ActionCatalog::standard()),
            &AgentConfig::default(),
        )
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Identifier.
    pub const fn id(&self) -> &AgentId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Hours simulated so far.
    pub const fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Needs.
    pub const fn needs(&self) -> &NeedsSystem {
        &self.needs
    }

    /// Needs, mutably (to subscribe or set values).
    pub const fn needs_mut(&mut self) -> &mut NeedsSystem {
        &mut self.needs
    }

    /// Action queue.
    pub const fn actions(&self) -> &ActionQueue {
        &self.actions
    }

    /// Action queue, mutably.
    pub const fn actions_mut(&mut self) -> &mut ActionQueue {
        &mut self.actions
    }

    /// Relationships.
    pub const fn relationships(&self) -> &RelationshipSystem {
        &self.relationships
    }

    /// Relationships, mutably.
    pub const fn relationships_mut(&mut self) -> &mut RelationshipSystem {
        &mut self.relationships
    }

    /// Skills.
    pub const fn skills(&self) -> &SkillSystem {
        &self.skills
    }

    /// Skills, mutably.
    pub const fn skills_mut(&mut self) -> &mut SkillSystem {
        &mut self.skills
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance the agent by `dt` hours.
    ///
    /// Returns the effect bundle of an action that completed during this
    /// step. Negative `dt` is treated as zero.
    pub fn update(&mut self, dt: f64) -> Option<EffectBundle> {
        let dt = dt.max(0.0);
        self.total_time += dt;

        let crossings = self.needs.update(dt);
        self.react_to_needs(&crossings);
        self.relationships.update(dt);
        self.skills.update(dt);

        let completed = self.actions.step(dt)?;
        self.apply_effects(&completed);
        Some(completed.effects)
    }

    fn react_to_needs(&mut self, events: &[NeedsEvent]) {
        for event in events {
            let NeedsEvent::CriticalCrossed(need) = event else {
                continue;
            };
            if self.actions.is_busy() {
                continue;
            }
            let Some(name) = self.policy.action_for(need.need_type, Severity::Critical) else {
                continue;
            };
            let queued = self.actions.add_action_by_name(name, ActionOverrides::front());
            debug!(
                agent_id = %self.id,
                need = %need.need_type,
                action = name,
                queued,
                "critical need reaction"
            );
        }
    }

    fn apply_effects(&mut self, action: &Action) {
        let effects = &action.effects;
        for (need, delta) in &effects.need_effects {
            self.needs.fulfill(*need, *delta);
        }
        for (skill, xp) in &effects.skill_effects {
            if self.skills.add_experience_by_name(skill, *xp).is_none() {
                debug!(agent_id = %self.id, skill = %skill, "skipping unknown skill effect");
            }
        }
        if let Some(target) = &action.target_agent_id
            && !effects.relationship_effects.is_empty()
        {
            let delta = |kind: &str| effects.relationship_effects.get(kind).copied().unwrap_or(0.0);
            self.relationships
                .adjust(target, delta("friendship"), delta("romance"));
        }
    }

    // -----------------------------------------------------------------------
    // Autonomy
    // -----------------------------------------------------------------------

    /// The action this agent would choose for itself right now.
    ///
    /// The first critical need (in enumeration order) takes its critical
    /// action. Otherwise, if any need is in warning, the lowest need takes
    /// its warning action.
    pub fn autonomous_action(&self) -> Option<&str> {
        if let Some(need) = self.needs.critical_needs().first() {
            return self.policy.action_for(*need, Severity::Critical);
        }
        if self.needs.warning_needs().is_empty() {
            return None;
        }
        let lowest = self.needs.lowest_need()?;
        self.policy.action_for(lowest, Severity::Warning)
    }

    /// Queue the recommended autonomous action. Returns whether one was
    /// queued.
    pub fn auto_act(&mut self) -> bool {
        let Some(name) = self.autonomous_action().map(String::from) else {
            return false;
        };
        self.queue_action(&name, ActionOverrides::default())
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Queue a catalog action by name.
    pub fn queue_action(&mut self, name: &str, overrides: ActionOverrides) -> bool {
        self.actions.add_action_by_name(name, overrides)
    }

    /// Queue an action that is not in the catalog.
    pub fn queue_custom_action(&mut self, action: &Action, at_front: bool) -> bool {
        self.actions.add_action(action, at_front)
    }

    /// Record an interaction on both this agent and `other`.
    pub fn interact_with(&mut self, other: &mut Self, interaction: &str) {
        self.relationships.interact(&other.id, interaction, None);
        other.relationships.interact(&self.id, interaction, None);
    }

    /// Practice a skill, returning the XP granted.
    pub fn practice_skill(&mut self, skill: SkillType, hours: f64, base_xp_per_hour: f64) -> f64 {
        self.skills.practice(skill, hours, base_xp_per_hour)
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    /// Whether an action is executing.
    pub const fn is_busy(&self) -> bool {
        self.actions.is_busy()
    }

    /// Name of the executing action.
    pub fn current_action_name(&self) -> Option<&str> {
        self.actions.current_action().map(|action| action.name.as_str())
    }

    /// Composite score in `[0, 1]` blending need satisfaction and skill
    /// mastery.
    pub fn overall_wellbeing(&self) -> f64 {
        let mastery = (self.skills.average_level() / SKILL_MASTERY_LEVEL).min(1.0);
        NEEDS_WEIGHT.mul_add(self.needs.satisfaction(), SKILLS_WEIGHT * mastery)
    }

    /// Compact summary for display.
    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            id: self.id.clone(),
            name: self.name.clone(),
            wellbeing: (self.overall_wellbeing() * 100.0).round() / 100.0,
            current_action: self.current_action_name().map(String::from),
            queued_actions: u32::try_from(self.actions.queue_length()).unwrap_or(u32::MAX),
            critical_needs: self.needs.critical_needs(),
            warning_needs: self.needs.warning_needs(),
            friend_count: u32::try_from(self.relationships.friends().len()).unwrap_or(u32::MAX),
            total_skill_points: self.skills.total_skill_points(),
            total_time: self.total_time,
        }
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    /// Serialize the agent.
    pub fn to_snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            needs: self.needs.to_snapshot(),
            skills: self.skills.to_snapshot(),
            relationships: self.relationships.to_snapshot(),
            current_action: self.current_action_name().map(String::from),
            action_queue: self.actions.queue_preview(),
            total_time: self.total_time,
            metadata: self.metadata.clone(),
        }
    }

    /// Load needs, skills, relationships, elapsed time, and metadata from a
    /// snapshot. Identity and the action queue are left untouched.
    pub fn restore(&mut self, snapshot: &AgentSnapshot) {
        self.needs.restore(&snapshot.needs);
        self.skills.restore(&snapshot.skills);
        self.relationships.restore(&snapshot.relationships);
        self.total_time = snapshot.total_time.max(0.0);
        self.metadata.clone_from(&snapshot.metadata);
    }

    /// Build a fresh agent from a snapshot.
    pub fn from_snapshot(
        snapshot: &AgentSnapshot,
        catalog: Arc<ActionCatalog>,
        config: &AgentConfig,
    ) -> Self {
        let mut agent = Self::new(snapshot.id.clone(), &snapshot.name, catalog, config);
        agent.restore(snapshot);
        agent
    }

    /// Serialize the agent to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Snapshot`] if metadata cannot be encoded.
    pub fn to_json(&self) -> Result<String, AgentError> {
        Ok(serde_json::to_string(&self.to_snapshot())?)
    }

    /// Build a fresh agent from JSON produced by [`Agent::to_json`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Snapshot`] if the input is not a valid snapshot.
    pub fn from_json(
        json: &str,
        catalog: Arc<ActionCatalog>,
        config: &AgentConfig,
    ) -> Result<Self, AgentError> {
        let snapshot: AgentSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(&snapshot, catalog, config))
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Agent(id={}, name={})", self.id, self.name)
    }
}
