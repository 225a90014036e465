//! Population management.
//!
//! The [`AgentManager`] owns every agent, keyed by [`AgentId`], and drives
//! them as a population: batch updates, batch autonomy, pairwise
//! interactions, and aggregate statistics. Iteration is in identifier
//! order.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::Arc;

use lifesim_types::{AgentId, AgentSnapshot, PopulationStats};
use tracing::info;

use crate::actions::ActionCatalog;
use crate::agent::Agent;
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::ids::{IdGenerator, UuidIdGenerator};

/// Owns and drives a population of agents.
pub struct AgentManager {
    agents: BTreeMap<AgentId, Agent>,
    catalog: Arc<ActionCatalog>,
    config: AgentConfig,
    ids: Box<dyn IdGenerator>,
}

impl AgentManager {
    /// Create an empty manager.
    ///
    /// New agents share `catalog`, are built from `config`, and draw their
    /// identifiers from `ids`.
    pub fn new(catalog: Arc<ActionCatalog>, config: AgentConfig, ids: Box<dyn IdGenerator>) -> Self {
        Self {
            agents: BTreeMap::new(),
            catalog,
            config,
            ids,
        }
    }

    /// The catalog shared by every agent.
    pub fn catalog(&self) -> &Arc<ActionCatalog> {
        &self.catalog
    }

    /// The tuning new agents are built from.
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Create an agent with a generated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateAgentId`] if the generator yields an
    /// identifier that is already registered.
    pub fn create_agent(&mut self, name: &str) -> Result<&mut Agent, AgentError> {
        let id = self.ids.next_id();
        self.create_agent_with_id(id, name)
    }

    /// Create an agent with a caller-chosen identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateAgentId`] if `id` is already registered.
    pub fn create_agent_with_id(&mut self, id: AgentId, name: &str) -> Result<&mut Agent, AgentError> {
        let agent = Agent::new(id, name, Arc::clone(&self.catalog), &self.config);
        self.insert(agent)
    }

    /// Register an existing agent, for example one rebuilt from a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::DuplicateAgentId`] if the agent's identifier is
    /// already registered.
    pub fn insert(&mut self, agent: Agent) -> Result<&mut Agent, AgentError> {
        match self.agents.entry(agent.id().clone()) {
            Entry::Occupied(entry) => Err(AgentError::DuplicateAgentId(entry.key().clone())),
            Entry::Vacant(entry) => {
                info!(agent_id = %agent.id(), name = agent.name(), "agent created");
                Ok(entry.insert(agent))
            }
        }
    }

    /// Remove an agent, returning it if it was registered.
    pub fn remove(&mut self, id: &AgentId) -> Option<Agent> {
        let removed = self.agents.remove(id);
        if let Some(agent) = &removed {
            info!(agent_id = %id, name = agent.name(), "agent removed");
        }
        removed
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Look up an agent.
    pub fn get(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Look up an agent mutably.
    pub fn get_mut(&mut self, id: &AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agents in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Identifiers in order.
    pub fn ids(&self) -> impl Iterator<Item = &AgentId> {
        self.agents.keys()
    }

    /// Display name of `agent_id`'s relationship partner `partner_id`, if
    /// both the relationship and the partner exist.
    pub fn partner_name(&self, agent_id: &AgentId, partner_id: &AgentId) -> Option<&str> {
        self.agents
            .get(agent_id)?
            .relationships()
            .get(partner_id)?;
        self.agents.get(partner_id).map(Agent::name)
    }

    // -----------------------------------------------------------------------
    // Batch operations
    // -----------------------------------------------------------------------

    /// Advance every agent by `dt` hours. Returns how many actions completed.
    pub fn update_all(&mut self, dt: f64) -> usize {
        self.agents
            .values_mut()
            .filter_map(|agent| agent.update(dt))
            .count()
    }

    /// Let every idle agent choose an autonomous action. Returns how many
    /// actions were queued.
    pub fn auto_act_all(&mut self) -> usize {
        self.agents
            .values_mut()
            .filter(|agent| !agent.is_busy())
            .map(Agent::auto_act)
            .filter(|queued| *queued)
            .count()
    }

    /// Record an interaction between two distinct registered agents.
    ///
    /// Returns false if either is missing or both identifiers are equal.
    pub fn interact(&mut self, first: &AgentId, second: &AgentId, interaction: &str) -> bool {
        if first == second {
            return false;
        }
        let Some(mut initiator) = self.agents.remove(first) else {
            return false;
        };
        let applied = match self.agents.get_mut(second) {
            Some(partner) => {
                initiator.interact_with(partner, interaction);
                true
            }
            None => false,
        };
        self.agents.insert(first.clone(), initiator);
        applied
    }

    // -----------------------------------------------------------------------
    // Statistics
    // -----------------------------------------------------------------------

    /// Aggregate wellbeing and activity figures.
    ///
    /// An empty population reports only `count = 0`.
    pub fn population_stats(&self) -> PopulationStats {
        if self.agents.is_empty() {
            return PopulationStats::default();
        }
        let count = self.agents.len();
        let wellbeing: Vec<f64> = self.agents.values().map(Agent::overall_wellbeing).collect();
        let total: f64 = wellbeing.iter().sum();
        let busy = self.agents.values().filter(|agent| agent.is_busy()).count();
        let to_u32 = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);

        PopulationStats {
            count: to_u32(count),
            avg_wellbeing: Some(total / f64::from(to_u32(count))),
            min_wellbeing: wellbeing.iter().copied().reduce(f64::min),
            max_wellbeing: wellbeing.iter().copied().reduce(f64::max),
            busy_count: Some(to_u32(busy)),
            idle_count: Some(to_u32(count.saturating_sub(busy))),
        }
    }

    /// Agents sorted by wellbeing. Ties keep identifier order.
    pub fn agents_by_wellbeing(&self, ascending: bool) -> Vec<&Agent> {
        let mut agents: Vec<(&Agent, f64)> = self
            .agents
            .values()
            .map(|agent| (agent, agent.overall_wellbeing()))
            .collect();
        if ascending {
            agents.sort_by(|a, b| a.1.total_cmp(&b.1));
        } else {
            agents.sort_by(|a, b| b.1.total_cmp(&a.1));
        }
        agents.into_iter().map(|(agent, _)| agent).collect()
    }

    /// Snapshot every agent, in identifier order.
    pub fn snapshots(&self) -> Vec<AgentSnapshot> {
        self.agents.values().map(Agent::to_snapshot).collect()
    }
}

impl Default for AgentManager {
    fn default() -> Self {
        Self::new(
            Arc::new(ActionCatalog::standard()),
            AgentConfig::default(),
            Box::new(UuidIdGenerator),
        )
    }
}

impl std::fmt::Debug for AgentManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentManager")
            .field("agents", &self.agents.len())
            .field("catalog", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use lifesim_types::{NeedType, RelationshipType};

    use super::*;
    use crate::ids::SequentialIdGenerator;

    fn manager() -> AgentManager {
        AgentManager::new(
            Arc::new(ActionCatalog::standard()),
            AgentConfig::default(),
            Box::new(SequentialIdGenerator::new("agent-")),
        )
    }

    fn spawn(manager: &mut AgentManager, name: &str) -> AgentId {
        manager
            .create_agent(name)
            .map(|agent| agent.id().clone())
            .unwrap_or_else(|_| AgentId::from("missing"))
    }

    #[test]
    fn create_uses_generator() {
        let mut m = manager();
        let first = spawn(&mut m, "Alice");
        let second = spawn(&mut m, "Bob");
        assert_eq!(first.as_str(), "agent-1");
        assert_eq!(second.as_str(), "agent-2");
        assert_eq!(m.len(), 2);
        assert_eq!(m.get(&first).map(Agent::name), Some("Alice"));
    }

    #[test]
    fn duplicate_id_rejected() {
        let mut m = manager();
        assert!(m.create_agent_with_id(AgentId::from("agent-1"), "Taken").is_ok());
        let result = m.create_agent("Alice").map(|agent| agent.id().clone());
        assert!(matches!(result, Err(AgentError::DuplicateAgentId(id)) if id.as_str() == "agent-1"));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn remove_returns_agent() {
        let mut m = manager();
        let id = spawn(&mut m, "Alice");
        assert!(m.remove(&id).is_some_and(|agent| agent.name() == "Alice"));
        assert!(m.remove(&id).is_none());
        assert!(m.is_empty());
    }

    #[test]
    fn update_all_counts_completions() {
        let mut m = manager();
        let a = spawn(&mut m, "Alice");
        spawn(&mut m, "Bob");
        if let Some(agent) = m.get_mut(&a) {
            agent.queue_action("use_bathroom", crate::actions::ActionOverrides::default());
        }
        assert_eq!(m.update_all(0.5), 1);
        assert!(m.iter().all(|agent| agent.total_time() > 0.0));
    }

    #[test]
    fn auto_act_all_skips_busy_and_content_agents() {
        let mut m = manager();
        let hungry = spawn(&mut m, "Hungry");
        let busy = spawn(&mut m, "Busy");
        spawn(&mut m, "Content");
        for id in [&hungry, &busy] {
            if let Some(agent) = m.get_mut(id) {
                agent.needs_mut().set_value(NeedType::Hunger, 30.0);
            }
        }
        if let Some(agent) = m.get_mut(&busy) {
            agent.queue_action("sleep", crate::actions::ActionOverrides::default());
            agent.update(0.1);
        }
        assert_eq!(m.auto_act_all(), 1);
        assert_eq!(m.get(&hungry).map(|a| a.actions().queue_length()), Some(1));
    }

    #[test]
    fn interact_requires_two_distinct_agents() {
        let mut m = manager();
        let a = spawn(&mut m, "Alice");
        let b = spawn(&mut m, "Bob");
        assert!(!m.interact(&a, &a, "chat"));
        assert!(!m.interact(&a, &AgentId::from("ghost"), "chat"));
        assert!(m.get(&a).is_some());
        assert!(m.interact(&a, &b, "chat"));
        assert!(m.get(&b).is_some_and(|agent| agent.relationships().get(&a).is_some()));
        assert_eq!(m.partner_name(&a, &b), Some("Bob"));
        assert_eq!(m.partner_name(&b, &AgentId::from("ghost")), None);
    }

    #[test]
    fn removed_partner_leaves_unresolved_relationship() {
        let mut m = manager();
        let alice = spawn(&mut m, "Alice");
        let bob = spawn(&mut m, "Bob");
        assert!(m.interact(&alice, &bob, "gift"));
        assert_eq!(m.partner_name(&alice, &bob), Some("Bob"));

        assert!(m.remove(&bob).is_some());
        assert_eq!(m.partner_name(&alice, &bob), None);
        assert!(!m.interact(&alice, &bob, "chat"));

        m.update_all(1.0);
        let stats = m.population_stats();
        assert_eq!(stats.count, 1);
        assert!(stats.avg_wellbeing.is_some());

        let survivor = m.get(&alice);
        assert!(survivor.is_some_and(|a| a.relationships().get(&bob).is_some()));
        let summary = survivor.map(|a| a.relationships().summary());
        // Friendship 10 decays below the acquaintance threshold.
        assert_eq!(
            summary.as_ref().and_then(|s| s.get(&RelationshipType::Stranger)).copied(),
            Some(1)
        );
        assert_eq!(survivor.map(|a| a.status().friend_count), Some(0));
    }

    #[test]
    fn stats_for_empty_population() {
        let stats = manager().population_stats();
        assert_eq!(stats.count, 0);
        assert!(stats.avg_wellbeing.is_none());
        assert!(stats.busy_count.is_none());
    }

    #[test]
    fn stats_and_ranking() {
        let mut m = manager();
        let low = spawn(&mut m, "Low");
        let high = spawn(&mut m, "High");
        if let Some(agent) = m.get_mut(&low) {
            for need in NeedType::ALL {
                agent.needs_mut().set_value(*need, 50.0);
            }
            agent.queue_action("sleep", crate::actions::ActionOverrides::default());
            agent.update(0.0);
        }
        let stats = m.population_stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.busy_count, Some(1));
        assert_eq!(stats.idle_count, Some(1));
        assert!(stats.min_wellbeing.is_some_and(|w| (w - 0.35).abs() < 1e-9));
        assert!(stats.max_wellbeing.is_some_and(|w| (w - 0.7).abs() < 1e-9));

        let ascending: Vec<&AgentId> = m.agents_by_wellbeing(true).into_iter().map(Agent::id).collect();
        assert_eq!(ascending, vec![&low, &high]);
        let descending: Vec<&AgentId> = m.agents_by_wellbeing(false).into_iter().map(Agent::id).collect();
        assert_eq!(descending, vec![&high, &low]);
    }

    #[test]
    fn ranking_ties_keep_id_order() {
        let mut m = manager();
        let ids: Vec<AgentId> = ["A", "B", "C"].iter().map(|n| spawn(&mut m, n)).collect();
        let ranked: Vec<AgentId> = m
            .agents_by_wellbeing(false)
            .into_iter()
            .map(|agent| agent.id().clone())
            .collect();
        assert_eq!(ranked, ids);
    }

    #[test]
    fn snapshots_in_id_order() {
        let mut m = manager();
        spawn(&mut m, "Alice");
        spawn(&mut m, "Bob");
        let names: Vec<String> = m.snapshots().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }
}
