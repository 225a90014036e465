//! Agent spawner for seeding the simulation with its starting population.
//!
//! Configured agents are created first, in file order, with their fixed
//! names, ids, and metadata. The rest of the population up to
//! `initial_count` gets unused names from a built-in pool. Every agent
//! starts with each need at a random value in the upper half of its range,
//! and configured family pairs are linked on both sides.

use std::collections::{BTreeMap, BTreeSet};

use lifesim_agents::{Agent, AgentManager};
use lifesim_types::{AgentId, NeedType};
use rand::Rng;
use tracing::info;

use crate::config::PopulationConfig;
use crate::error::EngineError;

// -----------------------------------------------------------------------
// Name pool
// -----------------------------------------------------------------------

/// Built-in pool of agent names. The spawner picks randomly without
/// replacement from this list to ensure uniqueness.
const NAME_POOL: &[&str] = &[
    "Alex", "Bella", "Casey", "Dana", "Eli", "Fiona", "Gus", "Hana",
    "Ivan", "Jade", "Kai", "Luna", "Milo", "Nora", "Owen", "Pia",
    "Quinn", "Rosa", "Sam", "Tess", "Uma", "Vic", "Wade", "Xena",
    "Yara", "Zane", "Abby", "Ben", "Cleo", "Dev", "Emma", "Finn",
];

// -----------------------------------------------------------------------
// Spawning
// -----------------------------------------------------------------------

/// Create the starting population in `manager`.
///
/// Returns the ids of the spawned agents in spawn order.
///
/// # Errors
///
/// Returns [`EngineError::Agent`] if a configured id is already taken, and
/// [`EngineError::Spawner`] if a family pair names an agent that was not
/// configured.
pub fn spawn_population<R: Rng>(
    manager: &mut AgentManager,
    population: &PopulationConfig,
    rng: &mut R,
) -> Result<Vec<AgentId>, EngineError> {
    let mut spawned = Vec::new();
    let mut names_in_use: BTreeSet<String> = manager.iter().map(|a| String::from(a.name())).collect();

    for seed in &population.agents {
        let agent = match &seed.id {
            Some(id) => manager.create_agent_with_id(AgentId::from(id.as_str()), &seed.name)?,
            None => manager.create_agent(&seed.name)?,
        };
        agent.metadata.clone_from(&seed.metadata);
        randomize_needs(agent, rng);
        names_in_use.insert(seed.name.clone());
        spawned.push(agent.id().clone());
    }

    let target = usize::try_from(population.initial_count).unwrap_or(usize::MAX);
    while spawned.len() < target {
        let name = pick_unused_name(rng, &names_in_use);
        let agent = manager.create_agent(&name)?;
        randomize_needs(agent, rng);
        info!(agent_id = %agent.id(), name = %name, "spawned pool agent");
        names_in_use.insert(name);
        spawned.push(agent.id().clone());
    }

    link_families(manager, population)?;
    Ok(spawned)
}

/// Set every need to a random value in the upper half of its range.
fn randomize_needs<R: Rng>(agent: &mut Agent, rng: &mut R) {
    for need_type in NeedType::ALL {
        let Some(need) = agent.needs().get(*need_type) else {
            continue;
        };
        let (min, max) = (need.config.min_value, need.config.max_value);
        let midpoint = min + (max - min) / 2.0;
        let value = rng.random_range(midpoint..=max);
        agent.needs_mut().set_value(*need_type, value);
    }
}

/// Pick a random unused name from the name pool, falling back to a numbered
/// name once the pool is exhausted.
fn pick_unused_name<R: Rng>(rng: &mut R, names_in_use: &BTreeSet<String>) -> String {
    let available: Vec<&str> = NAME_POOL
        .iter()
        .filter(|&&n| !names_in_use.contains(n))
        .copied()
        .collect();

    if available.is_empty() {
        let mut suffix = names_in_use.len();
        loop {
            let candidate = format!("Agent-{suffix}");
            if !names_in_use.contains(&candidate) {
                return candidate;
            }
            suffix = suffix.saturating_add(1);
        }
    }

    let idx = rng.random_range(0..available.len());
    available
        .get(idx)
        .map_or_else(|| String::from("Agent"), |s| String::from(*s))
}

/// Link configured family pairs on both sides, resolving names to the first
/// agent carrying each name.
fn link_families(manager: &mut AgentManager, population: &PopulationConfig) -> Result<(), EngineError> {
    if population.family_pairs.is_empty() {
        return Ok(());
    }

    let mut by_name: BTreeMap<String, AgentId> = BTreeMap::new();
    for agent in manager.iter() {
        by_name
            .entry(String::from(agent.name()))
            .or_insert_with(|| agent.id().clone());
    }
    let resolve = |name: &str| {
        by_name.get(name).cloned().ok_or_else(|| EngineError::Spawner {
            message: format!("family pair names unknown agent {name}"),
        })
    };

    for pair in &population.family_pairs {
        let first = resolve(&pair.first)?;
        let second = resolve(&pair.second)?;
        for (owner, partner) in [(&first, &second), (&second, &first)] {
            if let Some(agent) = manager.get_mut(owner) {
                agent.relationships_mut().set_family(partner, &pair.relation);
            }
        }
        info!(first = %pair.first, second = %pair.second, relation = %pair.relation, "linked family");
    }
    Ok(())
}
