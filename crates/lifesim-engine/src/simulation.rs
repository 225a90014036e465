//! The tick loop.
//!
//! A [`Simulation`] owns the population and a random source. Each tick it
//! lets idle agents choose autonomous actions, advances every agent,
//! occasionally has two random agents interact, and periodically logs
//! population statistics. [`Simulation::report`] captures the final state
//! for the JSON report.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lifesim_agents::{AgentManager, IdGenerator, SequentialIdGenerator, UuidIdGenerator};
use lifesim_types::{AgentId, AgentSnapshot, PopulationStats};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::error::EngineError;
use crate::spawner;

/// Interactions chosen for random encounters.
const ENCOUNTERS: &[&str] = &[
    "greet",
    "chat",
    "deep_conversation",
    "joke",
    "compliment",
    "help",
    "work_together",
    "play_together",
    "argue",
    "insult",
];

/// Prefix for sequential agent ids in seeded runs.
const SEEDED_ID_PREFIX: &str = "agent-";

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Actions queued by autonomy.
    pub queued: usize,
    /// Actions that finished.
    pub completed: usize,
    /// The random encounter, if one happened.
    pub encounter: Option<(AgentId, AgentId, &'static str)>,
}

/// Final state written to `output.report_path`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// `world.name`.
    pub world_name: String,
    /// Ticks executed.
    pub ticks: u64,
    /// Simulated hours per tick.
    pub dt_hours: f64,
    /// Population statistics at the end of the run.
    pub stats: PopulationStats,
    /// Every agent, in id order.
    pub agents: Vec<AgentSnapshot>,
}

/// A configured, populated simulation.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    manager: AgentManager,
    rng: StdRng,
    tick: u64,
}

impl Simulation {
    /// Build the catalog and population described by `config`.
    ///
    /// A configured seed makes the run reproducible: the random source is
    /// seeded and ids are sequential. Otherwise ids are UUIDs and the
    /// random source is seeded from the OS.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if `config` fails validation, or an
    /// error from [`spawner::spawn_population`].
    pub fn new(config: SimulationConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let catalog = Arc::new(config.catalog());
        if let Err(err) = config.agents.policy.validate(&catalog) {
            warn!(error = %err, "autonomy policy names an action missing from the catalog");
        }

        let (ids, mut rng): (Box<dyn IdGenerator>, StdRng) = match config.world.seed {
            Some(seed) => (
                Box::new(SequentialIdGenerator::new(SEEDED_ID_PREFIX)),
                StdRng::seed_from_u64(seed),
            ),
            None => (Box::new(UuidIdGenerator), StdRng::from_os_rng()),
        };

        let mut manager = AgentManager::new(catalog, config.agents.clone(), ids);
        let spawned = spawner::spawn_population(&mut manager, &config.population, &mut rng)?;
        info!(
            world_name = %config.world.name,
            agents = spawned.len(),
            catalog_size = manager.catalog().len(),
            "simulation ready"
        );

        Ok(Self {
            config,
            manager,
            rng,
            tick: 0,
        })
    }

    /// The population.
    pub const fn manager(&self) -> &AgentManager {
        &self.manager
    }

    /// Ticks executed so far.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Execute one tick.
    pub fn step(&mut self) -> TickSummary {
        let run = &self.config.run;
        let queued = if run.auto_act {
            self.manager.auto_act_all()
        } else {
            0
        };
        let completed = self.manager.update_all(run.dt_hours);
        let encounter = self.random_encounter();
        self.tick = self.tick.saturating_add(1);

        debug!(tick = self.tick, queued, completed, "tick complete");
        if self
            .tick
            .checked_rem(self.config.run.report_every)
            .is_some_and(|rem| rem == 0)
        {
            self.log_stats();
        }

        TickSummary {
            queued,
            completed,
            encounter,
        }
    }

    /// Execute every configured tick and return the final report.
    pub fn run(&mut self) -> SimulationReport {
        let mut completed = 0_usize;
        let mut encounters = 0_usize;
        for _ in 0..self.config.run.ticks {
            let summary = self.step();
            completed = completed.saturating_add(summary.completed);
            if summary.encounter.is_some() {
                encounters = encounters.saturating_add(1);
            }
        }
        info!(ticks = self.tick, completed, encounters, "run totals");
        self.report()
    }

    /// Capture the current state.
    pub fn report(&self) -> SimulationReport {
        SimulationReport {
            generated_at: Utc::now(),
            world_name: self.config.world.name.clone(),
            ticks: self.tick,
            dt_hours: self.config.run.dt_hours,
            stats: self.manager.population_stats(),
            agents: self.manager.snapshots(),
        }
    }

    fn random_encounter(&mut self) -> Option<(AgentId, AgentId, &'static str)> {
        let population = self.manager.len();
        if population < 2 || !self.rng.random_bool(self.config.run.interaction_chance) {
            return None;
        }

        let first = self.rng.random_range(0..population);
        let offset = self.rng.random_range(1..population);
        let second = first.saturating_add(offset).checked_rem(population)?;
        let kind = *ENCOUNTERS.get(self.rng.random_range(0..ENCOUNTERS.len()))?;

        let first_id = self.manager.ids().nth(first)?.clone();
        let second_id = self.manager.ids().nth(second)?.clone();

        if !self.manager.interact(&first_id, &second_id, kind) {
            return None;
        }
        debug!(first = %first_id, second = %second_id, interaction = kind, "random encounter");
        Some((first_id, second_id, kind))
    }

    fn log_stats(&self) {
        let stats = self.manager.population_stats();
        info!(
            tick = self.tick,
            hours = self.hours_elapsed(),
            count = stats.count,
            avg_wellbeing = stats.avg_wellbeing.unwrap_or(0.0),
            min_wellbeing = stats.min_wellbeing.unwrap_or(0.0),
            max_wellbeing = stats.max_wellbeing.unwrap_or(0.0),
            busy = stats.busy_count.unwrap_or(0),
            idle = stats.idle_count.unwrap_or(0),
            "population stats"
        );
    }

    fn hours_elapsed(&self) -> f64 {
        let ticks = u32::try_from(self.tick).unwrap_or(u32::MAX);
        f64::from(ticks) * self.config.run.dt_hours
    }
}

/// Write `report` as pretty-printed JSON, creating parent directories.
///
/// # Errors
///
/// Returns [`EngineError::ReportJson`] if encoding fails and
/// [`EngineError::ReportIo`] if the file cannot be written.
pub fn write_report(report: &SimulationReport, path: &Path) -> Result<(), EngineError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
