//! Headless driver for the Lifesim agent engine.
//!
//! Loads configuration, seeds a population, runs the tick loop, and
//! optionally writes a JSON report of the final state.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `LIFESIM_CONFIG` or `lifesim-config.yaml`
//! 2. Initialize structured logging (tracing), honouring `RUST_LOG` first
//!    and `logging.level` otherwise
//! 3. Build the action catalog and spawn the starting population
//! 4. Run the simulation loop
//! 5. Write the report, if `output.report_path` is set

mod config;
mod error;
mod simulation;
mod spawner;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::SimulationConfig;
use crate::simulation::{Simulation, write_report};

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, spawning, or report output fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. The log filter depends on it.
    let config = SimulationConfig::load()?;

    // 2. Initialize structured logging.
    let level = config.logging.level.clone();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(true)
        .init();

    info!(
        world_name = %config.world.name,
        seed = ?config.world.seed,
        ticks = config.run.ticks,
        dt_hours = config.run.dt_hours,
        "lifesim-engine starting"
    );

    // 3. Build the population.
    let report_path = config.output.report_path.clone();
    let mut simulation = Simulation::new(config)?;
    info!(population = simulation.manager().len(), "population spawned");

    // 4. Run.
    let report = simulation.run();
    info!(
        ticks = simulation.tick(),
        agents = report.stats.count,
        avg_wellbeing = report.stats.avg_wellbeing.unwrap_or(0.0),
        "simulation finished"
    );

    // 5. Report.
    if let Some(path) = report_path {
        write_report(&report, &path)?;
        info!(path = %path.display(), "report written");
    }

    Ok(())
}
