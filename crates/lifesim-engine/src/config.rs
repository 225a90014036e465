//! Configuration loading and typed config structures for the Lifesim engine.
//!
//! The canonical configuration lives in `lifesim-config.yaml` at the project
//! root; the `LIFESIM_CONFIG` environment variable points the engine at a
//! different file. This module defines strongly-typed structs that mirror
//! the YAML structure, and provides a loader that reads and validates the
//! file. Every section is optional and a missing file means all defaults.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use lifesim_agents::{ActionCatalog, ActionTemplate, AgentConfig, AgentError};
use lifesim_types::Metadata;
use serde::Deserialize;

/// Environment variable that overrides the configuration file path.
pub const CONFIG_ENV_VAR: &str = "LIFESIM_CONFIG";

/// Configuration file used when [`CONFIG_ENV_VAR`] is unset.
pub const DEFAULT_CONFIG_FILE: &str = "lifesim-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// Agent tuning failed validation.
    #[error("invalid agent tuning: {source}")]
    Agents {
        /// The underlying validation error.
        #[from]
        source: AgentError,
    },

    /// A run or population setting is out of range.
    #[error("invalid config: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `lifesim-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World name and random seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Tick loop parameters.
    #[serde(default)]
    pub run: RunConfig,

    /// Starting population.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Need, skill, relationship, queue, and policy tuning.
    #[serde(default)]
    pub agents: AgentConfig,

    /// Extra action templates added to the standard catalog. A template
    /// with a standard name replaces it.
    #[serde(default)]
    pub actions: Vec<ActionTemplate>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Report output.
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Load configuration from the file named by `LIFESIM_CONFIG`, or from
    /// `lifesim-config.yaml` in the working directory.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// See [`SimulationConfig::from_file`].
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path(std::env::var_os(CONFIG_ENV_VAR));
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    /// Load and validate configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or a
    /// validation error from [`SimulationConfig::validate`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or a
    /// validation error from [`SimulationConfig::validate`].
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges across all sections.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Agents`] for invalid agent tuning and
    /// [`ConfigError::Invalid`] for run or population settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.agents.validate()?;

        let run = &self.run;
        if !run.dt_hours.is_finite() || run.dt_hours <= 0.0 {
            return Err(invalid(format!("run.dt_hours must be positive, got {}", run.dt_hours)));
        }
        if run.report_every == 0 {
            return Err(invalid("run.report_every must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&run.interaction_chance) {
            return Err(invalid(format!(
                "run.interaction_chance must be within [0, 1], got {}",
                run.interaction_chance
            )));
        }

        for pair in &self.population.family_pairs {
            if pair.first == pair.second {
                return Err(invalid(format!(
                    "family pair links {} to itself",
                    pair.first
                )));
            }
        }
        Ok(())
    }

    /// The standard catalog extended with the configured templates.
    pub fn catalog(&self) -> ActionCatalog {
        self.actions
            .iter()
            .cloned()
            .fold(ActionCatalog::standard(), ActionCatalog::with_template)
    }
}

fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

/// Resolve the configuration path from the value of `LIFESIM_CONFIG`.
pub fn config_path(env_value: Option<OsString>) -> PathBuf {
    env_value
        .filter(|value| !value.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from)
}

// -----------------------------------------------------------------------
// Sections
// -----------------------------------------------------------------------

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed. When set, spawning and interactions are reproducible
    /// and agent ids are sequential.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: None,
        }
    }
}

/// Tick loop parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunConfig {
    /// Number of ticks to run.
    #[serde(default = "default_ticks")]
    pub ticks: u64,

    /// Simulated hours per tick.
    #[serde(default = "default_dt_hours")]
    pub dt_hours: f64,

    /// Whether idle agents pick autonomous actions each tick.
    #[serde(default = "default_true")]
    pub auto_act: bool,

    /// Log population statistics every this many ticks.
    #[serde(default = "default_report_every")]
    pub report_every: u64,

    /// Probability per tick that two random agents interact.
    #[serde(default = "default_interaction_chance")]
    pub interaction_chance: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: default_ticks(),
            dt_hours: default_dt_hours(),
            auto_act: true,
            report_every: default_report_every(),
            interaction_chance: default_interaction_chance(),
        }
    }
}

/// Starting population.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopulationConfig {
    /// Total agents at start. Named agents count toward it; the remainder
    /// get names from the built-in pool.
    #[serde(default = "default_initial_count")]
    pub initial_count: u32,

    /// Agents spawned first, with fixed names.
    #[serde(default)]
    pub agents: Vec<AgentSeed>,

    /// Family links between named agents.
    #[serde(default)]
    pub family_pairs: Vec<FamilyPair>,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_count: default_initial_count(),
            agents: Vec::new(),
            family_pairs: Vec::new(),
        }
    }
}

/// A named starting agent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgentSeed {
    /// Display name.
    pub name: String,

    /// Fixed identifier; generated when absent.
    #[serde(default)]
    pub id: Option<String>,

    /// Metadata copied onto the agent.
    #[serde(default)]
    pub metadata: Metadata,
}

/// A family link between two named agents, applied on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FamilyPair {
    /// Name of the first agent.
    pub first: String,

    /// Name of the second agent.
    pub second: String,

    /// Relation label, for example `sibling`.
    #[serde(default = "default_relation")]
    pub relation: String,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Report output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Where to write the JSON report; no report when absent.
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Defaults
// -----------------------------------------------------------------------

fn default_world_name() -> String {
    String::from("Lifesim")
}

const fn default_ticks() -> u64 {
    96
}

const fn default_dt_hours() -> f64 {
    0.25
}

const fn default_true() -> bool {
    true
}

const fn default_report_every() -> u64 {
    4
}

const fn default_interaction_chance() -> f64 {
    0.1
}

const fn default_initial_count() -> u32 {
    4
}

fn default_relation() -> String {
    String::from("family")
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
mod tests {
    use lifesim_types::NeedType;

    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.world.name, "Lifesim");
        assert!(config.world.seed.is_none());
        assert_eq!(config.run.ticks, 96);
        assert!((config.run.dt_hours - 0.25).abs() < EPSILON);
        assert_eq!(config.population.initial_count, 4);
        assert_eq!(config.logging.level, "info");
        assert!(config.output.report_path.is_none());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Maple Street"
  seed: 7

run:
  ticks: 48
  dt_hours: 0.5
  auto_act: false
  report_every: 12
  interaction_chance: 0.25

population:
  initial_count: 3
  agents:
    - name: Ada
      id: ada
      metadata:
        trait: curious
    - name: Ben
  family_pairs:
    - first: Ada
      second: Ben
      relation: sibling

agents:
  needs:
    hunger:
      decay_rate: 12.0
  queue:
    max_queue_size: 4

actions:
  - name: garden
    category: autonomous
    duration: 1.5
    effects:
      need_effects:
        fun: 10.0
      skill_effects:
        gardening: 4.0
    priority: 4

logging:
  level: debug

output:
  report_path: out/report.json
"#;
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let Ok(config) = config else { return };

        assert_eq!(config.world.name, "Maple Street");
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.run.ticks, 48);
        assert!(!config.run.auto_act);
        assert_eq!(config.population.agents.len(), 2);
        assert_eq!(
            config.population.agents.first().and_then(|a| a.id.as_deref()),
            Some("ada")
        );
        assert_eq!(
            config.population.family_pairs.first().map(|p| p.relation.as_str()),
            Some("sibling")
        );
        assert!((config.agents.needs.get(NeedType::Hunger).decay_rate - 12.0).abs() < EPSILON);
        assert!((config.agents.needs.get(NeedType::Energy).decay_rate - 6.0).abs() < EPSILON);
        assert_eq!(config.agents.queue.max_queue_size, 4);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.output.report_path, Some(PathBuf::from("out/report.json")));

        let catalog = config.catalog();
        assert_eq!(catalog.len(), 11);
        assert!(catalog.get("garden").is_some_and(|t| t.interruptible));
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 3\n");
        assert!(config.is_ok());
        let Ok(config) = config else { return };
        assert_eq!(config.world.seed, Some(3));
        assert_eq!(config.run, RunConfig::default());
        assert_eq!(config.catalog().len(), 10);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SimulationConfig::parse("").is_ok_and(|c| c == SimulationConfig::default()));
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        let result = SimulationConfig::parse("run: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn invalid_agent_tuning_is_rejected() {
        let yaml = "agents:\n  needs:\n    fun:\n      critical_threshold: 50.0\n";
        let result = SimulationConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Agents { .. })));
    }

    #[test]
    fn invalid_run_settings_are_rejected() {
        for yaml in [
            "run:\n  dt_hours: 0.0\n",
            "run:\n  report_every: 0\n",
            "run:\n  interaction_chance: 1.5\n",
            "population:\n  family_pairs:\n    - first: Ada\n      second: Ada\n",
        ] {
            let result = SimulationConfig::parse(yaml);
            assert!(matches!(result, Err(ConfigError::Invalid { .. })), "{yaml}");
        }
    }

    #[test]
    fn config_path_prefers_environment() {
        assert_eq!(config_path(None), PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(config_path(Some(OsString::new())), PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(
            config_path(Some(OsString::from("/etc/lifesim.yaml"))),
            PathBuf::from("/etc/lifesim.yaml")
        );
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(DEFAULT_CONFIG_FILE);
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
