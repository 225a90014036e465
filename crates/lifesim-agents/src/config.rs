//! Tunable parameters for needs, skills, relationships, and action queues.
//!
//! Every struct here has a `Default` matching the stock life-sim tuning and
//! deserializes with per-field defaults, so a YAML section only needs to
//! name the values it changes. [`AgentConfig`] bundles all of them and is
//! the unit an [`AgentManager`](crate::AgentManager) hands to every agent it
//! creates.

use std::collections::BTreeMap;

use lifesim_types::{NeedType, SkillType};
use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::policy::AutonomyPolicy;

// ---------------------------------------------------------------------------
// Needs
// ---------------------------------------------------------------------------

/// Bounds, thresholds, and decay rate of a single need.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeedConfig {
    /// Points lost per simulated hour.
    pub decay_rate: f64,

    /// Lowest possible value (default: 0).
    #[serde(default = "default_min_value")]
    pub min_value: f64,

    /// Highest possible value; needs start here (default: 100).
    #[serde(default = "default_max_value")]
    pub max_value: f64,

    /// At or below this value the need is critical (default: 20).
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f64,

    /// At or below this value the need is in warning (default: 40).
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: f64,
}

impl NeedConfig {
    /// A config with the given decay rate and default bounds.
    pub const fn with_decay(decay_rate: f64) -> Self {
        Self {
            decay_rate,
            min_value: default_min_value(),
            max_value: default_max_value(),
            critical_threshold: default_critical_threshold(),
            warning_threshold: default_warning_threshold(),
        }
    }

    /// The stock decay rate for a need, in points per hour.
    pub const fn default_decay_rate(need: NeedType) -> f64 {
        match need {
            NeedType::Hunger => 8.0,
            NeedType::Energy => 6.0,
            NeedType::Hygiene => 4.0,
            NeedType::Social => 5.0,
            NeedType::Fun => 7.0,
            NeedType::Bladder => 10.0,
        }
    }

    /// Check bounds and threshold ordering.
    pub fn validate(&self, need: NeedType) -> Result<(), AgentError> {
        let invalid = |reason: &str| AgentError::InvalidNeedConfig {
            need,
            reason: String::from(reason),
        };
        if !(self.min_value < self.max_value) {
            return Err(invalid("min_value must be below max_value"));
        }
        if !(self.critical_threshold < self.warning_threshold) {
            return Err(invalid("critical_threshold must be below warning_threshold"));
        }
        if self.critical_threshold < self.min_value || self.warning_threshold > self.max_value {
            return Err(invalid("thresholds must lie within [min_value, max_value]"));
        }
        if !(self.decay_rate >= 0.0) {
            return Err(invalid("decay_rate must be nonnegative"));
        }
        Ok(())
    }
}

const fn default_min_value() -> f64 {
    0.0
}

const fn default_max_value() -> f64 {
    100.0
}

const fn default_critical_threshold() -> f64 {
    20.0
}

const fn default_warning_threshold() -> f64 {
    40.0
}

/// Per-need configuration, always covering every [`NeedType`].
///
/// Deserializes from a partial map: needs or fields that are not named keep
/// their stock values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<NeedType, NeedConfigPatch>", into = "BTreeMap<NeedType, NeedConfig>")]
pub struct NeedsConfig {
    needs: BTreeMap<NeedType, NeedConfig>,
}

impl NeedsConfig {
    /// The config for one need.
    pub fn get(&self, need: NeedType) -> NeedConfig {
        self.needs
            .get(&need)
            .copied()
            .unwrap_or_else(|| NeedConfig::with_decay(NeedConfig::default_decay_rate(need)))
    }

    /// Replace the config for one need.
    pub fn set(&mut self, need: NeedType, config: NeedConfig) {
        self.needs.insert(need, config);
    }

    /// Iterate over every need and its config in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (NeedType, NeedConfig)> + '_ {
        self.needs.iter().map(|(need, config)| (*need, *config))
    }
}

impl Default for NeedsConfig {
    fn default() -> Self {
        let needs = NeedType::ALL
            .iter()
            .map(|need| (*need, NeedConfig::with_decay(NeedConfig::default_decay_rate(*need))))
            .collect();
        Self { needs }
    }
}

/// Partial [`NeedConfig`] as written in YAML.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
struct NeedConfigPatch {
    decay_rate: Option<f64>,
    min_value: Option<f64>,
    max_value: Option<f64>,
    critical_threshold: Option<f64>,
    warning_threshold: Option<f64>,
}

impl From<BTreeMap<NeedType, NeedConfigPatch>> for NeedsConfig {
    fn from(patches: BTreeMap<NeedType, NeedConfigPatch>) -> Self {
        let mut config = Self::default();
        for (need, patch) in patches {
            let mut entry = config.get(need);
            entry.decay_rate = patch.decay_rate.unwrap_or(entry.decay_rate);
            entry.min_value = patch.min_value.unwrap_or(entry.min_value);
            entry.max_value = patch.max_value.unwrap_or(entry.max_value);
            entry.critical_threshold = patch.critical_threshold.unwrap_or(entry.critical_threshold);
            entry.warning_threshold = patch.warning_threshold.unwrap_or(entry.warning_threshold);
            config.set(need, entry);
        }
        config
    }
}

impl From<NeedsConfig> for BTreeMap<NeedType, NeedConfig> {
    fn from(config: NeedsConfig) -> Self {
        config.needs
    }
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

/// Progression curve of a skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillConfig {
    /// Highest reachable level (default: 10).
    #[serde(default = "default_max_level")]
    pub max_level: u32,

    /// Experience needed to leave level 0 (default: 100).
    #[serde(default = "default_base_xp_per_level")]
    pub base_xp_per_level: f64,

    /// Growth factor of the per-level requirement (default: 1.5).
    #[serde(default = "default_xp_scaling")]
    pub xp_scaling: f64,

    /// Experience lost per simulated hour; levels never drop (default: 0).
    #[serde(default)]
    pub decay_rate: f64,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            max_level: default_max_level(),
            base_xp_per_level: default_base_xp_per_level(),
            xp_scaling: default_xp_scaling(),
            decay_rate: 0.0,
        }
    }
}

impl SkillConfig {
    /// Check that the curve is usable.
    pub fn validate(&self, skill: SkillType) -> Result<(), AgentError> {
        let invalid = |reason: &str| AgentError::InvalidSkillConfig {
            skill,
            reason: String::from(reason),
        };
        if self.max_level == 0 {
            return Err(invalid("max_level must be at least 1"));
        }
        if !(self.base_xp_per_level > 0.0) {
            return Err(invalid("base_xp_per_level must be positive"));
        }
        if !(self.xp_scaling > 0.0) {
            return Err(invalid("xp_scaling must be positive"));
        }
        if !(self.decay_rate >= 0.0) {
            return Err(invalid("decay_rate must be nonnegative"));
        }
        Ok(())
    }
}

const fn default_max_level() -> u32 {
    10
}

const fn default_base_xp_per_level() -> f64 {
    100.0
}

const fn default_xp_scaling() -> f64 {
    1.5
}

/// Skill curves: one shared default plus per-skill overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillsConfig {
    /// Curve used by every skill without an override.
    #[serde(default)]
    pub defaults: SkillConfig,

    /// Per-skill replacements for the default curve.
    #[serde(default)]
    pub overrides: BTreeMap<SkillType, SkillConfig>,
}

impl SkillsConfig {
    /// The curve for one skill.
    pub fn get(&self, skill: SkillType) -> SkillConfig {
        self.overrides.get(&skill).copied().unwrap_or(self.defaults)
    }
}

// ---------------------------------------------------------------------------
// Relationships and queues
// ---------------------------------------------------------------------------

/// Relationship decay and history limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelationshipConfig {
    /// Friendship points drifting toward zero per hour (default: 0.1).
    #[serde(default = "default_friendship_decay")]
    pub friendship_decay: f64,

    /// Romance points drifting toward zero per hour (default: 0.05).
    #[serde(default = "default_romance_decay")]
    pub romance_decay: f64,

    /// Interaction records kept per relationship (default: 100).
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            friendship_decay: default_friendship_decay(),
            romance_decay: default_romance_decay(),
            history_limit: default_history_limit(),
        }
    }
}

const fn default_friendship_decay() -> f64 {
    0.1
}

const fn default_romance_decay() -> f64 {
    0.05
}

const fn default_history_limit() -> usize {
    100
}

/// Action queue capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum pending actions, not counting the executing one (default: 10).
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,

    /// Finished actions retained in history (default: 50).
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_queue_size: default_max_queue_size(),
            max_history: default_max_history(),
        }
    }
}

const fn default_max_queue_size() -> usize {
    10
}

const fn default_max_history() -> usize {
    50
}

// ---------------------------------------------------------------------------
// AgentConfig
// ---------------------------------------------------------------------------

/// Everything an agent needs to be constructed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Need bounds and decay.
    #[serde(default)]
    pub needs: NeedsConfig,

    /// Skill curves.
    #[serde(default)]
    pub skills: SkillsConfig,

    /// Relationship decay.
    #[serde(default)]
    pub relationships: RelationshipConfig,

    /// Action queue limits.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Which action answers which need at each severity.
    #[serde(default)]
    pub policy: AutonomyPolicy,
}

impl AgentConfig {
    /// Check every numeric constraint.
    ///
    /// Template names in the policy are checked separately against a
    /// catalog with [`AutonomyPolicy::validate`].
    pub fn validate(&self) -> Result<(), AgentError> {
        for (need, config) in self.needs.iter() {
            config.validate(need)?;
        }
        for skill in SkillType::ALL {
            self.skills.get(*skill).validate(*skill)?;
        }
        if self.queue.max_queue_size == 0 {
            return Err(AgentError::InvalidLimits {
                reason: String::from("queue.max_queue_size must be at least 1"),
            });
        }
        let rel = &self.relationships;
        if !(rel.friendship_decay >= 0.0 && rel.romance_decay >= 0.0) {
            return Err(AgentError::InvalidLimits {
                reason: String::from("relationship decay rates must be nonnegative"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn default_needs_cover_every_type() {
        let config = NeedsConfig::default();
        assert_eq!(config.iter().count(), NeedType::ALL.len());
        assert!((config.get(NeedType::Bladder).decay_rate - 10.0).abs() < EPSILON);
        assert!((config.get(NeedType::Hygiene).decay_rate - 4.0).abs() < EPSILON);
    }

    #[test]
    fn default_config_validates() {
        assert!(AgentConfig::default().validate().is_ok());
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let mut config = AgentConfig::default();
        let mut hunger = config.needs.get(NeedType::Hunger);
        hunger.critical_threshold = 50.0;
        hunger.warning_threshold = 30.0;
        config.needs.set(NeedType::Hunger, hunger);
        assert!(matches!(
            config.validate(),
            Err(AgentError::InvalidNeedConfig {
                need: NeedType::Hunger,
                ..
            })
        ));
    }

    #[test]
    fn zero_max_level_is_rejected() {
        let mut config = AgentConfig::default();
        config.skills.overrides.insert(
            SkillType::Fitness,
            SkillConfig {
                max_level: 0,
                ..SkillConfig::default()
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_queue_is_rejected() {
        let mut config = AgentConfig::default();
        config.queue.max_queue_size = 0;
        assert!(matches!(
            config.validate(),
            Err(AgentError::InvalidLimits { .. })
        ));
    }

    #[test]
    fn partial_yaml_keeps_stock_values() {
        let yaml = r"
needs:
  hunger:
    decay_rate: 12.0
skills:
  overrides:
    cooking:
      max_level: 5
queue:
  max_queue_size: 3
";
        let parsed: Result<AgentConfig, _> = serde_yml::from_str(yaml);
        assert!(parsed.is_ok());
        if let Ok(config) = parsed {
            let hunger = config.needs.get(NeedType::Hunger);
            assert!((hunger.decay_rate - 12.0).abs() < EPSILON);
            assert!((hunger.warning_threshold - 40.0).abs() < EPSILON);
            assert!((config.needs.get(NeedType::Energy).decay_rate - 6.0).abs() < EPSILON);
            assert_eq!(config.skills.get(SkillType::Cooking).max_level, 5);
            assert_eq!(config.skills.get(SkillType::Logic).max_level, 10);
            assert_eq!(config.queue.max_queue_size, 3);
            assert_eq!(config.queue.max_history, 50);
            assert_eq!(config.relationships.history_limit, 100);
        }
    }
}
