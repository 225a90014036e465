//! Severity-tiered autonomy policy.
//!
//! One table decides which action answers a need, for both the reactive
//! path (a need just went critical) and the proactive path
//! ([`Agent::autonomous_action`](crate::Agent::autonomous_action)). Each row
//! holds a critical-tier action and a gentler warning-tier action.

use std::collections::BTreeMap;

use lifesim_types::NeedType;
use serde::{Deserialize, Serialize};

use crate::actions::ActionCatalog;
use crate::error::AgentError;

/// Which band a need is in when an action is chosen for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// At or below the critical threshold.
    Critical,
    /// At or below the warning threshold.
    Warning,
}

/// Actions answering one need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRow {
    /// Template queued when the need is critical.
    pub critical: String,
    /// Template recommended when the need is only in warning.
    pub warning: String,
}

impl PolicyRow {
    fn new(critical: &str, warning: &str) -> Self {
        Self {
            critical: String::from(critical),
            warning: String::from(warning),
        }
    }
}

/// Need-to-action table used by every autonomous decision.
///
/// Deserializes from a partial map; needs that are not named keep their
/// stock rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<NeedType, PolicyRow>", into = "BTreeMap<NeedType, PolicyRow>")]
pub struct AutonomyPolicy {
    rows: BTreeMap<NeedType, PolicyRow>,
}

impl Default for AutonomyPolicy {
    fn default() -> Self {
        let rows = NeedType::ALL
            .iter()
            .map(|need| {
                let row = match need {
                    NeedType::Hunger => PolicyRow::new("eat", "eat"),
                    NeedType::Energy => PolicyRow::new("sleep", "sleep"),
                    NeedType::Hygiene => PolicyRow::new("shower", "shower"),
                    NeedType::Social => PolicyRow::new("chat", "chat"),
                    NeedType::Fun => PolicyRow::new("play_game", "watch_tv"),
                    NeedType::Bladder => PolicyRow::new("use_bathroom", "use_bathroom"),
                };
                (*need, row)
            })
            .collect();
        Self { rows }
    }
}

impl From<BTreeMap<NeedType, PolicyRow>> for AutonomyPolicy {
    fn from(rows: BTreeMap<NeedType, PolicyRow>) -> Self {
        let mut policy = Self::default();
        policy.rows.extend(rows);
        policy
    }
}

impl From<AutonomyPolicy> for BTreeMap<NeedType, PolicyRow> {
    fn from(policy: AutonomyPolicy) -> Self {
        policy.rows
    }
}

impl AutonomyPolicy {
    /// The template answering `need` at `severity`, if the table has a row.
    pub fn action_for(&self, need: NeedType, severity: Severity) -> Option<&str> {
        self.rows.get(&need).map(|row| match severity {
            Severity::Critical => row.critical.as_str(),
            Severity::Warning => row.warning.as_str(),
        })
    }

    /// Replace the row for one need.
    pub fn set(&mut self, need: NeedType, row: PolicyRow) {
        self.rows.insert(need, row);
    }

    /// Check that every named template exists in `catalog`.
    pub fn validate(&self, catalog: &ActionCatalog) -> Result<(), AgentError> {
        for row in self.rows.values() {
            for name in [&row.critical, &row.warning] {
                if catalog.get(name).is_none() {
                    return Err(AgentError::UnknownTemplate { name: name.clone() });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_differ_only_for_fun() {
        let policy = AutonomyPolicy::default();
        for need in NeedType::ALL {
            let critical = policy.action_for(*need, Severity::Critical);
            let warning = policy.action_for(*need, Severity::Warning);
            if *need == NeedType::Fun {
                assert_eq!(critical, Some("play_game"));
                assert_eq!(warning, Some("watch_tv"));
            } else {
                assert_eq!(critical, warning);
            }
        }
    }

    #[test]
    fn default_policy_resolves_against_standard_catalog() {
        let policy = AutonomyPolicy::default();
        assert!(policy.validate(&ActionCatalog::standard()).is_ok());
    }

    #[test]
    fn unknown_template_fails_validation() {
        let mut policy = AutonomyPolicy::default();
        policy.set(NeedType::Fun, PolicyRow::new("skydive", "watch_tv"));
        assert!(matches!(
            policy.validate(&ActionCatalog::standard()),
            Err(AgentError::UnknownTemplate { name }) if name == "skydive"
        ));
    }
}
