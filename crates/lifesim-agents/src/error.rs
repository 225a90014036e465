//! Error types for the lifesim-agents crate.
//!
//! Simulation operations (fulfilling a need, queueing an action, cancelling)
//! report expected failures through `bool` and `Option` returns. The errors
//! here cover the remaining cases: invalid configuration, registry
//! conflicts, and snapshot encoding.

use lifesim_types::{AgentId, NeedType, SkillType};

/// Errors that can occur while configuring or managing agents.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// An agent with this id is already registered.
    #[error("duplicate agent id: {0}")]
    DuplicateAgentId(AgentId),

    /// A need's configuration violates its bounds or threshold ordering.
    #[error("invalid config for need {need}: {reason}")]
    InvalidNeedConfig {
        /// The misconfigured need.
        need: NeedType,
        /// Description of the violated constraint.
        reason: String,
    },

    /// A skill's configuration cannot produce a valid progression curve.
    #[error("invalid config for skill {skill}: {reason}")]
    InvalidSkillConfig {
        /// The misconfigured skill.
        skill: SkillType,
        /// Description of the violated constraint.
        reason: String,
    },

    /// Action queue or relationship limits are unusable.
    #[error("invalid limits: {reason}")]
    InvalidLimits {
        /// Description of the violated constraint.
        reason: String,
    },

    /// The autonomy policy names an action template the catalog lacks.
    #[error("unknown action template: {name}")]
    UnknownTemplate {
        /// The template name that failed to resolve.
        name: String,
    },

    /// Encoding or decoding an agent snapshot failed.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
