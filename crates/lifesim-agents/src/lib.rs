//! Agent state and behaviour for the Lifesim engine.
//!
//! This crate contains the logic layer for agents: everything that operates
//! on agent state without touching I/O. It sits between `lifesim-types`
//! (which defines the serialized data structures) and `lifesim-engine`
//! (which loads configuration and drives the simulation loop).
//!
//! # Modules
//!
//! - [`actions`] -- Actions, the shared catalog, and the per-agent queue
//! - [`agent`] -- The [`Agent`] composition root and its per-tick wiring
//! - [`config`] -- Tuning for needs, skills, relationships, and queues ([`AgentConfig`])
//! - [`error`] -- Error types for agent operations ([`AgentError`])
//! - [`events`] -- Typed events and the observer hub each subsystem owns
//! - [`ids`] -- Pluggable agent identifier generation
//! - [`manager`] -- Population management ([`AgentManager`])
//! - [`needs`] -- Decaying needs with warning and critical thresholds
//! - [`policy`] -- The need-to-action table driving autonomous behaviour
//! - [`relationships`] -- Friendship and romance scores, classification, history
//! - [`skills`] -- Skill levels, experience curves, practice

pub mod actions;
pub mod agent;
pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod manager;
pub mod needs;
pub mod policy;
pub mod relationships;
pub mod skills;

// Re-export primary types at crate root for convenience.
pub use actions::{Action, ActionCatalog, ActionOverrides, ActionQueue, ActionTemplate};
pub use agent::Agent;
pub use config::{
    AgentConfig, NeedConfig, NeedsConfig, QueueConfig, RelationshipConfig, SkillConfig,
    SkillsConfig,
};
pub use error::AgentError;
pub use events::{EventHub, Observer};
pub use ids::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use manager::AgentManager;
pub use needs::{Need, NeedsSystem};
pub use policy::{AutonomyPolicy, PolicyRow, Severity};
pub use relationships::{InteractionEffect, Relationship, RelationshipSystem};
pub use skills::{Skill, SkillSystem};
