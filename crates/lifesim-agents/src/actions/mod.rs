//! Actions: templates, runtime instances, and the per-agent queue.
//!
//! An action is instantiated from an immutable named [`ActionTemplate`]
//! held in an [`ActionCatalog`], waits in an [`ActionQueue`], runs for its
//! duration in the queue's executing slot, and on completion hands its
//! [`EffectBundle`](lifesim_types::EffectBundle) back to the owning agent.
//!
//! # Submodules
//!
//! - [`action`] -- Runtime action instances and their progress.
//! - [`catalog`] -- Named templates and the stock catalog.
//! - [`queue`] -- Bounded pending queue, executing slot, and history.

pub mod action;
pub mod catalog;
pub mod queue;

pub use action::Action;
pub use catalog::{ActionCatalog, ActionTemplate};
pub use queue::{ActionOverrides, ActionQueue};
