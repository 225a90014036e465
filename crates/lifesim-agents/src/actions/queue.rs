//! Per-agent action queue.
//!
//! The queue has three parts:
//!
//! - a bounded FIFO of pending actions (`max_queue_size`),
//! - a single executing slot,
//! - a bounded history of finished actions (`max_history`, oldest dropped).
//!
//! [`ActionQueue::step`] promotes the front pending action into the empty
//! executing slot, advances it, and retires it to history once complete.
//! Expected failures (unknown template, full queue, non-interruptible
//! action) are reported as `false` or `None` and leave the queue unchanged.

use std::collections::VecDeque;
use std::sync::Arc;

use lifesim_types::{ActionState, AgentId, EffectBundle, Metadata, ObjectId};
use tracing::debug;

use super::action::Action;
use super::catalog::ActionCatalog;
use crate::config::QueueConfig;
use crate::events::{ActionEvent, ActionEventKind, EventHub, Observer};

/// Per-instance adjustments applied when enqueuing a template by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionOverrides {
    /// Replace the template priority.
    pub priority: Option<u8>,
    /// Replace the template's interruptible flag.
    pub interruptible: Option<bool>,
    /// Agent the action targets.
    pub target_agent_id: Option<AgentId>,
    /// Object the action targets.
    pub target_object_id: Option<ObjectId>,
    /// Metadata for the instance.
    pub metadata: Option<Metadata>,
    /// Insert at the front of the pending queue instead of the back.
    pub at_front: bool,
}

impl ActionOverrides {
    /// Overrides that only place the action at the front of the queue.
    pub fn front() -> Self {
        Self {
            at_front: true,
            ..Self::default()
        }
    }

    /// Overrides that only set a target agent.
    pub fn targeting(agent: AgentId) -> Self {
        Self {
            target_agent_id: Some(agent),
            ..Self::default()
        }
    }

    fn apply(self, mut action: Action) -> Action {
        if let Some(priority) = self.priority {
            action.priority = priority;
        }
        if let Some(interruptible) = self.interruptible {
            action.interruptible = interruptible;
        }
        if self.target_agent_id.is_some() {
            action.target_agent_id = self.target_agent_id;
        }
        if self.target_object_id.is_some() {
            action.target_object_id = self.target_object_id;
        }
        if let Some(metadata) = self.metadata {
            action.metadata = metadata;
        }
        action
    }
}

/// Pending actions, the executing action, and recent history.
#[derive(Debug)]
pub struct ActionQueue {
    catalog: Arc<ActionCatalog>,
    config: QueueConfig,
    pending: VecDeque<Action>,
    current: Option<Action>,
    history: VecDeque<Action>,
    events: EventHub<ActionEvent>,
}

impl ActionQueue {
    /// Create an empty queue drawing templates from `catalog`.
    pub fn new(catalog: Arc<ActionCatalog>, config: QueueConfig) -> Self {
        Self {
            catalog,
            config,
            pending: VecDeque::new(),
            current: None,
            history: VecDeque::new(),
            events: EventHub::new(),
        }
    }

    /// Register an observer for one event kind.
    pub fn subscribe(&mut self, kind: ActionEventKind, observer: Observer<ActionEvent>) {
        self.events.subscribe(kind, observer);
    }

    /// The template catalog this queue instantiates from.
    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    // -----------------------------------------------------------------------
    // Enqueueing
    // -----------------------------------------------------------------------

    /// Enqueue a fresh copy of `action`, queued with zero progress.
    ///
    /// Returns `false` without change if the pending queue is full.
    pub fn add_action(&mut self, action: &Action, at_front: bool) -> bool {
        if self.pending.len() >= self.config.max_queue_size {
            debug!(action = %action.name, "action queue full");
            return false;
        }
        let mut copy = action.clone();
        copy.set_state(ActionState::Queued);
        copy.reset_progress();
        if at_front {
            self.pending.push_front(copy);
        } else {
            self.pending.push_back(copy);
        }
        true
    }

    /// Instantiate a catalog template and enqueue it.
    ///
    /// Returns `false` without change if the name is unknown or the pending
    /// queue is full.
    pub fn add_action_by_name(&mut self, name: &str, overrides: ActionOverrides) -> bool {
        let Some(action) = self.catalog.instantiate(name) else {
            debug!(action = name, "unknown action template");
            return false;
        };
        let at_front = overrides.at_front;
        let action = overrides.apply(action);
        self.add_action(&action, at_front)
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    /// Advance the queue by `dt` hours and return the completed action, if
    /// one finished during this step.
    pub fn step(&mut self, dt: f64) -> Option<Action> {
        if self.current.is_none()
            && let Some(mut next) = self.pending.pop_front()
        {
            next.set_state(ActionState::InProgress);
            debug!(action = %next.name, "action started");
            self.events.emit(&ActionEvent::Started(next.clone()));
            self.current = Some(next);
        }

        let finished = {
            let current = self.current.as_mut()?;
            current.advance(dt);
            current.is_complete()
        };
        if !finished {
            return None;
        }

        let completed = self.current.take()?;
        debug!(action = %completed.name, "action completed");
        self.push_history(completed.clone());
        self.events.emit(&ActionEvent::Completed(completed.clone()));
        Some(completed)
    }

    /// Advance the queue by `dt` hours and return the effects of an action
    /// that completed during this step.
    pub fn update(&mut self, dt: f64) -> Option<EffectBundle> {
        self.step(dt).map(|action| action.effects)
    }

    /// Cancel the executing action if it is interruptible.
    pub fn cancel_current(&mut self) -> Option<Action> {
        if !self.current.as_ref()?.interruptible {
            return None;
        }
        let mut cancelled = self.current.take()?;
        cancelled.set_state(ActionState::Cancelled);
        debug!(action = %cancelled.name, "action cancelled");
        self.push_history(cancelled.clone());
        self.events.emit(&ActionEvent::Cancelled(cancelled.clone()));
        Some(cancelled)
    }

    /// Start `action` immediately, pushing any executing action back to the
    /// front of the pending queue.
    ///
    /// Fails if the executing action is not interruptible. When the pending
    /// queue is already full, its last entry is cancelled to make room for
    /// the displaced action.
    pub fn interrupt_for(&mut self, action: &Action) -> bool {
        if self.current.as_ref().is_some_and(|current| !current.interruptible) {
            return false;
        }

        if let Some(mut displaced) = self.current.take() {
            displaced.set_state(ActionState::Queued);
            if self.pending.len() >= self.config.max_queue_size
                && let Some(mut evicted) = self.pending.pop_back()
            {
                evicted.set_state(ActionState::Cancelled);
                debug!(action = %evicted.name, "pending action evicted by interrupt");
                self.push_history(evicted);
            }
            self.pending.push_front(displaced);
        }

        let mut next = action.clone();
        next.set_state(ActionState::InProgress);
        debug!(action = %next.name, "action started by interrupt");
        self.events.emit(&ActionEvent::Started(next.clone()));
        self.current = Some(next);
        true
    }

    /// Remove every pending action, marking each cancelled.
    ///
    /// The executing action is not affected.
    pub fn clear_queue(&mut self) -> Vec<Action> {
        self.pending
            .drain(..)
            .map(|mut action| {
                action.set_state(ActionState::Cancelled);
                action
            })
            .collect()
    }

    fn push_history(&mut self, action: Action) {
        self.history.push_back(action);
        while self.history.len() > self.config.max_history {
            self.history.pop_front();
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The executing action.
    pub const fn current_action(&self) -> Option<&Action> {
        self.current.as_ref()
    }

    /// Whether an action is executing.
    pub const fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    /// Number of pending actions.
    pub fn queue_length(&self) -> usize {
        self.pending.len()
    }

    /// Pending actions in execution order.
    pub fn pending(&self) -> impl Iterator<Item = &Action> {
        self.pending.iter()
    }

    /// The newest `limit` finished actions, oldest first.
    pub fn history(&self, limit: usize) -> Vec<&Action> {
        let skip = self.history.len().saturating_sub(limit);
        self.history.iter().skip(skip).collect()
    }

    /// Display list: the executing action as `*name* (in progress)`, then
    /// pending action names in order.
    pub fn queue_preview(&self) -> Vec<String> {
        self.current
            .iter()
            .map(|action| format!("*{}* (in progress)", action.name))
            .chain(self.pending.iter().map(|action| action.name.clone()))
            .collect()
    }
}

impl Default for ActionQueue {
    fn default() -> Self {
        Self::new(Arc::new(ActionCatalog::standard()), QueueConfig::default())
    }
}
