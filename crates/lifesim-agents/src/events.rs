//! Typed events emitted by the agent subsystems.
//!
//! Each subsystem owns an [`EventHub`] for its event enum. Observers
//! subscribe to one event kind and are called synchronously, in
//! subscription order, from inside the call that produced the event.
//! An observer receives the event by reference and must not try to reach
//! back into the emitting subsystem; [`Agent`](crate::Agent) applies its own
//! reactions after the triggering call has returned.

use std::collections::BTreeMap;
use std::fmt;

use lifesim_types::{AgentId, RelationshipType, SkillType};

use crate::actions::Action;
use crate::needs::Need;

/// An event enum whose variants can be subscribed to individually.
pub trait Event {
    /// Fieldless discriminant naming one variant.
    type Kind: Copy + Ord + fmt::Debug;

    /// The variant of this event.
    fn kind(&self) -> Self::Kind;
}

/// A subscriber to one event kind.
pub type Observer<E> = Box<dyn FnMut(&E) + Send>;

/// Ordered observer lists, one per event kind.
pub struct EventHub<E: Event> {
    observers: BTreeMap<E::Kind, Vec<Observer<E>>>,
}

impl<E: Event> EventHub<E> {
    /// Create a hub with no observers.
    pub const fn new() -> Self {
        Self {
            observers: BTreeMap::new(),
        }
    }

    /// Append an observer for `kind`.
    pub fn subscribe(&mut self, kind: E::Kind, observer: Observer<E>) {
        self.observers.entry(kind).or_default().push(observer);
    }

    /// Deliver `event` to every observer of its kind.
    pub fn emit(&mut self, event: &E) {
        if let Some(list) = self.observers.get_mut(&event.kind()) {
            for observer in list.iter_mut() {
                observer(event);
            }
        }
    }

    /// Number of observers subscribed to `kind`.
    pub fn observer_count(&self, kind: E::Kind) -> usize {
        self.observers.get(&kind).map_or(0, Vec::len)
    }
}

impl<E: Event> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for EventHub<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<E::Kind, usize> = self
            .observers
            .iter()
            .map(|(kind, list)| (*kind, list.len()))
            .collect();
        f.debug_struct("EventHub").field("observers", &counts).finish()
    }
}

// ---------------------------------------------------------------------------
// Needs
// ---------------------------------------------------------------------------

/// Emitted by [`NeedsSystem`](crate::NeedsSystem).
#[derive(Debug, Clone, PartialEq)]
pub enum NeedsEvent {
    /// The need dropped to or below its critical threshold during decay.
    CriticalCrossed(Need),
    /// The need dropped to or below its warning threshold (but not critical).
    WarningCrossed(Need),
    /// The need was raised by a positive amount.
    Fulfilled {
        /// The need after fulfillment.
        need: Need,
        /// The amount actually applied.
        amount: f64,
    },
}

/// Discriminant of [`NeedsEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NeedsEventKind {
    /// [`NeedsEvent::CriticalCrossed`].
    CriticalCrossed,
    /// [`NeedsEvent::WarningCrossed`].
    WarningCrossed,
    /// [`NeedsEvent::Fulfilled`].
    Fulfilled,
}

impl Event for NeedsEvent {
    type Kind = NeedsEventKind;

    fn kind(&self) -> NeedsEventKind {
        match self {
            Self::CriticalCrossed(_) => NeedsEventKind::CriticalCrossed,
            Self::WarningCrossed(_) => NeedsEventKind::WarningCrossed,
            Self::Fulfilled { .. } => NeedsEventKind::Fulfilled,
        }
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Emitted by [`ActionQueue`](crate::ActionQueue).
#[derive(Debug, Clone, PartialEq)]
pub enum ActionEvent {
    /// The action entered the executing slot.
    Started(Action),
    /// The action finished and moved to history.
    Completed(Action),
    /// The executing action was cancelled.
    Cancelled(Action),
}

/// Discriminant of [`ActionEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ActionEventKind {
    /// [`ActionEvent::Started`].
    Started,
    /// [`ActionEvent::Completed`].
    Completed,
    /// [`ActionEvent::Cancelled`].
    Cancelled,
}

impl Event for ActionEvent {
    type Kind = ActionEventKind;

    fn kind(&self) -> ActionEventKind {
        match self {
            Self::Started(_) => ActionEventKind::Started,
            Self::Completed(_) => ActionEventKind::Completed,
            Self::Cancelled(_) => ActionEventKind::Cancelled,
        }
    }
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

/// Emitted by [`RelationshipSystem`](crate::RelationshipSystem).
#[derive(Debug, Clone, PartialEq)]
pub enum RelationshipEvent {
    /// A relationship with a previously unknown partner was created.
    NewRelationship {
        /// The new partner.
        partner_id: AgentId,
    },
    /// An interaction changed friendship or romance.
    Changed {
        /// The partner interacted with.
        partner_id: AgentId,
        /// Interaction type (`chat`, `insult`).
        interaction: String,
        /// Friendship delta requested by the interaction.
        friendship_change: f64,
        /// Romance delta requested by the interaction.
        romance_change: f64,
    },
    /// The derived classification changed.
    TypeChanged {
        /// The partner whose relationship changed.
        partner_id: AgentId,
        /// Classification before the change.
        old: RelationshipType,
        /// Classification after the change.
        new: RelationshipType,
    },
}

/// Discriminant of [`RelationshipEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RelationshipEventKind {
    /// [`RelationshipEvent::NewRelationship`].
    NewRelationship,
    /// [`RelationshipEvent::Changed`].
    Changed,
    /// [`RelationshipEvent::TypeChanged`].
    TypeChanged,
}

impl Event for RelationshipEvent {
    type Kind = RelationshipEventKind;

    fn kind(&self) -> RelationshipEventKind {
        match self {
            Self::NewRelationship { .. } => RelationshipEventKind::NewRelationship,
            Self::Changed { .. } => RelationshipEventKind::Changed,
            Self::TypeChanged { .. } => RelationshipEventKind::TypeChanged,
        }
    }
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

/// Emitted by [`SkillSystem`](crate::SkillSystem).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkillEvent {
    /// Experience was added to a skill.
    SkillGain {
        /// The skill that gained experience.
        skill: SkillType,
        /// Experience added.
        amount: f64,
    },
    /// A skill advanced one or more levels.
    LevelUp {
        /// The skill that leveled.
        skill: SkillType,
        /// Level before the gain.
        old_level: u32,
        /// Level after the gain.
        new_level: u32,
    },
}

/// Discriminant of [`SkillEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SkillEventKind {
    /// [`SkillEvent::SkillGain`].
    SkillGain,
    /// [`SkillEvent::LevelUp`].
    LevelUp,
}

impl Event for SkillEvent {
    type Kind = SkillEventKind;

    fn kind(&self) -> SkillEventKind {
        match self {
            Self::SkillGain { .. } => SkillEventKind::SkillGain,
            Self::LevelUp { .. } => SkillEventKind::LevelUp,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn gain(amount: f64) -> SkillEvent {
        SkillEvent::SkillGain {
            skill: SkillType::Cooking,
            amount,
        }
    }

    #[test]
    fn observers_fire_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut hub: EventHub<SkillEvent> = EventHub::new();
        for tag in ["first", "second"] {
            let log = Arc::clone(&log);
            hub.subscribe(
                SkillEventKind::SkillGain,
                Box::new(move |_| {
                    if let Ok(mut entries) = log.lock() {
                        entries.push(tag);
                    }
                }),
            );
        }
        hub.emit(&gain(5.0));
        let entries = log.lock().map(|e| e.clone()).unwrap_or_default();
        assert_eq!(entries, vec!["first", "second"]);
    }

    #[test]
    fn only_matching_kind_is_notified() {
        let count = Arc::new(Mutex::new(0_u32));
        let mut hub: EventHub<SkillEvent> = EventHub::new();
        let seen = Arc::clone(&count);
        hub.subscribe(
            SkillEventKind::LevelUp,
            Box::new(move |_| {
                if let Ok(mut n) = seen.lock() {
                    *n = n.saturating_add(1);
                }
            }),
        );
        hub.emit(&gain(1.0));
        assert_eq!(count.lock().map(|n| *n).unwrap_or(99), 0);
        assert_eq!(hub.observer_count(SkillEventKind::LevelUp), 1);
        assert_eq!(hub.observer_count(SkillEventKind::SkillGain), 0);
    }
}
