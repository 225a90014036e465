//! Runtime action instances.

use lifesim_types::{ActionCategory, ActionState, AgentId, EffectBundle, Metadata, ObjectId};

/// Default priority of a new action (scale 1--10).
pub const DEFAULT_PRIORITY: u8 = 5;

/// A queue-owned action instance.
///
/// Instances are value copies: cloning one from a template or from another
/// action never shares state with the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// Template name (`eat`, `chat`).
    pub name: String,
    /// How the action came about.
    pub category: ActionCategory,
    /// Duration in simulated hours. Zero or less completes on the first step.
    pub duration: f64,
    /// Deltas applied on completion.
    pub effects: EffectBundle,
    /// Importance on a 1--10 scale.
    pub priority: u8,
    /// Whether the action may be cancelled or displaced while executing.
    pub interruptible: bool,
    /// Agent the action is performed with.
    pub target_agent_id: Option<AgentId>,
    /// Object the action is performed on.
    pub target_object_id: Option<ObjectId>,
    /// Caller-defined data carried with the action.
    pub metadata: Metadata,
    state: ActionState,
    progress: f64,
}

impl Action {
    /// Create a queued, interruptible action with default priority.
    pub fn new(name: &str, category: ActionCategory, duration: f64, effects: EffectBundle) -> Self {
        Self {
            name: String::from(name),
            category,
            duration,
            effects,
            priority: DEFAULT_PRIORITY,
            interruptible: true,
            target_agent_id: None,
            target_object_id: None,
            metadata: Metadata::new(),
            state: ActionState::Queued,
            progress: 0.0,
        }
    }

    /// Set the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Set whether the action can be interrupted.
    #[must_use]
    pub const fn with_interruptible(mut self, interruptible: bool) -> Self {
        self.interruptible = interruptible;
        self
    }

    /// Target another agent.
    #[must_use]
    pub fn with_target_agent(mut self, target: AgentId) -> Self {
        self.target_agent_id = Some(target);
        self
    }

    /// Target a world object.
    #[must_use]
    pub fn with_target_object(mut self, target: ObjectId) -> Self {
        self.target_object_id = Some(target);
        self
    }

    /// Attach metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Lifecycle state.
    pub const fn state(&self) -> ActionState {
        self.state
    }

    /// Completion fraction in `[0, 1]`.
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// Whether the action has finished.
    pub fn is_complete(&self) -> bool {
        self.state == ActionState::Completed
    }

    /// Hours left until completion.
    pub fn time_remaining(&self) -> f64 {
        (self.duration * (1.0 - self.progress)).max(0.0)
    }

    /// Advance progress by `dt` hours.
    ///
    /// A queued action becomes in-progress; reaching full progress
    /// completes it. Negative `dt` is treated as zero.
    pub fn advance(&mut self, dt: f64) {
        let dt = dt.max(0.0);
        self.progress = if self.duration > 0.0 {
            (self.progress + dt / self.duration).min(1.0)
        } else {
            1.0
        };

        if self.progress >= 1.0 {
            self.state = ActionState::Completed;
        } else if self.state == ActionState::Queued {
            self.state = ActionState::InProgress;
        }
    }

    pub(crate) const fn set_state(&mut self, state: ActionState) {
        self.state = state;
    }

    pub(crate) const fn reset_progress(&mut self) {
        self.progress = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn nap(duration: f64) -> Action {
        Action::new("nap", ActionCategory::Autonomous, duration, EffectBundle::new())
    }

    #[test]
    fn advance_tracks_progress_then_completes() {
        let mut action = nap(2.0);
        action.advance(1.0);
        assert!((action.progress() - 0.5).abs() < EPSILON);
        assert_eq!(action.state(), ActionState::InProgress);
        assert!((action.time_remaining() - 1.0).abs() < EPSILON);

        action.advance(1.0);
        assert!((action.progress() - 1.0).abs() < EPSILON);
        assert_eq!(action.state(), ActionState::Completed);
        assert!(action.time_remaining().abs() < EPSILON);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut action = nap(0.0);
        action.advance(0.0);
        assert!(action.is_complete());
    }

    #[test]
    fn progress_is_capped() {
        let mut action = nap(1.0);
        action.advance(10.0);
        assert!((action.progress() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn negative_dt_does_not_rewind() {
        let mut action = nap(4.0);
        action.advance(1.0);
        action.advance(-2.0);
        assert!((action.progress() - 0.25).abs() < EPSILON);
    }

    #[test]
    fn builders_set_fields() {
        let action = nap(1.0)
            .with_priority(9)
            .with_interruptible(false)
            .with_target_agent(AgentId::from("bob"))
            .with_target_object(ObjectId::from("couch"));
        assert_eq!(action.priority, 9);
        assert!(!action.interruptible);
        assert_eq!(action.target_agent_id, Some(AgentId::from("bob")));
        assert_eq!(action.target_object_id, Some(ObjectId::from("couch")));
        assert_eq!(action.state(), ActionState::Queued);
    }
}
