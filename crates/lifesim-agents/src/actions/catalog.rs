//! Named action templates.
//!
//! An [`ActionCatalog`] is read-only once built and is shared between
//! queues behind an `Arc`. Each queue clones a template into a fresh
//! [`Action`] whenever one is enqueued by name, so running actions never
//! touch the catalog.

use std::collections::BTreeMap;

use lifesim_types::{ActionCategory, EffectBundle, NeedType, SkillType};
use serde::{Deserialize, Serialize};

use super::action::{Action, DEFAULT_PRIORITY};

/// Immutable prototype of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionTemplate {
    /// Lookup name.
    pub name: String,

    /// Category given to instances (default: `directed`).
    #[serde(default = "default_category")]
    pub category: ActionCategory,

    /// Duration in simulated hours.
    pub duration: f64,

    /// Deltas applied on completion.
    #[serde(default)]
    pub effects: EffectBundle,

    /// Priority on a 1--10 scale (default: 5).
    #[serde(default = "default_priority")]
    pub priority: u8,

    /// Whether instances may be interrupted (default: true).
    #[serde(default = "default_interruptible")]
    pub interruptible: bool,
}

const fn default_category() -> ActionCategory {
    ActionCategory::Directed
}

const fn default_priority() -> u8 {
    DEFAULT_PRIORITY
}

const fn default_interruptible() -> bool {
    true
}

impl ActionTemplate {
    /// Create an interruptible template.
    pub fn new(
        name: &str,
        category: ActionCategory,
        duration: f64,
        effects: EffectBundle,
        priority: u8,
    ) -> Self {
        Self {
            name: String::from(name),
            category,
            duration,
            effects,
            priority,
            interruptible: true,
        }
    }

    /// Create a fresh queued instance.
    pub fn instantiate(&self) -> Action {
        Action::new(&self.name, self.category, self.duration, self.effects.clone())
            .with_priority(self.priority)
            .with_interruptible(self.interruptible)
    }
}

/// Lookup table of action templates keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionCatalog {
    templates: BTreeMap<String, ActionTemplate>,
}

impl ActionCatalog {
    /// Create a catalog with no templates.
    pub const fn empty() -> Self {
        Self {
            templates: BTreeMap::new(),
        }
    }

    /// The stock catalog of everyday actions.
    pub fn standard() -> Self {
        use ActionCategory::{Autonomous, Object, Social};
        use NeedType::{Bladder, Energy, Fun, Hunger, Hygiene};

        let skill = |s: SkillType| s.as_str();
        let templates = [
            ActionTemplate::new(
                "eat",
                Object,
                0.5,
                EffectBundle::new().with_need(Hunger, 40.0).with_need(Bladder, -10.0),
                7,
            ),
            ActionTemplate::new(
                "sleep",
                Autonomous,
                8.0,
                EffectBundle::new().with_need(Energy, 100.0),
                8,
            ),
            ActionTemplate::new(
                "shower",
                Object,
                0.5,
                EffectBundle::new().with_need(Hygiene, 50.0),
                6,
            ),
            ActionTemplate::new(
                "use_bathroom",
                Object,
                0.1,
                EffectBundle::new().with_need(Bladder, 100.0),
                9,
            ),
            ActionTemplate::new(
                "chat",
                Social,
                0.5,
                EffectBundle::new()
                    .with_need(NeedType::Social, 20.0)
                    .with_need(Fun, 10.0)
                    .with_relationship("friendship", 5.0),
                4,
            ),
            ActionTemplate::new(
                "play_game",
                Object,
                1.0,
                EffectBundle::new().with_need(Fun, 30.0),
                3,
            ),
            ActionTemplate::new(
                "watch_tv",
                Object,
                2.0,
                EffectBundle::new().with_need(Fun, 20.0).with_need(Energy, -5.0),
                2,
            ),
            ActionTemplate::new(
                "cook",
                Object,
                1.0,
                EffectBundle::new().with_skill(skill(SkillType::Cooking), 2.0),
                5,
            ),
            ActionTemplate::new(
                "exercise",
                Autonomous,
                1.0,
                EffectBundle::new()
                    .with_need(Energy, -20.0)
                    .with_need(Fun, 10.0)
                    .with_need(Hygiene, -15.0)
                    .with_skill(skill(SkillType::Fitness), 3.0),
                4,
            ),
            ActionTemplate::new(
                "read",
                Object,
                1.0,
                EffectBundle::new()
                    .with_need(Fun, 15.0)
                    .with_skill(skill(SkillType::Logic), 2.0),
                3,
            ),
        ];
        templates
            .into_iter()
            .fold(Self::empty(), Self::with_template)
    }

    /// Add or replace a template.
    #[must_use]
    pub fn with_template(mut self, template: ActionTemplate) -> Self {
        self.insert(template);
        self
    }

    /// Add or replace a template in place.
    pub fn insert(&mut self, template: ActionTemplate) {
        self.templates.insert(template.name.clone(), template);
    }

    /// Look up a template.
    pub fn get(&self, name: &str) -> Option<&ActionTemplate> {
        self.templates.get(name)
    }

    /// Instantiate a template by name.
    pub fn instantiate(&self, name: &str) -> Option<Action> {
        self.get(name).map(ActionTemplate::instantiate)
    }

    /// Template names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Number of templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
