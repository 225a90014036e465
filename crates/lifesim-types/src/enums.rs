//! Enumeration types for the Lifesim agent engine.
//!
//! Need and skill types are closed sets: every agent carries exactly one
//! track per variant. Their snake-case names are the keys used in
//! serialized snapshots and in action effect bundles.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Error returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    /// The enum that was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Implements `as_str`, `ALL`, [`Display`](fmt::Display) and [`FromStr`]
/// for a fieldless enum from a variant-to-name table.
macro_rules! named_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The snake-case name used in snapshots and effect bundles.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: $kind,
                        value: String::from(s),
                    }),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Needs
// ---------------------------------------------------------------------------

/// A basic need that decays over time and is replenished by actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum NeedType {
    /// Food. Restored by eating.
    Hunger,
    /// Rest. Restored by sleeping.
    Energy,
    /// Cleanliness. Restored by showering.
    Hygiene,
    /// Company. Restored by socializing.
    Social,
    /// Entertainment. Restored by leisure.
    Fun,
    /// Restroom. Restored by using the bathroom.
    Bladder,
}

named_enum!(NeedType, "need type", {
    Hunger => "hunger",
    Energy => "energy",
    Hygiene => "hygiene",
    Social => "social",
    Fun => "fun",
    Bladder => "bladder",
});

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

/// Broad grouping of skills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SkillCategory {
    /// Everyday household skills.
    Life,
    /// Skills used with other people.
    Social,
    /// Artistic skills.
    Creative,
    /// Analytical skills.
    Mental,
    /// Bodily skills.
    Physical,
    /// Everything else.
    Misc,
}

/// A trainable skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SkillType {
    /// Preparing meals.
    Cooking,
    /// Growing plants.
    Gardening,
    /// Catching fish.
    Fishing,
    /// Repairing and building things.
    Handiness,
    /// Persuading and charming others.
    Charisma,
    /// Making others laugh.
    Comedy,
    /// Writing prose.
    Writing,
    /// Painting pictures.
    Painting,
    /// Playing music.
    Music,
    /// Taking photographs.
    Photography,
    /// Reasoning and puzzles.
    Logic,
    /// Writing software.
    Programming,
    /// Physical conditioning.
    Fitness,
    /// Dancing.
    Dancing,
    /// Playing video games.
    Gaming,
}

named_enum!(SkillType, "skill type", {
    Cooking => "cooking",
    Gardening => "gardening",
    Fishing => "fishing",
    Handiness => "handiness",
    Charisma => "charisma",
    Comedy => "comedy",
    Writing => "writing",
    Painting => "painting",
    Music => "music",
    Photography => "photography",
    Logic => "logic",
    Programming => "programming",
    Fitness => "fitness",
    Dancing => "dancing",
    Gaming => "gaming",
});

impl SkillType {
    /// The category this skill belongs to.
    pub const fn category(self) -> SkillCategory {
        match self {
            Self::Cooking | Self::Gardening | Self::Fishing | Self::Handiness => {
                SkillCategory::Life
            }
            Self::Charisma | Self::Comedy => SkillCategory::Social,
            Self::Writing | Self::Painting | Self::Music | Self::Photography => {
                SkillCategory::Creative
            }
            Self::Logic | Self::Programming => SkillCategory::Mental,
            Self::Fitness | Self::Dancing => SkillCategory::Physical,
            Self::Gaming => SkillCategory::Misc,
        }
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// How an action came to be performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionCategory {
    /// Chosen by the agent itself to satisfy a need.
    Autonomous,
    /// Ordered by the player or an external driver.
    Directed,
    /// Performed with another agent.
    Social,
    /// Performed with a world object.
    Object,
}

named_enum!(ActionCategory, "action category", {
    Autonomous => "autonomous",
    Directed => "directed",
    Social => "social",
    Object => "object",
});

/// Lifecycle state of a queued action instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ActionState {
    /// Waiting in the pending queue.
    Queued,
    /// Occupying the executing slot.
    InProgress,
    /// Ran to completion; its effects were applied.
    Completed,
    /// Removed before completion.
    Cancelled,
    /// Could not be carried out. No queue operation currently produces it.
    Failed,
}

named_enum!(ActionState, "action state", {
    Queued => "queued",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
    Failed => "failed",
});

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

/// Derived classification of a relationship.
///
/// Computed from friendship, romance, and the family flag; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum RelationshipType {
    /// No meaningful history.
    Stranger,
    /// Friendship of at least 10.
    Acquaintance,
    /// Friendship of at least 30.
    Friend,
    /// Friendship of at least 60.
    GoodFriend,
    /// Friendship of at least 85.
    BestFriend,
    /// Romance of at least 30.
    RomanticInterest,
    /// Romance of at least 60.
    Partner,
    /// Romance of at least 90.
    Spouse,
    /// Designated family member.
    Family,
    /// Friendship of -20 or lower.
    Rival,
    /// Friendship of -50 or lower.
    Enemy,
}

named_enum!(RelationshipType, "relationship type", {
    Stranger => "stranger",
    Acquaintance => "acquaintance",
    Friend => "friend",
    GoodFriend => "good_friend",
    BestFriend => "best_friend",
    RomanticInterest => "romantic_interest",
    Partner => "partner",
    Spouse => "spouse",
    Family => "family",
    Rival => "rival",
    Enemy => "enemy",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn need_names_round_trip_through_from_str() {
        for need in NeedType::ALL {
            assert_eq!(need.as_str().parse::<NeedType>().ok(), Some(*need));
        }
    }

    #[test]
    fn unknown_skill_name_is_rejected() {
        let err = "basket_weaving".parse::<SkillType>();
        assert!(err.is_err());
        if let Err(e) = err {
            assert_eq!(e.to_string(), "unknown skill type: basket_weaving");
        }
    }

    #[test]
    fn serde_names_match_as_str() {
        let json = serde_json::to_string(&RelationshipType::GoodFriend).ok();
        assert_eq!(json.as_deref(), Some("\"good_friend\""));
        let json = serde_json::to_string(&ActionState::InProgress).ok();
        assert_eq!(json.as_deref(), Some("\"in_progress\""));
    }

    #[test]
    fn enumeration_order_is_declaration_order() {
        assert_eq!(NeedType::ALL.first(), Some(&NeedType::Hunger));
        assert_eq!(NeedType::ALL.last(), Some(&NeedType::Bladder));
        assert_eq!(SkillType::ALL.len(), 15);
    }

    #[test]
    fn skill_categories() {
        assert_eq!(SkillType::Cooking.category(), SkillCategory::Life);
        assert_eq!(SkillType::Comedy.category(), SkillCategory::Social);
        assert_eq!(SkillType::Programming.category(), SkillCategory::Mental);
        assert_eq!(SkillType::Gaming.category(), SkillCategory::Misc);
    }
}
