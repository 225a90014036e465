//! Type-safe identifier wrappers.
//!
//! Agents and world objects are referenced by opaque string identifiers.
//! Relationships store a partner's [`AgentId`] and never a reference to the
//! partner itself, so an identifier may outlive the agent it names. Freshly
//! generated identifiers are UUID v7 strings (time-ordered), but any string
//! is accepted so external drivers and tests can supply their own.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier from a UUID v7 (time-ordered).
            pub fn generate() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the inner [`String`] value.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(String::from(id))
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an agent.
    AgentId
}

define_id! {
    /// Identifier for a world object an action may target (a fridge, a bed).
    ObjectId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique() {
        let a = AgentId::generate();
        let b = AgentId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_the_raw_string() {
        let id = AgentId::from("bob_123");
        assert_eq!(id.to_string(), "bob_123");
        assert_eq!(id.as_str(), "bob_123");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = ObjectId::from("fridge");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"fridge\""));
    }
}
