//! Identifier generation for new agents.
//!
//! The [`AgentManager`](crate::AgentManager) asks an [`IdGenerator`] for
//! every agent it creates without an explicit id. Production code uses
//! [`UuidIdGenerator`]; tests and seeded runs use
//! [`SequentialIdGenerator`] for reproducible ids.

use lifesim_types::AgentId;

/// Source of fresh agent identifiers.
pub trait IdGenerator: Send {
    /// Produce the next identifier.
    fn next_id(&mut self) -> AgentId;
}

/// Generates UUID v7 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> AgentId {
        AgentId::generate()
    }
}

/// Generates `"{prefix}{n}"` identifiers counting up from 1.
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    /// Create a generator whose first id is `"{prefix}1"`.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: String::from(prefix),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> AgentId {
        let id = AgentId(format!("{}{}", self.prefix, self.next));
        self.next = self.next.saturating_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_count_up() {
        let mut ids = SequentialIdGenerator::new("sim-");
        assert_eq!(ids.next_id().as_str(), "sim-1");
        assert_eq!(ids.next_id().as_str(), "sim-2");
    }

    #[test]
    fn uuid_ids_do_not_repeat() {
        let mut ids = UuidIdGenerator;
        assert_ne!(ids.next_id(), ids.next_id());
    }
}
