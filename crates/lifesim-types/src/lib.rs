//! Shared type definitions for the Lifesim agent engine.
//!
//! This crate holds the identifiers, enumerations, and serializable
//! snapshot structs used by `lifesim-agents` and its drivers. Types flow
//! downstream to `TypeScript` via `ts-rs` for dashboards and save editors.
//!
//! # Modules
//!
//! - [`ids`] -- String-backed identifier newtypes
//! - [`enums`] -- Need, skill, action, and relationship enumerations
//! - [`structs`] -- Effect bundles, snapshots, and population summaries

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    ActionCategory, ActionState, NeedType, RelationshipType, SkillCategory, SkillType,
    UnknownVariant,
};
pub use ids::{AgentId, ObjectId};
pub use structs::{
    AgentSnapshot, AgentStatus, EffectBundle, Metadata, PopulationStats, RelationshipRecord,
    RelationshipSummary, SkillRecord,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs generates TypeScript bindings when types with
        // #[ts(export)] are used. The files are written to the
        // `bindings/` directory relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::AgentId::export_all();
        let _ = crate::ids::ObjectId::export_all();

        // Enums
        let _ = crate::enums::NeedType::export_all();
        let _ = crate::enums::SkillCategory::export_all();
        let _ = crate::enums::SkillType::export_all();
        let _ = crate::enums::ActionCategory::export_all();
        let _ = crate::enums::ActionState::export_all();
        let _ = crate::enums::RelationshipType::export_all();

        // Structs
        let _ = crate::structs::EffectBundle::export_all();
        let _ = crate::structs::SkillRecord::export_all();
        let _ = crate::structs::RelationshipRecord::export_all();
        let _ = crate::structs::AgentSnapshot::export_all();
        let _ = crate::structs::AgentStatus::export_all();
        let _ = crate::structs::PopulationStats::export_all();
    }
}
