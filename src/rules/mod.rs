//! Dismemberment rules and the per-skeleton rule store

pub mod bone_rule;
pub mod store;

pub use bone_rule::{BoneRule, SimulateMode};
pub use store::{health_from_states, RuleEntry, RuleState, RuleStore, UNKNOWN_BONE_HEALTH};
