//! Health ledger: per-bone thresholds, attribution and the break decision

pub mod health;
pub mod instigator;

pub use health::{BoneState, DamageOutcome};
pub use instigator::{InstigatorLedger, InstigatorRecord};
