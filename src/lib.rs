//! Dismemberment - per-bone damage tracking for articulated skeletons
//!
//! Authored rules give each bone an immediate and a cumulative break
//! threshold. Incoming point and radial damage is routed to bones, tallied
//! per instigator, and once a threshold is crossed the bone is broken: the
//! physics collaborator detaches it and observers on every node hear about
//! it exactly once. One node is authoritative; replicas mirror its breaks.

pub mod core;
pub mod ledger;
pub mod propagate;
pub mod regen;
pub mod replication;
pub mod router;
pub mod rules;
pub mod skeleton;
pub mod world;

pub use crate::core::{DismemberError, Result, RulesFile, SimClock};
pub use crate::core::types::{
    BoneHealth, BoneId, DamageSurfaceId, DamageTypeId, InstigatorId, SimTime, SkeletonId,
};
pub use crate::propagate::{BoneBroken, BoneDamaged, PhysicsDriver, PhysicsLog, SimulationScope};
pub use crate::replication::ReplicaSkeleton;
pub use crate::router::{BoneGeometry, PointDamageEvent, RadialDamageEvent, StaticGeometry};
pub use crate::rules::{BoneRule, SimulateMode};
pub use crate::skeleton::{BoneHealthQuery, DamageReport, DamageSink, Skeleton};
pub use crate::world::DismembermentWorld;
