//! Incoming damage events and the per-bone hits they resolve to

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::{BoneId, DamageSurfaceId, DamageTypeId, InstigatorId};

/// A hit on a specific bone, as delivered by the actor's damage dispatch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointDamageEvent {
    pub damage: f32,
    pub instigator: InstigatorId,
    pub hit_location: Vec3,
    /// Surface the hit landed on; must be the skeleton's damage surface
    pub hit_surface: DamageSurfaceId,
    pub bone: BoneId,
    /// Direction the shot travelled
    pub direction: Vec3,
    pub damage_type: DamageTypeId,
}

/// A blast centred on `origin`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialDamageEvent {
    pub damage: f32,
    pub damage_type: DamageTypeId,
    pub origin: Vec3,
    pub instigator: InstigatorId,
}

/// Damage routed to one bone name, ready for the health ledger
#[derive(Debug, Clone, PartialEq)]
pub struct BoneHit {
    /// Bone the damage targets (may be a proxy alias)
    pub bone: BoneId,
    pub damage: f32,
    pub damage_type: DamageTypeId,
    pub instigator: InstigatorId,
    /// Impulse handed to the physics collaborator if the bone breaks
    pub impulse: Vec3,
    pub hit_location: Vec3,
}
