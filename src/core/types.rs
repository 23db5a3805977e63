//! Core type definitions used throughout the codebase

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Simulation time in seconds (pauses with the game, follows dilation)
pub type SimTime = f64;

/// Canonical name of a bone in a skeleton
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoneId(pub String);

impl BoneId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BoneId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for BoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a damage type ("bullet", "fire", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DamageTypeId(pub String);

impl DamageTypeId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DamageTypeId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for DamageTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Entity credited with dealing damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstigatorId(pub Uuid);

impl InstigatorId {
    /// Credit for damage nobody in particular dealt (falls, environment)
    pub const WORLD: Self = Self(Uuid::nil());

    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstigatorId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a dismemberable skeleton instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkeletonId(pub Uuid);

impl SkeletonId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SkeletonId {
    fn default() -> Self {
        Self::new()
    }
}

/// Reference to a hit surface (the mesh component a point hit landed on)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamageSurfaceId(pub Uuid);

impl DamageSurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DamageSurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

/// One row of a health snapshot: bone and its remaining cumulative threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneHealth {
    pub bone: BoneId,
    pub health: f32,
}

impl BoneHealth {
    pub fn new(bone: BoneId, health: f32) -> Self {
        Self { bone, health }
    }
}
