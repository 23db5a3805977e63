//! Read-only query surface shared by the authority and its replicas

use crate::core::types::{BoneHealth, BoneId};

/// Health queries both roles answer the same way
pub trait BoneHealthQuery {
    /// Bones broken so far, in break order
    fn dismembered_bones(&self) -> Vec<BoneId>;

    /// Remaining cumulative threshold of every rule, in rule order
    fn all_bone_health(&self) -> Vec<BoneHealth>;

    /// Remaining cumulative threshold of one bone
    ///
    /// Returns `UNKNOWN_BONE_HEALTH` (-1) when no rule matches.
    fn bone_health(&self, bone: &BoneId) -> f32;

    fn is_dismembered(&self, bone: &BoneId) -> bool {
        self.dismembered_bones().contains(bone)
    }
}
