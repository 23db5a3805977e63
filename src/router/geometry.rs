//! Bone geometry provider
//!
//! The skeleton never owns a pose. It asks this collaborator where a bone's
//! socket is in world space and where the owning actor stands.

use ahash::AHashMap;
use glam::Vec3;

use crate::core::types::BoneId;

/// World-space positions of a skeleton's bones
pub trait BoneGeometry {
    /// Socket position of a bone, if the skeleton has it
    fn socket_location(&self, bone: &BoneId) -> Option<Vec3>;

    /// The skeleton's overall reference point (the owning actor's location)
    fn reference_point(&self) -> Vec3;
}

/// Fixed pose, for headless runs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticGeometry {
    reference: Vec3,
    sockets: AHashMap<BoneId, Vec3>,
}

impl StaticGeometry {
    pub fn new(reference: Vec3) -> Self {
        Self {
            reference,
            sockets: AHashMap::new(),
        }
    }

    pub fn with_socket(mut self, bone: impl Into<BoneId>, location: Vec3) -> Self {
        self.sockets.insert(bone.into(), location);
        self
    }
}

impl BoneGeometry for StaticGeometry {
    fn socket_location(&self, bone: &BoneId) -> Option<Vec3> {
        self.sockets.get(bone).copied()
    }

    fn reference_point(&self) -> Vec3 {
        self.reference
    }
}
