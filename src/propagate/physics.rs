//! Physics collaborator
//!
//! Breaking a bone asks the physics side for two things: start simulating
//! some part of the skeleton, then sever the joint with an impulse. How either
//! is done is the collaborator's business.

use std::sync::{Arc, Mutex};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::BoneId;
use crate::rules::SimulateMode;

/// Which bodies start simulating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationScope {
    BoneOnly,
    BoneAndDescendants,
    WholeSkeleton,
}

impl From<SimulateMode> for SimulationScope {
    fn from(mode: SimulateMode) -> Self {
        match mode {
            SimulateMode::SelfOnly => SimulationScope::BoneOnly,
            SimulateMode::AllLowerBones => SimulationScope::BoneAndDescendants,
            SimulateMode::FullMesh => SimulationScope::WholeSkeleton,
        }
    }
}

/// Receiver of break directives
pub trait PhysicsDriver {
    fn enable_simulation(&mut self, scope: SimulationScope, bone: &BoneId);

    fn break_constraint(&mut self, impulse: Vec3, location: Vec3, bone: &BoneId);
}

/// A directive as issued to the physics collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PhysicsDirective {
    EnableSimulation {
        scope: SimulationScope,
        bone: BoneId,
    },
    BreakConstraint {
        impulse: Vec3,
        location: Vec3,
        bone: BoneId,
    },
}

/// Physics driver that only records what it was told
///
/// Clones share the same log, so a handle kept outside the skeleton sees
/// every directive the skeleton issued.
#[derive(Debug, Clone, Default)]
pub struct PhysicsLog {
    directives: Arc<Mutex<Vec<PhysicsDirective>>>,
}

impl PhysicsLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every directive so far, in issue order
    pub fn directives(&self) -> Vec<PhysicsDirective> {
        self.directives
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.directives.lock().map(|log| log.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, directive: PhysicsDirective) {
        if let Ok(mut log) = self.directives.lock() {
            log.push(directive);
        }
    }
}

impl PhysicsDriver for PhysicsLog {
    fn enable_simulation(&mut self, scope: SimulationScope, bone: &BoneId) {
        self.push(PhysicsDirective::EnableSimulation {
            scope,
            bone: bone.clone(),
        });
    }

    fn break_constraint(&mut self, impulse: Vec3, location: Vec3, bone: &BoneId) {
        self.push(PhysicsDirective::BreakConstraint {
            impulse,
            location,
            bone: bone.clone(),
        });
    }
}
