//! Append-only log of broken bones

use serde::{Deserialize, Serialize};

use crate::core::error::{DismemberError, Result};
use crate::core::types::BoneId;

/// Bones broken this session, in break order
///
/// Entries are only ever appended, so an observer that has seen a break can
/// never "unsee" it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokenBoneSet {
    bones: Vec<BoneId>,
}

impl BrokenBoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bone; a bone already in the log is an upstream logic error
    pub fn append(&mut self, bone: BoneId) -> Result<usize> {
        if self.contains(&bone) {
            return Err(DismemberError::AlreadyBroken(bone));
        }
        self.bones.push(bone);
        Ok(self.bones.len() - 1)
    }

    pub fn contains(&self, bone: &BoneId) -> bool {
        self.bones.contains(bone)
    }

    pub fn as_slice(&self) -> &[BoneId] {
        &self.bones
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }
}
