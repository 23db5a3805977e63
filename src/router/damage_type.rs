//! Damage type catalog

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::DamageTypeId;

/// A damage type and the impulse it imparts on a severed bone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageType {
    pub id: DamageTypeId,
    /// Impulse magnitude applied along the hit direction
    #[serde(default)]
    pub impulse: f32,
}

impl DamageType {
    pub fn new(id: impl Into<DamageTypeId>, impulse: f32) -> Self {
        Self {
            id: id.into(),
            impulse,
        }
    }
}

/// Known damage types, looked up by id
#[derive(Debug, Clone, Default)]
pub struct DamageTypeCatalog {
    types: AHashMap<DamageTypeId, DamageType>,
}

impl DamageTypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_types(types: impl IntoIterator<Item = DamageType>) -> Self {
        let mut catalog = Self::new();
        for damage_type in types {
            catalog.add(damage_type);
        }
        catalog
    }

    /// Add or replace a damage type
    pub fn add(&mut self, damage_type: DamageType) {
        self.types.insert(damage_type.id.clone(), damage_type);
    }

    pub fn get(&self, id: &DamageTypeId) -> Option<&DamageType> {
        self.types.get(id)
    }

    /// Impulse magnitude of a damage type (0 for unknown types)
    pub fn impulse(&self, id: &DamageTypeId) -> f32 {
        self.types.get(id).map(|t| t.impulse).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
