//! Per-instigator damage attribution for a single bone

use serde::{Deserialize, Serialize};

use crate::core::types::{InstigatorId, SimTime};

/// Damage one instigator has dealt to one bone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstigatorRecord {
    pub instigator: InstigatorId,
    /// Running total, never decreases
    pub damage_dealt: f32,
    /// Simulation time of the latest hit
    pub last_damage_time: SimTime,
}

/// Instigator records in first-damage order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstigatorLedger {
    records: Vec<InstigatorRecord>,
}

impl InstigatorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `damage` to `instigator` at `now`, creating the record lazily
    pub fn credit(&mut self, instigator: InstigatorId, damage: f32, now: SimTime) {
        match self.records.iter_mut().find(|r| r.instigator == instigator) {
            Some(record) => {
                record.damage_dealt += damage;
                record.last_damage_time = now;
            }
            None => self.records.push(InstigatorRecord {
                instigator,
                damage_dealt: damage,
                last_damage_time: now,
            }),
        }
    }

    pub fn get(&self, instigator: InstigatorId) -> Option<&InstigatorRecord> {
        self.records.iter().find(|r| r.instigator == instigator)
    }

    pub fn records(&self) -> &[InstigatorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of every instigator's contribution
    pub fn total_damage(&self) -> f32 {
        self.records.iter().map(|r| r.damage_dealt).sum()
    }
}
