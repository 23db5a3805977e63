//! Authority-side world: skeletons, the simulation clock and pending regeneration

use ahash::AHashMap;

use crate::core::clock::SimClock;
use crate::core::error::{DismemberError, Result};
use crate::core::types::{SimTime, SkeletonId};
use crate::regen::{RegenScheduler, RegenTask};
use crate::router::{DamageTypeCatalog, PointDamageEvent, RadialDamageEvent};
use crate::skeleton::{DamageReport, Skeleton};

/// What one `advance` call did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    pub now: SimTime,
    /// Regeneration tasks that restored a threshold
    pub restored: usize,
    /// Regeneration tasks whose skeleton or rule was gone
    pub stale: usize,
    /// Replica requests handled
    pub requests: usize,
}

/// Every skeleton this node is authoritative for
#[derive(Debug)]
pub struct DismembermentWorld {
    clock: SimClock,
    scheduler: RegenScheduler,
    catalog: DamageTypeCatalog,
    skeletons: AHashMap<SkeletonId, Skeleton>,
}

impl DismembermentWorld {
    pub fn new(catalog: DamageTypeCatalog) -> Self {
        Self {
            clock: SimClock::new(),
            scheduler: RegenScheduler::new(),
            catalog,
            skeletons: AHashMap::new(),
        }
    }

    pub fn spawn(&mut self, skeleton: Skeleton) -> SkeletonId {
        let id = skeleton.id();
        tracing::debug!(skeleton = ?id, rules = skeleton.rules().len(), "Skeleton spawned");
        self.skeletons.insert(id, skeleton);
        id
    }

    /// Remove a skeleton and cancel its pending regeneration
    pub fn despawn(&mut self, id: SkeletonId) -> Option<Skeleton> {
        let skeleton = self.skeletons.remove(&id)?;
        let cancelled = self.scheduler.cancel_skeleton(id);
        tracing::debug!(skeleton = ?id, cancelled, "Skeleton despawned");
        Some(skeleton)
    }

    pub fn get(&self, id: SkeletonId) -> Option<&Skeleton> {
        self.skeletons.get(&id)
    }

    pub fn get_mut(&mut self, id: SkeletonId) -> Option<&mut Skeleton> {
        self.skeletons.get_mut(&id)
    }

    pub fn skeleton_count(&self) -> usize {
        self.skeletons.len()
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut SimClock {
        &mut self.clock
    }

    pub fn scheduler(&self) -> &RegenScheduler {
        &self.scheduler
    }

    pub fn catalog(&self) -> &DamageTypeCatalog {
        &self.catalog
    }

    /// Deliver a point hit to one skeleton
    pub fn point_damage(&mut self, id: SkeletonId, event: &PointDamageEvent) -> Result<DamageReport> {
        let now = self.clock.now();
        let skeleton = self
            .skeletons
            .get_mut(&id)
            .ok_or(DismemberError::SkeletonNotFound(id))?;
        let report = skeleton.receive_point_damage(event, &self.catalog, now);
        self.schedule_regenerations(id, &report, now);
        Ok(report)
    }

    /// Deliver a blast to one skeleton
    pub fn radial_damage(&mut self, id: SkeletonId, event: &RadialDamageEvent) -> Result<DamageReport> {
        let now = self.clock.now();
        let skeleton = self
            .skeletons
            .get_mut(&id)
            .ok_or(DismemberError::SkeletonNotFound(id))?;
        let report = skeleton.receive_radial_damage(event, &self.catalog, now);
        self.schedule_regenerations(id, &report, now);
        Ok(report)
    }

    fn schedule_regenerations(&mut self, id: SkeletonId, report: &DamageReport, now: SimTime) {
        for regen in &report.regenerations {
            self.scheduler.schedule(
                id,
                regen.rule,
                regen.bone.clone(),
                regen.amount,
                now,
                regen.window,
            );
        }
    }

    /// Advance the clock, fire due regeneration and handle replica requests
    pub fn advance(&mut self, real_dt: f64) -> TickSummary {
        let now = self.clock.advance(real_dt);
        let mut summary = TickSummary {
            now,
            ..Default::default()
        };

        for task in self.scheduler.take_due(now) {
            if self.restore(&task) {
                summary.restored += 1;
            } else {
                summary.stale += 1;
            }
        }

        for skeleton in self.skeletons.values_mut() {
            summary.requests += skeleton.drain_requests();
        }

        summary
    }

    fn restore(&mut self, task: &RegenTask) -> bool {
        let Some(skeleton) = self.skeletons.get_mut(&task.skeleton) else {
            tracing::debug!(skeleton = ?task.skeleton, bone = %task.bone, "Regeneration for missing skeleton dropped");
            return false;
        };
        if !skeleton.restore_immediate(task.rule, task.amount) {
            tracing::debug!(skeleton = ?task.skeleton, rule = task.rule, bone = %task.bone, "Regeneration for missing rule dropped");
            return false;
        }
        true
    }
}
