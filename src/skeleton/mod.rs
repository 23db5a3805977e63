//! Authoritative dismemberable skeleton
//!
//! Ties the pieces together for one skeleton instance: routes incoming
//! damage, runs the health ledger on every matching rule, notifies observers
//! and hands breaks to the propagator. Everything here needs `&mut self`, so
//! a skeleton processes one damage event at a time.

pub mod query;

pub use query::BoneHealthQuery;

use glam::Vec3;
use tokio::sync::mpsc;

use crate::core::error::Result;
use crate::core::types::{BoneHealth, BoneId, DamageSurfaceId, SimTime, SkeletonId};
use crate::ledger::{BoneState, DamageOutcome};
use crate::propagate::{
    BoneDamaged, BoneObservers, BreakEvent, BreakOrder, BreakPropagator, BrokenBoneSet,
    PhysicsDriver,
};
use crate::replication::{AuthorityRequest, ReplicaSkeleton};
use crate::router::{
    self, Binding, BoneGeometry, BoneHit, DamageBindings, DamageHandler, DamageTypeCatalog,
    PointDamageEvent, RadialDamageEvent,
};
use crate::rules::{BoneRule, RuleStore};

/// Immediate threshold to give back once a window has elapsed
#[derive(Debug, Clone, PartialEq)]
pub struct Regeneration {
    /// Position of the rule in the skeleton's rule store
    pub rule: usize,
    pub bone: BoneId,
    pub amount: f32,
    /// Seconds on the simulation clock
    pub window: f32,
}

/// What one damage event did to a skeleton
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DamageReport {
    /// At least one rule accepted the damage
    pub applied: bool,
    /// Bones broken by this event, in break order
    pub broken: Vec<BoneId>,
    /// Restorations the caller must schedule
    pub regenerations: Vec<Regeneration>,
}

impl DamageReport {
    pub fn broke_any(&self) -> bool {
        !self.broken.is_empty()
    }

    fn merge(&mut self, other: DamageReport) {
        self.applied |= other.applied;
        self.broken.extend(other.broken);
        self.regenerations.extend(other.regenerations);
    }
}

/// Anything damage events can be delivered to
///
/// Only the authority accepts; replicas refuse with `NotAuthority`.
pub trait DamageSink {
    fn take_point_damage(
        &mut self,
        event: &PointDamageEvent,
        catalog: &DamageTypeCatalog,
        now: SimTime,
    ) -> Result<DamageReport>;

    fn take_radial_damage(
        &mut self,
        event: &RadialDamageEvent,
        catalog: &DamageTypeCatalog,
        now: SimTime,
    ) -> Result<DamageReport>;
}

/// One dismemberable skeleton, authority side
pub struct Skeleton {
    id: SkeletonId,
    surface: DamageSurfaceId,
    damage_surface: DamageSurfaceId,
    rules: RuleStore,
    bindings: DamageBindings,
    observers: BoneObservers,
    propagator: BreakPropagator,
    geometry: Box<dyn BoneGeometry + Send>,
    physics: Box<dyn PhysicsDriver + Send>,
    requests_tx: mpsc::UnboundedSender<AuthorityRequest>,
    requests_rx: mpsc::UnboundedReceiver<AuthorityRequest>,
}

impl std::fmt::Debug for Skeleton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Skeleton")
            .field("id", &self.id)
            .field("damage_surface", &self.damage_surface)
            .field("rules", &self.rules.len())
            .field("broken", self.propagator.broken())
            .field("bindings", &self.bindings)
            .finish()
    }
}

impl Skeleton {
    pub fn new(
        rules: Vec<BoneRule>,
        geometry: impl BoneGeometry + Send + 'static,
        physics: impl PhysicsDriver + Send + 'static,
    ) -> Self {
        let rules = RuleStore::new(rules);
        let propagator = BreakPropagator::new(rules.states());
        let surface = DamageSurfaceId::new();
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();
        Self {
            id: SkeletonId::new(),
            surface,
            damage_surface: surface,
            rules,
            bindings: DamageBindings::new(),
            observers: BoneObservers::new(),
            propagator,
            geometry: Box::new(geometry),
            physics: Box::new(physics),
            requests_tx,
            requests_rx,
        }
    }

    pub fn id(&self) -> SkeletonId {
        self.id
    }

    /// The skeleton mesh's own surface
    pub fn surface(&self) -> DamageSurfaceId {
        self.surface
    }

    /// Surface whose point hits this skeleton accepts
    pub fn damage_surface(&self) -> DamageSurfaceId {
        self.damage_surface
    }

    /// Route point hits from another surface (a proxy mesh) to this skeleton
    pub fn set_damage_surface(&mut self, surface: DamageSurfaceId) {
        tracing::debug!(skeleton = ?self.id, ?surface, "Damage surface reassigned");
        self.damage_surface = surface;
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    /// Runtime state of the rule whose primary bone is `bone`
    pub fn bone_state(&self, bone: &BoneId) -> Option<&BoneState> {
        self.rules.get(bone).map(|entry| &entry.state)
    }

    pub fn broken(&self) -> &BrokenBoneSet {
        self.propagator.broken()
    }

    /// Every break issued so far
    pub fn break_history(&self) -> &[BreakEvent] {
        self.propagator.history()
    }

    pub fn observers_mut(&mut self) -> &mut BoneObservers {
        &mut self.observers
    }

    /// Replace the point-damage handler; the previous one is detached first
    pub fn rebind_point_damage(&mut self, handler: DamageHandler<PointDamageEvent>) {
        let previous = self.bindings.rebind_point(handler);
        tracing::debug!(skeleton = ?self.id, ?previous, "Point damage rebound");
    }

    /// Replace the radial-damage handler; the previous one is detached first
    pub fn rebind_radial_damage(&mut self, handler: DamageHandler<RadialDamageEvent>) {
        let previous = self.bindings.rebind_radial(handler);
        tracing::debug!(skeleton = ?self.id, ?previous, "Radial damage rebound");
    }

    /// Route both channels through the built-in pipeline again
    pub fn reset_damage_bindings(&mut self) {
        self.bindings.reset_point();
        self.bindings.reset_radial();
    }

    /// Handle a point-damage event through the active binding
    pub fn receive_point_damage(
        &mut self,
        event: &PointDamageEvent,
        catalog: &DamageTypeCatalog,
        now: SimTime,
    ) -> DamageReport {
        if let Binding::Custom(handler) = &mut self.bindings.point {
            handler(event);
            return DamageReport::default();
        }
        match router::route_point(event, self.damage_surface, catalog) {
            Some(hit) => self.apply_hit(&hit, now),
            None => {
                tracing::debug!(skeleton = ?self.id, bone = %event.bone, "Point hit on foreign surface ignored");
                DamageReport::default()
            }
        }
    }

    /// Handle a radial-damage event through the active binding
    pub fn receive_radial_damage(
        &mut self,
        event: &RadialDamageEvent,
        catalog: &DamageTypeCatalog,
        now: SimTime,
    ) -> DamageReport {
        if let Binding::Custom(handler) = &mut self.bindings.radial {
            handler(event);
            return DamageReport::default();
        }
        let hits = router::route_radial(event, &self.rules, self.geometry.as_ref(), catalog);
        let mut report = DamageReport::default();
        for hit in &hits {
            report.merge(self.apply_hit(hit, now));
        }
        report
    }

    /// Apply one routed hit to every rule it matches
    pub fn apply_hit(&mut self, hit: &BoneHit, now: SimTime) -> DamageReport {
        let mut report = DamageReport::default();

        for (index, entry) in self.rules.matching_mut(&hit.bone) {
            let outcome = entry.state.apply_damage(
                &entry.rule,
                hit.damage,
                &hit.damage_type,
                hit.instigator,
                now,
            );
            let bone = &entry.rule.bone;

            match outcome {
                DamageOutcome::Rejected => {
                    tracing::debug!(%bone, damage_type = %hit.damage_type, "Damage filtered out");
                }
                DamageOutcome::AlreadyBroken { predicted_health } => {
                    report.applied = true;
                    tracing::debug!(%bone, "Damage on broken bone credited without a new break");
                    self.observers.notify_damaged(&BoneDamaged {
                        bone: bone.clone(),
                        damage: hit.damage,
                        predicted_health,
                        instigator: hit.instigator,
                    });
                }
                DamageOutcome::Absorbed {
                    predicted_health,
                    regenerate,
                } => {
                    report.applied = true;
                    self.observers.notify_damaged(&BoneDamaged {
                        bone: bone.clone(),
                        damage: hit.damage,
                        predicted_health,
                        instigator: hit.instigator,
                    });
                    if let Some(amount) = regenerate {
                        report.regenerations.push(Regeneration {
                            rule: index,
                            bone: bone.clone(),
                            amount,
                            window: entry.rule.regeneration_window,
                        });
                    }
                }
                DamageOutcome::Broken { predicted_health } => {
                    report.applied = true;
                    self.observers.notify_damaged(&BoneDamaged {
                        bone: bone.clone(),
                        damage: hit.damage,
                        predicted_health,
                        instigator: hit.instigator,
                    });
                    let order = BreakOrder {
                        bone: bone.clone(),
                        world_location: self
                            .geometry
                            .socket_location(bone)
                            .unwrap_or(hit.hit_location),
                        impulse: hit.impulse,
                        hit_location: hit.hit_location,
                        simulate_mode: entry.rule.simulate_mode,
                        instigators: entry.state.instigators.records().to_vec(),
                    };
                    match self.propagator.break_bone(order, self.physics.as_mut(), &mut self.observers) {
                        Ok(event) => {
                            tracing::info!(
                                skeleton = ?self.id,
                                bone = %event.bone,
                                sequence = event.sequence,
                                "Bone broken"
                            );
                            report.broken.push(event.bone);
                        }
                        Err(err) => tracing::warn!(skeleton = ?self.id, "Break not propagated: {}", err),
                    }
                }
            }
        }

        if report.applied {
            self.publish_states();
        }
        report
    }

    /// Give back immediate threshold taken by an earlier non-lethal hit
    ///
    /// `rule` is the position carried by the `Regeneration`. Returns false if
    /// no rule sits there.
    pub fn restore_immediate(&mut self, rule: usize, amount: f32) -> bool {
        let Some(entry) = self.rules.entry_mut(rule) else {
            return false;
        };
        entry.state.restore_immediate(amount);
        self.publish_states();
        true
    }

    fn publish_states(&self) {
        self.propagator.publish_states(self.rules.states());
    }

    /// Attach a replica that mirrors this skeleton through its own physics
    pub fn attach_replica(&mut self, physics: impl PhysicsDriver + Send + 'static) -> ReplicaSkeleton {
        ReplicaSkeleton::new(
            self.id,
            self.propagator.subscribe(),
            self.requests_tx.clone(),
            Box::new(physics),
        )
    }

    /// Handle every pending replica request; returns how many were handled
    pub fn drain_requests(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(request) = self.requests_rx.try_recv() {
            match request {
                AuthorityRequest::SetDamageSurface { surface, reply } => {
                    self.set_damage_surface(surface);
                    if reply.send(Ok(())).is_err() {
                        tracing::debug!(skeleton = ?self.id, "Requester gone before acknowledgement");
                    }
                }
            }
            handled += 1;
        }
        handled
    }

    /// World-space location of a bone socket, if the geometry knows it
    pub fn socket_location(&self, bone: &BoneId) -> Option<Vec3> {
        self.geometry.socket_location(bone)
    }
}

impl BoneHealthQuery for Skeleton {
    fn dismembered_bones(&self) -> Vec<BoneId> {
        self.propagator.broken().as_slice().to_vec()
    }

    fn all_bone_health(&self) -> Vec<BoneHealth> {
        self.rules.all_health()
    }

    fn bone_health(&self, bone: &BoneId) -> f32 {
        self.rules.health(bone)
    }
}

impl DamageSink for Skeleton {
    fn take_point_damage(
        &mut self,
        event: &PointDamageEvent,
        catalog: &DamageTypeCatalog,
        now: SimTime,
    ) -> Result<DamageReport> {
        Ok(self.receive_point_damage(event, catalog, now))
    }

    fn take_radial_damage(
        &mut self,
        event: &RadialDamageEvent,
        catalog: &DamageTypeCatalog,
        now: SimTime,
    ) -> Result<DamageReport> {
        Ok(self.receive_radial_damage(event, catalog, now))
    }
}
