//! Read-only mirror of an authoritative skeleton
//!
//! A replica never decides anything. It applies the authority's break events
//! in sequence order, answers health queries from the replicated rule state,
//! and sends any mutation it wants up the request channel.

use tokio::sync::{mpsc, oneshot};

use crate::core::error::{DismemberError, Result};
use crate::core::types::{BoneHealth, BoneId, DamageSurfaceId, SimTime, SkeletonId};
use crate::propagate::{apply_break, BoneObservers, BreakEvent, BrokenBoneSet, PhysicsDriver, ReplicaFeed};
use crate::replication::messages::{AuthorityRequest, PendingAck};
use crate::router::{DamageTypeCatalog, PointDamageEvent, RadialDamageEvent};
use crate::rules::{health_from_states, RuleState};
use crate::skeleton::{BoneHealthQuery, DamageReport, DamageSink};

pub struct ReplicaSkeleton {
    skeleton: SkeletonId,
    broken: BrokenBoneSet,
    feed: ReplicaFeed,
    requests: mpsc::UnboundedSender<AuthorityRequest>,
    physics: Box<dyn PhysicsDriver + Send>,
    observers: BoneObservers,
    next_sequence: u64,
}

impl std::fmt::Debug for ReplicaSkeleton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicaSkeleton")
            .field("skeleton", &self.skeleton)
            .field("broken", &self.broken)
            .field("next_sequence", &self.next_sequence)
            .finish()
    }
}

impl ReplicaSkeleton {
    pub(crate) fn new(
        skeleton: SkeletonId,
        feed: ReplicaFeed,
        requests: mpsc::UnboundedSender<AuthorityRequest>,
        physics: Box<dyn PhysicsDriver + Send>,
    ) -> Self {
        Self {
            skeleton,
            broken: BrokenBoneSet::new(),
            feed,
            requests,
            physics,
            observers: BoneObservers::new(),
            next_sequence: 0,
        }
    }

    /// Skeleton this replica mirrors
    pub fn skeleton_id(&self) -> SkeletonId {
        self.skeleton
    }

    pub fn observers_mut(&mut self) -> &mut BoneObservers {
        &mut self.observers
    }

    /// Apply every break event that has arrived; returns how many were applied
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.feed.breaks.try_recv() {
            if self.receive(event) {
                applied += 1;
            }
        }
        applied
    }

    fn receive(&mut self, event: BreakEvent) -> bool {
        if event.sequence < self.next_sequence {
            tracing::debug!(bone = %event.bone, sequence = event.sequence, "Ignoring replayed break");
            return false;
        }
        if event.sequence > self.next_sequence {
            tracing::warn!(
                expected = self.next_sequence,
                got = event.sequence,
                "Break log gap on replica"
            );
        }
        if let Err(err) = self.broken.append(event.bone.clone()) {
            tracing::warn!("Replica rejected break: {}", err);
            return false;
        }
        self.next_sequence = event.sequence + 1;
        apply_break(&event, self.physics.as_mut(), &mut self.observers);
        true
    }

    /// Latest replicated rule state
    pub fn rule_states(&self) -> Vec<RuleState> {
        self.feed.rule_states.borrow().clone()
    }

    /// Wait until the authority publishes a new rule-state snapshot
    pub async fn state_changed(&mut self) -> Result<()> {
        self.feed
            .rule_states
            .changed()
            .await
            .map_err(|_| DismemberError::ChannelClosed)
    }

    /// Ask the authority to reassign the damage-receiving surface
    pub fn request_damage_surface(&self, surface: DamageSurfaceId) -> Result<PendingAck> {
        let (reply, ack) = oneshot::channel();
        self.requests
            .send(AuthorityRequest::SetDamageSurface { surface, reply })
            .map_err(|_| DismemberError::ChannelClosed)?;
        Ok(PendingAck::new(ack))
    }
}

impl BoneHealthQuery for ReplicaSkeleton {
    fn dismembered_bones(&self) -> Vec<BoneId> {
        self.broken.as_slice().to_vec()
    }

    fn all_bone_health(&self) -> Vec<BoneHealth> {
        self.feed
            .rule_states
            .borrow()
            .iter()
            .map(|s| BoneHealth::new(s.bone.clone(), s.cumulative_threshold))
            .collect()
    }

    fn bone_health(&self, bone: &BoneId) -> f32 {
        health_from_states(&self.feed.rule_states.borrow(), bone)
    }
}

impl DamageSink for ReplicaSkeleton {
    fn take_point_damage(
        &mut self,
        _event: &PointDamageEvent,
        _catalog: &DamageTypeCatalog,
        _now: SimTime,
    ) -> Result<DamageReport> {
        tracing::warn!(skeleton = ?self.skeleton, "Replica refused point damage");
        Err(DismemberError::NotAuthority("point damage"))
    }

    fn take_radial_damage(
        &mut self,
        _event: &RadialDamageEvent,
        _catalog: &DamageTypeCatalog,
        _now: SimTime,
    ) -> Result<DamageReport> {
        tracing::warn!(skeleton = ?self.skeleton, "Replica refused radial damage");
        Err(DismemberError::NotAuthority("radial damage"))
    }
}
