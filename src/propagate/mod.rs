//! Break propagation
//!
//! The authority is the only node that decides a break. Once it does, the
//! bone goes into the append-only broken log, the break is applied locally
//! (physics directives, then observers) and the same event is pushed down a
//! reliable, ordered channel to every replica, which applies it the same way.
//! Rule state is replicated separately as a latest-value snapshot.

pub mod broken;
pub mod observer;
pub mod physics;

pub use broken::BrokenBoneSet;
pub use observer::{BoneBroken, BoneDamaged, BoneObservers, ListenerId};
pub use physics::{PhysicsDirective, PhysicsDriver, PhysicsLog, SimulationScope};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use crate::core::error::Result;
use crate::core::types::BoneId;
use crate::ledger::InstigatorRecord;
use crate::rules::{RuleState, SimulateMode};

/// Everything needed to carry out a break, before it is sequenced
#[derive(Debug, Clone, PartialEq)]
pub struct BreakOrder {
    pub bone: BoneId,
    pub world_location: Vec3,
    pub impulse: Vec3,
    pub hit_location: Vec3,
    pub simulate_mode: SimulateMode,
    pub instigators: Vec<InstigatorRecord>,
}

/// A sequenced break, as replicated to every observer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakEvent {
    /// Position in the broken-bone log
    pub sequence: u64,
    pub bone: BoneId,
    pub world_location: Vec3,
    pub impulse: Vec3,
    pub hit_location: Vec3,
    pub simulate_mode: SimulateMode,
    pub instigators: Vec<InstigatorRecord>,
}

impl BreakEvent {
    fn sequenced(order: BreakOrder, sequence: u64) -> Self {
        Self {
            sequence,
            bone: order.bone,
            world_location: order.world_location,
            impulse: order.impulse,
            hit_location: order.hit_location,
            simulate_mode: order.simulate_mode,
            instigators: order.instigators,
        }
    }
}

/// Carry out a break on this node: physics first, then observers
pub fn apply_break(event: &BreakEvent, physics: &mut dyn PhysicsDriver, observers: &mut BoneObservers) {
    physics.enable_simulation(event.simulate_mode.into(), &event.bone);
    physics.break_constraint(event.impulse, event.hit_location, &event.bone);
    observers.notify_broken(&BoneBroken {
        bone: event.bone.clone(),
        world_location: event.world_location,
        instigators: event.instigators.clone(),
    });
}

/// Receiving ends handed to a new replica
#[derive(Debug)]
pub struct ReplicaFeed {
    pub breaks: mpsc::UnboundedReceiver<BreakEvent>,
    pub rule_states: watch::Receiver<Vec<RuleState>>,
}

/// Authority-side broken log plus the replication fan-out
#[derive(Debug)]
pub struct BreakPropagator {
    broken: BrokenBoneSet,
    history: Vec<BreakEvent>,
    replicas: Vec<mpsc::UnboundedSender<BreakEvent>>,
    rule_states: watch::Sender<Vec<RuleState>>,
}

impl BreakPropagator {
    pub fn new(initial_states: Vec<RuleState>) -> Self {
        let (rule_states, _) = watch::channel(initial_states);
        Self {
            broken: BrokenBoneSet::new(),
            history: Vec::new(),
            replicas: Vec::new(),
            rule_states,
        }
    }

    pub fn broken(&self) -> &BrokenBoneSet {
        &self.broken
    }

    /// Every break issued so far, in order
    pub fn history(&self) -> &[BreakEvent] {
        &self.history
    }

    pub fn replica_count(&self) -> usize {
        self.replicas.len()
    }

    /// Sequence, apply locally and replicate a break
    ///
    /// Fails without side effects if the bone is already in the broken log.
    pub fn break_bone(
        &mut self,
        order: BreakOrder,
        physics: &mut dyn PhysicsDriver,
        observers: &mut BoneObservers,
    ) -> Result<BreakEvent> {
        let index = self.broken.append(order.bone.clone())?;
        let event = BreakEvent::sequenced(order, index as u64);

        apply_break(&event, physics, observers);

        self.replicas.retain(|replica| {
            let delivered = replica.send(event.clone()).is_ok();
            if !delivered {
                tracing::debug!("Dropping disconnected replica");
            }
            delivered
        });
        self.history.push(event.clone());

        Ok(event)
    }

    /// Replace the replicated rule-state snapshot
    pub fn publish_states(&self, states: Vec<RuleState>) {
        self.rule_states.send_replace(states);
    }

    /// Attach a new replica; it first receives every break already issued
    pub fn subscribe(&mut self) -> ReplicaFeed {
        let (tx, breaks) = mpsc::unbounded_channel();
        for event in &self.history {
            // The receiver is alive in this scope, so replay cannot fail
            let _ = tx.send(event.clone());
        }
        self.replicas.push(tx);
        ReplicaFeed {
            breaks,
            rule_states: self.rule_states.subscribe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn order(bone: &str) -> BreakOrder {
        BreakOrder {
            bone: bone.into(),
            world_location: Vec3::new(0.0, 0.0, 1.0),
            impulse: Vec3::X,
            hit_location: Vec3::new(0.1, 0.0, 1.0),
            simulate_mode: SimulateMode::SelfOnly,
            instigators: Vec::new(),
        }
    }

    #[test]
    fn test_break_applies_physics_then_observers() {
        let mut propagator = BreakPropagator::new(Vec::new());
        let physics = PhysicsLog::new();
        let mut driver = physics.clone();
        let mut observers = BoneObservers::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        observers.on_broken(move |e| sink.lock().unwrap().push(e.bone.clone()));

        let event = propagator.break_bone(order("hand_l"), &mut driver, &mut observers).unwrap();

        assert_eq!(event.sequence, 0);
        assert_eq!(
            physics.directives(),
            vec![
                PhysicsDirective::EnableSimulation {
                    scope: SimulationScope::BoneOnly,
                    bone: "hand_l".into()
                },
                PhysicsDirective::BreakConstraint {
                    impulse: Vec3::X,
                    location: Vec3::new(0.1, 0.0, 1.0),
                    bone: "hand_l".into()
                },
            ]
        );
        assert_eq!(*seen.lock().unwrap(), vec![BoneId::from("hand_l")]);
        assert!(propagator.broken().contains(&"hand_l".into()));
    }

    #[test]
    fn test_second_break_of_same_bone_has_no_effects() {
        let mut propagator = BreakPropagator::new(Vec::new());
        let physics = PhysicsLog::new();
        let mut driver = physics.clone();
        let mut observers = BoneObservers::new();
        let mut feed = propagator.subscribe();

        propagator.break_bone(order("head"), &mut driver, &mut observers).unwrap();
        assert!(propagator.break_bone(order("head"), &mut driver, &mut observers).is_err());

        assert_eq!(physics.len(), 2);
        assert_eq!(propagator.history().len(), 1);
        assert!(feed.breaks.try_recv().is_ok());
        assert!(feed.breaks.try_recv().is_err());
    }

    #[test]
    fn test_late_subscriber_gets_history_in_order() {
        let mut propagator = BreakPropagator::new(Vec::new());
        let mut driver = PhysicsLog::new();
        let mut observers = BoneObservers::new();
        propagator.break_bone(order("hand_l"), &mut driver, &mut observers).unwrap();
        propagator.break_bone(order("hand_r"), &mut driver, &mut observers).unwrap();

        let mut feed = propagator.subscribe();
        propagator.break_bone(order("head"), &mut driver, &mut observers).unwrap();

        let mut bones = Vec::new();
        while let Ok(event) = feed.breaks.try_recv() {
            bones.push((event.sequence, event.bone));
        }
        assert_eq!(
            bones,
            vec![(0, "hand_l".into()), (1, "hand_r".into()), (2, "head".into())]
        );
    }

    #[test]
    fn test_dropped_replica_is_pruned() {
        let mut propagator = BreakPropagator::new(Vec::new());
        let mut driver = PhysicsLog::new();
        let mut observers = BoneObservers::new();
        let feed = propagator.subscribe();
        assert_eq!(propagator.replica_count(), 1);
        drop(feed);

        propagator.break_bone(order("head"), &mut driver, &mut observers).unwrap();
        assert_eq!(propagator.replica_count(), 0);
    }

    #[test]
    fn test_published_states_reach_subscribers() {
        let mut propagator = BreakPropagator::new(Vec::new());
        let feed = propagator.subscribe();
        propagator.publish_states(vec![RuleState {
            bone: "head".into(),
            proxy_bones: Vec::new(),
            cumulative_threshold: 10.0,
            immediate_threshold: 20.0,
            broken: false,
        }]);
        assert_eq!(feed.rule_states.borrow().len(), 1);
    }
}
