//! Observer hooks: "bone damaged" and "bone broken"
//!
//! Both channels are multicast listener lists. "Bone broken" also has one
//! local override slot for presentation, invoked before the listeners.
//! Notifications are fire-and-forget.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::{BoneId, InstigatorId};
use crate::ledger::InstigatorRecord;

/// A bone took damage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneDamaged {
    pub bone: BoneId,
    pub damage: f32,
    /// Cumulative threshold minus this hit, before any break pins it to 0
    pub predicted_health: f32,
    pub instigator: InstigatorId,
}

/// A bone was severed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneBroken {
    pub bone: BoneId,
    pub world_location: Vec3,
    pub instigators: Vec<InstigatorRecord>,
}

pub type DamagedListener = Box<dyn FnMut(&BoneDamaged) + Send>;
pub type BrokenListener = Box<dyn FnMut(&BoneBroken) + Send>;

/// Handle returned when registering a listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Listener registry of one skeleton (authority or replica)
#[derive(Default)]
pub struct BoneObservers {
    next_id: u64,
    damaged: Vec<(ListenerId, DamagedListener)>,
    broken: Vec<(ListenerId, BrokenListener)>,
    broken_override: Option<BrokenListener>,
}

impl std::fmt::Debug for BoneObservers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoneObservers")
            .field("damaged", &self.damaged.len())
            .field("broken", &self.broken.len())
            .field("broken_override", &self.broken_override.is_some())
            .finish()
    }
}

impl BoneObservers {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn on_damaged(&mut self, listener: impl FnMut(&BoneDamaged) + Send + 'static) -> ListenerId {
        let id = self.next_id();
        self.damaged.push((id, Box::new(listener)));
        id
    }

    pub fn on_broken(&mut self, listener: impl FnMut(&BoneBroken) + Send + 'static) -> ListenerId {
        let id = self.next_id();
        self.broken.push((id, Box::new(listener)));
        id
    }

    /// Unregister a listener from whichever channel holds it
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.damaged.len() + self.broken.len();
        self.damaged.retain(|(listener, _)| *listener != id);
        self.broken.retain(|(listener, _)| *listener != id);
        before != self.damaged.len() + self.broken.len()
    }

    /// Install the presentation override, detaching any previous one
    pub fn set_broken_override(
        &mut self,
        hook: impl FnMut(&BoneBroken) + Send + 'static,
    ) -> Option<BrokenListener> {
        self.broken_override.replace(Box::new(hook))
    }

    pub fn clear_broken_override(&mut self) -> Option<BrokenListener> {
        self.broken_override.take()
    }

    pub fn listener_count(&self) -> usize {
        self.damaged.len() + self.broken.len()
    }

    pub fn notify_damaged(&mut self, event: &BoneDamaged) {
        for (_, listener) in &mut self.damaged {
            listener(event);
        }
    }

    pub fn notify_broken(&mut self, event: &BoneBroken) {
        if let Some(hook) = &mut self.broken_override {
            hook(event);
        }
        for (_, listener) in &mut self.broken {
            listener(event);
        }
    }
}
