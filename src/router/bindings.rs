//! Damage channel bindings
//!
//! Each incoming channel (point, radial) has exactly one active handler: the
//! built-in router, or a custom handler the game swapped in. Rebinding always
//! detaches whatever was bound before attaching the new handler.

use crate::router::events::{PointDamageEvent, RadialDamageEvent};

/// Custom handler for a damage channel
pub type DamageHandler<E> = Box<dyn FnMut(&E) + Send>;

/// The active handler of one channel
pub enum Binding<E> {
    /// Route through the skeleton's own damage pipeline
    Builtin,
    /// Hand the raw event to a custom handler instead
    Custom(DamageHandler<E>),
}

impl<E> Binding<E> {
    pub fn is_builtin(&self) -> bool {
        matches!(self, Binding::Builtin)
    }
}

impl<E> Default for Binding<E> {
    fn default() -> Self {
        Binding::Builtin
    }
}

impl<E> std::fmt::Debug for Binding<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Binding::Builtin => f.write_str("Builtin"),
            Binding::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Point and radial bindings of one skeleton
#[derive(Debug, Default)]
pub struct DamageBindings {
    pub point: Binding<PointDamageEvent>,
    pub radial: Binding<RadialDamageEvent>,
}

impl DamageBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the point handler; returns the handler that was detached
    pub fn rebind_point(&mut self, handler: DamageHandler<PointDamageEvent>) -> Binding<PointDamageEvent> {
        std::mem::replace(&mut self.point, Binding::Custom(handler))
    }

    /// Replace the radial handler; returns the handler that was detached
    pub fn rebind_radial(&mut self, handler: DamageHandler<RadialDamageEvent>) -> Binding<RadialDamageEvent> {
        std::mem::replace(&mut self.radial, Binding::Custom(handler))
    }

    /// Go back to the built-in point router
    pub fn reset_point(&mut self) -> Binding<PointDamageEvent> {
        std::mem::take(&mut self.point)
    }

    /// Go back to the built-in radial router
    pub fn reset_radial(&mut self) -> Binding<RadialDamageEvent> {
        std::mem::take(&mut self.radial)
    }
}
