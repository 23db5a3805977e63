//! Damage router: turns point and radial events into per-bone hits

pub mod bindings;
pub mod damage_type;
pub mod events;
pub mod geometry;

pub use bindings::{Binding, DamageBindings, DamageHandler};
pub use damage_type::{DamageType, DamageTypeCatalog};
pub use events::{BoneHit, PointDamageEvent, RadialDamageEvent};
pub use geometry::{BoneGeometry, StaticGeometry};

use crate::core::types::DamageSurfaceId;
use crate::rules::RuleStore;

/// Resolve a point hit to its bone
///
/// Hits on any surface other than `damage_surface` are discarded. The impulse
/// points along the shot, scaled by the damage type's impulse magnitude.
pub fn route_point(
    event: &PointDamageEvent,
    damage_surface: DamageSurfaceId,
    catalog: &DamageTypeCatalog,
) -> Option<BoneHit> {
    if event.hit_surface != damage_surface {
        return None;
    }
    Some(BoneHit {
        bone: event.bone.clone(),
        damage: event.damage,
        damage_type: event.damage_type.clone(),
        instigator: event.instigator,
        impulse: event.direction.normalize_or_zero() * catalog.impulse(&event.damage_type),
        hit_location: event.hit_location,
    })
}

/// Resolve a blast to every exposed bone
///
/// A bone is exposed when its socket is closer to the origin than the
/// skeleton's reference point is, a cheap stand-in for line of sight. Rules
/// that ignore radial damage, and bones the geometry cannot place, are skipped.
pub fn route_radial(
    event: &RadialDamageEvent,
    rules: &RuleStore,
    geometry: &dyn BoneGeometry,
    catalog: &DamageTypeCatalog,
) -> Vec<BoneHit> {
    let reference_distance = event.origin.distance(geometry.reference_point());
    let impulse = catalog.impulse(&event.damage_type);

    rules
        .entries()
        .iter()
        .filter(|entry| !entry.rule.ignore_radial_damage)
        .filter_map(|entry| {
            let socket = geometry.socket_location(&entry.rule.bone)?;
            if socket.distance(event.origin) >= reference_distance {
                return None;
            }
            Some(BoneHit {
                bone: entry.rule.bone.clone(),
                damage: event.damage,
                damage_type: event.damage_type.clone(),
                instigator: event.instigator,
                impulse: (socket - event.origin).normalize_or_zero() * impulse,
                hit_location: event.origin,
            })
        })
        .collect()
}
