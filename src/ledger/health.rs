//! Runtime health of one bone and the break decision
//!
//! Two thresholds run side by side. The cumulative threshold is a health
//! pool that every accepted hit drains. The immediate threshold is a burst
//! ceiling; when regeneration is enabled, non-lethal hits lower it for a
//! window so chip damage followed by a big hit can still snap the bone.
//! Whichever is currently lower decides an instant break.

use serde::{Deserialize, Serialize};

use crate::core::types::{DamageTypeId, InstigatorId, SimTime};
use crate::ledger::instigator::InstigatorLedger;
use crate::rules::BoneRule;

/// What a single damage application did to a bone
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Filtered out: no state change, no notifications
    Rejected,
    /// Non-lethal hit. `regenerate` holds the slice of immediate threshold
    /// that was consumed and must be restored after the rule's window.
    Absorbed {
        predicted_health: f32,
        regenerate: Option<f32>,
    },
    /// This hit broke the bone
    Broken { predicted_health: f32 },
    /// The bone was already broken; attribution was updated, thresholds were not
    AlreadyBroken { predicted_health: f32 },
}

impl DamageOutcome {
    /// Did the damage get past the filters?
    pub fn was_applied(&self) -> bool {
        !matches!(self, DamageOutcome::Rejected)
    }

    /// Did this call transition the bone to broken?
    pub fn broke(&self) -> bool {
        matches!(self, DamageOutcome::Broken { .. })
    }
}

/// Mutable per-rule state, owned by the authority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneState {
    /// Remaining health pool, never negative
    pub cumulative_threshold: f32,
    /// Current burst ceiling
    pub immediate_threshold: f32,
    pub instigators: InstigatorLedger,
    pub broken: bool,
}

impl BoneState {
    pub fn from_rule(rule: &BoneRule) -> Self {
        Self {
            cumulative_threshold: rule.cumulative_break_threshold.max(0.0),
            immediate_threshold: rule.immediate_break_threshold,
            instigators: InstigatorLedger::new(),
            broken: false,
        }
    }

    /// Apply one hit and decide whether the bone breaks
    ///
    /// Non-positive or non-finite damage is rejected like a filtered type.
    pub fn apply_damage(
        &mut self,
        rule: &BoneRule,
        damage: f32,
        damage_type: &DamageTypeId,
        instigator: InstigatorId,
        now: SimTime,
    ) -> DamageOutcome {
        if !(damage.is_finite() && damage > 0.0) || !rule.accepts(damage_type) {
            return DamageOutcome::Rejected;
        }

        self.instigators.credit(instigator, damage, now);
        let predicted_health = self.cumulative_threshold - damage;

        if self.broken {
            return DamageOutcome::AlreadyBroken { predicted_health };
        }

        if damage >= self.cumulative_threshold.min(self.immediate_threshold) {
            self.cumulative_threshold = 0.0;
            self.broken = true;
            return DamageOutcome::Broken { predicted_health };
        }

        self.cumulative_threshold -= damage;

        let regenerate = if rule.regenerates() {
            self.immediate_threshold -= damage;
            Some(damage)
        } else {
            None
        };

        DamageOutcome::Absorbed {
            predicted_health,
            regenerate,
        }
    }

    /// Give back a slice of immediate threshold consumed by an earlier hit
    pub fn restore_immediate(&mut self, amount: f32) {
        self.immediate_threshold += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bullet() -> DamageTypeId {
        DamageTypeId::from("bullet")
    }

    #[test]
    fn test_hit_below_both_thresholds_is_absorbed() {
        let rule = BoneRule::new("arm").with_thresholds(30.0, 50.0);
        let mut state = BoneState::from_rule(&rule);
        let outcome = state.apply_damage(&rule, 25.0, &bullet(), InstigatorId::WORLD, 0.0);

        assert_eq!(
            outcome,
            DamageOutcome::Absorbed {
                predicted_health: 25.0,
                regenerate: None
            }
        );
        assert_eq!(state.cumulative_threshold, 25.0);
        assert!(!state.broken);
    }

    #[test]
    fn test_burst_at_immediate_threshold_breaks() {
        let rule = BoneRule::new("arm").with_thresholds(20.0, 50.0);
        let mut state = BoneState::from_rule(&rule);
        let outcome = state.apply_damage(&rule, 20.0, &bullet(), InstigatorId::WORLD, 0.0);

        assert_eq!(outcome, DamageOutcome::Broken { predicted_health: 30.0 });
        assert_eq!(state.cumulative_threshold, 0.0);
        assert!(state.broken);
    }

    #[test]
    fn test_lower_cumulative_governs_break() {
        let rule = BoneRule::new("arm").with_thresholds(100.0, 10.0);
        let mut state = BoneState::from_rule(&rule);
        assert!(state
            .apply_damage(&rule, 10.0, &bullet(), InstigatorId::WORLD, 0.0)
            .broke());
    }

    #[test]
    fn test_non_lethal_hit_lowers_immediate_when_regenerating() {
        let rule = BoneRule::new("arm")
            .with_thresholds(20.0, 50.0)
            .with_regeneration(2.0);
        let mut state = BoneState::from_rule(&rule);
        let outcome = state.apply_damage(&rule, 8.0, &bullet(), InstigatorId::WORLD, 0.0);

        assert_eq!(
            outcome,
            DamageOutcome::Absorbed {
                predicted_health: 42.0,
                regenerate: Some(8.0)
            }
        );
        assert_eq!(state.immediate_threshold, 12.0);

        // 12 >= min(42, 12): the chip damage lowered the bar
        assert!(state
            .apply_damage(&rule, 12.0, &bullet(), InstigatorId::WORLD, 0.5)
            .broke());
    }

    #[test]
    fn test_rejected_damage_changes_nothing() {
        let rule = BoneRule::new("arm").with_whitelist(["fire"]);
        let mut state = BoneState::from_rule(&rule);
        let before = state.clone();
        let outcome = state.apply_damage(&rule, 100.0, &bullet(), InstigatorId::WORLD, 0.0);

        assert_eq!(outcome, DamageOutcome::Rejected);
        assert!(!outcome.was_applied());
        assert_eq!(state, before);
    }

    #[test]
    fn test_non_positive_damage_rejected() {
        let rule = BoneRule::new("arm").with_thresholds(0.0, 0.0);
        let mut state = BoneState::from_rule(&rule);
        for damage in [0.0, -5.0, f32::NAN] {
            let outcome = state.apply_damage(&rule, damage, &bullet(), InstigatorId::WORLD, 0.0);
            assert_eq!(outcome, DamageOutcome::Rejected);
        }
        assert!(!state.broken);
        assert!(state.instigators.is_empty());
    }

    #[test]
    fn test_zero_thresholds_break_on_first_hit() {
        let rule = BoneRule::new("arm").with_thresholds(0.0, -10.0);
        let mut state = BoneState::from_rule(&rule);
        assert_eq!(state.cumulative_threshold, 0.0);
        assert!(state
            .apply_damage(&rule, 0.1, &bullet(), InstigatorId::WORLD, 0.0)
            .broke());
    }

    #[test]
    fn test_broken_bone_credits_without_threshold_change() {
        let rule = BoneRule::new("arm").with_thresholds(20.0, 50.0);
        let mut state = BoneState::from_rule(&rule);
        let shooter = InstigatorId::new();
        state.apply_damage(&rule, 30.0, &bullet(), shooter, 0.0);

        let outcome = state.apply_damage(&rule, 30.0, &bullet(), shooter, 1.0);
        assert_eq!(outcome, DamageOutcome::AlreadyBroken { predicted_health: -30.0 });
        assert!(outcome.was_applied());
        assert!(!outcome.broke());
        assert!(state.broken);
        assert_eq!(state.cumulative_threshold, 0.0);
        assert_eq!(state.instigators.get(shooter).unwrap().damage_dealt, 60.0);
    }

    #[test]
    fn test_restore_immediate() {
        let rule = BoneRule::new("arm").with_regeneration(1.0);
        let mut state = BoneState::from_rule(&rule);
        state.apply_damage(&rule, 5.0, &bullet(), InstigatorId::WORLD, 0.0);
        assert_eq!(state.immediate_threshold, 15.0);
        state.restore_immediate(5.0);
        assert_eq!(state.immediate_threshold, 20.0);
    }
}
