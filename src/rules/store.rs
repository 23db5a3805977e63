//! Rule store: the ordered rule/state pairs of one skeleton

use serde::{Deserialize, Serialize};

use crate::core::types::{BoneHealth, BoneId};
use crate::ledger::BoneState;
use crate::rules::bone_rule::BoneRule;

/// Health reported for a bone no rule knows about
pub const UNKNOWN_BONE_HEALTH: f32 = -1.0;

/// An authored rule and its runtime state
#[derive(Debug, Clone)]
pub struct RuleEntry {
    pub rule: BoneRule,
    pub state: BoneState,
}

/// Replicated view of one rule's thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleState {
    pub bone: BoneId,
    pub proxy_bones: Vec<BoneId>,
    pub cumulative_threshold: f32,
    pub immediate_threshold: f32,
    pub broken: bool,
}

impl RuleState {
    pub fn matches(&self, bone: &BoneId) -> bool {
        self.bone == *bone || self.proxy_bones.contains(bone)
    }
}

/// Health of `bone` from a list of replicated rule states
///
/// Prefers a rule whose primary bone matches, then falls back to proxies.
pub fn health_from_states(states: &[RuleState], bone: &BoneId) -> f32 {
    states
        .iter()
        .find(|s| s.bone == *bone)
        .or_else(|| states.iter().find(|s| s.matches(bone)))
        .map(|s| s.cumulative_threshold)
        .unwrap_or(UNKNOWN_BONE_HEALTH)
}

/// Ordered rules for one skeleton instance
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    entries: Vec<RuleEntry>,
}

impl RuleStore {
    pub fn new(rules: Vec<BoneRule>) -> Self {
        let entries = rules
            .into_iter()
            .map(|rule| RuleEntry {
                state: BoneState::from_rule(&rule),
                rule,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    /// Every rule a hit on `bone` applies to (primary or proxy match), with
    /// its position in the store
    pub fn matching_mut<'a>(
        &'a mut self,
        bone: &'a BoneId,
    ) -> impl Iterator<Item = (usize, &'a mut RuleEntry)> + 'a {
        self.entries
            .iter_mut()
            .enumerate()
            .filter(move |(_, e)| e.rule.matches(bone))
    }

    /// Rule at a position returned by `matching_mut`
    ///
    /// Two rules may share a primary bone, so this is the only exact handle.
    pub fn entry_mut(&mut self, index: usize) -> Option<&mut RuleEntry> {
        self.entries.get_mut(index)
    }

    /// Rule whose primary bone is `bone`
    pub fn get(&self, bone: &BoneId) -> Option<&RuleEntry> {
        self.entries.iter().find(|e| e.rule.bone == *bone)
    }

    /// Remaining cumulative threshold of every rule, in rule order
    pub fn all_health(&self) -> Vec<BoneHealth> {
        self.entries
            .iter()
            .map(|e| BoneHealth::new(e.rule.bone.clone(), e.state.cumulative_threshold))
            .collect()
    }

    /// Remaining cumulative threshold of one bone, or UNKNOWN_BONE_HEALTH
    pub fn health(&self, bone: &BoneId) -> f32 {
        self.get(bone)
            .or_else(|| self.entries.iter().find(|e| e.rule.matches(bone)))
            .map(|e| e.state.cumulative_threshold)
            .unwrap_or(UNKNOWN_BONE_HEALTH)
    }

    /// Snapshot for replication
    pub fn states(&self) -> Vec<RuleState> {
        self.entries
            .iter()
            .map(|e| RuleState {
                bone: e.rule.bone.clone(),
                proxy_bones: e.rule.proxy_bones.clone(),
                cumulative_threshold: e.state.cumulative_threshold,
                immediate_threshold: e.state.immediate_threshold,
                broken: e.state.broken,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RuleStore {
        RuleStore::new(vec![
            BoneRule::new("upperarm_l")
                .with_thresholds(20.0, 40.0)
                .with_proxies(["upperarm_twist_l"]),
            BoneRule::new("lowerarm_l")
                .with_thresholds(20.0, 30.0)
                .with_proxies(["upperarm_twist_l"]),
            BoneRule::new("head").with_thresholds(20.0, 60.0),
        ])
    }

    #[test]
    fn test_proxy_fans_out_to_every_matching_rule() {
        let mut store = store();
        let bone = BoneId::from("upperarm_twist_l");
        let matched: Vec<_> = store
            .matching_mut(&bone)
            .map(|(index, e)| (index, e.rule.bone.clone()))
            .collect();
        assert_eq!(
            matched,
            vec![(0, BoneId::from("upperarm_l")), (1, BoneId::from("lowerarm_l"))]
        );
    }

    #[test]
    fn test_entry_mut_addresses_rules_sharing_a_bone() {
        let mut store = RuleStore::new(vec![BoneRule::new("arm"), BoneRule::new("arm")]);
        if let Some(entry) = store.entry_mut(1) {
            entry.state.immediate_threshold = 5.0;
        }
        assert_eq!(store.entries()[0].state.immediate_threshold, 20.0);
        assert_eq!(store.entries()[1].state.immediate_threshold, 5.0);
        assert!(store.entry_mut(2).is_none());
    }

    #[test]
    fn test_unknown_bone_matches_nothing() {
        let mut store = store();
        let bone = BoneId::from("tail_03");
        assert_eq!(store.matching_mut(&bone).count(), 0);
        assert_eq!(store.health(&bone), UNKNOWN_BONE_HEALTH);
    }

    #[test]
    fn test_health_snapshot_in_rule_order() {
        let store = store();
        let health = store.all_health();
        assert_eq!(health.len(), 3);
        assert_eq!(health[0], BoneHealth::new("upperarm_l".into(), 40.0));
        assert_eq!(health[2], BoneHealth::new("head".into(), 60.0));
    }

    #[test]
    fn test_single_bone_health_prefers_primary() {
        let store = store();
        assert_eq!(store.health(&"lowerarm_l".into()), 30.0);
        assert_eq!(store.health(&"upperarm_twist_l".into()), 40.0);
    }

    #[test]
    fn test_replicated_states_answer_like_the_store() {
        let store = store();
        let states = store.states();
        for bone in ["upperarm_l", "lowerarm_l", "upperarm_twist_l", "head", "tail"] {
            let bone = BoneId::from(bone);
            assert_eq!(health_from_states(&states, &bone), store.health(&bone));
        }
    }
}
