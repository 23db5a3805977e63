//! Dismemberment rules: one per breakable bone
//!
//! A rule names the bone (plus any proxy aliases that count as hits on it),
//! how much of the skeleton goes limp when it breaks, and the two thresholds
//! that decide when it breaks.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::types::{BoneId, DamageTypeId};

/// Default burst ceiling for a single hit
pub const DEFAULT_IMMEDIATE_BREAK_THRESHOLD: f32 = 20.0;
/// Default health pool
pub const DEFAULT_CUMULATIVE_BREAK_THRESHOLD: f32 = 50.0;

/// How much of the skeleton starts simulating physics when a bone breaks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulateMode {
    /// The broken bone and every bone below it
    #[default]
    AllLowerBones,
    /// Only the broken bone's own body
    SelfOnly,
    /// The whole mesh goes ragdoll
    FullMesh,
}

/// Authored rule for one dismemberable bone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoneRule {
    /// Bone that follows this rule
    pub bone: BoneId,
    /// Hits on these bones register as hits on `bone`
    #[serde(default)]
    pub proxy_bones: Vec<BoneId>,
    #[serde(default)]
    pub simulate_mode: SimulateMode,
    /// Damage from one hit at or above this breaks the bone outright
    #[serde(default = "default_immediate")]
    pub immediate_break_threshold: f32,
    /// Total damage before the bone breaks
    #[serde(default = "default_cumulative")]
    pub cumulative_break_threshold: f32,
    /// Non-lethal hits also lower the immediate threshold for a while
    #[serde(default = "default_true")]
    pub regenerate_immediate_over_time: bool,
    /// Seconds (simulation clock) before a lowered immediate threshold recovers
    #[serde(default)]
    pub regeneration_window: f32,
    /// Only point damage can break this bone
    #[serde(default)]
    pub ignore_radial_damage: bool,
    /// If non-empty, only these damage types affect the bone
    #[serde(default)]
    pub damage_type_whitelist: AHashSet<DamageTypeId>,
    /// Damage types that never affect the bone
    #[serde(default)]
    pub damage_type_blacklist: AHashSet<DamageTypeId>,
}

fn default_immediate() -> f32 {
    DEFAULT_IMMEDIATE_BREAK_THRESHOLD
}

fn default_cumulative() -> f32 {
    DEFAULT_CUMULATIVE_BREAK_THRESHOLD
}

fn default_true() -> bool {
    true
}

impl BoneRule {
    /// Rule with default thresholds and no regeneration window
    pub fn new(bone: impl Into<BoneId>) -> Self {
        Self {
            bone: bone.into(),
            proxy_bones: Vec::new(),
            simulate_mode: SimulateMode::default(),
            immediate_break_threshold: DEFAULT_IMMEDIATE_BREAK_THRESHOLD,
            cumulative_break_threshold: DEFAULT_CUMULATIVE_BREAK_THRESHOLD,
            regenerate_immediate_over_time: true,
            regeneration_window: 0.0,
            ignore_radial_damage: false,
            damage_type_whitelist: AHashSet::new(),
            damage_type_blacklist: AHashSet::new(),
        }
    }

    pub fn with_thresholds(mut self, immediate: f32, cumulative: f32) -> Self {
        self.immediate_break_threshold = immediate;
        self.cumulative_break_threshold = cumulative;
        self
    }

    pub fn with_proxies<I, B>(mut self, proxies: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<BoneId>,
    {
        self.proxy_bones.extend(proxies.into_iter().map(Into::into));
        self
    }

    pub fn with_simulate_mode(mut self, mode: SimulateMode) -> Self {
        self.simulate_mode = mode;
        self
    }

    /// Enable windowed regeneration of the immediate threshold
    pub fn with_regeneration(mut self, window_seconds: f32) -> Self {
        self.regenerate_immediate_over_time = true;
        self.regeneration_window = window_seconds;
        self
    }

    pub fn without_regeneration(mut self) -> Self {
        self.regenerate_immediate_over_time = false;
        self
    }

    pub fn ignoring_radial(mut self) -> Self {
        self.ignore_radial_damage = true;
        self
    }

    pub fn with_whitelist<I, D>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DamageTypeId>,
    {
        self.damage_type_whitelist.extend(types.into_iter().map(Into::into));
        self
    }

    pub fn with_blacklist<I, D>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DamageTypeId>,
    {
        self.damage_type_blacklist.extend(types.into_iter().map(Into::into));
        self
    }

    /// Does a hit on `bone` count as a hit on this rule?
    pub fn matches(&self, bone: &BoneId) -> bool {
        self.bone == *bone || self.proxy_bones.contains(bone)
    }

    /// Does this damage type affect the bone?
    ///
    /// A non-empty whitelist is exclusive; the blacklist is checked after it.
    pub fn accepts(&self, damage_type: &DamageTypeId) -> bool {
        if !self.damage_type_whitelist.is_empty()
            && !self.damage_type_whitelist.contains(damage_type)
        {
            return false;
        }
        !self.damage_type_blacklist.contains(damage_type)
    }

    /// Whether a non-lethal hit should lower the immediate threshold
    pub fn regenerates(&self) -> bool {
        self.regenerate_immediate_over_time && self.regeneration_window > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_primary_and_proxy() {
        let rule = BoneRule::new("upperarm_l").with_proxies(["upperarm_twist_01_l"]);
        assert!(rule.matches(&BoneId::from("upperarm_l")));
        assert!(rule.matches(&BoneId::from("upperarm_twist_01_l")));
        assert!(!rule.matches(&BoneId::from("lowerarm_l")));
    }

    #[test]
    fn test_empty_filters_accept_everything() {
        let rule = BoneRule::new("head");
        assert!(rule.accepts(&DamageTypeId::from("bullet")));
        assert!(rule.accepts(&DamageTypeId::from("fire")));
    }

    #[test]
    fn test_whitelist_is_exclusive() {
        let rule = BoneRule::new("head").with_whitelist(["fire"]);
        assert!(rule.accepts(&DamageTypeId::from("fire")));
        assert!(!rule.accepts(&DamageTypeId::from("bullet")));
    }

    #[test]
    fn test_blacklist_excludes() {
        let rule = BoneRule::new("head").with_blacklist(["fall"]);
        assert!(!rule.accepts(&DamageTypeId::from("fall")));
        assert!(rule.accepts(&DamageTypeId::from("bullet")));
    }

    #[test]
    fn test_blacklist_wins_over_whitelist() {
        let rule = BoneRule::new("head")
            .with_whitelist(["fire"])
            .with_blacklist(["fire"]);
        assert!(!rule.accepts(&DamageTypeId::from("fire")));
    }

    #[test]
    fn test_regeneration_needs_positive_window() {
        assert!(!BoneRule::new("head").regenerates());
        assert!(BoneRule::new("head").with_regeneration(2.0).regenerates());
        assert!(!BoneRule::new("head")
            .with_regeneration(2.0)
            .without_regeneration()
            .regenerates());
    }

    #[test]
    fn test_toml_defaults() {
        let rule: BoneRule = toml::from_str(r#"bone = "thigh_r""#).unwrap();
        assert_eq!(rule.immediate_break_threshold, DEFAULT_IMMEDIATE_BREAK_THRESHOLD);
        assert_eq!(rule.cumulative_break_threshold, DEFAULT_CUMULATIVE_BREAK_THRESHOLD);
        assert!(rule.regenerate_immediate_over_time);
        assert_eq!(rule.regeneration_window, 0.0);
        assert_eq!(rule.simulate_mode, SimulateMode::AllLowerBones);
    }
}
