//! Rules file: damage types, bone rules and optional rig geometry
//!
//! A rules file is plain TOML:
//!
//! ```toml
//! [[damage_types]]
//! id = "bullet"
//! impulse = 120.0
//!
//! [[bones]]
//! bone = "upperarm_l"
//! proxy_bones = ["lowerarm_l", "hand_l"]
//! immediate_break_threshold = 30.0
//! regeneration_window = 2.0
//!
//! [geometry]
//! reference_point = [0.0, 1.0, 0.0]
//!
//! [geometry.sockets]
//! upperarm_l = [-0.25, 1.45, 0.0]
//! ```
//!
//! Every bone field except `bone` falls back to the component defaults
//! (immediate 20, cumulative 50, regeneration on, window 0, all lower bones
//! simulate). Questionable values are accepted and reported by `validate`.

use std::collections::BTreeMap;
use std::path::Path;

use ahash::AHashMap;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::BoneId;
use crate::router::{DamageType, DamageTypeCatalog, StaticGeometry};
use crate::rules::BoneRule;

/// Rig used when no rules file is given
const HUMANOID_RULES: &str = include_str!("../../data/humanoid.toml");

/// Socket positions for rigs without a live mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryConfig {
    #[serde(default)]
    pub reference_point: Vec3,
    #[serde(default)]
    pub sockets: BTreeMap<BoneId, Vec3>,
}

/// Parsed rules file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RulesFile {
    #[serde(default)]
    pub damage_types: Vec<DamageType>,
    #[serde(default)]
    pub bones: Vec<BoneRule>,
    #[serde(default)]
    pub geometry: Option<GeometryConfig>,
}

impl RulesFile {
    /// Parse rules from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let file: RulesFile = toml::from_str(content)?;
        Ok(file)
    }

    /// Load rules from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file = Self::parse_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            bones = file.bones.len(),
            damage_types = file.damage_types.len(),
            "Loaded rules file"
        );
        Ok(file)
    }

    /// Bundled humanoid rig
    pub fn humanoid() -> Result<Self> {
        Self::parse_toml(HUMANOID_RULES)
    }

    pub fn catalog(&self) -> DamageTypeCatalog {
        DamageTypeCatalog::from_types(self.damage_types.iter().cloned())
    }

    /// Static geometry from the `[geometry]` table; origin-only if absent
    pub fn static_geometry(&self) -> StaticGeometry {
        let Some(config) = &self.geometry else {
            return StaticGeometry::default();
        };
        config
            .sockets
            .iter()
            .fold(StaticGeometry::new(config.reference_point), |geometry, (bone, location)| {
                geometry.with_socket(bone.clone(), *location)
            })
    }

    /// Report suspicious but legal content
    ///
    /// Nothing here is fatal; each warning is also logged.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut primaries: AHashMap<&BoneId, usize> = AHashMap::new();

        for (index, rule) in self.bones.iter().enumerate() {
            if rule.immediate_break_threshold <= 0.0 {
                warnings.push(format!(
                    "bone '{}' has non-positive immediate threshold {}; any hit breaks it",
                    rule.bone, rule.immediate_break_threshold
                ));
            }
            if rule.cumulative_break_threshold <= 0.0 {
                warnings.push(format!(
                    "bone '{}' has non-positive cumulative threshold {}; any hit breaks it",
                    rule.bone, rule.cumulative_break_threshold
                ));
            }
            if let Some(first) = primaries.insert(&rule.bone, index) {
                warnings.push(format!(
                    "bone '{}' has rules at positions {} and {}; both apply",
                    rule.bone, first, index
                ));
            }
        }

        for rule in &self.bones {
            for proxy in &rule.proxy_bones {
                let owners: Vec<&BoneId> = self
                    .bones
                    .iter()
                    .filter(|other| other.bone != rule.bone && other.matches(proxy))
                    .map(|other| &other.bone)
                    .collect();
                for owner in owners {
                    warnings.push(format!(
                        "proxy '{}' of '{}' is also claimed by '{}'; hits fan out to both",
                        proxy, rule.bone, owner
                    ));
                }
            }
        }

        for warning in &warnings {
            tracing::warn!("Rules file: {}", warning);
        }
        warnings
    }
}
