//! Tunables for contour generation, bone extraction and binding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{skeleton::Archetype, RigError};

/// Everything a caller can tune. Missing fields in JSON take their defaults.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub struct RigConfig {
    pub contour: ContourConfig,
    pub bones: BoneConfig,
    pub bind: BindConfig,
    pub weight: WeightConfig,
}

impl RigConfig {
    pub fn from_json(json: &str) -> Result<Self, RigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, RigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ContourConfig {
    /// Steps an arced segment is sampled with before its sides are refitted.
    pub samples: usize,
    /// Fitting tolerance for the refitted sides, in font units.
    pub tolerance: f64,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            samples: 100,
            tolerance: 2.0,
        }
    }
}

/// Bones cut from each straight and each arced segment.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentCounts {
    pub straight: usize,
    pub arced: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BoneConfig {
    pub straight: usize,
    pub arced: usize,
    pub overrides: BTreeMap<Archetype, SegmentCounts>,
}

impl Default for BoneConfig {
    fn default() -> Self {
        Self {
            straight: 4,
            arced: 8,
            overrides: BTreeMap::new(),
        }
    }
}

impl BoneConfig {
    pub fn counts(&self, archetype: Archetype) -> SegmentCounts {
        self.overrides
            .get(&archetype)
            .copied()
            .unwrap_or(SegmentCounts {
                straight: self.straight,
                arced: self.arced,
            })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct BindConfig {
    /// A bone influences points within this many bone lengths of it.
    pub distance_threshold: f64,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 1.5,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WeightConfig {
    /// How far to either side of a bone the outline is searched for.
    pub reach: f64,
    /// Steps each outline curve is sampled with.
    pub samples: usize,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            reach: 100.0,
            samples: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_the_default() {
        assert_eq!(RigConfig::from_json("{}").unwrap(), RigConfig::default());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = RigConfig::from_json(
            r#"{
                "bind": { "distance_threshold": 3.0 },
                "bones": { "overrides": { "heng_pie": { "straight": 2, "arced": 6 } } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.bind.distance_threshold, 3.0);
        assert_eq!(config.contour.tolerance, 2.0);
        assert_eq!(
            config.bones.counts(Archetype::HengPie),
            SegmentCounts {
                straight: 2,
                arced: 6
            }
        );
        assert_eq!(config.bones.counts(Archetype::Line).straight, 4);
    }

    #[test]
    fn bad_json_is_a_config_error() {
        assert!(matches!(
            RigConfig::from_json("{ \"bind\": 3 }"),
            Err(RigError::Config(_))
        ));
    }

    #[test]
    fn config_survives_json() {
        let mut config = RigConfig::default();
        config.bones.overrides.insert(
            Archetype::Curve,
            SegmentCounts {
                straight: 1,
                arced: 16,
            },
        );
        let json = config.to_json().unwrap();
        assert_eq!(RigConfig::from_json(&json).unwrap(), config);
    }
}
