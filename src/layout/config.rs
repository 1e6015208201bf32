//! Layout Configuration
//!
//! Physics constants for the force-directed layout. Everything here is
//! tunable at runtime through [`super::LayoutEngine::set_config`], which
//! validates before applying.

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};

pub use crate::core::config::ConfigError;
use crate::core::config::env_override;

/// Largest grid reach (in cells) scanned before falling back to all pairs.
pub const MAX_GRID_REACH: i32 = 8;

/// How repulsion pairs are found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepulsionMode {
    /// Uniform 3D bucketing; only nearby cells are scanned
    #[default]
    Grid,
    /// Every active pair; for small graphs and cross-checking
    AllPairs,
}

impl fmt::Display for RepulsionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepulsionMode::Grid => write!(f, "grid"),
            RepulsionMode::AllPairs => write!(f, "all-pairs"),
        }
    }
}

impl FromStr for RepulsionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(RepulsionMode::Grid),
            "all-pairs" | "allpairs" | "all_pairs" => Ok(RepulsionMode::AllPairs),
            other => Err(other.to_string()),
        }
    }
}

/// Force-directed layout constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Global multiplier on accumulated force
    pub force_strength: f32,
    /// Pairwise repulsion numerator (force = repulsion / d²)
    pub repulsion_force: f32,
    /// Edge pull per unit of distance
    pub attraction_force: f32,
    /// Velocity retained per tick, in (0, 1)
    pub damping: f32,
    /// Pull toward the origin per unit of distance
    pub center_force: f32,
    /// Force to velocity scale
    pub time_scale: f32,
    /// Velocity to displacement scale
    pub position_scale: f32,
    /// Pairs farther apart than this are not repelled
    pub repulsion_cutoff: f32,
    /// Spatial grid cell edge length
    pub cell_size: f32,
    /// Floor applied to pair distances
    pub min_distance: f32,
    /// Pair search strategy
    pub repulsion_mode: RepulsionMode,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            force_strength: 25.0,
            repulsion_force: 100.0,
            attraction_force: 0.1,
            damping: 0.9,
            center_force: 0.05,
            time_scale: 0.001,
            position_scale: 0.1,
            repulsion_cutoff: 140.0,
            cell_size: 50.0,
            min_distance: 0.1,
            repulsion_mode: RepulsionMode::Grid,
        }
    }
}

impl LayoutConfig {
    /// Defaults overridden by any `GRAPH_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        env_override("GRAPH_FORCE_STRENGTH", &mut config.force_strength)?;
        env_override("GRAPH_REPULSION", &mut config.repulsion_force)?;
        env_override("GRAPH_ATTRACTION", &mut config.attraction_force)?;
        env_override("GRAPH_DAMPING", &mut config.damping)?;
        env_override("GRAPH_CENTER", &mut config.center_force)?;
        env_override("GRAPH_CUTOFF", &mut config.repulsion_cutoff)?;
        env_override("GRAPH_CELL_SIZE", &mut config.cell_size)?;

        if let Ok(raw) = std::env::var("GRAPH_REPULSION_MODE") {
            config.repulsion_mode = raw.parse().map_err(|_| ConfigError::InvalidEnv {
                key: "GRAPH_REPULSION_MODE",
                value: raw.clone(),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every constant is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("force_strength", self.force_strength),
            ("repulsion_force", self.repulsion_force),
            ("attraction_force", self.attraction_force),
            ("center_force", self.center_force),
            ("time_scale", self.time_scale),
            ("position_scale", self.position_scale),
            ("repulsion_cutoff", self.repulsion_cutoff),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    value,
                    reason: "must be finite and >= 0",
                });
            }
        }

        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "damping",
                value: self.damping,
                reason: "must be in (0, 1)",
            });
        }

        let positive = [
            ("cell_size", self.cell_size),
            ("min_distance", self.min_distance),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    value,
                    reason: "must be finite and > 0",
                });
            }
        }

        Ok(())
    }

    /// Cells to scan in each direction so no pair within the cutoff is missed.
    pub fn grid_reach(&self) -> i32 {
        (self.repulsion_cutoff / self.cell_size).ceil().max(1.0) as i32
    }

    /// Integration factor applied to force each tick.
    #[inline]
    pub fn force_scale(&self) -> f32 {
        self.force_strength * self.time_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LayoutConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid_reach(), 3);
        assert!((config.force_scale() - 0.025).abs() < 1e-6);
    }

    #[test]
    fn test_grid_reach_one_when_cutoff_fits_a_cell() {
        let config = LayoutConfig {
            repulsion_cutoff: 50.0,
            cell_size: 50.0,
            ..LayoutConfig::default()
        };
        assert_eq!(config.grid_reach(), 1);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            LayoutConfig { damping: 1.0, ..LayoutConfig::default() },
            LayoutConfig { damping: 0.0, ..LayoutConfig::default() },
            LayoutConfig { cell_size: 0.0, ..LayoutConfig::default() },
            LayoutConfig { repulsion_force: -1.0, ..LayoutConfig::default() },
            LayoutConfig { min_distance: 0.0, ..LayoutConfig::default() },
            LayoutConfig { center_force: f32::NAN, ..LayoutConfig::default() },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidValue { .. })),
                "{:?}",
                config
            );
        }
    }

    #[test]
    fn test_from_json_partial() {
        let config = LayoutConfig::from_json(
            r#"{ "damping": 0.5, "repulsion_mode": "all-pairs" }"#,
        )
        .unwrap();

        assert_eq!(config.damping, 0.5);
        assert_eq!(config.repulsion_mode, RepulsionMode::AllPairs);
        assert_eq!(config.repulsion_force, 100.0);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(LayoutConfig::from_json("{"), Err(ConfigError::Json(_))));
        assert!(matches!(
            LayoutConfig::from_json(r#"{ "damping": 2.0 }"#),
            Err(ConfigError::InvalidValue { field: "damping", .. })
        ));
    }

    #[test]
    fn test_repulsion_mode_parse() {
        assert_eq!("grid".parse::<RepulsionMode>(), Ok(RepulsionMode::Grid));
        assert_eq!("All-Pairs".parse::<RepulsionMode>(), Ok(RepulsionMode::AllPairs));
        assert!("octree".parse::<RepulsionMode>().is_err());
    }
}
