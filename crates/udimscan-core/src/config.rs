//! Analysis configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default overlap tolerance in UV units.
pub const DEFAULT_TOLERANCE: f64 = 0.0001;

/// Which tiles a face takes part in during overlap detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileAssignment {
    /// Only the tile of the bounding box's minimum corner.
    ///
    /// Faces straddling a tile border are only compared against faces that
    /// start in the same tile, so overlaps across the border can be missed.
    #[default]
    MinCorner,
    /// Every tile the bounding box touches.
    Spanned,
}

impl TileAssignment {
    pub fn as_str(self) -> &'static str {
        match self {
            TileAssignment::MinCorner => "min_corner",
            TileAssignment::Spanned => "spanned",
        }
    }
}

impl std::str::FromStr for TileAssignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "min_corner" => Ok(TileAssignment::MinCorner),
            "spanned" => Ok(TileAssignment::Spanned),
            _ => Err(format!(
                "unknown tile assignment '{}', expected 'min_corner' or 'spanned'",
                s
            )),
        }
    }
}

impl std::fmt::Display for TileAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables for an analysis run.
///
/// Every field has a default, so a config file only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Overlap tolerance (default: 0.0001)
    pub tolerance: f64,
    /// Tile membership rule for overlap candidates (default: min_corner)
    pub tile_assignment: TileAssignment,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            tile_assignment: TileAssignment::MinCorner,
        }
    }
}

impl AnalysisConfig {
    /// Parse a config from a JSON file and validate it.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a config from JSON text and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "tolerance",
                message: format!("must be a finite value >= 0, got {}", self.tolerance),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.tolerance, 0.0001);
        assert_eq!(config.tile_assignment, TileAssignment::MinCorner);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AnalysisConfig::from_json(r#"{"tile_assignment": "spanned"}"#).unwrap();
        assert_eq!(config.tile_assignment, TileAssignment::Spanned);
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        let err = AnalysisConfig::from_json(r#"{"tolerance": -1.0}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "tolerance",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_assignment() {
        let err = AnalysisConfig::from_json(r#"{"tile_assignment": "everywhere"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_tile_assignment_parsing() {
        assert_eq!("spanned".parse::<TileAssignment>().unwrap(), TileAssignment::Spanned);
        assert_eq!(
            "min-corner".parse::<TileAssignment>().unwrap(),
            TileAssignment::MinCorner
        );
        assert_eq!(
            "MIN_CORNER".parse::<TileAssignment>().unwrap(),
            TileAssignment::MinCorner
        );
        assert!("diagonal".parse::<TileAssignment>().is_err());
        assert_eq!(TileAssignment::Spanned.to_string(), "spanned");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"tolerance": 0.001}}"#).unwrap();

        let config = AnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.tolerance, 0.001);

        let missing = AnalysisConfig::from_file(Path::new("/nonexistent/udimscan.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
