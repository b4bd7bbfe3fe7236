//! Error types.
//!
//! Only configuration-time failures are errors. Query misses (no path, empty
//! scan, sensor miss) are ordinary outcomes and never surface here.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid vehicle configuration, detected when the vehicle enters the world.
///
/// A vehicle that fails validation is tagged `Disabled` and stays inert.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("vehicle has no wheels assigned")]
    NoWheels,

    #[error("vehicle has no steering wheel")]
    NoSteeringWheel,

    #[error("AI vehicle has no steering sensors")]
    MissingSensorArray,

    #[error("AI vehicle is missing its {0} component")]
    MissingComponent(&'static str),

    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must be within [{min}, {max}] (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("clip size must be at least 1")]
    EmptyClip,
}

/// Failure while loading an arena scenario file.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("cannot read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scenario: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("vehicle #{index} has an invalid config: {source}")]
    InvalidVehicle {
        index: usize,
        #[source]
        source: ConfigError,
    },

    #[error("arena half extent must be positive (got {0})")]
    InvalidArena(f32),

    #[error("navigation cell size must be positive (got {0})")]
    InvalidCellSize(f32),

    #[error("navigation grid of {cells} cells per side exceeds the limit of {max}")]
    GridTooLarge { cells: f32, max: i32 },
}

/// Check that a config value is strictly positive.
pub(crate) fn ensure_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Check that a config value lies in `[min, max]`.
pub(crate) fn ensure_range(
    field: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
