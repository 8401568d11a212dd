//! Error types for manifest parsing and stage validation.

use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or validating configuration.
///
/// All of these are raised at composition time, before any resource
/// provisioning call is issued.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("stage {stage:?}: required field `{field}` is empty")]
    EmptyField { stage: String, field: &'static str },

    #[error("stage {stage:?}: {what} bounds inverted (min {min} > max {max})")]
    InvertedBounds {
        stage: String,
        what: &'static str,
        min: u32,
        max: u32,
    },

    #[error("scaling step {index}: lower bound {lower} exceeds upper bound {upper}")]
    InvertedStep { index: usize, lower: i64, upper: i64 },

    #[error("scaling step {index} is out of order: tables must be sorted by increasing bound")]
    UnsortedSteps { index: usize },

    #[error("scaling table must start with a floor step (no lower bound)")]
    MissingFloorStep,

    #[error("manifest declares no stages")]
    NoStages,
}
