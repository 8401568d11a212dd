//! Pipeline error types.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors that can occur while composing or running a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] shipway_config::ConfigError),

    #[error("pipeline must declare exactly two stages (staging, production), got {0}")]
    StageCount(usize),

    #[error("first stage {0:?} must not sit behind an approval gate")]
    GatedFirstStage(String),

    #[error("promotion to stage {0:?} must be gated by a manual approval")]
    UngatedPromotion(String),

    #[error("stage {stage:?} deployment failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("approval gate {gate:?} failed: {source}")]
    Approval {
        gate: String,
        #[source]
        source: anyhow::Error,
    },
}
