//! shipway-config — pipeline manifest and stage configuration.
//!
//! Everything a pipeline run needs to know is declared up front in a
//! `shipway.toml` manifest: the source repository, the account/region
//! context, and one `[[stage]]` table per deployment environment. This
//! crate parses the manifest, fills in defaults for any field a stage
//! omits, and validates the result before a single provisioning call is
//! issued.
//!
//! Validation is deliberately front-loaded: a malformed scaling-step
//! table or inverted capacity bound aborts composition, never a running
//! deployment.

pub mod error;
pub mod manifest;
pub mod scaling;
pub mod stage;

pub use error::{ConfigError, ConfigResult};
pub use manifest::{BuildManifest, DeployContext, Manifest, PipelineManifest, SourceManifest};
pub use scaling::{ScalingStep, overlapping_pairs, validate_steps};
pub use stage::{DATABASE_NAME, DatabaseCapacity, StageConfig, TaskScaling, TaskSize};
