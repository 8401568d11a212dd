//! Provisioning error types.

use thiserror::Error;

use crate::plan::ResourceGroup;

/// Result type alias for provisioning operations.
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// Errors that can occur while running a stage's provisioning plan.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("invalid stage configuration: {0}")]
    Config(#[from] shipway_config::ConfigError),

    #[error("step {step:?} requires {missing:?}, which has not been provisioned")]
    DependencyNotProvisioned {
        step: ResourceGroup,
        missing: ResourceGroup,
    },

    #[error("step {0:?} appears twice in the plan")]
    DuplicateStep(ResourceGroup),

    #[error("resource reference {0} is missing")]
    MissingReference(&'static str),

    #[error("application service came up without a load balancer")]
    MissingLoadBalancer,

    #[error("provider error: {0}")]
    Provider(#[from] anyhow::Error),
}
