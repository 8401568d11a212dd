//! Stage composition — overrides plus defaults into a resolved plan.

use serde::{Deserialize, Serialize};

use shipway_config::{ConfigResult, StageConfig};
use shipway_provision::{ResourceGroup, standard_steps};

/// A fully resolved deployment plan for one stage.
///
/// Immutable once composed; deploying it is the engine's job. Two
/// `compose` calls over the same configuration produce identical plans
/// — there is no hidden randomness or time-dependence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagePlan {
    /// The resolved stage configuration.
    pub config: StageConfig,
    /// Externally reachable hostname, derived from domain + subdomain.
    pub hostname: String,
    /// Resource-group steps in dependency order.
    pub steps: Vec<ResourceGroup>,
}

/// Compose a stage plan from its configuration.
///
/// Validation happens here, before any provisioning: malformed scaling
/// tables and inverted capacity bounds never reach a provider.
pub fn compose(cfg: &StageConfig) -> ConfigResult<StagePlan> {
    cfg.validate()?;
    Ok(StagePlan {
        hostname: cfg.hostname(),
        steps: standard_steps(),
        config: cfg.clone(),
    })
}
