//! The ordered provisioning plan and its runner.
//!
//! A plan is an explicit list of [`ResourceGroup`] steps. Each group
//! declares which groups must already exist before it can be
//! provisioned; the runner enforces that before dispatching to the
//! provider, so a mis-ordered plan fails loudly instead of handing a
//! provider half-wired inputs.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use shipway_config::{DATABASE_NAME, DeployContext, StageConfig};

use crate::env::app_env_map;
use crate::error::{ProvisionError, ProvisionResult};
use crate::provider::{DatabaseSpec, ResourceProvider, ServiceSpec};
use crate::refs::ResourceRefs;

/// A logical cluster of managed resources provisioned together.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceGroup {
    Network,
    Database,
    StaticSite,
    Queue,
    Secrets,
    AppService,
    QueueSendGrant,
    Workers,
    DnsRoute,
}

impl ResourceGroup {
    /// Groups that must be provisioned before this one.
    pub fn requires(self) -> &'static [ResourceGroup] {
        use ResourceGroup::*;
        match self {
            Network | StaticSite | Queue => &[],
            Database => &[Network],
            Secrets => &[Database],
            AppService | Workers => &[Network, StaticSite, Queue, Secrets],
            QueueSendGrant => &[Queue, AppService],
            DnsRoute => &[AppService],
        }
    }
}

/// The full stage plan in dependency order.
pub fn standard_steps() -> Vec<ResourceGroup> {
    use ResourceGroup::*;
    vec![
        Network,
        Database,
        StaticSite,
        Queue,
        Secrets,
        AppService,
        QueueSendGrant,
        Workers,
        DnsRoute,
    ]
}

/// Everything a provisioned stage hands back: the reference graph and
/// the environment map its services were started with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResources {
    pub refs: ResourceRefs,
    pub env: BTreeMap<String, String>,
}

/// Run a stage's provisioning steps in order.
///
/// Validates the stage configuration first — a bad scaling table or
/// inverted bound aborts before any provider call. A provider failure
/// aborts at the failing step with everything before it provisioned;
/// rollback is the engine's concern.
pub async fn run_steps<P: ResourceProvider>(
    cfg: &StageConfig,
    ctx: &DeployContext,
    steps: &[ResourceGroup],
    provider: &mut P,
) -> ProvisionResult<StageResources> {
    cfg.validate()?;

    let stage = cfg.name.as_str();
    let mut provisioned: BTreeSet<ResourceGroup> = BTreeSet::new();
    let mut refs = ResourceRefs::default();

    info!(%stage, steps = steps.len(), "provisioning stage");

    for &step in steps {
        if !provisioned.insert(step) {
            return Err(ProvisionError::DuplicateStep(step));
        }
        for &dep in step.requires() {
            if !provisioned.contains(&dep) {
                return Err(ProvisionError::DependencyNotProvisioned { step, missing: dep });
            }
        }

        debug!(%stage, group = ?step, "provisioning resource group");
        match step {
            ResourceGroup::Network => {
                refs.network = Some(provider.provision_network(stage).await?);
            }
            ResourceGroup::Database => {
                let spec = DatabaseSpec {
                    name: DATABASE_NAME.to_string(),
                    min_capacity_units: cfg.database.min_capacity_units,
                    max_capacity_units: cfg.database.max_capacity_units,
                    auto_pause_minutes: cfg.database.auto_pause_minutes,
                };
                refs.database =
                    Some(provider.provision_database(stage, refs.network()?, &spec).await?);
            }
            ResourceGroup::StaticSite => {
                let origins = [cfg.cors_origin()];
                refs.static_site =
                    Some(provider.provision_static_site(stage, &origins).await?);
            }
            ResourceGroup::Queue => {
                refs.queue = Some(provider.provision_queue(stage).await?);
            }
            ResourceGroup::Secrets => {
                refs.secrets = Some(
                    provider
                        .provision_secrets(stage, &cfg.secret_prefix(), refs.database()?)
                        .await?,
                );
            }
            ResourceGroup::AppService => {
                let spec = ServiceSpec {
                    cpu_units: cfg.task_size.cpu_units,
                    memory_mib: cfg.task_size.memory_mib,
                    desired_count: cfg.app_tasks.min,
                    min_count: cfg.app_tasks.min,
                    max_count: cfg.app_tasks.max,
                    env: app_env_map(cfg, ctx, refs.static_site()?, refs.queue()?),
                    secrets: refs.secrets()?.clone(),
                    scaling_steps: None,
                };
                let service = provider
                    .provision_app_service(stage, refs.network()?, &spec)
                    .await?;
                if service.load_balancer_id.is_none() {
                    return Err(ProvisionError::MissingLoadBalancer);
                }
                refs.app_service = Some(service);
            }
            ResourceGroup::QueueSendGrant => {
                let task_role = refs.app_service()?.task_role.clone();
                provider
                    .grant_queue_send(stage, refs.queue()?, &task_role)
                    .await?;
            }
            ResourceGroup::Workers => {
                let spec = ServiceSpec {
                    cpu_units: cfg.task_size.cpu_units,
                    memory_mib: cfg.task_size.memory_mib,
                    desired_count: cfg.worker_tasks.min,
                    min_count: cfg.worker_tasks.min,
                    max_count: cfg.worker_tasks.max,
                    env: app_env_map(cfg, ctx, refs.static_site()?, refs.queue()?),
                    secrets: refs.secrets()?.clone(),
                    scaling_steps: Some(cfg.worker_scaling_steps.clone()),
                };
                refs.workers =
                    Some(provider.provision_workers(stage, refs.network()?, &spec).await?);
            }
            ResourceGroup::DnsRoute => {
                let app = refs.app_service()?;
                let lb = app
                    .load_balancer_id
                    .clone()
                    .ok_or(ProvisionError::MissingLoadBalancer)?;
                provider
                    .create_dns_route(stage, &cfg.domain, cfg.subdomain.as_deref(), &lb)
                    .await?;
            }
        }
    }

    let env = match (&refs.static_site, &refs.queue) {
        (Some(site), Some(queue)) => app_env_map(cfg, ctx, site, queue),
        _ => BTreeMap::new(),
    };

    info!(%stage, "stage provisioned");
    Ok(StageResources { refs, env })
}
