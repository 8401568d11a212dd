//! The managed-service provisioning interface.
//!
//! One async method per resource group, with the input/output shapes
//! the plan runner wires together. Real backends talk to a cloud
//! provider; [`InMemoryProvider`] fabricates deterministic references
//! for tests and dry runs.
//!
//! Provider failures are surfaced as `anyhow::Error` and propagated
//! unmodified — this layer does not retry or roll back.

use std::collections::BTreeMap;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use shipway_config::ScalingStep;

use crate::plan::ResourceGroup;
use crate::refs::{
    DatabaseRefs, NetworkRefs, QueueRefs, SecretBundle, ServiceRefs, StaticSiteRefs,
};

/// Parameters for the database group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSpec {
    pub name: String,
    pub min_capacity_units: u32,
    pub max_capacity_units: u32,
    pub auto_pause_minutes: u32,
}

/// Parameters for a compute service group (app or workers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSpec {
    pub cpu_units: u32,
    pub memory_mib: u32,
    pub desired_count: u32,
    pub min_count: u32,
    pub max_count: u32,
    pub env: BTreeMap<String, String>,
    pub secrets: SecretBundle,
    /// Queue-depth scaling table; workers only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling_steps: Option<Vec<ScalingStep>>,
}

/// Provisioning backend for one stage's resource groups.
///
/// Implementations are managed-service clients; each method creates or
/// updates a resource group and returns the references later groups
/// consume. Callers are generic over the provider, so `Send` bounds
/// stay the implementor's choice.
#[allow(async_fn_in_trait)]
pub trait ResourceProvider {
    async fn provision_network(&mut self, stage: &str) -> anyhow::Result<NetworkRefs>;

    async fn provision_database(
        &mut self,
        stage: &str,
        network: &NetworkRefs,
        spec: &DatabaseSpec,
    ) -> anyhow::Result<DatabaseRefs>;

    async fn provision_static_site(
        &mut self,
        stage: &str,
        cors_allowed_origins: &[String],
    ) -> anyhow::Result<StaticSiteRefs>;

    async fn provision_queue(&mut self, stage: &str) -> anyhow::Result<QueueRefs>;

    async fn provision_secrets(
        &mut self,
        stage: &str,
        name_prefix: &str,
        database: &DatabaseRefs,
    ) -> anyhow::Result<SecretBundle>;

    async fn provision_app_service(
        &mut self,
        stage: &str,
        network: &NetworkRefs,
        spec: &ServiceSpec,
    ) -> anyhow::Result<ServiceRefs>;

    /// Grant the given task role permission to send to the queue.
    async fn grant_queue_send(
        &mut self,
        stage: &str,
        queue: &QueueRefs,
        task_role: &str,
    ) -> anyhow::Result<()>;

    async fn provision_workers(
        &mut self,
        stage: &str,
        network: &NetworkRefs,
        spec: &ServiceSpec,
    ) -> anyhow::Result<ServiceRefs>;

    async fn create_dns_route(
        &mut self,
        stage: &str,
        domain: &str,
        subdomain: Option<&str>,
        load_balancer_id: &str,
    ) -> anyhow::Result<()>;
}

/// One recorded provider call, for assertions on ordering and inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub group: ResourceGroup,
    pub stage: String,
    /// Human-readable summary of the call's distinguishing input.
    pub detail: String,
}

/// Deterministic in-memory backend.
///
/// Fabricates stage-derived identifiers and records every call in
/// order. Can be told to fail at a chosen group to exercise abort
/// paths.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    pub calls: Vec<RecordedCall>,
    fail_on: Option<ResourceGroup>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with an error when the given group is provisioned.
    pub fn fail_on(mut self, group: ResourceGroup) -> Self {
        self.fail_on = Some(group);
        self
    }

    /// The groups provisioned so far, in call order.
    pub fn call_order(&self) -> Vec<ResourceGroup> {
        self.calls.iter().map(|c| c.group).collect()
    }

    fn record(&mut self, group: ResourceGroup, stage: &str, detail: String) -> anyhow::Result<()> {
        if self.fail_on == Some(group) {
            bail!("injected failure at {group:?}");
        }
        self.calls.push(RecordedCall {
            group,
            stage: stage.to_string(),
            detail,
        });
        Ok(())
    }
}

impl ResourceProvider for InMemoryProvider {
    async fn provision_network(&mut self, stage: &str) -> anyhow::Result<NetworkRefs> {
        self.record(ResourceGroup::Network, stage, String::new())?;
        Ok(NetworkRefs {
            vpc_id: format!("vpc-{stage}"),
            cluster_id: format!("cluster-{stage}"),
        })
    }

    async fn provision_database(
        &mut self,
        stage: &str,
        network: &NetworkRefs,
        spec: &DatabaseSpec,
    ) -> anyhow::Result<DatabaseRefs> {
        self.record(
            ResourceGroup::Database,
            stage,
            format!(
                "{} in {} ({}-{} units, pause {}m)",
                spec.name,
                network.vpc_id,
                spec.min_capacity_units,
                spec.max_capacity_units,
                spec.auto_pause_minutes
            ),
        )?;
        Ok(DatabaseRefs {
            credentials_secret: format!("secret:{stage}/{}/credentials", spec.name),
        })
    }

    async fn provision_static_site(
        &mut self,
        stage: &str,
        cors_allowed_origins: &[String],
    ) -> anyhow::Result<StaticSiteRefs> {
        self.record(
            ResourceGroup::StaticSite,
            stage,
            format!("cors {}", cors_allowed_origins.join(",")),
        )?;
        Ok(StaticSiteRefs {
            bucket_name: format!("{stage}-static-files"),
            cdn_domain: format!("{stage}.cdn.example.net"),
        })
    }

    async fn provision_queue(&mut self, stage: &str) -> anyhow::Result<QueueRefs> {
        self.record(ResourceGroup::Queue, stage, String::new())?;
        Ok(QueueRefs {
            queue_url: format!("https://queue.example/{stage}-default"),
        })
    }

    async fn provision_secrets(
        &mut self,
        stage: &str,
        name_prefix: &str,
        database: &DatabaseRefs,
    ) -> anyhow::Result<SecretBundle> {
        self.record(ResourceGroup::Secrets, stage, name_prefix.to_string())?;
        Ok(SecretBundle {
            entries: BTreeMap::from([
                (
                    "DATABASE_SECRET".to_string(),
                    database.credentials_secret.clone(),
                ),
                (
                    "SECRET_KEY".to_string(),
                    format!("secret:{name_prefix}secret-key"),
                ),
            ]),
        })
    }

    async fn provision_app_service(
        &mut self,
        stage: &str,
        network: &NetworkRefs,
        spec: &ServiceSpec,
    ) -> anyhow::Result<ServiceRefs> {
        self.record(
            ResourceGroup::AppService,
            stage,
            format!(
                "on {} desired {} scaling {}-{}",
                network.cluster_id, spec.desired_count, spec.min_count, spec.max_count
            ),
        )?;
        Ok(ServiceRefs {
            service_id: format!("svc-{stage}-app"),
            task_role: format!("role-{stage}-app"),
            load_balancer_id: Some(format!("alb-{stage}")),
        })
    }

    async fn grant_queue_send(
        &mut self,
        stage: &str,
        queue: &QueueRefs,
        task_role: &str,
    ) -> anyhow::Result<()> {
        self.record(
            ResourceGroup::QueueSendGrant,
            stage,
            format!("{task_role} → {}", queue.queue_url),
        )
    }

    async fn provision_workers(
        &mut self,
        stage: &str,
        network: &NetworkRefs,
        spec: &ServiceSpec,
    ) -> anyhow::Result<ServiceRefs> {
        let steps = spec.scaling_steps.as_deref().unwrap_or_default().len();
        self.record(
            ResourceGroup::Workers,
            stage,
            format!(
                "on {} scaling {}-{} with {steps} steps",
                network.cluster_id, spec.min_count, spec.max_count
            ),
        )?;
        Ok(ServiceRefs {
            service_id: format!("svc-{stage}-workers"),
            task_role: format!("role-{stage}-workers"),
            load_balancer_id: None,
        })
    }

    async fn create_dns_route(
        &mut self,
        stage: &str,
        domain: &str,
        subdomain: Option<&str>,
        load_balancer_id: &str,
    ) -> anyhow::Result<()> {
        let host = match subdomain {
            Some(sub) => format!("{sub}.{domain}"),
            None => domain.to_string(),
        };
        self.record(
            ResourceGroup::DnsRoute,
            stage,
            format!("{host} → {load_balancer_id}"),
        )
    }
}
