//! Resource references propagated between resource groups.
//!
//! Each group's provisioning call returns a small record of
//! identifiers/endpoints; later groups consume them as inputs. The
//! whole graph is assembled once per stage and read-only afterward.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ProvisionError, ProvisionResult};

/// Outputs of the network group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRefs {
    /// Virtual-network handle.
    pub vpc_id: String,
    /// Compute-cluster handle shared by app and worker services.
    pub cluster_id: String,
}

/// Outputs of the database group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseRefs {
    /// Reference to the generated credentials secret.
    pub credentials_secret: String,
}

/// Outputs of the static-files group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticSiteRefs {
    pub bucket_name: String,
    /// Content-delivery distribution domain.
    pub cdn_domain: String,
}

/// Outputs of the queue group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueRefs {
    pub queue_url: String,
}

/// Resolved secret references injected into compute tasks, keyed by
/// the environment-variable name they surface as.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretBundle {
    pub entries: BTreeMap<String, String>,
}

/// Outputs of a compute service group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRefs {
    pub service_id: String,
    /// The task role messages are sent/received under.
    pub task_role: String,
    /// Present for the load-balanced application service, absent for
    /// workers.
    pub load_balancer_id: Option<String>,
}

/// The reference graph for one stage, filled in as the plan runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRefs {
    pub network: Option<NetworkRefs>,
    pub database: Option<DatabaseRefs>,
    pub static_site: Option<StaticSiteRefs>,
    pub queue: Option<QueueRefs>,
    pub secrets: Option<SecretBundle>,
    pub app_service: Option<ServiceRefs>,
    pub workers: Option<ServiceRefs>,
}

impl ResourceRefs {
    pub fn network(&self) -> ProvisionResult<&NetworkRefs> {
        self.network
            .as_ref()
            .ok_or(ProvisionError::MissingReference("network"))
    }

    pub fn database(&self) -> ProvisionResult<&DatabaseRefs> {
        self.database
            .as_ref()
            .ok_or(ProvisionError::MissingReference("database"))
    }

    pub fn static_site(&self) -> ProvisionResult<&StaticSiteRefs> {
        self.static_site
            .as_ref()
            .ok_or(ProvisionError::MissingReference("static_site"))
    }

    pub fn queue(&self) -> ProvisionResult<&QueueRefs> {
        self.queue
            .as_ref()
            .ok_or(ProvisionError::MissingReference("queue"))
    }

    pub fn secrets(&self) -> ProvisionResult<&SecretBundle> {
        self.secrets
            .as_ref()
            .ok_or(ProvisionError::MissingReference("secrets"))
    }

    pub fn app_service(&self) -> ProvisionResult<&ServiceRefs> {
        self.app_service
            .as_ref()
            .ok_or(ProvisionError::MissingReference("app_service"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_reference_is_named() {
        let refs = ResourceRefs::default();
        let err = refs.queue().unwrap_err();
        assert_eq!(err.to_string(), "resource reference queue is missing");
    }

    #[test]
    fn accessor_returns_filled_reference() {
        let refs = ResourceRefs {
            queue: Some(QueueRefs {
                queue_url: "https://queue.example/staging-default".to_string(),
            }),
            ..Default::default()
        };
        assert_eq!(
            refs.queue().unwrap().queue_url,
            "https://queue.example/staging-default"
        );
    }
}
