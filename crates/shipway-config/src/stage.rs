//! Per-stage configuration model.
//!
//! A `StageConfig` describes one deployment environment (staging,
//! production) completely: application settings, domain, database
//! capacity, task scaling bounds, and the worker scaling-step table.
//! Fields omitted in the manifest get the documented defaults during
//! deserialization, so a resolved `StageConfig` is always fully
//! populated and immutable from then on.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::scaling::{ScalingStep, validate_steps};

/// Name of the application database created in every stage.
pub const DATABASE_NAME: &str = "app_db";

/// Fully resolved configuration for one deployment stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Stage name, e.g. "staging" or "production".
    pub name: String,
    /// Settings module the application boots with.
    pub settings_module: String,
    /// Debug flag, injected into the app environment as "True"/"False".
    #[serde(default)]
    pub debug: bool,
    /// Apex domain the stage is reachable under.
    pub domain: String,
    /// Optional subdomain; the stage hostname is `subdomain.domain`
    /// when set, `domain` otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    /// Serverless database capacity bounds.
    #[serde(default)]
    pub database: DatabaseCapacity,
    /// Web application task scaling bounds.
    #[serde(default)]
    pub app_tasks: TaskScaling,
    /// Background worker task scaling bounds.
    #[serde(default = "TaskScaling::worker_default")]
    pub worker_tasks: TaskScaling,
    /// Scaling-step table driving worker count from queue depth.
    #[serde(default = "default_worker_steps")]
    pub worker_scaling_steps: Vec<ScalingStep>,
    /// CPU/memory sizing shared by app and worker tasks.
    #[serde(default)]
    pub task_size: TaskSize,
}

/// Capacity bounds for the stage's serverless database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseCapacity {
    /// Minimum capacity units.
    pub min_capacity_units: u32,
    /// Maximum capacity units.
    pub max_capacity_units: u32,
    /// Minutes of inactivity before the database pauses. 0 keeps it
    /// always on.
    #[serde(default)]
    pub auto_pause_minutes: u32,
}

impl Default for DatabaseCapacity {
    fn default() -> Self {
        Self {
            min_capacity_units: 2,
            max_capacity_units: 4,
            auto_pause_minutes: 0,
        }
    }
}

/// Min/max instance count for a scaled service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskScaling {
    pub min: u32,
    pub max: u32,
}

impl Default for TaskScaling {
    /// Default bounds for the web application service.
    fn default() -> Self {
        Self { min: 2, max: 4 }
    }
}

impl TaskScaling {
    /// Default bounds for the worker service.
    pub fn worker_default() -> Self {
        Self { min: 1, max: 4 }
    }
}

/// CPU units and memory for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSize {
    pub cpu_units: u32,
    pub memory_mib: u32,
}

impl Default for TaskSize {
    fn default() -> Self {
        Self {
            cpu_units: 256,
            memory_mib: 512,
        }
    }
}

/// A table whose only rule is the floor marker. Workers stay at the
/// stage minimum until a real table is configured.
fn default_worker_steps() -> Vec<ScalingStep> {
    vec![ScalingStep {
        lower: None,
        upper: Some(0),
        change: 0,
    }]
}

impl StageConfig {
    /// The externally reachable hostname for this stage.
    pub fn hostname(&self) -> String {
        match &self.subdomain {
            Some(sub) => format!("{sub}.{}", self.domain),
            None => self.domain.clone(),
        }
    }

    /// Allowed cross-origin source for the static-files bucket.
    pub fn cors_origin(&self) -> String {
        format!("https://{}", self.hostname())
    }

    /// Name prefix under which this stage's secrets are created.
    pub fn secret_prefix(&self) -> String {
        format!("/{}/", self.name)
    }

    /// Check every field that can be wrong before provisioning starts.
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("name", &self.name),
            ("settings_module", &self.settings_module),
            ("domain", &self.domain),
        ] {
            if value.is_empty() {
                return Err(ConfigError::EmptyField {
                    stage: self.name.clone(),
                    field,
                });
            }
        }

        let bounds = [
            (
                "database capacity",
                self.database.min_capacity_units,
                self.database.max_capacity_units,
            ),
            ("app task scaling", self.app_tasks.min, self.app_tasks.max),
            (
                "worker task scaling",
                self.worker_tasks.min,
                self.worker_tasks.max,
            ),
        ];
        for (what, min, max) in bounds {
            if min > max {
                return Err(ConfigError::InvertedBounds {
                    stage: self.name.clone(),
                    what,
                    min,
                    max,
                });
            }
        }

        validate_steps(&self.worker_scaling_steps)
    }
}
