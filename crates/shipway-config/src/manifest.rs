//! shipway.toml manifest parser.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::scaling::ScalingStep;
use crate::stage::{DatabaseCapacity, StageConfig, TaskScaling};

/// Top-level manifest: pipeline identity, account context, and one
/// `[[stage]]` table per deployment environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub pipeline: PipelineManifest,
    pub context: DeployContext,
    #[serde(rename = "stage")]
    pub stages: Vec<StageConfig>,
}

/// Pipeline identity plus source and build configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineManifest {
    pub name: String,
    pub source: SourceManifest,
    pub build: BuildManifest,
}

/// Where the pipeline pulls application source from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceManifest {
    /// Repository in `owner/name` form.
    pub repository: String,
    pub branch: String,
    /// Parameter-store key holding the source-provider connection ARN.
    pub connection_param: String,
}

/// How the pipeline synthesizes itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Commands run by the build step to synthesize the pipeline.
    pub synth_commands: Vec<String>,
    /// Secret name holding docker registry credentials for image pulls.
    pub docker_credentials_secret: String,
}

/// Account and region every stage deploys into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployContext {
    pub account: String,
    pub region: String,
}

impl Manifest {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let manifest: Manifest = toml::from_str(&content)?;
        Ok(manifest)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Look up a stage by name.
    pub fn stage(&self, name: &str) -> Option<&StageConfig> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Validate the manifest and every stage in it.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.stages.is_empty() {
            return Err(ConfigError::NoStages);
        }
        for stage in &self.stages {
            stage.validate()?;
        }
        Ok(())
    }

    /// Scaffold a two-stage pipeline manifest with the conventional
    /// staging/production split: staging scaled down with an
    /// auto-pausing database, production always on.
    pub fn example(name: &str, repository: &str, domain: &str) -> Self {
        Manifest {
            pipeline: PipelineManifest {
                name: name.to_string(),
                source: SourceManifest {
                    repository: repository.to_string(),
                    branch: "main".to_string(),
                    connection_param: format!("/{name}/github-connection"),
                },
                build: BuildManifest {
                    synth_commands: vec![
                        "pip install -r requirements.txt".to_string(),
                        format!("shipway synth {name}"),
                    ],
                    docker_credentials_secret: format!("/{name}/DockerHubSecret"),
                },
            },
            context: DeployContext {
                account: "123456789012".to_string(),
                region: "us-east-1".to_string(),
            },
            stages: vec![
                StageConfig {
                    name: "staging".to_string(),
                    settings_module: "app.settings.stage".to_string(),
                    debug: true,
                    domain: domain.to_string(),
                    subdomain: Some("stage".to_string()),
                    // Limit scaling in staging to reduce costs.
                    database: DatabaseCapacity {
                        min_capacity_units: 2,
                        max_capacity_units: 2,
                        auto_pause_minutes: 5,
                    },
                    app_tasks: TaskScaling { min: 1, max: 2 },
                    worker_tasks: TaskScaling { min: 1, max: 2 },
                    worker_scaling_steps: vec![
                        ScalingStep { lower: None, upper: Some(0), change: 0 },
                        ScalingStep { lower: Some(10), upper: None, change: 1 },
                    ],
                    task_size: Default::default(),
                },
                StageConfig {
                    name: "production".to_string(),
                    settings_module: "app.settings.prod".to_string(),
                    debug: false,
                    domain: domain.to_string(),
                    subdomain: None,
                    // Keep the database always up in production.
                    database: DatabaseCapacity {
                        min_capacity_units: 2,
                        max_capacity_units: 4,
                        auto_pause_minutes: 0,
                    },
                    app_tasks: TaskScaling { min: 2, max: 5 },
                    worker_tasks: TaskScaling { min: 2, max: 4 },
                    worker_scaling_steps: vec![
                        ScalingStep { lower: None, upper: Some(0), change: 0 },
                        ScalingStep { lower: Some(100), upper: None, change: 1 },
                        ScalingStep { lower: Some(200), upper: None, change: 1 },
                        ScalingStep { lower: Some(500), upper: None, change: 2 },
                    ],
                    task_size: Default::default(),
                },
            ],
        }
    }
}
