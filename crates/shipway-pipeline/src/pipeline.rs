//! Pipeline definition — gated stage sequence plus source and build
//! configuration.

use serde::{Deserialize, Serialize};

use shipway_config::{BuildManifest, DeployContext, Manifest, SourceManifest};

use crate::error::{PipelineError, PipelineResult};
use crate::stage::{StagePlan, compose};

/// A manual checkpoint blocking automatic promotion into a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalGate {
    pub name: String,
}

impl ApprovalGate {
    /// The conventional gate name for promoting into `stage`, e.g.
    /// "PromoteToProduction".
    pub fn promoting_to(stage: &str) -> Self {
        let mut chars = stage.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        Self {
            name: format!("PromoteTo{capitalized}"),
        }
    }
}

/// One entry in the pipeline's stage sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStage {
    /// Gate that must be approved before this stage deploys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalGate>,
    pub plan: StagePlan,
}

/// The complete pipeline definition: where source comes from, how the
/// pipeline builds itself, and the ordered stage sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    pub name: String,
    pub source: SourceManifest,
    pub build: BuildManifest,
    pub context: DeployContext,
    pub stages: Vec<PipelineStage>,
}

impl PipelineSpec {
    /// Compose every stage in the manifest into a pipeline definition.
    ///
    /// The first stage deploys unconditionally; every later stage gets
    /// a manual approval gate in front of it.
    pub fn from_manifest(manifest: &Manifest) -> PipelineResult<Self> {
        let mut stages = Vec::with_capacity(manifest.stages.len());
        for (index, cfg) in manifest.stages.iter().enumerate() {
            let approval = if index == 0 {
                None
            } else {
                Some(ApprovalGate::promoting_to(&cfg.name))
            };
            stages.push(PipelineStage {
                approval,
                plan: compose(cfg)?,
            });
        }

        let spec = Self {
            name: manifest.pipeline.name.clone(),
            source: manifest.pipeline.source.clone(),
            build: manifest.pipeline.build.clone(),
            context: manifest.context.clone(),
            stages,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Check the stage-sequence invariants: exactly two stages, an
    /// ungated first stage, and an approval gate immediately before
    /// every promotion.
    pub fn validate(&self) -> PipelineResult<()> {
        if self.stages.len() != 2 {
            return Err(PipelineError::StageCount(self.stages.len()));
        }
        for (index, stage) in self.stages.iter().enumerate() {
            match (index, &stage.approval) {
                (0, Some(_)) => {
                    return Err(PipelineError::GatedFirstStage(stage.plan.config.name.clone()));
                }
                (0, None) => {}
                (_, None) => {
                    return Err(PipelineError::UngatedPromotion(
                        stage.plan.config.name.clone(),
                    ));
                }
                (_, Some(_)) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> Manifest {
        Manifest::example("my-app", "acme/my-app", "example.com")
    }

    #[test]
    fn staging_precedes_gated_production() {
        let spec = PipelineSpec::from_manifest(&manifest()).unwrap();

        assert_eq!(spec.stages.len(), 2);
        assert_eq!(spec.stages[0].plan.config.name, "staging");
        assert!(spec.stages[0].approval.is_none());
        assert_eq!(spec.stages[1].plan.config.name, "production");
        assert_eq!(
            spec.stages[1].approval.as_ref().unwrap().name,
            "PromoteToProduction"
        );
    }

    #[test]
    fn gate_naming() {
        assert_eq!(ApprovalGate::promoting_to("production").name, "PromoteToProduction");
        assert_eq!(ApprovalGate::promoting_to("qa").name, "PromoteToQa");
    }

    #[test]
    fn wrong_stage_count_rejected() {
        let mut m = manifest();
        m.stages.push(m.stages[1].clone());
        let err = PipelineSpec::from_manifest(&m).unwrap_err();
        assert!(matches!(err, PipelineError::StageCount(3)));

        let mut m = manifest();
        m.stages.truncate(1);
        let err = PipelineSpec::from_manifest(&m).unwrap_err();
        assert!(matches!(err, PipelineError::StageCount(1)));
    }

    #[test]
    fn tampered_gates_rejected() {
        let mut spec = PipelineSpec::from_manifest(&manifest()).unwrap();
        spec.stages[1].approval = None;
        assert!(matches!(
            spec.validate(),
            Err(PipelineError::UngatedPromotion(name)) if name == "production"
        ));

        let mut spec = PipelineSpec::from_manifest(&manifest()).unwrap();
        spec.stages[0].approval = Some(ApprovalGate::promoting_to("staging"));
        assert!(matches!(
            spec.validate(),
            Err(PipelineError::GatedFirstStage(name)) if name == "staging"
        ));
    }

    #[test]
    fn spec_serializes_deterministically() {
        let a = PipelineSpec::from_manifest(&manifest()).unwrap();
        let b = PipelineSpec::from_manifest(&manifest()).unwrap();
        assert_eq!(
            serde_json::to_string_pretty(&a).unwrap(),
            serde_json::to_string_pretty(&b).unwrap()
        );
    }

    #[test]
    fn bad_stage_config_fails_composition() {
        let mut m = manifest();
        m.stages[1].app_tasks.min = 9;
        assert!(matches!(
            PipelineSpec::from_manifest(&m),
            Err(PipelineError::Config(_))
        ));
    }
}
