//! Pipeline execution — stages in order, approvals in between.
//!
//! The executor walks the stage sequence of a validated
//! [`PipelineSpec`]. Before a gated stage it asks the [`Approver`];
//! a rejection ends the run with the remaining stages untouched. A
//! stage deployment failure aborts the run — retry and rollback are
//! the pipeline service's concern, not this layer's.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use shipway_config::DeployContext;
use shipway_provision::{ResourceProvider, StageResources, run_steps};

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::{ApprovalGate, PipelineSpec};
use crate::stage::StagePlan;

/// Deployment backend for one stage plan.
#[allow(async_fn_in_trait)]
pub trait PipelineEngine {
    async fn deploy_stage(
        &mut self,
        plan: &StagePlan,
        ctx: &DeployContext,
    ) -> anyhow::Result<()>;
}

/// Decides whether a gated promotion proceeds.
#[allow(async_fn_in_trait)]
pub trait Approver {
    /// Returns `Ok(true)` to promote, `Ok(false)` to reject the run.
    async fn approve(&mut self, gate: &ApprovalGate, stage: &str) -> anyhow::Result<bool>;
}

/// An approver with a fixed answer, for dry runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticApprover {
    pub approve: bool,
}

impl Approver for StaticApprover {
    async fn approve(&mut self, gate: &ApprovalGate, stage: &str) -> anyhow::Result<bool> {
        info!(gate = %gate.name, %stage, approved = self.approve, "approval decision");
        Ok(self.approve)
    }
}

/// What happened to one stage during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageOutcome {
    Deployed,
    /// The gate in front of this stage was rejected; the stage was
    /// never assembled.
    Rejected { gate: String },
}

/// Per-stage outcomes of one pipeline run, in sequence order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub stages: Vec<(String, StageOutcome)>,
}

/// Run the pipeline's stage sequence against an engine.
pub async fn run_pipeline<E: PipelineEngine, A: Approver>(
    spec: &PipelineSpec,
    engine: &mut E,
    approver: &mut A,
) -> PipelineResult<PipelineReport> {
    spec.validate()?;

    info!(
        pipeline = %spec.name,
        repository = %spec.source.repository,
        branch = %spec.source.branch,
        "pipeline run started"
    );

    let mut report = PipelineReport::default();
    for stage in &spec.stages {
        let name = stage.plan.config.name.clone();

        if let Some(gate) = &stage.approval {
            let approved = approver
                .approve(gate, &name)
                .await
                .map_err(|source| PipelineError::Approval {
                    gate: gate.name.clone(),
                    source,
                })?;
            if !approved {
                warn!(gate = %gate.name, stage = %name, "promotion rejected");
                report.stages.push((
                    name,
                    StageOutcome::Rejected {
                        gate: gate.name.clone(),
                    },
                ));
                break;
            }
        }

        engine
            .deploy_stage(&stage.plan, &spec.context)
            .await
            .map_err(|source| PipelineError::Stage {
                stage: name.clone(),
                source,
            })?;
        info!(stage = %name, hostname = %stage.plan.hostname, "stage deployed");
        report.stages.push((name, StageOutcome::Deployed));
    }

    Ok(report)
}

/// An engine that deploys each stage by running its provisioning plan
/// against a [`ResourceProvider`], keeping the provisioned resources
/// per stage.
#[derive(Debug, Default)]
pub struct ProvisionEngine<P> {
    pub provider: P,
    pub resources: BTreeMap<String, StageResources>,
}

impl<P: ResourceProvider> ProvisionEngine<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            resources: BTreeMap::new(),
        }
    }
}

impl<P: ResourceProvider> PipelineEngine for ProvisionEngine<P> {
    async fn deploy_stage(
        &mut self,
        plan: &StagePlan,
        ctx: &DeployContext,
    ) -> anyhow::Result<()> {
        let resources =
            run_steps(&plan.config, ctx, &plan.steps, &mut self.provider).await?;
        self.resources.insert(plan.config.name.clone(), resources);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use shipway_config::Manifest;
    use shipway_provision::InMemoryProvider;

    fn spec() -> PipelineSpec {
        let manifest = Manifest::example("my-app", "acme/my-app", "example.com");
        PipelineSpec::from_manifest(&manifest).unwrap()
    }

    #[tokio::test]
    async fn approved_run_deploys_staging_then_production() {
        let spec = spec();
        let mut engine = ProvisionEngine::new(InMemoryProvider::new());
        let mut approver = StaticApprover { approve: true };

        let report = run_pipeline(&spec, &mut engine, &mut approver).await.unwrap();

        assert_eq!(
            report.stages,
            vec![
                ("staging".to_string(), StageOutcome::Deployed),
                ("production".to_string(), StageOutcome::Deployed),
            ]
        );

        // All staging provisioning strictly precedes all production
        // provisioning.
        let stages: Vec<&str> = engine
            .provider
            .calls
            .iter()
            .map(|c| c.stage.as_str())
            .collect();
        assert_eq!(stages.len(), 18);
        assert!(stages[..9].iter().all(|s| *s == "staging"));
        assert!(stages[9..].iter().all(|s| *s == "production"));

        assert_eq!(
            engine.resources["production"].env["DJANGO_SETTINGS_MODULE"],
            "app.settings.prod"
        );
    }

    #[tokio::test]
    async fn rejected_gate_leaves_production_untouched() {
        let spec = spec();
        let mut engine = ProvisionEngine::new(InMemoryProvider::new());
        let mut approver = StaticApprover { approve: false };

        let report = run_pipeline(&spec, &mut engine, &mut approver).await.unwrap();

        assert_eq!(report.stages[0], ("staging".to_string(), StageOutcome::Deployed));
        assert_eq!(
            report.stages[1],
            (
                "production".to_string(),
                StageOutcome::Rejected {
                    gate: "PromoteToProduction".to_string()
                }
            )
        );
        assert!(
            engine.provider.calls.iter().all(|c| c.stage == "staging"),
            "no production resource may exist after a rejected gate"
        );
        assert!(!engine.resources.contains_key("production"));
    }

    #[tokio::test]
    async fn staging_provisioning_failure_aborts_run() {
        use shipway_provision::ResourceGroup;

        let spec = spec();
        let provider = InMemoryProvider::new().fail_on(ResourceGroup::Database);
        let mut engine = ProvisionEngine::new(provider);
        let mut approver = StaticApprover { approve: true };

        let err = run_pipeline(&spec, &mut engine, &mut approver).await.unwrap_err();
        assert!(matches!(err, PipelineError::Stage { stage, .. } if stage == "staging"));
        assert!(engine.resources.is_empty());
    }

    #[tokio::test]
    async fn production_failure_after_approval_propagates() {
        struct FailProduction;
        impl PipelineEngine for FailProduction {
            async fn deploy_stage(
                &mut self,
                plan: &StagePlan,
                _ctx: &DeployContext,
            ) -> anyhow::Result<()> {
                if plan.config.name == "production" {
                    bail!("capacity exhausted");
                }
                Ok(())
            }
        }

        let spec = spec();
        let mut approver = StaticApprover { approve: true };
        let err = run_pipeline(&spec, &mut FailProduction, &mut approver)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Stage { stage, .. } if stage == "production"));
    }

    #[tokio::test]
    async fn approver_failure_is_distinct_from_rejection() {
        struct BrokenApprover;
        impl Approver for BrokenApprover {
            async fn approve(
                &mut self,
                _gate: &ApprovalGate,
                _stage: &str,
            ) -> anyhow::Result<bool> {
                bail!("approval channel unavailable")
            }
        }

        let spec = spec();
        let mut engine = ProvisionEngine::new(InMemoryProvider::new());
        let err = run_pipeline(&spec, &mut engine, &mut BrokenApprover)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Approval { gate, .. } if gate == "PromoteToProduction"));
    }

    #[tokio::test]
    async fn invalid_spec_never_reaches_the_engine() {
        let mut spec = spec();
        spec.stages[1].approval = None;
        let mut engine = ProvisionEngine::new(InMemoryProvider::new());
        let mut approver = StaticApprover { approve: true };

        let err = run_pipeline(&spec, &mut engine, &mut approver).await.unwrap_err();
        assert!(matches!(err, PipelineError::UngatedPromotion(_)));
        assert!(engine.provider.calls.is_empty());
    }
}
