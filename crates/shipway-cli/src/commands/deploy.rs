use shipway_pipeline::{ProvisionEngine, StageOutcome, StaticApprover, run_pipeline};
use shipway_provision::InMemoryProvider;

use super::synth::synth_spec;

/// Dry-run the pipeline against the in-memory provider.
///
/// Without `--auto-approve` the promotion gate is rejected, which is
/// exactly what an unattended run of the real pipeline would do.
pub async fn deploy(manifest_path: &str, auto_approve: bool) -> anyhow::Result<()> {
    let spec = synth_spec(manifest_path)?;

    let mut engine = ProvisionEngine::new(InMemoryProvider::new());
    let mut approver = StaticApprover {
        approve: auto_approve,
    };
    let report = run_pipeline(&spec, &mut engine, &mut approver).await?;

    for (stage, outcome) in &report.stages {
        match outcome {
            StageOutcome::Deployed => {
                let resources = &engine.resources[stage];
                println!("{stage}: deployed ({} env vars)", resources.env.len());
                if let Some(queue) = &resources.refs.queue {
                    println!("  queue: {}", queue.queue_url);
                }
            }
            StageOutcome::Rejected { gate } => {
                println!("{stage}: rejected at gate {gate}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipway_config::Manifest;

    fn manifest_file(dir: &std::path::Path) -> String {
        let path = dir.join("shipway.toml");
        let manifest = Manifest::example("my-app", "acme/my-app", "example.com");
        std::fs::write(&path, manifest.to_toml_string().unwrap()).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn dry_run_deploys_both_stages_when_approved() {
        let dir = tempfile::tempdir().unwrap();
        deploy(&manifest_file(dir.path()), true).await.unwrap();
    }

    #[tokio::test]
    async fn dry_run_without_approval_stops_at_the_gate() {
        let dir = tempfile::tempdir().unwrap();
        // Rejection is a normal outcome, not an error.
        deploy(&manifest_file(dir.path()), false).await.unwrap();
    }
}
