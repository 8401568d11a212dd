use std::path::Path;

use anyhow::{Context, bail};

use shipway_autoscale::evaluate;
use shipway_config::Manifest;

/// Evaluate a stage's worker scaling table at an observed queue depth.
pub fn scale_sim(manifest_path: &str, stage: &str, metric: f64) -> anyhow::Result<()> {
    let manifest = Manifest::from_file(Path::new(manifest_path))?;
    manifest.validate().context("manifest failed validation")?;

    let Some(cfg) = manifest.stage(stage) else {
        bail!("stage {stage:?} not found in {manifest_path}");
    };

    let bounds = cfg.worker_tasks;
    let target = evaluate(
        &cfg.worker_scaling_steps,
        metric,
        bounds.min,
        bounds.min,
        bounds.max,
    );
    println!(
        "{stage}: queue depth {metric} → {target} worker(s) [bounds {}-{}]",
        bounds.min, bounds.max
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_file(dir: &Path) -> String {
        let path = dir.join("shipway.toml");
        let manifest = Manifest::example("my-app", "acme/my-app", "example.com");
        std::fs::write(&path, manifest.to_toml_string().unwrap()).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn simulates_known_stage() {
        let dir = tempfile::tempdir().unwrap();
        let path = manifest_file(dir.path());
        scale_sim(&path, "staging", 15.0).unwrap();
        scale_sim(&path, "production", 600.0).unwrap();
    }

    #[test]
    fn unknown_stage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = scale_sim(&manifest_file(dir.path()), "qa", 10.0).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
