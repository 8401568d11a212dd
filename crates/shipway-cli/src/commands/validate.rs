use std::path::Path;

use shipway_config::{Manifest, overlapping_pairs};
use shipway_pipeline::PipelineSpec;

pub fn validate(manifest_path: &str) -> anyhow::Result<()> {
    let manifest = Manifest::from_file(Path::new(manifest_path))?;
    let spec = PipelineSpec::from_manifest(&manifest)?;

    println!("{} ok: {} stages", manifest_path, spec.stages.len());
    for stage in &spec.stages {
        let cfg = &stage.plan.config;
        let gate = match &stage.approval {
            Some(g) => format!(" (gated by {})", g.name),
            None => String::new(),
        };
        println!(
            "  {}{gate}: https://{} app {}-{} workers {}-{}",
            cfg.name,
            stage.plan.hostname,
            cfg.app_tasks.min,
            cfg.app_tasks.max,
            cfg.worker_tasks.min,
            cfg.worker_tasks.max,
        );
        let overlaps = overlapping_pairs(&cfg.worker_scaling_steps);
        if !overlaps.is_empty() {
            println!(
                "    note: {} overlapping scaling-step pair(s), applied additively",
                overlaps.len()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipway_config::Manifest;

    fn write_manifest(dir: &Path, manifest: &Manifest) -> String {
        let path = dir.join("shipway.toml");
        std::fs::write(&path, manifest.to_toml_string().unwrap()).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn valid_manifest_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(
            dir.path(),
            &Manifest::example("my-app", "acme/my-app", "example.com"),
        );
        validate(&path).unwrap();
    }

    #[test]
    fn invalid_manifest_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = Manifest::example("my-app", "acme/my-app", "example.com");
        manifest.stages[0].database.min_capacity_units = 8;
        let path = write_manifest(dir.path(), &manifest);

        let err = validate(&path).unwrap_err();
        assert!(err.to_string().contains("bounds inverted"));
    }

    #[test]
    fn missing_manifest_fails() {
        assert!(validate("/nonexistent/shipway.toml").is_err());
    }
}
