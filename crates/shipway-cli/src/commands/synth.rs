use std::path::Path;

use shipway_config::Manifest;
use shipway_pipeline::PipelineSpec;

pub fn synth(manifest_path: &str) -> anyhow::Result<()> {
    let spec = synth_spec(manifest_path)?;
    println!("{}", serde_json::to_string_pretty(&spec)?);
    Ok(())
}

pub fn synth_spec(manifest_path: &str) -> anyhow::Result<PipelineSpec> {
    let manifest = Manifest::from_file(Path::new(manifest_path))?;
    Ok(PipelineSpec::from_manifest(&manifest)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synth_resolves_the_example_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shipway.toml");
        let manifest = Manifest::example("my-app", "acme/my-app", "example.com");
        std::fs::write(&path, manifest.to_toml_string().unwrap()).unwrap();

        let spec = synth_spec(path.to_str().unwrap()).unwrap();
        assert_eq!(spec.stages[0].plan.hostname, "stage.example.com");
        assert_eq!(spec.stages[1].plan.hostname, "example.com");

        // Synth output is stable across runs.
        let again = synth_spec(path.to_str().unwrap()).unwrap();
        assert_eq!(
            serde_json::to_vec(&spec).unwrap(),
            serde_json::to_vec(&again).unwrap()
        );
    }
}
