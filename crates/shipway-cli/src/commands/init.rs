use std::path::Path;

use anyhow::{Context, bail};

use shipway_config::Manifest;

pub fn init(name: &str, repository: &str, domain: &str, out: &str) -> anyhow::Result<()> {
    let out_path = Path::new(out);
    if out_path.exists() {
        bail!("{out} already exists, not overwriting");
    }

    let manifest = Manifest::example(name, repository, domain);
    let toml = manifest.to_toml_string()?;
    std::fs::write(out_path, toml).with_context(|| format!("writing {out}"))?;

    println!("Wrote {out} with stages:");
    for stage in &manifest.stages {
        println!("  {} → https://{}", stage.name, stage.hostname());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_a_valid_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("shipway.toml");
        let out = out.to_str().unwrap();

        init("my-app", "acme/my-app", "example.com", out).unwrap();

        let manifest = Manifest::from_file(Path::new(out)).unwrap();
        manifest.validate().unwrap();
        assert_eq!(manifest.pipeline.name, "my-app");
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("shipway.toml");
        std::fs::write(&out, "existing").unwrap();

        let err = init("my-app", "acme/my-app", "example.com", out.to_str().unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
