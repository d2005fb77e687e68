use recollect_core::{Settings, Workspace};
use std::path::PathBuf;

/// Write default settings into the workspace; an existing file is kept unless `force`
fn init_workspace(workspace: &Workspace, force: bool) -> anyhow::Result<PathBuf> {
    let path = workspace.config_path();
    if path.exists() && !force {
        anyhow::bail!("{} already exists; pass --force to overwrite", path.display());
    }
    Settings::default().save(&path)?;
    tracing::info!(path = %path.display(), "wrote default settings");
    Ok(path)
}

pub fn run(force: bool) -> anyhow::Result<()> {
    let workspace = Workspace::resolve()?;
    let path = init_workspace(&workspace, force)?;
    println!("Initialized {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let workspace = Workspace::at(temp.path().join(".recollect"));

        let path = init_workspace(&workspace, false).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_init_keeps_existing_settings() {
        let temp = tempfile::TempDir::new().unwrap();
        let workspace = Workspace::at(temp.path());
        std::fs::write(workspace.config_path(), r#"{"min_confidence": 0.8}"#).unwrap();

        assert!(init_workspace(&workspace, false).is_err());
        assert_eq!(Settings::load(&workspace.config_path()).unwrap().min_confidence, 0.8);

        init_workspace(&workspace, true).unwrap();
        assert_eq!(Settings::load(&workspace.config_path()).unwrap(), Settings::default());
    }
}
