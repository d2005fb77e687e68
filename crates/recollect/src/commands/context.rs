use anyhow::Context as _;
use recollect_core::{Settings, Workspace};
use recollect_extract::PatternStrategy;
use recollect_store::Store;
use recollect_transcript::Paths;
use std::path::PathBuf;

/// Resolved workspace and settings for one command invocation
pub struct AppContext {
    pub workspace: Workspace,
    pub settings: Settings,
}

impl AppContext {
    /// Settings errors are fatal; for commands that write
    pub fn strict() -> anyhow::Result<Self> {
        let workspace = Workspace::resolve()?;
        let settings = Settings::load(&workspace.config_path())
            .context("fix or remove the settings file to continue")?;
        Ok(Self {
            workspace,
            settings,
        })
    }

    /// Bad settings fall back to defaults; for read-only display and hooks
    pub fn lenient() -> anyhow::Result<Self> {
        let workspace = Workspace::resolve()?;
        let settings = Settings::load_or_default(&workspace.config_path());
        Ok(Self {
            workspace,
            settings,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.settings.database_path(&self.workspace)
    }

    pub fn open_store(&self) -> anyhow::Result<Store> {
        let path = self.database_path();
        Store::open(&path).with_context(|| format!("failed to open store at {}", path.display()))
    }

    pub fn transcripts_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.settings.transcripts_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Paths::new()?.project_dir()?),
        }
    }

    pub fn strategy(&self) -> PatternStrategy {
        PatternStrategy::new().with_summary_min_chars(self.settings.summary_min_chars)
    }
}
