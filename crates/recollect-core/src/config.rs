//! Workspace resolution and settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const WORKSPACE_DIR_NAME: &str = ".recollect";
const WORKSPACE_ENV: &str = "RECOLLECT_DIR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("current directory unavailable: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// Directory holding the database and settings for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub root: PathBuf,
}

impl Workspace {
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `RECOLLECT_DIR`, else `.recollect/` at the nearest git root, else `./.recollect/`
    pub fn resolve() -> Result<Self, ConfigError> {
        if let Ok(dir) = std::env::var(WORKSPACE_ENV) {
            if !dir.trim().is_empty() {
                return Ok(Self::at(dir));
            }
        }
        let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
        Ok(Self::resolve_from(&cwd))
    }

    pub fn resolve_from(start: &Path) -> Self {
        for dir in start.ancestors() {
            let candidate = dir.join(WORKSPACE_DIR_NAME);
            if candidate.is_dir() || dir.join(".git").exists() {
                return Self::at(candidate);
            }
        }
        Self::at(start.join(WORKSPACE_DIR_NAME))
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }

    pub fn default_database(&self) -> PathBuf {
        self.root.join("recollect.db")
    }
}

/// Tunable settings; every field falls back to its default when absent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Candidates scoring below this are never stored
    pub min_confidence: f64,
    pub database: Option<PathBuf>,
    pub transcripts_dir: Option<PathBuf>,
    pub auto_import: bool,
    /// Minimum body length for a summary section to count
    pub summary_min_chars: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            database: None,
            transcripts_dir: None,
            auto_import: true,
            summary_min_chars: 80,
        }
    }
}

impl Settings {
    /// Load settings strictly; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings for passive callers that must never fail on bad config
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(temp_path, path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(ConfigError::Invalid {
                field: "min_confidence",
                reason: format!("{} is outside [0, 1]", self.min_confidence),
            });
        }
        Ok(())
    }

    pub fn database_path(&self, workspace: &Workspace) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| workspace.default_database())
    }
}
