//! Locating assistant transcripts on disk

use std::path::{Path, PathBuf};

/// Resolves where the assistant keeps per-project transcripts
#[derive(Debug, Clone)]
pub struct Paths {
    pub home_claude: PathBuf,
}

impl Paths {
    pub fn new() -> std::io::Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;
        Ok(Self {
            home_claude: home.join(".claude"),
        })
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.home_claude.join("projects")
    }

    /// Transcript directory for the current working directory
    pub fn project_dir(&self) -> std::io::Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        Ok(self.project_dir_for(&cwd))
    }

    /// Transcript directory for `cwd`; separators and dots become dashes
    pub fn project_dir_for(&self, cwd: &Path) -> PathBuf {
        let key = cwd.to_string_lossy().replace(['/', '.'], "-");
        self.projects_dir().join(key)
    }
}

/// `*.jsonl` files directly under `dir`, sorted; a missing directory yields none
pub fn discover_transcripts(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "jsonl") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
