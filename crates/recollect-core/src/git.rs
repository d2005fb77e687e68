//! Git context stamped onto new entries and sessions

use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitContext {
    pub branch: Option<String>,
    pub commit: Option<String>,
}

impl GitContext {
    /// Detect branch and short commit for the current directory
    pub fn detect() -> Self {
        Self::detect_in(Path::new("."))
    }

    pub fn detect_in(dir: &Path) -> Self {
        Self {
            branch: run_git(dir, &["branch", "--show-current"]),
            commit: run_git(dir, &["rev-parse", "--short", "HEAD"]),
        }
    }
}

fn run_git(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_outside_repo_is_empty() {
        let temp = tempfile::TempDir::new().unwrap();
        let git = GitContext::detect_in(temp.path());
        assert_eq!(git.branch, None);
        assert_eq!(git.commit, None);
    }
}
