//! Project layout
//!
//! A project is any directory containing `.rank/`. Commands that work on
//! stored tasks find the nearest one above the current directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, TaskStore};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a rank project. Run 'rank init' first.")]
    NotInProject,
}

const RANK_DIR: &str = ".rank";

const DEFAULT_CONFIG: &str = r#"# rank-cli configuration

# Strategy used when --strategy is not given
# (balanced, fastest, impact, deadline)
default_strategy = "balanced"

# Maximum number of tasks shown by 'rank prioritize'
# default_limit = 10
"#;

/// Writes `contents` to `path` unless something is already there
fn create_if_missing(path: &Path, contents: &str) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    fs::write(path, contents).with_context(|| format!("Failed to create {}", path.display()))
}

/// A directory holding `.rank/`, with its loaded settings
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens the project rooted at `root`, loading its config
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.join(RANK_DIR).is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;
        Ok(Self { root, config })
    }

    /// Opens the project enclosing the current directory
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;
        Self::open(root)
    }

    /// Creates `.rank/` with a commented config and an empty task file
    ///
    /// Files that already exist are kept, so re-running is harmless.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let rank_dir = root.join(RANK_DIR);
        fs::create_dir_all(&rank_dir)
            .with_context(|| format!("Failed to create {}", rank_dir.display()))?;

        create_if_missing(&rank_dir.join("config.toml"), DEFAULT_CONFIG)?;
        create_if_missing(TaskStore::for_project(&root).path(), "")?;

        Self::open(root)
    }

    /// Returns the directory that contains `.rank/`
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the `.rank/` directory path
    pub fn rank_dir(&self) -> PathBuf {
        self.root.join(RANK_DIR)
    }

    /// Returns the loaded configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the project's task store
    pub fn task_store(&self) -> TaskStore {
        TaskStore::for_project(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Strategy;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.rank_dir().is_dir());
        assert!(project.rank_dir().join("config.toml").is_file());
        assert!(project.task_store().path().is_file());
    }

    #[test]
    fn default_config_file_parses() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert_eq!(project.config().default_strategy(), Strategy::Balanced);
        assert_eq!(project.config().project.default_limit, None);
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        fs::write(
            dir.path().join(".rank").join("config.toml"),
            "default_strategy = \"impact\"\n",
        )
        .unwrap();

        let project = Project::init(dir.path()).unwrap();
        assert_eq!(project.config().default_strategy(), Strategy::Impact);
    }

    #[test]
    fn open_existing_project() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();

        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.root(), dir.path());
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        let err = Project::open(dir.path()).err().unwrap();

        assert!(err.to_string().contains("rank init"));
    }

    #[test]
    fn init_keeps_existing_tasks() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();
        project
            .task_store()
            .append(&crate::domain::Task::new(crate::domain::TaskId::Number(1), "Keep me"))
            .unwrap();

        let project = Project::init(dir.path()).unwrap();
        assert_eq!(project.task_store().read_all().unwrap().len(), 1);
    }
}
