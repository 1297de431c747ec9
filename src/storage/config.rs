//! Configuration handling for rank-cli
//!
//! Configuration is stored in `.rank/config.toml` (project) and
//! `~/.config/rank-cli/config.toml` (global, via the platform config dir).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Strategy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Project-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Strategy used when none is given on the command line or in a request
    pub default_strategy: String,

    /// Maximum number of tasks shown by `rank prioritize`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_limit: Option<usize>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            default_strategy: Strategy::default().name().to_string(),
            default_limit: None,
        }
    }
}

impl ProjectConfig {
    /// Resolves the configured default strategy, rejecting unknown names
    pub fn strategy(&self) -> Result<Strategy, ConfigError> {
        self.default_strategy
            .parse()
            .map_err(|e: crate::domain::UnknownStrategy| ConfigError::Invalid(e.to_string()))
    }
}

/// Per-user settings shared by every project
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Format used when `--format` is not given
    pub default_format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Reads a TOML file, or returns the default when it doesn't exist
fn read_toml<T>(path: &Path, what: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}: {}", what, path.display()))
        }
    };

    toml::from_str(&content)
        .map_err(|e| ConfigError::Parse(e.to_string()))
        .with_context(|| format!("Failed to parse {}: {}", what, path.display()))
}

/// Global settings plus those of the enclosing project, if any
#[derive(Debug, Clone)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,
    pub project_root: Option<PathBuf>,
}

impl Config {
    /// Loads global settings and, when run inside a project, its settings
    pub fn load() -> Result<Self> {
        match Self::find_project_root() {
            Some(root) => Self::for_project(&root),
            None => Ok(Self {
                project: ProjectConfig::default(),
                global: Self::load_global()?,
                project_root: None,
            }),
        }
    }

    /// Loads settings for the project rooted at `project_root`
    ///
    /// Fails if the configured default strategy is not a known name.
    pub fn for_project(project_root: &Path) -> Result<Self> {
        let path = project_root.join(".rank").join("config.toml");
        let project: ProjectConfig = read_toml(&path, "project config")?;
        project
            .strategy()
            .with_context(|| format!("Invalid project config: {}", path.display()))?;

        Ok(Self {
            project,
            global: Self::load_global()?,
            project_root: Some(project_root.to_path_buf()),
        })
    }

    /// Platform config directory, e.g. `~/.config/rank-cli` on Linux
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "rank", "rank-cli").map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn load_global() -> Result<GlobalConfig> {
        match Self::global_config_dir() {
            Some(dir) => read_toml(&dir.join("config.toml"), "global config"),
            None => Ok(GlobalConfig::default()),
        }
    }

    /// Finds the enclosing project from the current directory
    pub fn find_project_root() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::find_project_root_from(&cwd)
    }

    /// Nearest ancestor of `start` (inclusive) that has a `.rank/` directory
    pub fn find_project_root_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .find(|dir| dir.join(".rank").is_dir())
            .map(Path::to_path_buf)
    }

    /// Strategy to use when none is given explicitly
    pub fn default_strategy(&self) -> Strategy {
        self.project.strategy().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config {
            project: ProjectConfig::default(),
            global: GlobalConfig::default(),
            project_root: None,
        };

        assert_eq!(config.project.default_strategy, "balanced");
        assert_eq!(config.project.default_limit, None);
        assert_eq!(config.default_strategy(), Strategy::Balanced);
        assert_eq!(config.global.default_format, OutputFormat::Text);
    }

    #[test]
    fn parse_project_config() {
        let toml = r#"
default_strategy = "deadline"
default_limit = 5
"#;

        let config: ProjectConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.strategy().unwrap(), Strategy::Deadline);
        assert_eq!(config.default_limit, Some(5));
    }

    #[test]
    fn unknown_default_strategy_is_invalid() {
        let config: ProjectConfig = toml::from_str(r#"default_strategy = "urgent""#).unwrap();
        assert!(matches!(config.strategy(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn invalid_project_config_fails_to_load() {
        let dir = TempDir::new().unwrap();
        let rank_dir = dir.path().join(".rank");
        fs::create_dir_all(&rank_dir).unwrap();
        fs::write(rank_dir.join("config.toml"), "default_strategy = \"urgent\"\n").unwrap();

        assert!(Config::for_project(dir.path()).is_err());
    }

    #[test]
    fn parse_global_config() {
        let config: GlobalConfig = toml::from_str(r#"default_format = "json""#).unwrap();
        assert_eq!(config.default_format, OutputFormat::Json);
    }

    #[test]
    fn missing_files_use_defaults() {
        let dir = TempDir::new().unwrap();
        let config: ProjectConfig = read_toml(&dir.path().join("absent.toml"), "test").unwrap();
        assert_eq!(config.default_strategy, "balanced");
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_limit = [").unwrap();

        let err = read_toml::<ProjectConfig>(&path, "project config").unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse project config"));
    }

    #[test]
    fn find_project_root() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".rank")).unwrap();

        let sub_dir = dir.path().join("sub").join("dir");
        fs::create_dir_all(&sub_dir).unwrap();

        let root = Config::find_project_root_from(&sub_dir);
        assert_eq!(root.as_deref(), Some(dir.path()));
    }
}
