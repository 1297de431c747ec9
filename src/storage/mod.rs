//! # Storage Layer
//!
//! Persistence for rank-cli with git-friendly file formats.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Tasks | JSONL (one JSON per line) | `.rank/tasks.jsonl` |
//! | Config | TOML | `.rank/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`TaskStore`] locks `.rank/tasks.lock` with `fs2`: shared for reads,
//!   exclusive for appends and for the whole read-modify-write of edits
//! - Full rewrites are atomic (temp file + rename)
//!
//! ## Project Structure
//!
//! ```text
//! .rank/
//! ├── tasks.jsonl           # All tasks in JSONL format
//! ├── tasks.lock            # Lock file guarding tasks.jsonl
//! └── config.toml           # Project configuration
//! ```

mod jsonl;
mod config;
mod project;

pub use jsonl::{TaskMap, TaskStore};
pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ProjectConfig};
pub use project::{Project, ProjectError};
