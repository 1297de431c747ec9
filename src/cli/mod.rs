//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project setup | `init` |
//! | Ranking | Score and sort tasks | `analyze`, `prioritize`, `strategies` |
//! | Task | Work item management | `task add`, `task dep`, `task list` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! rank --verbose prioritize --strategy deadline
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod ranking;
mod task;

use chrono::NaiveDate;

use crate::api::DATE_FORMAT;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};

/// Parses a `YYYY-MM-DD` command-line date
pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD", s))
}
