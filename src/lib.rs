//! rank-cli - Multi-factor task prioritization
//!
//! Scores tasks on urgency, importance, effort and how many other tasks
//! they block, then ranks them under a named weighting strategy
//! (`balanced`, `fastest`, `impact`, `deadline`).

pub mod domain;
pub mod storage;
pub mod api;
pub mod cli;

pub use domain::{analyze, resolve_strategy, ScoredResult, Strategy, Task, TaskId, TaskInput};
