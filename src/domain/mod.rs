//! Domain models for rank-cli
//!
//! Contains the scoring core without any I/O concerns.

mod id;
mod task;
mod graph;
mod strategy;
mod scoring;

pub use id::{IdError, TaskId};
pub use task::{
    validate_estimated_hours, validate_importance, BlockingCount, Task, TaskError, TaskInput,
    MAX_IMPORTANCE, MIN_ESTIMATED_HOURS, MIN_IMPORTANCE,
};
pub use graph::{DependencyGraph, GraphError};
pub use strategy::{resolve_strategy, Strategy, UnknownStrategy, Weights};
pub use scoring::{
    analyze, effort_raw, resolve_blocking_count, round_score, score, urgency_raw, BlockingIndex,
    NoIndex, ScoreBreakdown, ScoredResult, Scorer, URGENCY_HORIZON_DAYS,
};
