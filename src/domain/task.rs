//! Task domain model
//!
//! [`Task`] is the persisted record kept by the task store. [`TaskInput`] is
//! the plain value the scorer consumes; it can come from a stored task or
//! from a transient request that was never persisted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::TaskId;

/// Lowest accepted importance rating
pub const MIN_IMPORTANCE: u8 = 1;

/// Highest accepted importance rating
pub const MAX_IMPORTANCE: u8 = 10;

/// Smallest effort estimate a stored task may carry
pub const MIN_ESTIMATED_HOURS: f64 = 0.1;

#[derive(Debug, Error, PartialEq)]
pub enum TaskError {
    #[error("Importance must be between 1 and 10, got {0}")]
    ImportanceOutOfRange(i64),

    #[error("Estimated hours must be at least 0.1, got {0}")]
    HoursTooSmall(f64),
}

/// Checks that an importance rating is within `[1, 10]`
pub fn validate_importance(value: i64) -> Result<u8, TaskError> {
    if (MIN_IMPORTANCE as i64..=MAX_IMPORTANCE as i64).contains(&value) {
        Ok(value as u8)
    } else {
        Err(TaskError::ImportanceOutOfRange(value))
    }
}

/// Checks that an effort estimate is usable for a stored task
pub fn validate_estimated_hours(value: f64) -> Result<f64, TaskError> {
    if value.is_finite() && value >= MIN_ESTIMATED_HOURS {
        Ok(value)
    } else {
        Err(TaskError::HoursTooSmall(value))
    }
}

/// Where a task's blocking count comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockingCount {
    /// Precomputed by the caller
    Known(u32),
    /// Must be looked up in a blocking index (or treated as 0)
    #[default]
    Unknown,
}

impl BlockingCount {
    pub fn known(&self) -> Option<u32> {
        match self {
            BlockingCount::Known(n) => Some(*n),
            BlockingCount::Unknown => None,
        }
    }
}

/// A task as consumed by the scorer
#[derive(Debug, Clone, PartialEq)]
pub struct TaskInput {
    /// Pass-through identifier; `None` for tasks that were never persisted
    pub id: Option<TaskId>,
    pub title: String,
    /// `None` means no deadline pressure
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: f64,
    /// Caller-validated, `[1, 10]`
    pub importance: u8,
    pub blocking: BlockingCount,
}

impl TaskInput {
    /// Creates an input with neutral defaults (importance 1, one hour, no due date)
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            due_date: None,
            estimated_hours: 1.0,
            importance: MIN_IMPORTANCE,
            blocking: BlockingCount::Unknown,
        }
    }

    pub fn with_id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = hours;
        self
    }

    pub fn with_importance(mut self, importance: u8) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_blocking_count(mut self, count: u32) -> Self {
        self.blocking = BlockingCount::Known(count);
        self
    }
}

/// A persisted task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Human-readable title
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Effort estimate in hours
    pub estimated_hours: f64,

    /// Priority rating from 1 (low) to 10 (high)
    pub importance: u8,

    /// Tasks that must be done before this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<TaskId>,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task with the given ID and title
    pub fn new(id: TaskId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            due_date: None,
            estimated_hours: 1.0,
            importance: MIN_IMPORTANCE,
            depends_on: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn set_importance(&mut self, importance: i64) -> Result<(), TaskError> {
        self.importance = validate_importance(importance)?;
        Ok(())
    }

    pub fn set_estimated_hours(&mut self, hours: f64) -> Result<(), TaskError> {
        self.estimated_hours = validate_estimated_hours(hours)?;
        Ok(())
    }

    /// Adds a dependency; returns false if it was already present
    pub fn add_dependency(&mut self, task_id: TaskId) -> bool {
        if self.depends_on.contains(&task_id) {
            return false;
        }
        self.depends_on.push(task_id);
        true
    }

    /// Removes a dependency; returns false if it was not present
    pub fn remove_dependency(&mut self, task_id: &TaskId) -> bool {
        let len_before = self.depends_on.len();
        self.depends_on.retain(|d| d != task_id);
        self.depends_on.len() != len_before
    }

    /// Builds the scorer input; the blocking count is left for the index
    pub fn to_input(&self) -> TaskInput {
        TaskInput {
            id: Some(self.id.clone()),
            title: self.title.clone(),
            due_date: self.due_date,
            estimated_hours: self.estimated_hours,
            importance: self.importance,
            blocking: BlockingCount::Unknown,
        }
    }
}
