//! Priority scoring
//!
//! A task's score is the sum of four weighted sub-scores:
//!
//! | Term | Raw value | Notes |
//! |------|-----------|-------|
//! | Urgency | `100 + 5*days_overdue`, `50` if due today, `max(0, 30 - days_left)` | 0 without a due date |
//! | Importance | `importance * 10` | |
//! | Effort | `10 / estimated_hours` | 0 when hours <= 0 |
//! | Dependency | `blocking_count * 10` | |
//!
//! Each raw value is multiplied by the strategy's weight for that term and
//! the total is rounded to two decimal places. Scoring is pure: the same
//! task, blocking count, strategy and `today` always give the same score.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use super::graph::DependencyGraph;
use super::id::TaskId;
use super::strategy::{Strategy, Weights};
use super::task::TaskInput;

/// Days ahead after which a due date stops adding urgency
pub const URGENCY_HORIZON_DAYS: i64 = 30;

/// Source of blocking counts for tasks that don't carry one
pub trait BlockingIndex {
    /// Number of tasks that directly depend on `id`, `None` if unknown
    fn blocking_count(&self, id: &TaskId) -> Option<u32>;
}

/// Index with no answers; every unknown count becomes 0
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIndex;

impl BlockingIndex for NoIndex {
    fn blocking_count(&self, _id: &TaskId) -> Option<u32> {
        None
    }
}

impl BlockingIndex for HashMap<TaskId, u32> {
    fn blocking_count(&self, id: &TaskId) -> Option<u32> {
        self.get(id).copied()
    }
}

impl BlockingIndex for DependencyGraph {
    fn blocking_count(&self, id: &TaskId) -> Option<u32> {
        self.dependent_count(id)
    }
}

/// Picks the one blocking count used for a task in this call
///
/// A precomputed count wins. Otherwise the index is asked, and tasks
/// without an ID (never persisted, so nothing can depend on them) get 0.
pub fn resolve_blocking_count<I>(task: &TaskInput, index: &I) -> u32
where
    I: BlockingIndex + ?Sized,
{
    if let Some(count) = task.blocking.known() {
        return count;
    }

    task.id
        .as_ref()
        .and_then(|id| index.blocking_count(id))
        .unwrap_or(0)
}

/// Raw urgency before weighting
pub fn urgency_raw(due_date: Option<NaiveDate>, today: NaiveDate) -> f64 {
    let Some(due) = due_date else {
        return 0.0;
    };

    let days = (due - today).num_days();
    if days < 0 {
        100.0 + (days.unsigned_abs() as f64) * 5.0
    } else if days == 0 {
        50.0
    } else {
        (URGENCY_HORIZON_DAYS - days).max(0) as f64
    }
}

/// Raw effort score; quicker tasks score higher
pub fn effort_raw(estimated_hours: f64) -> f64 {
    if estimated_hours > 0.0 {
        10.0 / estimated_hours
    } else {
        0.0
    }
}

/// Rounds a score to two decimal places (half away from zero)
pub fn round_score(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Weighted contribution of each term, before rounding
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub urgency: f64,
    pub importance: f64,
    pub effort: f64,
    pub dependency: f64,
}

impl ScoreBreakdown {
    /// Computes the four contributions for a task
    pub fn compute(
        task: &TaskInput,
        blocking_count: u32,
        weights: &Weights,
        today: NaiveDate,
    ) -> Self {
        Self {
            urgency: urgency_raw(task.due_date, today) * weights.urgency,
            importance: f64::from(task.importance) * 10.0 * weights.importance,
            effort: effort_raw(task.estimated_hours) * weights.effort,
            dependency: f64::from(blocking_count) * 10.0 * weights.dependency,
        }
    }

    /// Unrounded sum
    pub fn raw_total(&self) -> f64 {
        self.urgency + self.importance + self.effort + self.dependency
    }

    /// Sum rounded to two decimal places
    pub fn total(&self) -> f64 {
        round_score(self.raw_total())
    }
}

/// Output record for one ranked task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub id: Option<TaskId>,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub importance: u8,
    pub estimated_hours: f64,
    pub score: f64,
    pub blocking_count: u32,
    #[serde(skip)]
    pub breakdown: ScoreBreakdown,
}

/// Scores tasks under one strategy as of one day
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    strategy: Strategy,
    weights: Weights,
    today: NaiveDate,
}

impl Scorer {
    pub fn new(strategy: Strategy, today: NaiveDate) -> Self {
        Self {
            strategy,
            weights: strategy.weights(),
            today,
        }
    }

    /// Creates a scorer from a strategy name, `balanced` if unknown
    pub fn for_name(strategy_name: &str, today: NaiveDate) -> Self {
        Self::new(Strategy::resolve(strategy_name), today)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn breakdown(&self, task: &TaskInput, blocking_count: u32) -> ScoreBreakdown {
        ScoreBreakdown::compute(task, blocking_count, &self.weights, self.today)
    }

    pub fn score(&self, task: &TaskInput, blocking_count: u32) -> f64 {
        self.breakdown(task, blocking_count).total()
    }

    /// Scores a single task, resolving its blocking count from `index`
    pub fn score_task<I>(&self, task: &TaskInput, index: &I) -> ScoredResult
    where
        I: BlockingIndex + ?Sized,
    {
        let blocking_count = resolve_blocking_count(task, index);
        let breakdown = self.breakdown(task, blocking_count);

        ScoredResult {
            id: task.id.clone(),
            title: task.title.clone(),
            due_date: task.due_date,
            importance: task.importance,
            estimated_hours: task.estimated_hours,
            score: breakdown.total(),
            blocking_count,
            breakdown,
        }
    }

    /// Scores every task and returns them highest score first
    ///
    /// The sort is stable, so equal scores keep their input order.
    pub fn analyze<I>(&self, tasks: &[TaskInput], index: &I) -> Vec<ScoredResult>
    where
        I: BlockingIndex + ?Sized,
    {
        let mut results: Vec<ScoredResult> = tasks
            .iter()
            .map(|task| self.score_task(task, index))
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results
    }
}

/// Scores one task with an explicit blocking count
pub fn score(task: &TaskInput, blocking_count: u32, strategy_name: &str, today: NaiveDate) -> f64 {
    Scorer::for_name(strategy_name, today).score(task, blocking_count)
}

/// Scores and ranks a batch of tasks under the named strategy
pub fn analyze<I>(
    tasks: &[TaskInput],
    strategy_name: &str,
    today: NaiveDate,
    index: &I,
) -> Vec<ScoredResult>
where
    I: BlockingIndex + ?Sized,
{
    Scorer::for_name(strategy_name, today).analyze(tasks, index)
}
