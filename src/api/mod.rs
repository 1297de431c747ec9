//! # Transport
//!
//! JSON request/response handling for batch analysis. This is the layer a
//! web endpoint (or the `rank analyze` command) sits on:
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | Scored | 200 | `{"status": "success", "strategy_used": ..., "tasks": [...]}` |
//! | Bad payload | 400 | `{"status": "error", "message": ...}` |
//! | Scoring fault | 500 | `{"status": "error", "message": ...}` |
//!
//! A batch either scores completely or fails before any task is scored.

mod request;
mod response;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{BlockingIndex, ScoredResult, Scorer, Strategy};

pub use request::{AnalyzeRequest, RequestError, DATE_FORMAT};
pub use response::{AnalyzeResponse, Reply};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Score for task '{title}' is not a finite number")]
    NonFiniteScore { title: String },
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Request(_) => Reply::BAD_REQUEST,
            ApiError::NonFiniteScore { .. } => Reply::INTERNAL_ERROR,
        }
    }
}

/// Settings that apply to every request
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Strategy used when the request doesn't name one
    pub default_strategy: String,
    /// Strategy that replaces whatever the request names
    pub strategy_override: Option<String>,
    /// Reference date for urgency
    pub today: NaiveDate,
}

impl AnalyzeOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            default_strategy: Strategy::default().name().to_string(),
            strategy_override: None,
            today,
        }
    }

    pub fn with_default_strategy(mut self, name: impl Into<String>) -> Self {
        self.default_strategy = name.into();
        self
    }

    pub fn with_strategy_override(mut self, name: impl Into<String>) -> Self {
        self.strategy_override = Some(name.into());
        self
    }
}

/// Fails on the first result whose score is infinite or NaN
pub fn ensure_finite(results: &[ScoredResult]) -> Result<(), ApiError> {
    match results.iter().find(|r| !r.score.is_finite()) {
        Some(bad) => Err(ApiError::NonFiniteScore {
            title: bad.title.clone(),
        }),
        None => Ok(()),
    }
}

/// Scores a parsed request
///
/// `strategy_used` echoes the requested name, even when it fell back to
/// `balanced`.
pub fn analyze_request<I>(
    request: &AnalyzeRequest,
    options: &AnalyzeOptions,
    index: &I,
) -> Result<AnalyzeResponse, ApiError>
where
    I: BlockingIndex + ?Sized,
{
    let strategy_used = options
        .strategy_override
        .clone()
        .or_else(|| request.strategy.clone())
        .unwrap_or_else(|| options.default_strategy.clone());

    let scorer = Scorer::for_name(&strategy_used, options.today);
    let tasks = scorer.analyze(&request.tasks, index);
    ensure_finite(&tasks)?;

    Ok(AnalyzeResponse::Success {
        strategy_used,
        tasks,
    })
}

/// Handles a raw request body end to end
pub fn handle_analyze<I>(body: &str, options: &AnalyzeOptions, index: &I) -> Reply
where
    I: BlockingIndex + ?Sized,
{
    let result = AnalyzeRequest::parse(body)
        .map_err(ApiError::from)
        .and_then(|request| analyze_request(&request, options, index));

    match result {
        Ok(body) => Reply::ok(body),
        Err(e) => Reply {
            status_code: e.status_code(),
            body: AnalyzeResponse::error(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NoIndex;
    use serde_json::{json, Value};

    fn options() -> AnalyzeOptions {
        AnalyzeOptions::new(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    fn body(value: Value) -> String {
        value.to_string()
    }

    fn sample_body(strategy: &str) -> String {
        body(json!({
            "strategy": strategy,
            "tasks": [
                { "id": 1, "title": "Urgent Task", "due_date": "2024-06-15", "importance": 5, "estimated_hours": 2.0 },
                { "id": 2, "title": "Important Task", "due_date": "2024-06-25", "importance": 10, "estimated_hours": 2.0 },
                { "id": 3, "title": "Quick Task", "due_date": "2024-06-20", "importance": 5, "estimated_hours": 0.5 }
            ]
        }))
    }

    fn first_title(reply: &Reply) -> &str {
        &reply.body.tasks()[0].title
    }

    #[test]
    fn strategies_pick_different_leaders() {
        let deadline = handle_analyze(&sample_body("deadline"), &options(), &NoIndex);
        let impact = handle_analyze(&sample_body("impact"), &options(), &NoIndex);
        let fastest = handle_analyze(&sample_body("fastest"), &options(), &NoIndex);

        assert!(deadline.is_success());
        assert_eq!(first_title(&deadline), "Urgent Task");
        assert_eq!(first_title(&impact), "Important Task");
        assert_eq!(first_title(&fastest), "Quick Task");
    }

    #[test]
    fn success_body_shape() {
        let reply = handle_analyze(&sample_body("impact"), &options(), &NoIndex);
        let json = serde_json::to_value(&reply).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["strategy_used"], "impact");
        assert_eq!(json["tasks"][0]["id"], 2);
        assert_eq!(json["tasks"][0]["due_date"], "2024-06-25");
        assert_eq!(json["tasks"][0]["score"], 312.5);
        assert_eq!(json["tasks"][0]["blocking_count"], 0);
    }

    #[test]
    fn unknown_strategy_is_echoed_but_scored_as_balanced() {
        let unknown = handle_analyze(&sample_body("speedy"), &options(), &NoIndex);
        let balanced = handle_analyze(&sample_body("balanced"), &options(), &NoIndex);

        match &unknown.body {
            AnalyzeResponse::Success { strategy_used, .. } => assert_eq!(strategy_used, "speedy"),
            other => panic!("unexpected response: {:?}", other),
        }
        assert_eq!(unknown.body.tasks(), balanced.body.tasks());
    }

    #[test]
    fn missing_strategy_uses_default() {
        let options = options().with_default_strategy("deadline");
        let reply = handle_analyze(&body(json!({ "tasks": [] })), &options, &NoIndex);

        assert_eq!(
            reply.body,
            AnalyzeResponse::Success {
                strategy_used: "deadline".to_string(),
                tasks: vec![]
            }
        );
    }

    #[test]
    fn override_beats_requested_strategy() {
        let options = options().with_strategy_override("fastest");
        let reply = handle_analyze(&sample_body("deadline"), &options, &NoIndex);

        match &reply.body {
            AnalyzeResponse::Success { strategy_used, .. } => assert_eq!(strategy_used, "fastest"),
            other => panic!("unexpected response: {:?}", other),
        }
        assert_eq!(first_title(&reply), "Quick Task");
    }

    #[test]
    fn dependencies_count_as_blocking() {
        let reply = handle_analyze(
            &body(json!({
                "tasks": [
                    { "title": "Leaf", "importance": 5 },
                    { "title": "Hub", "importance": 5, "dependencies": [1, 2, 3] }
                ]
            })),
            &options(),
            &NoIndex,
        );

        let tasks = reply.body.tasks();
        assert_eq!(tasks[0].title, "Hub");
        assert_eq!(tasks[0].blocking_count, 3);
        assert_eq!(tasks[0].score - tasks[1].score, 60.0);
    }

    #[test]
    fn invalid_json_is_a_client_error() {
        let reply = handle_analyze("{\"tasks\": [", &options(), &NoIndex);

        assert_eq!(reply.status_code, 400);
        assert_eq!(reply.body, AnalyzeResponse::error("Invalid JSON"));
    }

    #[test]
    fn bad_field_is_a_client_error() {
        let reply = handle_analyze(
            &body(json!({ "tasks": [{ "importance": 42 }] })),
            &options(),
            &NoIndex,
        );

        assert_eq!(reply.status_code, 400);
        match reply.body {
            AnalyzeResponse::Error { message } => assert!(message.contains("importance")),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn overflowing_score_is_a_server_error() {
        let reply = handle_analyze(
            &body(json!({ "tasks": [{ "title": "Instant", "estimated_hours": "1e-320" }] })),
            &options(),
            &NoIndex,
        );

        assert_eq!(reply.status_code, 500);
        match reply.body {
            AnalyzeResponse::Error { message } => assert!(message.contains("Instant")),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn ensure_finite_names_the_offending_task() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let tasks = vec![
            crate::domain::TaskInput::new("Fine"),
            crate::domain::TaskInput::new("Instant").with_estimated_hours(3e-308),
        ];
        let results = Scorer::new(Strategy::Balanced, today).analyze(&tasks, &NoIndex);

        assert_eq!(results[0].title, "Instant");
        assert!(ensure_finite(&results[1..]).is_ok());
        let err = ensure_finite(&results).unwrap_err();
        assert_eq!(err.status_code(), Reply::INTERNAL_ERROR);
        assert!(err.to_string().contains("Instant"));
    }
}
