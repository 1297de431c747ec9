//! Analyze response bodies

use serde::Serialize;

use crate::domain::ScoredResult;

/// Response body, tagged by `status`
///
/// ```json
/// {"status": "success", "strategy_used": "deadline", "tasks": [...]}
/// {"status": "error", "message": "Invalid JSON"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalyzeResponse {
    Success {
        strategy_used: String,
        tasks: Vec<ScoredResult>,
    },
    Error {
        message: String,
    },
}

impl AnalyzeResponse {
    pub fn error(message: impl Into<String>) -> Self {
        AnalyzeResponse::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalyzeResponse::Success { .. })
    }

    /// Ranked tasks, empty for error responses
    pub fn tasks(&self) -> &[ScoredResult] {
        match self {
            AnalyzeResponse::Success { tasks, .. } => tasks,
            AnalyzeResponse::Error { .. } => &[],
        }
    }
}

/// HTTP-style status code plus body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    #[serde(skip)]
    pub status_code: u16,
    #[serde(flatten)]
    pub body: AnalyzeResponse,
}

impl Reply {
    pub const OK: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const INTERNAL_ERROR: u16 = 500;

    pub fn ok(body: AnalyzeResponse) -> Self {
        Self {
            status_code: Self::OK,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == Self::OK
    }
}
