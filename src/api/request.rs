//! Analyze request parsing
//!
//! Requests arrive as loosely-typed JSON from web clients, so fields are
//! coerced rather than deserialized strictly:
//!
//! - `due_date` that isn't a `YYYY-MM-DD` string becomes "no due date"
//! - `importance` accepts integers, floats (truncated) and integer strings
//! - `estimated_hours` accepts numbers and numeric strings
//! - `dependencies` only contributes its length, as the blocking count

use chrono::NaiveDate;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::{validate_importance, BlockingCount, TaskId, TaskInput};

/// Date format accepted for `due_date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DEFAULT_TITLE: &str = "Untitled";
const DEFAULT_IMPORTANCE: i64 = 1;
const DEFAULT_ESTIMATED_HOURS: f64 = 1.0;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid JSON")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Invalid JSON")]
    NotAnObject,

    #[error("Invalid '{field}': {reason}")]
    InvalidRequestField { field: &'static str, reason: String },

    #[error("Task {index}: expected an object")]
    TaskNotAnObject { index: usize },

    #[error("Task {index}: invalid '{field}': {reason}")]
    InvalidTaskField {
        index: usize,
        field: &'static str,
        reason: String,
    },
}

/// A parsed analyze request
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeRequest {
    pub tasks: Vec<TaskInput>,
    /// Requested strategy name, `None` to use the configured default
    pub strategy: Option<String>,
}

impl AnalyzeRequest {
    /// Parses a raw request body
    pub fn parse(body: &str) -> Result<Self, RequestError> {
        let value: Value = serde_json::from_str(body).map_err(RequestError::InvalidJson)?;
        Self::from_value(&value)
    }

    /// Builds a request from an already-decoded JSON value
    pub fn from_value(value: &Value) -> Result<Self, RequestError> {
        let root = value.as_object().ok_or(RequestError::NotAnObject)?;

        let strategy = match root.get("strategy") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.clone()),
            Some(other) => {
                return Err(RequestError::InvalidRequestField {
                    field: "strategy",
                    reason: format!("expected a string, got {}", type_name(other)),
                })
            }
        };

        let raw_tasks: &[Value] = match root.get("tasks") {
            None | Some(Value::Null) => &[],
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(RequestError::InvalidRequestField {
                    field: "tasks",
                    reason: format!("expected an array, got {}", type_name(other)),
                })
            }
        };

        let tasks = raw_tasks
            .iter()
            .enumerate()
            .map(|(index, item)| parse_task(index, item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { tasks, strategy })
    }
}

fn parse_task(index: usize, item: &Value) -> Result<TaskInput, RequestError> {
    let obj = item
        .as_object()
        .ok_or(RequestError::TaskNotAnObject { index })?;

    let field_error = |field: &'static str, reason: String| RequestError::InvalidTaskField {
        index,
        field,
        reason,
    };

    let id = parse_id(obj).map_err(|reason| field_error("id", reason))?;
    let title = parse_title(obj).map_err(|reason| field_error("title", reason))?;
    let importance = parse_importance(obj).map_err(|reason| field_error("importance", reason))?;
    let estimated_hours =
        parse_estimated_hours(obj).map_err(|reason| field_error("estimated_hours", reason))?;

    let explicit = parse_blocking_count(obj).map_err(|reason| field_error("blocking_count", reason))?;
    let blocking = match explicit {
        Some(count) => count,
        None => parse_dependency_count(obj).map_err(|reason| field_error("dependencies", reason))?,
    };

    Ok(TaskInput {
        id,
        title,
        due_date: parse_due_date(obj),
        estimated_hours,
        importance,
        blocking: BlockingCount::Known(blocking),
    })
}

fn parse_id(obj: &Map<String, Value>) -> Result<Option<TaskId>, String> {
    match obj.get("id") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(|n| Some(TaskId::Number(n)))
            .ok_or_else(|| format!("expected an integer, got {}", n)),
        Some(Value::String(s)) => Ok(Some(TaskId::Name(s.clone()))),
        Some(other) => Err(format!("expected an integer or string, got {}", type_name(other))),
    }
}

fn parse_title(obj: &Map<String, Value>) -> Result<String, String> {
    match obj.get("title") {
        None | Some(Value::Null) => Ok(DEFAULT_TITLE.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(format!("expected a string, got {}", type_name(other))),
    }
}

/// Unparseable dates degrade to "no due date"
fn parse_due_date(obj: &Map<String, Value>) -> Option<NaiveDate> {
    obj.get("due_date")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
}

fn parse_importance(obj: &Map<String, Value>) -> Result<u8, String> {
    let raw = match obj.get("importance") {
        None | Some(Value::Null) => DEFAULT_IMPORTANCE,
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i,
            None => match n.as_f64() {
                Some(f) if f.is_finite() && f.abs() < i64::MAX as f64 => f.trunc() as i64,
                _ => return Err(format!("expected an integer, got {}", n)),
            },
        },
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("expected an integer, got '{}'", s))?,
        Some(other) => return Err(format!("expected an integer, got {}", type_name(other))),
    };

    validate_importance(raw).map_err(|e| e.to_string())
}

fn parse_estimated_hours(obj: &Map<String, Value>) -> Result<f64, String> {
    let hours = match obj.get("estimated_hours") {
        None | Some(Value::Null) => DEFAULT_ESTIMATED_HOURS,
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| format!("expected a number, got {}", n))?,
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("expected a number, got '{}'", s))?,
        Some(other) => return Err(format!("expected a number, got {}", type_name(other))),
    };

    if hours.is_finite() {
        Ok(hours)
    } else {
        Err(format!("expected a finite number, got {}", hours))
    }
}

fn parse_blocking_count(obj: &Map<String, Value>) -> Result<Option<u32>, String> {
    match obj.get("blocking_count") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| format!("expected a non-negative integer, got {}", n)),
        Some(other) => Err(format!(
            "expected a non-negative integer, got {}",
            type_name(other)
        )),
    }
}

fn parse_dependency_count(obj: &Map<String, Value>) -> Result<u32, String> {
    match obj.get("dependencies") {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Array(items)) => {
            u32::try_from(items.len()).map_err(|_| "too many dependencies".to_string())
        }
        Some(other) => Err(format!("expected an array, got {}", type_name(other))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<AnalyzeRequest, RequestError> {
        AnalyzeRequest::from_value(&value)
    }

    fn single(task: Value) -> TaskInput {
        parse(json!({ "tasks": [task] })).unwrap().tasks.remove(0)
    }

    #[test]
    fn empty_object_is_an_empty_request() {
        let request = parse(json!({})).unwrap();
        assert!(request.tasks.is_empty());
        assert!(request.strategy.is_none());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let task = single(json!({}));
        assert_eq!(task.id, None);
        assert_eq!(task.title, "Untitled");
        assert_eq!(task.importance, 1);
        assert_eq!(task.estimated_hours, 1.0);
        assert_eq!(task.due_date, None);
        assert_eq!(task.blocking, BlockingCount::Known(0));
    }

    #[test]
    fn full_task_is_parsed() {
        let task = single(json!({
            "id": 7,
            "title": "Fix login",
            "due_date": "2024-06-20",
            "importance": 8,
            "estimated_hours": 2.5,
            "dependencies": [1, 2]
        }));

        assert_eq!(task.id, Some(TaskId::Number(7)));
        assert_eq!(task.title, "Fix login");
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2024, 6, 20));
        assert_eq!(task.importance, 8);
        assert_eq!(task.estimated_hours, 2.5);
        assert_eq!(task.blocking, BlockingCount::Known(2));
    }

    #[test]
    fn bad_dates_degrade_to_none() {
        assert_eq!(single(json!({ "due_date": "20/06/2024" })).due_date, None);
        assert_eq!(single(json!({ "due_date": "2024-02-30" })).due_date, None);
        assert_eq!(single(json!({ "due_date": "" })).due_date, None);
        assert_eq!(single(json!({ "due_date": 20240620 })).due_date, None);
    }

    #[test]
    fn importance_is_coerced() {
        assert_eq!(single(json!({ "importance": "6" })).importance, 6);
        assert_eq!(single(json!({ "importance": 7.9 })).importance, 7);
        assert_eq!(single(json!({ "importance": null })).importance, 1);
    }

    #[test]
    fn importance_out_of_range_is_rejected() {
        let err = parse(json!({ "tasks": [{ "importance": 11 }] })).unwrap_err();
        assert!(matches!(
            err,
            RequestError::InvalidTaskField { index: 0, field: "importance", .. }
        ));

        assert!(parse(json!({ "tasks": [{ "importance": "high" }] })).is_err());
        assert!(parse(json!({ "tasks": [{ "importance": 0 }] })).is_err());
    }

    #[test]
    fn hours_are_coerced_and_passed_through() {
        assert_eq!(single(json!({ "estimated_hours": "1.5" })).estimated_hours, 1.5);
        assert_eq!(single(json!({ "estimated_hours": 3 })).estimated_hours, 3.0);
        // Non-positive hours are the scorer's concern
        assert_eq!(single(json!({ "estimated_hours": 0 })).estimated_hours, 0.0);
        assert!(parse(json!({ "tasks": [{ "estimated_hours": "soon" }] })).is_err());
        assert!(parse(json!({ "tasks": [{ "estimated_hours": "inf" }] })).is_err());
    }

    #[test]
    fn explicit_blocking_count_wins_over_dependencies() {
        let task = single(json!({ "blocking_count": 4, "dependencies": [1] }));
        assert_eq!(task.blocking, BlockingCount::Known(4));

        assert!(parse(json!({ "tasks": [{ "blocking_count": -1 }] })).is_err());
        assert!(parse(json!({ "tasks": [{ "dependencies": "1,2" }] })).is_err());
    }

    #[test]
    fn string_ids_keep_their_shape() {
        assert_eq!(single(json!({ "id": "42" })).id, Some(TaskId::Name("42".to_string())));
        assert!(parse(json!({ "tasks": [{ "id": 1.5 }] })).is_err());
        assert!(parse(json!({ "tasks": [{ "id": [1] }] })).is_err());
    }

    #[test]
    fn structural_errors() {
        assert!(matches!(
            AnalyzeRequest::parse("{not json"),
            Err(RequestError::InvalidJson(_))
        ));
        assert!(matches!(parse(json!([])), Err(RequestError::NotAnObject)));
        assert_eq!(RequestError::NotAnObject.to_string(), "Invalid JSON");
        assert!(matches!(
            parse(json!({ "tasks": {} })),
            Err(RequestError::InvalidRequestField { field: "tasks", .. })
        ));
        assert!(matches!(
            parse(json!({ "strategy": 3 })),
            Err(RequestError::InvalidRequestField { field: "strategy", .. })
        ));
        assert!(matches!(
            parse(json!({ "tasks": [{}, "oops"] })),
            Err(RequestError::TaskNotAnObject { index: 1 })
        ));
    }

    #[test]
    fn strategy_is_kept_verbatim() {
        let request = parse(json!({ "strategy": "speedy" })).unwrap();
        assert_eq!(request.strategy.as_deref(), Some("speedy"));
    }
}
