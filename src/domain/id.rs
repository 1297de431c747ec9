//! Task identifiers
//!
//! IDs are opaque to scoring. Callers may hand in integers (`42`) or strings
//! (`"api-login"`); both are echoed back in the shape they arrived in.
//!
//! Tasks created through the task store get generated IDs of the form
//! `t-{7-char-hash}` (e.g., `t-9d3e5f2`). The hash is derived from
//! title + creation timestamp, so the same title at different times
//! produces different IDs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Task ID must not be empty")]
    Empty,

    #[error("Task ID must not contain whitespace: '{0}'")]
    Whitespace(String),
}

/// Generates a 7-character hash from title and timestamp
fn generate_hash(title: &str, timestamp: DateTime<Utc>) -> String {
    let input = format!("{}{}", title, timestamp.timestamp_nanos_opt().unwrap_or(0));
    let hash = blake3::hash(input.as_bytes());
    let hex = hash.to_hex();
    hex[..7].to_string()
}

/// Opaque task identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    /// Numeric ID, usually assigned by an external data store
    Number(i64),
    /// Free-form string ID
    Name(String),
}

impl TaskId {
    /// Generates a new `t-{hash}` ID from title and timestamp
    pub fn generate(title: &str, timestamp: DateTime<Utc>) -> Self {
        TaskId::Name(format!("t-{}", generate_hash(title, timestamp)))
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{}", n),
            TaskId::Name(name) => f.write_str(name),
        }
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(IdError::Whitespace(s.to_string()));
        }

        // Digits-only IDs refer to numeric IDs so `rank task show 7` finds `7`
        if let Ok(n) = s.parse::<i64>() {
            return Ok(TaskId::Number(n));
        }

        Ok(TaskId::Name(s.to_string()))
    }
}

impl From<i64> for TaskId {
    fn from(n: i64) -> Self {
        TaskId::Number(n)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId::Name(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_is_unique_for_different_timestamps() {
        let title = "Same Title";
        let ts1 = Utc::now();
        let ts2 = ts1 + chrono::Duration::nanoseconds(1);

        let id1 = TaskId::generate(title, ts1);
        let id2 = TaskId::generate(title, ts2);

        assert_ne!(id1, id2);
    }

    #[test]
    fn generated_id_format_is_correct() {
        let id = TaskId::generate("Test", Utc::now());
        let s = id.to_string();

        assert!(s.starts_with("t-"));
        assert_eq!(s.len(), 9); // "t-" + 7 chars
        assert!(s[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_id_parses_back() {
        let original = TaskId::generate("Test", Utc::now());
        let parsed: TaskId = original.to_string().parse().unwrap();

        assert_eq!(original, parsed);
    }

    #[test]
    fn numeric_strings_parse_as_numbers() {
        assert_eq!("42".parse::<TaskId>().unwrap(), TaskId::Number(42));
        assert_eq!(" 7 ".parse::<TaskId>().unwrap(), TaskId::Number(7));
        assert_eq!("api-login".parse::<TaskId>().unwrap(), TaskId::from("api-login"));
    }

    #[test]
    fn rejects_invalid_ids() {
        assert_eq!("".parse::<TaskId>(), Err(IdError::Empty));
        assert_eq!("   ".parse::<TaskId>(), Err(IdError::Empty));
        assert!(matches!("a b".parse::<TaskId>(), Err(IdError::Whitespace(_))));
    }

    #[test]
    fn json_shape_is_preserved() {
        let number: TaskId = serde_json::from_str("12").unwrap();
        let name: TaskId = serde_json::from_str("\"12\"").unwrap();

        assert_eq!(number, TaskId::Number(12));
        assert_eq!(name, TaskId::Name("12".to_string()));
        assert_eq!(serde_json::to_string(&number).unwrap(), "12");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"12\"");
    }
}
