//! Scoring strategies
//!
//! A strategy is a named weight vector applied to the four sub-scores.
//! The set is closed: unknown names resolve to [`Strategy::Balanced`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("Unknown strategy '{0}' (expected one of: balanced, fastest, impact, deadline)")]
pub struct UnknownStrategy(pub String);

/// Multipliers applied to each sub-score before summation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Weights {
    pub urgency: f64,
    pub importance: f64,
    pub effort: f64,
    pub dependency: f64,
}

/// Named weight profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Balanced,
    /// Low effort first
    Fastest,
    /// High importance first
    Impact,
    /// Due dates first
    Deadline,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Balanced,
        Strategy::Fastest,
        Strategy::Impact,
        Strategy::Deadline,
    ];

    /// Resolves a strategy by name, falling back to `Balanced`
    pub fn resolve(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    pub fn weights(&self) -> Weights {
        match self {
            Strategy::Balanced => Weights {
                urgency: 1.5,
                importance: 1.2,
                effort: 0.8,
                dependency: 2.0,
            },
            Strategy::Fastest => Weights {
                urgency: 0.5,
                importance: 0.5,
                effort: 3.0,
                dependency: 0.5,
            },
            Strategy::Impact => Weights {
                urgency: 0.5,
                importance: 3.0,
                effort: 0.5,
                dependency: 0.5,
            },
            Strategy::Deadline => Weights {
                urgency: 3.0,
                importance: 0.5,
                effort: 0.5,
                dependency: 1.0,
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Balanced => "balanced",
            Strategy::Fastest => "fastest",
            Strategy::Impact => "impact",
            Strategy::Deadline => "deadline",
        }
    }

    /// One-line summary for help output
    pub fn description(&self) -> &'static str {
        match self {
            Strategy::Balanced => "Weighs all factors, favoring tasks that unblock others",
            Strategy::Fastest => "Quick wins first",
            Strategy::Impact => "Most important work first",
            Strategy::Deadline => "Overdue and soon-due tasks first",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Strict lookup; names are matched exactly
impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| UnknownStrategy(s.to_string()))
    }
}

/// Returns the weight vector for a strategy name, `balanced` if unknown
pub fn resolve_strategy(name: &str) -> Weights {
    Strategy::resolve(name).weights()
}
