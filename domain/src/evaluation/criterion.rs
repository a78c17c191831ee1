//! Evaluation criteria

use serde::{Deserialize, Serialize};
use std::fmt;

/// A quality dimension a solution is scored on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Correctness,
    Completeness,
    Clarity,
    Efficiency,
    Security,
    Maintainability,
}

impl Criterion {
    pub fn all() -> [Criterion; 6] {
        [
            Criterion::Correctness,
            Criterion::Completeness,
            Criterion::Clarity,
            Criterion::Efficiency,
            Criterion::Security,
            Criterion::Maintainability,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Correctness => "correctness",
            Criterion::Completeness => "completeness",
            Criterion::Clarity => "clarity",
            Criterion::Efficiency => "efficiency",
            Criterion::Security => "security",
            Criterion::Maintainability => "maintainability",
        }
    }

    /// What the scorer is asked to judge. Included verbatim in every scoring
    /// prompt so each call is self-contained.
    pub fn description(&self) -> &'static str {
        match self {
            Criterion::Correctness => {
                "Does the solution actually achieve the goal without errors or false claims?"
            }
            Criterion::Completeness => {
                "Does it address every part of the task, including edge cases?"
            }
            Criterion::Clarity => "Is it easy to read, understand and act on?",
            Criterion::Efficiency => {
                "Does it avoid unnecessary work in time, memory and complexity?"
            }
            Criterion::Security => {
                "Does it avoid introducing vulnerabilities or unsafe practices?"
            }
            Criterion::Maintainability => {
                "Will it be straightforward to extend and modify later?"
            }
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Criterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Criterion::all()
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown criterion: {}", s))
    }
}
