//! Agent roles
//!
//! The system always has exactly two collaborators. The primary agent works
//! with a bounded context and always initiates and validates a task; the
//! auxiliary agent has a large context window and is brought in for
//! analysis proportional to task size.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which collaborator produced or should handle something
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Bounded-context agent, always the orchestrator
    Primary,
    /// Large-context agent
    Auxiliary,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Primary => "primary",
            AgentRole::Auxiliary => "auxiliary",
        }
    }

    /// The other collaborator
    pub fn counterpart(&self) -> AgentRole {
        match self {
            AgentRole::Primary => AgentRole::Auxiliary,
            AgentRole::Auxiliary => AgentRole::Primary,
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counterpart() {
        assert_eq!(AgentRole::Primary.counterpart(), AgentRole::Auxiliary);
        assert_eq!(AgentRole::Auxiliary.counterpart(), AgentRole::Primary);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&AgentRole::Auxiliary).unwrap();
        assert_eq!(json, "\"auxiliary\"");
    }
}
