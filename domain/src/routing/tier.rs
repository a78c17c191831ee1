//! Routing tiers and the division of labour within each.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing tier chosen from a task's estimated context size.
///
/// | Tier | Proposer | Reviewer / holder of full context |
/// |------|----------|-----------------------------------|
/// | Bounded | primary drafts | auxiliary reviews short context |
/// | Collaborative | primary plans, auxiliary analyses | auxiliary |
/// | Delegated | auxiliary heavy analysis, primary directs + validates | auxiliary |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingTier {
    /// `size < t_small`
    Bounded,
    /// `t_small <= size < t_large`
    Collaborative,
    /// `size >= t_large`
    Delegated,
}

/// Human-readable description of who does what in a tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierRoles {
    pub primary_role: &'static str,
    pub auxiliary_role: &'static str,
    pub steps: Vec<&'static str>,
}

impl RoutingTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingTier::Bounded => "bounded",
            RoutingTier::Collaborative => "collaborative",
            RoutingTier::Delegated => "delegated",
        }
    }

    /// Whether the auxiliary agent receives the full context bundle
    pub fn auxiliary_holds_full_context(&self) -> bool {
        !matches!(self, RoutingTier::Bounded)
    }

    pub fn roles(&self) -> TierRoles {
        match self {
            RoutingTier::Bounded => TierRoles {
                primary_role: "Primary processor - drafts the solution",
                auxiliary_role: "Verifier - reviews and critiques",
                steps: vec![
                    "Primary proposes a solution",
                    "Auxiliary reviews the solution",
                    "Primary refines while blocking issues remain",
                    "Debate when the reviewer offers an alternative",
                ],
            },
            RoutingTier::Collaborative => TierRoles {
                primary_role: "Coordinator - plans and composes",
                auxiliary_role: "Context provider - analyses the full context",
                steps: vec![
                    "Primary breaks the task down into a plan",
                    "Auxiliary analyses the full context against the plan",
                    "Primary composes the candidate from plan and analysis",
                    "Auxiliary reviews with full context",
                    "Primary refines while blocking issues remain",
                ],
            },
            RoutingTier::Delegated => TierRoles {
                primary_role: "Orchestrator - directs and validates",
                auxiliary_role: "Heavy lifter - processes the large context",
                steps: vec![
                    "Primary formulates the direction",
                    "Auxiliary performs the heavy analysis",
                    "Primary validates the findings",
                    "Auxiliary reviews with full context",
                    "Primary directs refinements until accepted",
                ],
            },
        }
    }
}

impl fmt::Display for RoutingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RoutingTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bounded" | "small" => Ok(RoutingTier::Bounded),
            "collaborative" | "medium" => Ok(RoutingTier::Collaborative),
            "delegated" | "large" => Ok(RoutingTier::Delegated),
            _ => Err(format!("Invalid routing tier: {}", s)),
        }
    }
}
