//! Solution and critique entities

use crate::core::role::AgentRole;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static SOLUTION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifier of a solution within the process
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SolutionId(String);

impl SolutionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(format!(
            "sol-{}",
            SOLUTION_COUNTER.fetch_add(1, Ordering::Relaxed)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SolutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a solution came to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolutionOrigin {
    /// Direct answer to the task
    Proposal,
    /// Task breakdown or strategic direction by the primary agent
    Plan,
    /// Full-context analysis by the auxiliary agent
    Analysis,
    /// New version addressing a critique
    Refinement,
    /// Counter-proposal offered inside a critique
    Alternative,
    /// Combination of two debated solutions
    Synthesis,
}

impl SolutionOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolutionOrigin::Proposal => "proposal",
            SolutionOrigin::Plan => "plan",
            SolutionOrigin::Analysis => "analysis",
            SolutionOrigin::Refinement => "refinement",
            SolutionOrigin::Alternative => "alternative",
            SolutionOrigin::Synthesis => "synthesis",
        }
    }
}

/// Who produced a solution and when
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub author: AgentRole,
    /// Workflow iteration (1-based; 0 for pre-candidate work such as plans)
    pub iteration: usize,
    pub origin: SolutionOrigin,
}

/// A proposed artifact (text or code). Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    id: SolutionId,
    content: String,
    provenance: Provenance,
}

impl Solution {
    pub fn new(content: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            id: SolutionId::generate(),
            content: content.into(),
            provenance,
        }
    }

    pub fn proposal(content: impl Into<String>, author: AgentRole, iteration: usize) -> Self {
        Self::new(
            content,
            Provenance {
                author,
                iteration,
                origin: SolutionOrigin::Proposal,
            },
        )
    }

    pub fn id(&self) -> &SolutionId {
        &self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn provenance(&self) -> Provenance {
        self.provenance
    }

    pub fn author(&self) -> AgentRole {
        self.provenance.author
    }

    /// Build a new solution derived from this one. The original is untouched.
    pub fn derive(&self, content: impl Into<String>, provenance: Provenance) -> Solution {
        Solution::new(content, provenance)
    }

    /// Stamp the workflow iteration this solution is the candidate of
    pub fn at_iteration(mut self, iteration: usize) -> Self {
        self.provenance.iteration = iteration;
        self
    }

    /// Same artifact text, ignoring surrounding whitespace
    pub fn same_content(&self, other: &Solution) -> bool {
        self.content.trim() == other.content.trim()
    }
}

/// Severity of a single review finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Must be fixed before the solution can be accepted
    Blocking,
    /// Worth mentioning, does not prevent acceptance
    Advisory,
}

/// A single review finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub description: String,
    pub severity: Severity,
}

impl Issue {
    pub fn blocking(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            severity: Severity::Blocking,
        }
    }

    pub fn advisory(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            severity: Severity::Advisory,
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocking
    }
}

/// Structured review of exactly one [`Solution`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Critique {
    solution_id: SolutionId,
    pub reviewer: AgentRole,
    pub summary: String,
    pub issues: Vec<Issue>,
    /// Counter-proposal. Together with blocking issues this marks a
    /// disagreement rather than a refinement request.
    pub alternative: Option<Solution>,
}

impl Critique {
    pub fn new(solution: &Solution, reviewer: AgentRole, summary: impl Into<String>) -> Self {
        Self {
            solution_id: solution.id().clone(),
            reviewer,
            summary: summary.into(),
            issues: Vec::new(),
            alternative: None,
        }
    }

    /// A critique with no findings at all
    pub fn approval(solution: &Solution, reviewer: AgentRole) -> Self {
        Self::new(solution, reviewer, "No blocking issues")
    }

    pub fn with_issue(mut self, issue: Issue) -> Self {
        self.issues.push(issue);
        self
    }

    pub fn with_alternative(mut self, alternative: Solution) -> Self {
        self.alternative = Some(alternative);
        self
    }

    pub fn solution_id(&self) -> &SolutionId {
        &self.solution_id
    }

    pub fn has_blocking_issues(&self) -> bool {
        self.issues.iter().any(Issue::is_blocking)
    }

    pub fn blocking_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.is_blocking())
    }

    /// Blocking issues plus a counter-proposal
    pub fn is_disagreement(&self) -> bool {
        self.has_blocking_issues() && self.alternative.is_some()
    }

    /// Render the findings as a bullet list (used in prompts)
    pub fn render_issues(&self) -> String {
        if self.issues.is_empty() {
            return "(no issues)".to_string();
        }
        self.issues
            .iter()
            .map(|i| {
                let tag = match i.severity {
                    Severity::Blocking => "BLOCKING",
                    Severity::Advisory => "advisory",
                };
                format!("- [{}] {}", tag, i.description)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
