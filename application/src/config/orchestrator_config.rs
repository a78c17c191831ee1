//! Orchestrator configuration.
//!
//! [`OrchestratorConfig`] groups every value the orchestration core
//! consumes. All thresholds are explicit; [`Default`] supplies documented
//! starting points and [`OrchestratorConfig::validate`] rejects anything
//! inconsistent before a use case is constructed.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tandem_domain::{ConvergenceThresholds, CriterionWeights, DomainError, RoutingThresholds};

/// Debate loop parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateConfig {
    /// Hard cap on rounds (>= 1)
    pub max_rounds: usize,
    pub thresholds: ConvergenceThresholds,
    /// Have the auxiliary check the synthesis against the debate's concerns
    pub validate_synthesis: bool,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            thresholds: ConvergenceThresholds::default(),
            validate_synthesis: true,
        }
    }
}

impl DebateConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_rounds == 0 {
            return Err(DomainError::configuration(
                "debate.max_rounds must be at least 1",
            ));
        }
        self.thresholds.validate()
    }
}

/// Evaluator parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub weights: CriterionWeights,
    /// Totals closer than this are a tie (> 0)
    pub tie_margin: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            weights: CriterionWeights::default(),
            tie_margin: 0.05,
        }
    }
}

impl EvaluationConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.tie_margin.is_finite() || self.tie_margin <= 0.0 {
            return Err(DomainError::configuration(format!(
                "evaluation.tie_margin must be a positive number, got {}",
                self.tie_margin
            )));
        }
        Ok(())
    }
}

/// What happens when the shared budget is exceeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPolicy {
    /// Record a warning and continue
    #[default]
    Warn,
    /// Fail the task unless an override was given
    RequireOverride,
}

impl std::str::FromStr for BudgetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "warn" => Ok(BudgetPolicy::Warn),
            "require_override" => Ok(BudgetPolicy::RequireOverride),
            _ => Err(format!("Invalid budget policy: {}", s)),
        }
    }
}

/// Configuration consumed by the orchestration core
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    pub routing: RoutingThresholds,
    /// Maximum number of critiques per task (>= 1)
    pub max_iterations: usize,
    /// Largest bundle a single auxiliary call can hold, in context units
    pub max_unit_size: u64,
    pub debate: DebateConfig,
    pub evaluation: EvaluationConfig,
    /// Per agent call
    pub call_timeout: Duration,
    pub budget_policy: BudgetPolicy,
    /// Explicit override for [`BudgetPolicy::RequireOverride`]
    pub budget_override: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            routing: RoutingThresholds::default(),
            max_iterations: 3,
            max_unit_size: 1_000_000,
            debate: DebateConfig::default(),
            evaluation: EvaluationConfig::default(),
            call_timeout: Duration::from_secs(120),
            budget_policy: BudgetPolicy::Warn,
            budget_override: false,
        }
    }
}

impl OrchestratorConfig {
    /// Check every section; the first problem found is returned
    pub fn validate(&self) -> Result<(), DomainError> {
        self.routing.validate()?;
        if self.max_iterations == 0 {
            return Err(DomainError::configuration(
                "workflow.max_iterations must be at least 1",
            ));
        }
        if self.max_unit_size == 0 {
            return Err(DomainError::configuration(
                "workflow.max_unit_size must be greater than 0",
            ));
        }
        if self.call_timeout.is_zero() {
            return Err(DomainError::configuration(
                "workflow.call_timeout must be greater than 0",
            ));
        }
        self.debate.validate()?;
        self.evaluation.validate()
    }

    // ==================== Builder Methods ====================

    pub fn with_routing(mut self, routing: RoutingThresholds) -> Self {
        self.routing = routing;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_max_debate_rounds(mut self, max: usize) -> Self {
        self.debate.max_rounds = max;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_budget_policy(mut self, policy: BudgetPolicy, overridden: bool) -> Self {
        self.budget_policy = policy;
        self.budget_override = overridden;
        self
    }
}
