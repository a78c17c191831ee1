//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! Every section has defaults, so a partial file is always valid TOML for
//! [`FileConfig`]; semantic checks happen in
//! [`FileConfig::to_orchestrator_config`].

mod agents;
mod budget;
mod debate;
mod evaluation;
mod logging;
mod output;
mod repl;
mod routing;
mod workflow;

pub use agents::{FileAgentEndpoint, FileAgentsConfig};
pub use budget::FileBudgetConfig;
pub use debate::FileDebateConfig;
pub use evaluation::FileEvaluationConfig;
pub use logging::FileLoggingConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use repl::FileReplConfig;
pub use routing::FileRoutingConfig;
pub use workflow::FileWorkflowConfig;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tandem_application::OrchestratorConfig;
use tandem_domain::{AgentRole, DomainError};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub routing: FileRoutingConfig,
    pub workflow: FileWorkflowConfig,
    pub debate: FileDebateConfig,
    pub evaluation: FileEvaluationConfig,
    pub budget: FileBudgetConfig,
    pub agents: FileAgentsConfig,
    pub output: FileOutputConfig,
    pub repl: FileReplConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Convert to the validated configuration the orchestrator consumes.
    ///
    /// `budget_override` comes from the command line, never from a file.
    pub fn to_orchestrator_config(
        &self,
        budget_override: bool,
    ) -> Result<OrchestratorConfig, DomainError> {
        for role in [AgentRole::Primary, AgentRole::Auxiliary] {
            self.agents.endpoint(role).validate(role)?;
        }

        let config = OrchestratorConfig {
            routing: self.routing.to_thresholds(),
            max_iterations: self.workflow.max_iterations,
            max_unit_size: self.workflow.max_unit_size,
            debate: self.debate.to_debate_config(),
            evaluation: self.evaluation.to_evaluation_config()?,
            call_timeout: Duration::from_secs(self.workflow.call_timeout_seconds),
            budget_policy: self.budget.parse_policy()?,
            budget_override,
        };
        config.validate()?;
        Ok(config)
    }
}
