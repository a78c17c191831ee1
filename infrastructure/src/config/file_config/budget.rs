//! Budget configuration from TOML (`[budget]` section)

use serde::{Deserialize, Serialize};
use tandem_application::BudgetPolicy;
use tandem_domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBudgetConfig {
    /// Total context units across all tasks of a process; unlimited if unset
    pub limit: Option<u64>,
    /// `warn` or `require_override`
    pub policy: String,
}

impl Default for FileBudgetConfig {
    fn default() -> Self {
        Self {
            limit: None,
            policy: "warn".to_string(),
        }
    }
}

impl FileBudgetConfig {
    pub fn parse_policy(&self) -> Result<BudgetPolicy, DomainError> {
        self.policy
            .parse()
            .map_err(|e: String| DomainError::configuration(format!("budget.policy: {}", e)))
    }
}
