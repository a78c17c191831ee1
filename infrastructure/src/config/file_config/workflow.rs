//! Workflow configuration from TOML (`[workflow]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWorkflowConfig {
    /// Maximum number of critiques per task
    pub max_iterations: usize,
    /// Largest bundle a single auxiliary call can hold, in context units
    pub max_unit_size: u64,
    /// Timeout for one agent call
    pub call_timeout_seconds: u64,
    /// Reuse accepted results for identical tasks within one process
    pub cache_results: bool,
}

impl Default for FileWorkflowConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            max_unit_size: 1_000_000,
            call_timeout_seconds: 120,
            cache_results: true,
        }
    }
}
