//! Configuration file loading for tandem
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `TANDEM_<SECTION>__<KEY>` (e.g. `TANDEM_WORKFLOW__MAX_ITERATIONS=5`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./tandem.toml` or `./.tandem.toml`
//! 4. Global: `$XDG_CONFIG_HOME/tandem/config.toml` (or the platform equivalent)
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileAgentEndpoint, FileAgentsConfig, FileBudgetConfig, FileConfig, FileDebateConfig,
    FileEvaluationConfig, FileLoggingConfig, FileOutputConfig, FileOutputFormat, FileReplConfig,
    FileRoutingConfig, FileWorkflowConfig,
};
pub use loader::{ConfigLoader, ConfigSource};
