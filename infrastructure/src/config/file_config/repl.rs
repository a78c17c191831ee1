//! Interactive session configuration from TOML (`[repl]` section)

use super::logging::expand_home;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Show the stage spinner while a task runs
    pub show_progress: bool,
    /// Line history; defaults to the data directory
    pub history_file: Option<String>,
    /// Characters of the accepted solution carried into a `/continue` task
    pub continue_summary_chars: usize,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
            continue_summary_chars: 1_000,
        }
    }
}

impl FileReplConfig {
    pub fn history_path(&self) -> Option<PathBuf> {
        match &self.history_file {
            Some(path) => Some(expand_home(path)),
            None => dirs::data_dir().map(|d| d.join("tandem").join("history.txt")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_history_file_wins() {
        let config = FileReplConfig {
            history_file: Some("/tmp/tandem-history".to_string()),
            ..FileReplConfig::default()
        };
        assert_eq!(
            config.history_path(),
            Some(PathBuf::from("/tmp/tandem-history"))
        );
    }
}
