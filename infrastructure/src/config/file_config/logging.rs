//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for per-task JSONL transcripts; none are written if unset
    pub transcript_dir: Option<String>,
}

impl FileLoggingConfig {
    /// Transcript directory with a leading `~` expanded
    pub fn transcript_path(&self) -> Option<PathBuf> {
        self.transcript_dir.as_deref().map(expand_home)
    }
}

pub(crate) fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
