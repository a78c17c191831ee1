//! Routing configuration from TOML (`[routing]` section)

use serde::{Deserialize, Serialize};
use tandem_domain::RoutingThresholds;

/// Tier thresholds in context units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoutingConfig {
    /// Sizes below this are handled by the primary agent alone
    pub t_small: u64,
    /// Sizes from this up are delegated to the auxiliary agent
    pub t_large: u64,
}

impl Default for FileRoutingConfig {
    fn default() -> Self {
        let defaults = RoutingThresholds::default();
        Self {
            t_small: defaults.t_small,
            t_large: defaults.t_large,
        }
    }
}

impl FileRoutingConfig {
    pub fn to_thresholds(&self) -> RoutingThresholds {
        RoutingThresholds::new(self.t_small, self.t_large)
    }
}

#[cfg(test)]
mod tests {
    use super::super::FileConfig;

    #[test]
    fn test_routing_deserialize() {
        let config: FileConfig = toml::from_str(
            r#"
[routing]
t_small = 4000
"#,
        )
        .unwrap();
        assert_eq!(config.routing.t_small, 4_000);
        assert_eq!(config.routing.t_large, 100_000);
    }
}
