//! Evaluation configuration from TOML (`[evaluation]` section)
//!
//! ```toml
//! [evaluation]
//! tie_margin = 0.05
//!
//! [evaluation.weights]
//! correctness = 0.5
//! security = 0.5
//! ```
//!
//! A `weights` table replaces the default weights as a whole, so it is kept
//! optional: merged configuration layers never mix default and custom
//! criteria.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tandem_application::EvaluationConfig;
use tandem_domain::{Criterion, CriterionWeights, DomainError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEvaluationConfig {
    /// Criterion name to weight; must sum to 1.0. Built-in weights if unset.
    pub weights: Option<BTreeMap<String, f64>>,
    pub tie_margin: f64,
}

impl Default for FileEvaluationConfig {
    fn default() -> Self {
        Self {
            weights: None,
            tie_margin: EvaluationConfig::default().tie_margin,
        }
    }
}

impl FileEvaluationConfig {
    pub fn to_evaluation_config(&self) -> Result<EvaluationConfig, DomainError> {
        let weights = match &self.weights {
            None => CriterionWeights::default(),
            Some(table) => {
                let mut weights = BTreeMap::new();
                for (name, weight) in table {
                    let criterion: Criterion = name.parse().map_err(|e: String| {
                        DomainError::configuration(format!("evaluation.weights: {}", e))
                    })?;
                    weights.insert(criterion, *weight);
                }
                CriterionWeights::new(weights)?
            }
        };

        let config = EvaluationConfig {
            weights,
            tie_margin: self.tie_margin,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_weights(pairs: &[(&str, f64)]) -> FileEvaluationConfig {
        FileEvaluationConfig {
            weights: Some(
                pairs
                    .iter()
                    .map(|(name, weight)| (name.to_string(), *weight))
                    .collect(),
            ),
            tie_margin: 0.05,
        }
    }

    #[test]
    fn test_default_uses_built_in_weights() {
        let config = FileEvaluationConfig::default().to_evaluation_config().unwrap();
        assert_eq!(config, EvaluationConfig::default());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let err = with_weights(&[("correctness", 0.5), ("clarity", 0.3)])
            .to_evaluation_config()
            .unwrap_err();
        assert!(err.to_string().contains("sum to 1.0"));
    }

    #[test]
    fn test_unknown_criterion_rejected() {
        let err = with_weights(&[("style", 1.0)])
            .to_evaluation_config()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_zero_tie_margin_rejected() {
        let config = FileEvaluationConfig {
            tie_margin: 0.0,
            ..FileEvaluationConfig::default()
        };
        assert!(config.to_evaluation_config().is_err());
    }
}
