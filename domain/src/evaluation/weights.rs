//! Criterion weights and solution comparison

use super::criterion::Criterion;
use super::score::ScoreSet;
use crate::core::error::DomainError;
use crate::debate::DebateSide;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tolerance when checking that weights sum to one
pub const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// Validated weights: finite, non-negative, summing to 1.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Criterion, f64>", into = "BTreeMap<Criterion, f64>")]
pub struct CriterionWeights {
    weights: BTreeMap<Criterion, f64>,
}

impl CriterionWeights {
    pub fn new(weights: BTreeMap<Criterion, f64>) -> Result<Self, DomainError> {
        if weights.is_empty() {
            return Err(DomainError::configuration(
                "evaluation.weights must name at least one criterion",
            ));
        }
        if let Some((criterion, weight)) = weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(DomainError::configuration(format!(
                "evaluation.weights.{} must be a non-negative number, got {}",
                criterion, weight
            )));
        }

        let sum: f64 = weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(DomainError::configuration(format!(
                "evaluation.weights must sum to 1.0, got {:.6}",
                sum
            )));
        }

        Ok(Self { weights })
    }

    /// Criteria with a configured weight, in a stable order
    pub fn criteria(&self) -> Vec<Criterion> {
        self.weights.keys().copied().collect()
    }

    pub fn weight(&self, criterion: Criterion) -> f64 {
        self.weights.get(&criterion).copied().unwrap_or(0.0)
    }

    /// `Σ weight[c] * scores[c].score`; criteria missing from `scores`
    /// contribute nothing
    pub fn weighted_score(&self, scores: &ScoreSet) -> f64 {
        self.weights
            .iter()
            .filter_map(|(criterion, weight)| scores.get(*criterion).map(|s| weight * s.score))
            .sum()
    }
}

impl Default for CriterionWeights {
    fn default() -> Self {
        let weights = BTreeMap::from([
            (Criterion::Correctness, 0.30),
            (Criterion::Completeness, 0.20),
            (Criterion::Clarity, 0.15),
            (Criterion::Efficiency, 0.15),
            (Criterion::Security, 0.10),
            (Criterion::Maintainability, 0.10),
        ]);
        Self { weights }
    }
}

impl TryFrom<BTreeMap<Criterion, f64>> for CriterionWeights {
    type Error = DomainError;

    fn try_from(weights: BTreeMap<Criterion, f64>) -> Result<Self, Self::Error> {
        Self::new(weights)
    }
}

impl From<CriterionWeights> for BTreeMap<Criterion, f64> {
    fn from(weights: CriterionWeights) -> Self {
        weights.weights
    }
}

/// Result of comparing two solutions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "side", rename_all = "snake_case")]
pub enum Verdict {
    Tie,
    Winner(DebateSide),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub total_a: f64,
    pub total_b: f64,
    pub verdict: Verdict,
}

impl ComparisonResult {
    /// `Tie` when the totals differ by less than `tie_margin`
    pub fn classify(total_a: f64, total_b: f64, tie_margin: f64) -> Self {
        let verdict = if (total_a - total_b).abs() < tie_margin {
            Verdict::Tie
        } else if total_a > total_b {
            Verdict::Winner(DebateSide::A)
        } else {
            Verdict::Winner(DebateSide::B)
        };
        Self {
            total_a,
            total_b,
            verdict,
        }
    }

    pub fn is_tie(&self) -> bool {
        self.verdict == Verdict::Tie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::score::EvaluationScore;

    #[test]
    fn test_default_weights_are_valid() {
        let defaults = CriterionWeights::default();
        assert!(CriterionWeights::new(defaults.clone().into()).is_ok());
        assert_eq!(defaults.criteria().len(), 6);
    }

    #[test]
    fn test_weights_summing_to_point_eight_rejected() {
        let weights = BTreeMap::from([(Criterion::Correctness, 0.5), (Criterion::Clarity, 0.3)]);
        let err = CriterionWeights::new(weights).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("sum to 1.0"));
    }

    #[test]
    fn test_negative_and_nan_weights_rejected() {
        let negative = BTreeMap::from([(Criterion::Correctness, 1.5), (Criterion::Clarity, -0.5)]);
        assert!(CriterionWeights::new(negative).is_err());
        let nan = BTreeMap::from([(Criterion::Correctness, f64::NAN)]);
        assert!(CriterionWeights::new(nan).is_err());
        assert!(CriterionWeights::new(BTreeMap::new()).is_err());
    }

    #[test]
    fn test_weights_deserialize_with_validation() {
        let ok: CriterionWeights =
            serde_json::from_str(r#"{"correctness": 0.6, "security": 0.4}"#).unwrap();
        assert_eq!(ok.weight(Criterion::Security), 0.4);
        assert!(serde_json::from_str::<CriterionWeights>(r#"{"correctness": 0.6}"#).is_err());
    }

    #[test]
    fn test_weighted_score_ignores_missing_criteria() {
        let weights =
            CriterionWeights::new(BTreeMap::from([(Criterion::Correctness, 0.75), (Criterion::Clarity, 0.25)]))
                .unwrap();
        let mut scores = ScoreSet::new();
        scores
            .insert(EvaluationScore::new(Criterion::Correctness, 0.8, "", vec![]))
            .unwrap();
        scores
            .insert(EvaluationScore::new(Criterion::Security, 1.0, "", vec![]))
            .unwrap();
        assert!((weights.weighted_score(&scores) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_classify() {
        assert!(ComparisonResult::classify(0.70, 0.72, 0.05).is_tie());
        assert!(ComparisonResult::classify(0.5, 0.5, 0.05).is_tie());
        assert_eq!(
            ComparisonResult::classify(0.9, 0.6, 0.05).verdict,
            Verdict::Winner(DebateSide::A)
        );
        assert_eq!(
            ComparisonResult::classify(0.4, 0.6, 0.05).verdict,
            Verdict::Winner(DebateSide::B)
        );
    }
}
