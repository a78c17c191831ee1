//! Per-criterion scores

use super::criterion::Criterion;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Score of one solution on one criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationScore {
    pub criterion: Criterion,
    /// In `[0, 1]`
    pub score: f64,
    pub reasoning: String,
    pub evidence: Vec<String>,
}

impl EvaluationScore {
    /// Build a score, clamping into `[0, 1]` (NaN becomes 0)
    pub fn new(
        criterion: Criterion,
        score: f64,
        reasoning: impl Into<String>,
        evidence: Vec<String>,
    ) -> Self {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        };
        Self {
            criterion,
            score,
            reasoning: reasoning.into(),
            evidence,
        }
    }
}

/// Scores keyed by criterion, one entry per criterion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSet {
    scores: BTreeMap<Criterion, EvaluationScore>,
}

impl ScoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a score. A second score for the same criterion is rejected.
    pub fn insert(&mut self, score: EvaluationScore) -> Result<(), DomainError> {
        if self.scores.contains_key(&score.criterion) {
            return Err(DomainError::DuplicateScore(score.criterion.to_string()));
        }
        self.scores.insert(score.criterion, score);
        Ok(())
    }

    pub fn get(&self, criterion: Criterion) -> Option<&EvaluationScore> {
        self.scores.get(&criterion)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EvaluationScore> {
        self.scores.values()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
