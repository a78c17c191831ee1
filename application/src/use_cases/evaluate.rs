//! Solution evaluation use case
//!
//! Scores solutions one criterion at a time through a scoring-capable agent
//! and compares two solutions by weighted total.

use crate::config::EvaluationConfig;
use crate::ports::agent::{Agent, AgentError};
use crate::use_cases::shared::{CallError, retry_once, with_timeout};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tandem_domain::{
    ComparisonResult, Criterion, DomainError, ScoreSet, Solution, Task,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Errors that can occur during evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("Scoring {criterion} failed: {source}")]
    Scoring {
        criterion: Criterion,
        #[source]
        source: AgentError,
    },

    #[error("Invalid score set: {0}")]
    InvalidScores(#[from] DomainError),

    #[error("Evaluation cancelled")]
    Cancelled,
}

/// Stateless evaluator, freely shared across tasks
pub struct SolutionEvaluator {
    scorer: Arc<dyn Agent>,
    config: EvaluationConfig,
    call_timeout: Duration,
}

impl SolutionEvaluator {
    /// Create an evaluator, rejecting an invalid tie margin up front.
    /// Weights are validated when [`EvaluationConfig`] is built.
    pub fn new(
        scorer: Arc<dyn Agent>,
        config: EvaluationConfig,
        call_timeout: Duration,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self {
            scorer,
            config,
            call_timeout,
        })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Score `solution` on each distinct criterion, one agent call each
    pub async fn score(
        &self,
        task: &Task,
        solution: &Solution,
        criteria: &[Criterion],
    ) -> Result<ScoreSet, EvaluationError> {
        self.score_with_cancel(task, solution, criteria, &CancellationToken::new())
            .await
    }

    pub async fn score_with_cancel(
        &self,
        task: &Task,
        solution: &Solution,
        criteria: &[Criterion],
        cancel: &CancellationToken,
    ) -> Result<ScoreSet, EvaluationError> {
        let distinct: BTreeSet<Criterion> = criteria.iter().copied().collect();
        let mut scores = ScoreSet::new();

        for criterion in distinct {
            let scorer = self.scorer.as_ref();
            let timeout = self.call_timeout;
            let result = retry_once(
                cancel,
                |attempt, err: &AgentError| {
                    warn!(
                        "Scoring {} failed (attempt {}): {}",
                        criterion, attempt, err
                    );
                },
                move || async move {
                    let score =
                        with_timeout(timeout, scorer.score(task, solution, criterion)).await?;
                    if score.criterion != criterion {
                        return Err(AgentError::ResponseMalformed(format!(
                            "asked for {}, scored {}",
                            criterion, score.criterion
                        )));
                    }
                    Ok(score)
                },
            )
            .await;

            match result {
                Ok(score) => {
                    debug!("{} scored {:.2} on {}", solution.id(), score.score, criterion);
                    scores.insert(score)?;
                }
                Err(CallError::Cancelled) => return Err(EvaluationError::Cancelled),
                Err(CallError::Failed(source)) => {
                    return Err(EvaluationError::Scoring { criterion, source });
                }
            }
        }

        Ok(scores)
    }

    /// `Σ weight[c] * scores[c].score` over the configured weights
    pub fn weighted_score(&self, scores: &ScoreSet) -> f64 {
        self.config.weights.weighted_score(scores)
    }

    /// Compare two solutions on the weighted criteria.
    ///
    /// Identical solutions are scored once and share the score set, so a
    /// solution compared with itself is always a tie.
    pub async fn compare(
        &self,
        task: &Task,
        a: &Solution,
        b: &Solution,
    ) -> Result<ComparisonResult, EvaluationError> {
        self.compare_with_cancel(task, a, b, &CancellationToken::new())
            .await
    }

    pub async fn compare_with_cancel(
        &self,
        task: &Task,
        a: &Solution,
        b: &Solution,
        cancel: &CancellationToken,
    ) -> Result<ComparisonResult, EvaluationError> {
        let criteria = self.config.weights.criteria();

        let scores_a = self.score_with_cancel(task, a, &criteria, cancel).await?;
        let total_a = self.weighted_score(&scores_a);

        let total_b = if a.id() == b.id() || a.same_content(b) {
            total_a
        } else {
            let scores_b = self.score_with_cancel(task, b, &criteria, cancel).await?;
            self.weighted_score(&scores_b)
        };

        let result = ComparisonResult::classify(total_a, total_b, self.config.tie_margin);
        debug!(
            "Compared {} ({:.3}) with {} ({:.3}): {:?}",
            a.id(),
            total_a,
            b.id(),
            total_b,
            result.verdict
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{Reply, ScriptedAgent};
    use std::collections::BTreeMap;
    use tandem_domain::{AgentRole, CriterionWeights, DebateSide, Verdict};

    fn two_criteria() -> EvaluationConfig {
        EvaluationConfig {
            weights: CriterionWeights::new(BTreeMap::from([
                (Criterion::Correctness, 0.6),
                (Criterion::Clarity, 0.4),
            ]))
            .unwrap(),
            tie_margin: 0.05,
        }
    }

    fn evaluator(scorer: Arc<ScriptedAgent>) -> SolutionEvaluator {
        SolutionEvaluator::new(scorer, two_criteria(), Duration::from_secs(5)).unwrap()
    }

    fn task() -> Task {
        Task::new("Write a sort").unwrap()
    }

    #[test]
    fn test_non_positive_tie_margin_rejected() {
        let scorer = Arc::new(ScriptedAgent::new(AgentRole::Primary, vec![]));
        let config = EvaluationConfig {
            tie_margin: 0.0,
            ..EvaluationConfig::default()
        };
        let err = SolutionEvaluator::new(scorer, config, Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn test_score_one_call_per_distinct_criterion() {
        let scorer = Arc::new(ScriptedAgent::new(
            AgentRole::Primary,
            vec![Reply::Score(0.9), Reply::Score(0.5)],
        ));
        let evaluator = evaluator(scorer.clone());
        let solution = Solution::proposal("merge sort", AgentRole::Primary, 1);

        let scores = evaluator
            .score(
                &task(),
                &solution,
                &[Criterion::Clarity, Criterion::Correctness, Criterion::Clarity],
            )
            .await
            .unwrap();

        assert_eq!(scores.len(), 2);
        assert_eq!(scorer.calls(), vec!["score", "score"]);
        // BTreeSet order: Correctness before Clarity
        assert_eq!(scores.get(Criterion::Correctness).unwrap().score, 0.9);
        assert!((evaluator.weighted_score(&scores) - (0.6 * 0.9 + 0.4 * 0.5)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_compare_same_solution_is_tie() {
        let scorer = Arc::new(ScriptedAgent::new(
            AgentRole::Primary,
            vec![Reply::Score(0.3), Reply::Score(0.8)],
        ));
        let evaluator = evaluator(scorer.clone());
        let solution = Solution::proposal("quick sort", AgentRole::Primary, 1);

        let result = evaluator.compare(&task(), &solution, &solution).await.unwrap();
        assert_eq!(result.verdict, Verdict::Tie);
        assert_eq!(result.total_a, result.total_b);
        assert_eq!(scorer.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_compare_picks_higher_total() {
        let scorer = Arc::new(ScriptedAgent::new(
            AgentRole::Primary,
            vec![
                Reply::Score(0.4),
                Reply::Score(0.4),
                Reply::Score(0.9),
                Reply::Score(0.9),
            ],
        ));
        let evaluator = evaluator(scorer);
        let a = Solution::proposal("bubble sort", AgentRole::Primary, 1);
        let b = Solution::proposal("merge sort", AgentRole::Auxiliary, 1);

        let result = evaluator.compare(&task(), &a, &b).await.unwrap();
        assert_eq!(result.verdict, Verdict::Winner(DebateSide::B));
    }

    #[tokio::test]
    async fn test_scoring_retried_once_then_fails() {
        let scorer = Arc::new(ScriptedAgent::new(
            AgentRole::Primary,
            vec![
                Reply::Fail(AgentError::ResponseMalformed("no json".into())),
                Reply::Score(0.7),
                Reply::Fail(AgentError::RateLimited("429".into())),
                Reply::Fail(AgentError::RateLimited("429".into())),
            ],
        ));
        let evaluator = evaluator(scorer);
        let solution = Solution::proposal("heap sort", AgentRole::Primary, 1);

        let err = evaluator
            .score(&task(), &solution, &[Criterion::Correctness, Criterion::Clarity])
            .await
            .unwrap_err();
        assert_eq!(
            err,
            EvaluationError::Scoring {
                criterion: Criterion::Clarity,
                source: AgentError::RateLimited("429".into()),
            }
        );
    }
}
