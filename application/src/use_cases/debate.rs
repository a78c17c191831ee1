//! Debate use case
//!
//! Runs a structured debate between the primary agent (side A, defending
//! the candidate) and the auxiliary agent (side B, defending the
//! alternative) and settles it with a synthesis.
//!
//! ```text
//! round 1..=max_rounds:
//!     argue(A) ─┐
//!               ├─ join ─> push round ─> consensus? ─> stalemate?
//!     argue(B) ─┘
//! synthesize(A, B, transcript) ─> [auxiliary checks concerns] ─> [primary refines]
//! ```
//!
//! A round or the synthesis that fails twice aborts the debate; the winner
//! is then picked by the [`SolutionEvaluator`].

use crate::config::DebateConfig;
use crate::ports::agent::{Agent, AgentError};
use crate::ports::progress::{NoProgress, WorkflowProgress, WorkflowStage};
use crate::use_cases::evaluate::{EvaluationError, SolutionEvaluator};
use crate::use_cases::shared::{CallError, failed_call, retry_once, with_timeout};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tandem_domain::{
    AgentRole, Argument, CritiqueContext, DebateOutcome, DebateSide, DebateTranscript,
    DecisionTrace, DomainError, LexicalSimilarity, Resolution, SimilarityMeasure, Solution, Task,
    Verdict, WorkflowStep, detect_consensus_with, detect_stalemate_with,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that can occur while facilitating a debate
#[derive(Error, Debug)]
pub enum DebateError {
    #[error("Invalid debate configuration: {0}")]
    Configuration(#[from] DomainError),

    #[error("Debate aborted and no winner could be picked: {0}")]
    Evaluation(EvaluationError),

    #[error("Debate cancelled")]
    Cancelled,
}

/// Per-debate collaborators supplied by the caller
pub struct DebateRun<'a> {
    pub cancel: &'a CancellationToken,
    pub progress: &'a dyn WorkflowProgress,
    /// Failed agent calls are recorded here
    pub trace: &'a mut DecisionTrace,
    /// Every agent call attempted, in order, by role
    pub calls: Vec<AgentRole>,
}

impl<'a> DebateRun<'a> {
    pub fn new(
        cancel: &'a CancellationToken,
        progress: &'a dyn WorkflowProgress,
        trace: &'a mut DecisionTrace,
    ) -> Self {
        Self {
            cancel,
            progress,
            trace,
            calls: Vec::new(),
        }
    }
}

/// Both sides' failures for one attempt at a round
type RoundFailure = Vec<(AgentRole, AgentError)>;

/// Use case for facilitating a debate between the two agents
pub struct DebateManager {
    primary: Arc<dyn Agent>,
    auxiliary: Arc<dyn Agent>,
    evaluator: Arc<SolutionEvaluator>,
    config: DebateConfig,
    call_timeout: Duration,
    similarity: Arc<dyn SimilarityMeasure>,
}

impl DebateManager {
    pub fn new(
        primary: Arc<dyn Agent>,
        auxiliary: Arc<dyn Agent>,
        evaluator: Arc<SolutionEvaluator>,
        config: DebateConfig,
        call_timeout: Duration,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        if primary.role() != AgentRole::Primary || auxiliary.role() != AgentRole::Auxiliary {
            return Err(DomainError::configuration(
                "debate needs a primary agent on side A and an auxiliary agent on side B",
            ));
        }
        Ok(Self {
            primary,
            auxiliary,
            evaluator,
            config,
            call_timeout,
            similarity: Arc::new(LexicalSimilarity),
        })
    }

    /// Replace the claim similarity measure
    pub fn with_similarity(mut self, similarity: Arc<dyn SimilarityMeasure>) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    /// Facilitate a debate with its own trace and no progress reporting
    pub async fn facilitate(
        &self,
        task: &Task,
        solution_a: &Solution,
        solution_b: &Solution,
        max_rounds: usize,
        cancel: &CancellationToken,
    ) -> Result<DebateOutcome, DebateError> {
        let mut trace = DecisionTrace::new(task.id().clone());
        let mut run = DebateRun::new(cancel, &NoProgress, &mut trace);
        self.facilitate_with(task, solution_a, solution_b, max_rounds, &mut run)
            .await
    }

    pub async fn facilitate_with(
        &self,
        task: &Task,
        solution_a: &Solution,
        solution_b: &Solution,
        max_rounds: usize,
        run: &mut DebateRun<'_>,
    ) -> Result<DebateOutcome, DebateError> {
        if max_rounds == 0 {
            return Err(DomainError::configuration("debate.max_rounds must be at least 1").into());
        }

        info!(
            "Debate on {}: {} vs {} (up to {} rounds)",
            task.id(),
            solution_a.id(),
            solution_b.id(),
            max_rounds
        );

        let mut transcript = DebateTranscript::new();
        let mut resolution = Resolution::RoundsExhausted;

        for round in 1..=max_rounds {
            run.progress.on_debate_round(round, max_rounds);

            let (side_a, side_b) = match self
                .argue_round(task, solution_a, solution_b, &transcript, run)
                .await
            {
                Ok(arguments) => arguments,
                Err(CallError::Cancelled) => return Err(DebateError::Cancelled),
                Err(CallError::Failed(failures)) => {
                    let reason = format!("round {} failed twice: {}", round, describe(&failures));
                    return self
                        .abort(task, solution_a, solution_b, transcript, reason, run)
                        .await;
                }
            };

            transcript.push(side_a, side_b);
            let Some(latest) = transcript.last() else {
                break;
            };
            debug!(
                "Round {}: A ({:.2}) \"{}\" / B ({:.2}) \"{}\"",
                round,
                latest.side_a.confidence(),
                latest.side_a.claim(),
                latest.side_b.confidence(),
                latest.side_b.claim()
            );

            if let Some(reason) = detect_consensus_with(
                &latest.side_a,
                &latest.side_b,
                &self.config.thresholds,
                self.similarity.as_ref(),
            ) {
                resolution = Resolution::Consensus { reason };
                break;
            }

            if detect_stalemate_with(
                transcript.rounds(),
                &self.config.thresholds,
                self.similarity.as_ref(),
            ) {
                resolution = Resolution::Stalemate;
                break;
            }
        }

        info!(
            "Debate ended after {} round(s): {}",
            transcript.len(),
            resolution
        );
        run.progress
            .on_stage(WorkflowStage::Synthesising, resolution.as_str());

        let primary = self.primary.as_ref();
        let synthesis = match self
            .guarded(run, AgentRole::Primary, WorkflowStep::Synthesize, || {
                primary.synthesize(task, solution_a, solution_b, &transcript)
            })
            .await
        {
            Ok(synthesis) => synthesis,
            Err(CallError::Cancelled) => return Err(DebateError::Cancelled),
            Err(CallError::Failed(err)) => {
                let reason = format!("synthesis failed twice: {}", err);
                return self
                    .abort(task, solution_a, solution_b, transcript, reason, run)
                    .await;
            }
        };

        let final_solution = if self.config.validate_synthesis {
            self.validate_synthesis(task, synthesis, &transcript, run)
                .await?
        } else {
            synthesis
        };

        let rounds_completed = transcript.len();
        Ok(DebateOutcome {
            final_solution,
            transcript,
            resolution,
            rounds_completed,
        })
    }

    /// One round: both sides argue concurrently. The round as a whole is
    /// retried when either side fails.
    async fn argue_round(
        &self,
        task: &Task,
        a: &Solution,
        b: &Solution,
        transcript: &DebateTranscript,
        run: &mut DebateRun<'_>,
    ) -> Result<(Argument, Argument), CallError<RoundFailure>> {
        let timeout = self.call_timeout;
        let primary = self.primary.as_ref();
        let auxiliary = self.auxiliary.as_ref();
        let trace = &mut *run.trace;
        let calls = &mut run.calls;

        retry_once(
            run.cancel,
            |attempt, failures: &RoundFailure| {
                for (role, err) in failures {
                    warn!("{} argue failed (attempt {}): {}", role, attempt, err);
                    trace.record(failed_call(WorkflowStep::Argue, *role, attempt, err));
                }
            },
            || {
                calls.extend([AgentRole::Primary, AgentRole::Auxiliary]);
                async move {
                    let (side_a, side_b) = tokio::join!(
                        with_timeout(timeout, primary.argue(task, a, b, transcript)),
                        with_timeout(timeout, auxiliary.argue(task, b, a, transcript)),
                    );
                    match (side_a, side_b) {
                        (Ok(side_a), Ok(side_b)) => Ok((side_a, side_b)),
                        (side_a, side_b) => {
                            let mut failures = Vec::new();
                            if let Err(err) = side_a {
                                failures.push((AgentRole::Primary, err));
                            }
                            if let Err(err) = side_b {
                                failures.push((AgentRole::Auxiliary, err));
                            }
                            Err(failures)
                        }
                    }
                }
            },
        )
        .await
    }

    /// Auxiliary checks the synthesis against every concern raised; one
    /// primary refinement follows a blocking check. A failed check or
    /// refinement keeps the unvalidated synthesis.
    async fn validate_synthesis(
        &self,
        task: &Task,
        synthesis: Solution,
        transcript: &DebateTranscript,
        run: &mut DebateRun<'_>,
    ) -> Result<Solution, DebateError> {
        let ctx = CritiqueContext::synthesis_check(transcript.raised_concerns());
        let auxiliary = self.auxiliary.as_ref();
        let check = match self
            .guarded(run, AgentRole::Auxiliary, WorkflowStep::ValidateSynthesis, || {
                auxiliary.critique(task, &synthesis, &ctx)
            })
            .await
        {
            Ok(check) => check,
            Err(CallError::Cancelled) => return Err(DebateError::Cancelled),
            Err(CallError::Failed(err)) => {
                warn!("Synthesis check failed, keeping unvalidated synthesis: {}", err);
                return Ok(synthesis);
            }
        };

        if !check.has_blocking_issues() {
            debug!("Synthesis {} addresses all concerns", synthesis.id());
            return Ok(synthesis);
        }

        info!(
            "Synthesis check found {} blocking issue(s); refining",
            check.blocking_issues().count()
        );
        let primary = self.primary.as_ref();
        match self
            .guarded(run, AgentRole::Primary, WorkflowStep::Refine, || {
                primary.refine(task, &synthesis, &check)
            })
            .await
        {
            Ok(refined) => Ok(refined),
            Err(CallError::Cancelled) => Err(DebateError::Cancelled),
            Err(CallError::Failed(err)) => {
                warn!("Synthesis refinement failed, keeping unvalidated synthesis: {}", err);
                Ok(synthesis)
            }
        }
    }

    /// Degraded path: pick the winner by evaluation (a tie keeps side A)
    async fn abort(
        &self,
        task: &Task,
        a: &Solution,
        b: &Solution,
        transcript: DebateTranscript,
        reason: String,
        run: &mut DebateRun<'_>,
    ) -> Result<DebateOutcome, DebateError> {
        warn!("Debate aborted: {}", reason);

        let comparison = self
            .evaluator
            .compare_with_cancel(task, a, b, run.cancel)
            .await
            .map_err(|err| match err {
                EvaluationError::Cancelled => DebateError::Cancelled,
                other => DebateError::Evaluation(other),
            })?;

        let final_solution = match comparison.verdict {
            Verdict::Winner(DebateSide::B) => b.clone(),
            Verdict::Winner(DebateSide::A) | Verdict::Tie => a.clone(),
        };
        info!(
            "Evaluation picked {} ({:.3} vs {:.3})",
            final_solution.id(),
            comparison.total_a,
            comparison.total_b
        );

        let rounds_completed = transcript.len();
        Ok(DebateOutcome {
            final_solution,
            transcript,
            resolution: Resolution::Aborted { reason },
            rounds_completed,
        })
    }

    /// A single agent call with timeout, one retry and failure tracing
    async fn guarded<T, F, Fut>(
        &self,
        run: &mut DebateRun<'_>,
        role: AgentRole,
        step: WorkflowStep,
        mut call: F,
    ) -> Result<T, CallError<AgentError>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AgentError>>,
    {
        let timeout = self.call_timeout;
        let trace = &mut *run.trace;
        let calls = &mut run.calls;

        retry_once(
            run.cancel,
            |attempt, err: &AgentError| {
                warn!("{} {} failed (attempt {}): {}", role, step, attempt, err);
                trace.record(failed_call(step, role, attempt, err));
            },
            || {
                calls.push(role);
                with_timeout(timeout, call())
            },
        )
        .await
    }
}

fn describe(failures: &RoundFailure) -> String {
    failures
        .iter()
        .map(|(role, err)| format!("{} {}", role, err))
        .collect::<Vec<_>>()
        .join("; ")
}
