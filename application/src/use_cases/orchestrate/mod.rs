//! Workflow orchestration use case
//!
//! Drives one task from routing to a final, reviewed solution:
//!
//! 1. estimate the context size and route the task to a tier
//! 2. produce a first candidate with the tier's protocol
//! 3. have the auxiliary agent review it, then accept, refine, escalate to
//!    a debate or give up once `max_iterations` critiques have happened
//!
//! Every decision lands in the task's [`DecisionTrace`], which is handed to
//! the [`TraceSink`] once the task completes.

mod bracket;

use crate::config::{BudgetPolicy, OrchestratorConfig};
use crate::ports::agent::{Agent, AgentError};
use crate::ports::budget::BudgetTracker;
use crate::ports::context_sizer::ContextSizer;
use crate::ports::progress::{NoProgress, WorkflowProgress, WorkflowStage};
use crate::ports::result_cache::ResultCache;
use crate::ports::trace_sink::{NoTraceSink, TraceRecord, TraceSink};
use crate::use_cases::debate::{DebateError, DebateManager, DebateRun};
use crate::use_cases::evaluate::SolutionEvaluator;
use crate::use_cases::health::{HealthCheck, HealthReport};
use crate::use_cases::shared::{CallError, failed_call, retry_once, with_timeout};
use bracket::{BracketError, Directed, HeavyLifted, Validated, Validation};
use std::future::Future;
use std::sync::Arc;
use tandem_domain::prompt::CONTEXT_PREVIEW_CHARS;
use tandem_domain::{
    AgentErrorKind, AgentRole, ContextRouter, Critique, CritiqueContext, DebateOutcome,
    DebateTranscript, DecisionTrace, DomainError, FailureReason, FailureReport, ProposalContext,
    ProposalStage, RoutingTier, SimilarityMeasure, Solution, Task, TraceEvent, WorkflowOutcome,
    WorkflowResult, WorkflowState, WorkflowStep,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Prompt scaffolding charged on top of the context for every call
const PROMPT_OVERHEAD_UNITS: u64 = 200;

/// Context units carried by a call that only sees the preview
const PREVIEW_UNITS: u64 = (CONTEXT_PREVIEW_CHARS / 4) as u64;

/// Errors returned instead of a [`WorkflowResult`].
///
/// Agent failures are not among them: they end the task with
/// [`WorkflowOutcome::Failed`].
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Task cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Configuration(#[from] DomainError),
}

/// Why a run stopped before reaching an outcome of its own
enum Halt {
    Cancelled,
    Failed(FailureReport),
    Configuration(DomainError),
}

/// Everything one run carries between steps
struct RunContext<'a> {
    task: &'a Task,
    tier: RoutingTier,
    size: u64,
    cancel: &'a CancellationToken,
    progress: &'a dyn WorkflowProgress,
    trace: DecisionTrace,
    budget_reported: bool,
}

/// Whether `role` sees the whole context in `tier`
fn holds_full_context(tier: RoutingTier, role: AgentRole) -> bool {
    tier == RoutingTier::Bounded
        || (role == AgentRole::Auxiliary && tier.auxiliary_holds_full_context())
}

fn protocol_violation(step: WorkflowStep, err: BracketError) -> Halt {
    Halt::Failed(FailureReport {
        step,
        reason: FailureReason::Agent {
            role: err.offender(),
            kind: AgentErrorKind::ResponseMalformed,
            message: err.to_string(),
        },
    })
}

/// Use case for processing a task with the two agents
pub struct WorkflowOrchestrator {
    primary: Arc<dyn Agent>,
    auxiliary: Arc<dyn Agent>,
    sizer: Arc<dyn ContextSizer>,
    router: ContextRouter,
    debate_manager: DebateManager,
    config: OrchestratorConfig,
    budget: Option<Arc<dyn BudgetTracker>>,
    cache: Option<Arc<dyn ResultCache>>,
    trace_sink: Arc<dyn TraceSink>,
}

impl WorkflowOrchestrator {
    /// Build the orchestrator and its collaborators, validating the whole
    /// configuration up front. The primary agent also scores solutions.
    pub fn new(
        primary: Arc<dyn Agent>,
        auxiliary: Arc<dyn Agent>,
        sizer: Arc<dyn ContextSizer>,
        config: OrchestratorConfig,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        if primary.role() != AgentRole::Primary {
            return Err(DomainError::configuration(format!(
                "agent '{}' is not a primary agent",
                primary.name()
            )));
        }
        if auxiliary.role() != AgentRole::Auxiliary {
            return Err(DomainError::configuration(format!(
                "agent '{}' is not an auxiliary agent",
                auxiliary.name()
            )));
        }

        let router = ContextRouter::new(config.routing)?;
        let evaluator = Arc::new(SolutionEvaluator::new(
            primary.clone(),
            config.evaluation.clone(),
            config.call_timeout,
        )?);
        let debate_manager = DebateManager::new(
            primary.clone(),
            auxiliary.clone(),
            evaluator,
            config.debate.clone(),
            config.call_timeout,
        )?;

        Ok(Self {
            primary,
            auxiliary,
            sizer,
            router,
            debate_manager,
            config,
            budget: None,
            cache: None,
            trace_sink: Arc::new(NoTraceSink),
        })
    }

    // ==================== Builder Methods ====================

    pub fn with_budget(mut self, budget: Arc<dyn BudgetTracker>) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.trace_sink = sink;
        self
    }

    /// Replace the claim similarity measure used in debates
    pub fn with_similarity(mut self, similarity: Arc<dyn SimilarityMeasure>) -> Self {
        self.debate_manager = self.debate_manager.with_similarity(similarity);
        self
    }

    // ==================== Accessors ====================

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn router(&self) -> &ContextRouter {
        &self.router
    }

    /// Probe both agents and report every component's status
    pub async fn health(&self) -> HealthReport {
        HealthCheck::new(
            self.primary.clone(),
            self.auxiliary.clone(),
            self.config.routing,
            self.config.call_timeout,
        )
        .execute()
        .await
    }

    // ==================== Processing ====================

    /// Process a task to completion
    pub async fn process(&self, task: Task) -> Result<WorkflowResult, WorkflowError> {
        self.process_with_progress(task, &CancellationToken::new(), &NoProgress)
            .await
    }

    pub async fn process_with_cancel(
        &self,
        task: Task,
        cancel: &CancellationToken,
    ) -> Result<WorkflowResult, WorkflowError> {
        self.process_with_progress(task, cancel, &NoProgress).await
    }

    /// Process a task with cancellation and progress callbacks.
    ///
    /// A cancelled run discards its state and persists nothing.
    pub async fn process_with_progress(
        &self,
        task: Task,
        cancel: &CancellationToken,
        progress: &dyn WorkflowProgress,
    ) -> Result<WorkflowResult, WorkflowError> {
        if cancel.is_cancelled() {
            return Err(WorkflowError::Cancelled);
        }

        progress.on_stage(WorkflowStage::Analysing, "estimating context size");
        let mut trace = DecisionTrace::new(task.id().clone());
        trace.record(TraceEvent::TaskReceived {
            goal: task.goal().to_string(),
            context_blobs: task.context().len(),
            continues: task.conversation().map(|c| c.previous_task.clone()),
        });

        let size = self.sizer.estimate(&task);
        let bundle = self.router.bundle(task, size, self.config.max_unit_size);
        let routing = self.router.route(bundle.size);
        let task = &bundle.task;

        info!("Task {} routed to {} ({} units)", task.id(), routing.tier, size);
        progress.on_stage(WorkflowStage::Routing, routing.tier.as_str());
        progress.on_routed(&routing);
        trace.record(TraceEvent::Routed {
            tier: routing.tier,
            size,
            requires_split: bundle.requires_split,
        });
        if bundle.requires_split {
            self.warn_oversized(size);
        }

        let fingerprint = task.fingerprint();
        if let Some(cached) = self.cached(fingerprint) {
            info!("Task {} answered from cache", task.id());
            trace.record(TraceEvent::CacheHit { fingerprint });
            let result = WorkflowResult {
                task_id: task.id().clone(),
                routing,
                trace,
                failure: None,
                ..cached
            };
            return Ok(self.finish(result, None, progress));
        }

        let mut ctx = RunContext {
            task,
            tier: routing.tier,
            size,
            cancel,
            progress,
            trace,
            budget_reported: false,
        };
        let mut state = WorkflowState::new(routing.tier);
        let ended = self.run(&mut ctx, &mut state).await;
        let mut trace = ctx.trace;

        let result = match ended {
            Ok((outcome, debate)) => {
                let iterations = state.iteration();
                let (solution, approved, transcript, resolution) = match debate {
                    Some(debate) => (
                        Some(debate.final_solution),
                        !debate.resolution.is_aborted(),
                        Some(debate.transcript),
                        Some(debate.resolution),
                    ),
                    None => (
                        state.take_current(),
                        outcome == WorkflowOutcome::Accepted,
                        None,
                        None,
                    ),
                };
                WorkflowResult {
                    task_id: task.id().clone(),
                    routing,
                    outcome,
                    solution,
                    approved,
                    iterations,
                    trace,
                    transcript,
                    resolution,
                    failure: None,
                }
            }
            Err(Halt::Cancelled) => {
                info!("Task {} cancelled; discarding its state", task.id());
                return Err(WorkflowError::Cancelled);
            }
            Err(Halt::Configuration(err)) => return Err(err.into()),
            Err(Halt::Failed(report)) => {
                warn!("Task {} failed: {}", task.id(), report);
                state.finish(WorkflowOutcome::Failed);
                trace.record(TraceEvent::Failed {
                    report: report.clone(),
                });
                WorkflowResult {
                    task_id: task.id().clone(),
                    routing,
                    outcome: WorkflowOutcome::Failed,
                    solution: None,
                    approved: false,
                    iterations: state.iteration(),
                    trace,
                    transcript: None,
                    resolution: None,
                    failure: Some(report),
                }
            }
        };

        Ok(self.finish(result, Some(fingerprint), progress))
    }

    /// The review loop. Returns the outcome and, for escalated tasks, the
    /// debate that settled them.
    async fn run(
        &self,
        ctx: &mut RunContext<'_>,
        state: &mut WorkflowState,
    ) -> Result<(WorkflowOutcome, Option<DebateOutcome>), Halt> {
        ctx.progress
            .on_stage(WorkflowStage::Proposing, ctx.tier.as_str());
        let first = self.first_candidate(ctx).await?;
        let mut candidate = self.install(ctx, state, first);

        loop {
            let iteration = state.iteration();
            ctx.progress
                .on_stage(WorkflowStage::Reviewing, &format!("iteration {}", iteration));

            let task = ctx.task;
            let auxiliary = self.auxiliary.as_ref();
            let review = CritiqueContext::review(
                iteration,
                holds_full_context(ctx.tier, AgentRole::Auxiliary),
            );
            let critique = self
                .call(ctx, AgentRole::Auxiliary, WorkflowStep::Review, || {
                    auxiliary.critique(task, &candidate, &review)
                })
                .await?;

            let blocking = critique.blocking_issues().count();
            ctx.trace.record(TraceEvent::CritiqueReceived {
                iteration,
                solution_id: candidate.id().clone(),
                reviewer: critique.reviewer,
                blocking_issues: blocking,
                advisory_issues: critique.issues.len() - blocking,
                has_alternative: critique.alternative.is_some(),
            });
            state.record_critique(critique.clone());

            if blocking == 0 {
                info!("Iteration {}: {} accepted", iteration, candidate.id());
                state.finish(WorkflowOutcome::Accepted);
                return Ok((WorkflowOutcome::Accepted, None));
            }

            if let Some(alternative) = &critique.alternative {
                info!(
                    "Iteration {}: reviewer disagrees with {} and proposes {}; escalating",
                    iteration,
                    candidate.id(),
                    alternative.id()
                );
                ctx.trace.record(TraceEvent::Escalated {
                    iteration,
                    candidate: candidate.id().clone(),
                    alternative: alternative.id().clone(),
                });
                ctx.progress
                    .on_stage(WorkflowStage::Debating, &format!("iteration {}", iteration));

                let debate = self.run_debate(ctx, &candidate, alternative).await?;
                ctx.trace.record(TraceEvent::DebateConcluded {
                    resolution: debate.resolution.clone(),
                    rounds_completed: debate.rounds_completed,
                    final_solution: debate.final_solution.id().clone(),
                });
                state.finish(WorkflowOutcome::EscalatedToDebate);
                return Ok((WorkflowOutcome::EscalatedToDebate, Some(debate)));
            }

            if iteration >= self.config.max_iterations {
                warn!(
                    "{} still has {} blocking issue(s) after {} iteration(s)",
                    candidate.id(),
                    blocking,
                    iteration
                );
                state.finish(WorkflowOutcome::Exhausted);
                return Ok((WorkflowOutcome::Exhausted, None));
            }

            debug!("Iteration {}: {} blocking issue(s), refining", iteration, blocking);
            ctx.trace
                .record(TraceEvent::RefinementRequested { iteration });
            ctx.progress
                .on_stage(WorkflowStage::Refining, &format!("iteration {}", iteration + 1));
            let refined = self
                .refine_candidate(ctx, &candidate, &critique, iteration + 1)
                .await?;
            candidate = self.install(ctx, state, refined);
        }
    }

    /// Make `candidate` current and return it stamped with its iteration
    fn install(
        &self,
        ctx: &mut RunContext<'_>,
        state: &mut WorkflowState,
        candidate: Solution,
    ) -> Solution {
        let candidate = state.set_candidate(candidate).clone();
        let provenance = candidate.provenance();
        let solution_id = candidate.id().clone();

        debug!(
            "Candidate {} ({} by {}) for iteration {}",
            solution_id,
            provenance.origin.as_str(),
            provenance.author,
            state.iteration()
        );
        ctx.trace.record(TraceEvent::CandidateProduced {
            iteration: state.iteration(),
            solution_id,
            author: provenance.author,
            origin: provenance.origin,
        });
        ctx.progress
            .on_iteration(state.iteration(), self.config.max_iterations);
        candidate
    }

    // ==================== Mode Protocols ====================

    async fn first_candidate(&self, ctx: &mut RunContext<'_>) -> Result<Solution, Halt> {
        let task = ctx.task;
        let primary = self.primary.as_ref();
        let auxiliary = self.auxiliary.as_ref();

        match ctx.tier {
            RoutingTier::Bounded => {
                let draft = ProposalContext::new(ProposalStage::Draft, 1, true);
                self.call(ctx, AgentRole::Primary, WorkflowStep::Propose, || {
                    primary.propose(task, &draft)
                })
                .await
            }
            RoutingTier::Collaborative => {
                let plan_ctx = ProposalContext::new(ProposalStage::Plan, 1, false);
                let plan = self
                    .call(ctx, AgentRole::Primary, WorkflowStep::Plan, || {
                        primary.propose(task, &plan_ctx)
                    })
                    .await?;

                let analysis_ctx =
                    ProposalContext::new(ProposalStage::Analysis { plan: plan.clone() }, 1, true);
                let analysis = self
                    .call(ctx, AgentRole::Auxiliary, WorkflowStep::Analyse, || {
                        auxiliary.propose(task, &analysis_ctx)
                    })
                    .await?;

                let composition = DebateTranscript::new();
                self.call(ctx, AgentRole::Primary, WorkflowStep::Compose, || {
                    primary.synthesize(task, &plan, &analysis, &composition)
                })
                .await
            }
            RoutingTier::Delegated => {
                let direction_ctx = ProposalContext::new(ProposalStage::Direction, 1, false);
                let direction = self
                    .call(ctx, AgentRole::Primary, WorkflowStep::Direct, || {
                        primary.propose(task, &direction_ctx)
                    })
                    .await?;
                let directed = Directed::new(direction)
                    .map_err(|e| protocol_violation(WorkflowStep::Direct, e))?;

                let heavy_ctx = ProposalContext::new(
                    ProposalStage::HeavyAnalysis {
                        direction: directed.direction().clone(),
                    },
                    1,
                    true,
                );
                let analysis = self
                    .call(ctx, AgentRole::Auxiliary, WorkflowStep::HeavyAnalysis, || {
                        auxiliary.propose(task, &heavy_ctx)
                    })
                    .await?;
                let lifted = directed
                    .heavy_lifted(analysis)
                    .map_err(|e| protocol_violation(WorkflowStep::HeavyAnalysis, e))?;

                self.close_bracket(ctx, lifted, 1).await
            }
        }
    }

    async fn refine_candidate(
        &self,
        ctx: &mut RunContext<'_>,
        current: &Solution,
        critique: &Critique,
        iteration: usize,
    ) -> Result<Solution, Halt> {
        let task = ctx.task;
        let primary = self.primary.as_ref();
        let auxiliary = self.auxiliary.as_ref();

        match ctx.tier {
            RoutingTier::Bounded | RoutingTier::Collaborative => {
                self.call(ctx, AgentRole::Primary, WorkflowStep::Refine, || {
                    primary.refine(task, current, critique)
                })
                .await
            }
            RoutingTier::Delegated => {
                // The primary turns the critique into a new direction, the
                // auxiliary redoes the heavy work under it.
                let direction = self
                    .call(ctx, AgentRole::Primary, WorkflowStep::Direct, || {
                        primary.refine(task, current, critique)
                    })
                    .await?;
                let directed = Directed::new(direction)
                    .map_err(|e| protocol_violation(WorkflowStep::Direct, e))?;

                let analysis = self
                    .call(ctx, AgentRole::Auxiliary, WorkflowStep::HeavyAnalysis, || {
                        auxiliary.refine(task, directed.direction(), critique)
                    })
                    .await?;
                let lifted = directed
                    .heavy_lifted(analysis)
                    .map_err(|e| protocol_violation(WorkflowStep::HeavyAnalysis, e))?;

                self.close_bracket(ctx, lifted, iteration).await
            }
        }
    }

    /// Primary validation of the heavy analysis, plus a correction when the
    /// validation blocks
    async fn close_bracket(
        &self,
        ctx: &mut RunContext<'_>,
        lifted: HeavyLifted,
        iteration: usize,
    ) -> Result<Solution, Halt> {
        let task = ctx.task;
        let primary = self.primary.as_ref();

        let validation_ctx = CritiqueContext::validation(iteration);
        let validation = self
            .call(ctx, AgentRole::Primary, WorkflowStep::Validate, || {
                primary.critique(task, lifted.analysis(), &validation_ctx)
            })
            .await?;

        match lifted
            .validate(validation)
            .map_err(|e| protocol_violation(WorkflowStep::Validate, e))?
        {
            Validation::Validated(validated) => Ok(validated.into_candidate()),
            Validation::Correcting(correcting) => {
                debug!(
                    "Primary validation blocked {}; correcting",
                    correcting.analysis().id()
                );
                let corrected = self
                    .call(ctx, AgentRole::Primary, WorkflowStep::Refine, || {
                        primary.refine(task, correcting.analysis(), correcting.validation())
                    })
                    .await?;
                correcting
                    .correct(corrected)
                    .map(Validated::into_candidate)
                    .map_err(|e| protocol_violation(WorkflowStep::Refine, e))
            }
        }
    }

    async fn run_debate(
        &self,
        ctx: &mut RunContext<'_>,
        candidate: &Solution,
        alternative: &Solution,
    ) -> Result<DebateOutcome, Halt> {
        let mut run = DebateRun::new(ctx.cancel, ctx.progress, &mut ctx.trace);
        let result = self
            .debate_manager
            .facilitate_with(
                ctx.task,
                candidate,
                alternative,
                self.config.debate.max_rounds,
                &mut run,
            )
            .await;
        let calls = run.calls;

        if matches!(result, Err(DebateError::Cancelled)) {
            return Err(Halt::Cancelled);
        }
        for role in calls {
            let units = self.call_units(ctx, role);
            self.charge(ctx, role, units, WorkflowStep::Debate)?;
        }

        match result {
            Ok(outcome) => Ok(outcome),
            Err(DebateError::Cancelled) => Err(Halt::Cancelled),
            Err(DebateError::Configuration(err)) => Err(Halt::Configuration(err)),
            Err(DebateError::Evaluation(err)) => Err(Halt::Failed(FailureReport {
                step: WorkflowStep::Score,
                reason: FailureReason::Evaluation {
                    message: err.to_string(),
                },
            })),
        }
    }

    // ==================== Agent Calls ====================

    /// One agent call: timeout, one retry, failure tracing and budget.
    async fn call<T, F, Fut>(
        &self,
        ctx: &mut RunContext<'_>,
        role: AgentRole,
        step: WorkflowStep,
        mut call: F,
    ) -> Result<T, Halt>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AgentError>>,
    {
        let timeout = self.config.call_timeout;
        let trace = &mut ctx.trace;
        let mut attempts = 0;

        let result = retry_once(
            ctx.cancel,
            |attempt, err: &AgentError| {
                warn!("{} {} failed (attempt {}): {}", role, step, attempt, err);
                trace.record(failed_call(step, role, attempt, err));
            },
            || {
                attempts += 1;
                with_timeout(timeout, call())
            },
        )
        .await;

        let result = match result {
            Ok(value) => Ok(value),
            Err(CallError::Cancelled) => return Err(Halt::Cancelled),
            Err(CallError::Failed(err)) => Err(err),
        };

        let units = self.call_units(ctx, role);
        for _ in 0..attempts {
            self.charge(ctx, role, units, step)?;
        }

        result.map_err(|err| {
            Halt::Failed(FailureReport {
                step,
                reason: FailureReason::Agent {
                    role,
                    kind: err.kind(),
                    message: err.message().to_string(),
                },
            })
        })
    }

    /// Estimated units one call consumes: the context it carries plus the
    /// prompt around it
    fn call_units(&self, ctx: &RunContext<'_>, role: AgentRole) -> u64 {
        let context = if holds_full_context(ctx.tier, role) {
            ctx.size
        } else {
            ctx.size.min(PREVIEW_UNITS)
        };
        context.saturating_add(PROMPT_OVERHEAD_UNITS)
    }

    fn charge(
        &self,
        ctx: &mut RunContext<'_>,
        role: AgentRole,
        units: u64,
        step: WorkflowStep,
    ) -> Result<(), Halt> {
        let Some(budget) = &self.budget else {
            return Ok(());
        };
        let status = budget.record(ctx.task.id(), role, units);
        let Some(limit) = status.limit.filter(|_| status.is_exceeded()) else {
            return Ok(());
        };

        let overridden = self.config.budget_override;
        if !ctx.budget_reported {
            ctx.budget_reported = true;
            warn!(
                "Budget exceeded: {} of {} units used{}",
                status.used,
                limit,
                if overridden { " (overridden)" } else { "" }
            );
            ctx.trace.record(TraceEvent::BudgetExceeded {
                used: status.used,
                limit,
                overridden,
            });
        }

        match self.config.budget_policy {
            BudgetPolicy::Warn => Ok(()),
            BudgetPolicy::RequireOverride if overridden => Ok(()),
            BudgetPolicy::RequireOverride => Err(Halt::Failed(FailureReport {
                step,
                reason: FailureReason::BudgetExceeded {
                    used: status.used,
                    limit,
                },
            })),
        }
    }

    // ==================== Completion ====================

    fn cached(&self, fingerprint: u64) -> Option<WorkflowResult> {
        let cached = self.cache.as_ref()?.get(fingerprint)?;
        matches!(
            cached.outcome,
            WorkflowOutcome::Accepted | WorkflowOutcome::EscalatedToDebate
        )
        .then_some(cached)
    }

    fn warn_oversized(&self, size: u64) {
        match self
            .router
            .recommend_split(size, self.config.max_unit_size)
        {
            Ok(split) => warn!(
                "Context of {} units exceeds the {} unit limit of a single call; \
                 {} chunks recommended",
                size,
                self.config.max_unit_size,
                split.chunk_count()
            ),
            Err(e) => warn!("Could not recommend a split: {}", e),
        }
    }

    /// Record completion, persist the trace and cache a successful result.
    /// `fingerprint` is `None` for results served from the cache.
    fn finish(
        &self,
        mut result: WorkflowResult,
        fingerprint: Option<u64>,
        progress: &dyn WorkflowProgress,
    ) -> WorkflowResult {
        if result.outcome != WorkflowOutcome::Failed {
            result.trace.record(TraceEvent::Completed {
                outcome: result.outcome,
                iterations: result.iterations,
                approved: result.approved,
            });
        }
        info!(
            "Task {} finished: {} after {} iteration(s)",
            result.task_id, result.outcome, result.iterations
        );

        self.trace_sink.append(
            &result.task_id,
            TraceRecord::Decisions(result.trace.clone()),
        );
        if let Some(transcript) = &result.transcript {
            self.trace_sink
                .append(&result.task_id, TraceRecord::Debate(transcript.clone()));
        }
        self.trace_sink.append(
            &result.task_id,
            TraceRecord::Outcome {
                outcome: result.outcome,
                approved: result.approved,
                iterations: result.iterations,
            },
        );

        if let Some(fingerprint) = fingerprint
            && let Some(cache) = &self.cache
            && matches!(
                result.outcome,
                WorkflowOutcome::Accepted | WorkflowOutcome::EscalatedToDebate
            )
        {
            cache.put(fingerprint, result.clone());
        }

        progress.on_stage(WorkflowStage::Complete, result.outcome.as_str());
        progress.on_complete(result.outcome);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::budget::{BudgetStatus, BudgetUsage};
    use crate::use_cases::test_support::{Reply, ScriptedAgent};
    use std::collections::{BTreeMap, HashMap};
    use std::sync::Mutex;
    use std::time::Duration;
    use tandem_domain::{Criterion, CriterionWeights, Resolution, TaskId};

    const STABLE: &str = "merge sort is stable and predictable";
    const FAST: &str = "quick sort is faster in practice";

    struct FixedSizer(u64);

    impl ContextSizer for FixedSizer {
        fn estimate(&self, _task: &Task) -> u64 {
            self.0
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<(TaskId, &'static str)>>,
    }

    impl RecordingSink {
        fn kinds(&self) -> Vec<&'static str> {
            self.records.lock().unwrap().iter().map(|(_, k)| *k).collect()
        }
    }

    impl TraceSink for RecordingSink {
        fn append(&self, task_id: &TaskId, record: TraceRecord) {
            self.records
                .lock()
                .unwrap()
                .push((task_id.clone(), record.kind()));
        }
    }

    struct LimitedBudget {
        used: Mutex<u64>,
        limit: u64,
    }

    impl LimitedBudget {
        fn new(limit: u64) -> Self {
            Self {
                used: Mutex::new(0),
                limit,
            }
        }
    }

    impl BudgetTracker for LimitedBudget {
        fn record(&self, _task_id: &TaskId, _role: AgentRole, units: u64) -> BudgetStatus {
            let mut used = self.used.lock().unwrap();
            *used += units;
            BudgetStatus {
                used: *used,
                limit: Some(self.limit),
            }
        }

        fn status(&self) -> BudgetStatus {
            BudgetStatus {
                used: *self.used.lock().unwrap(),
                limit: Some(self.limit),
            }
        }

        fn usage(&self) -> BudgetUsage {
            BudgetUsage {
                primary: *self.used.lock().unwrap(),
                auxiliary: 0,
            }
        }
    }

    #[derive(Default)]
    struct MapCache(Mutex<HashMap<u64, WorkflowResult>>);

    impl ResultCache for MapCache {
        fn get(&self, fingerprint: u64) -> Option<WorkflowResult> {
            self.0.lock().unwrap().get(&fingerprint).cloned()
        }

        fn put(&self, fingerprint: u64, result: WorkflowResult) {
            self.0.lock().unwrap().insert(fingerprint, result);
        }
    }

    struct Harness {
        primary: Arc<ScriptedAgent>,
        auxiliary: Arc<ScriptedAgent>,
        sink: Arc<RecordingSink>,
        log: Arc<Mutex<Vec<String>>>,
        orchestrator: WorkflowOrchestrator,
    }

    impl Harness {
        fn log(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    fn config() -> OrchestratorConfig {
        let mut config = OrchestratorConfig::default().with_call_timeout(Duration::from_millis(200));
        config.evaluation.weights = CriterionWeights::new(BTreeMap::from([
            (Criterion::Correctness, 0.5),
            (Criterion::Efficiency, 0.5),
        ]))
        .unwrap();
        config
    }

    fn harness_with(
        size: u64,
        primary: Vec<Reply>,
        auxiliary: Vec<Reply>,
        config: OrchestratorConfig,
    ) -> Harness {
        let log = Arc::new(Mutex::new(Vec::new()));
        let primary =
            Arc::new(ScriptedAgent::new(AgentRole::Primary, primary).with_log(log.clone()));
        let auxiliary =
            Arc::new(ScriptedAgent::new(AgentRole::Auxiliary, auxiliary).with_log(log.clone()));
        let sink = Arc::new(RecordingSink::default());
        let orchestrator = WorkflowOrchestrator::new(
            primary.clone(),
            auxiliary.clone(),
            Arc::new(FixedSizer(size)),
            config,
        )
        .unwrap()
        .with_trace_sink(sink.clone());
        Harness {
            primary,
            auxiliary,
            sink,
            log,
            orchestrator,
        }
    }

    fn harness(size: u64, primary: Vec<Reply>, auxiliary: Vec<Reply>) -> Harness {
        harness_with(size, primary, auxiliary, config())
    }

    fn task() -> Task {
        Task::new("Sort the customer records by signup date").unwrap()
    }

    fn argue(claim: &'static str) -> Reply {
        Reply::Argue {
            claim,
            confidence: 0.9,
        }
    }

    #[tokio::test]
    async fn test_bounded_accepted_on_first_review() {
        let h = harness(
            500,
            vec![Reply::Solution("records.sort_by_key(|r| r.signup)")],
            vec![Reply::Approve],
        );

        let result = h.orchestrator.process(task()).await.unwrap();

        assert_eq!(result.mode(), RoutingTier::Bounded);
        assert_eq!(result.outcome, WorkflowOutcome::Accepted);
        assert!(result.approved);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.exit_code(), 0);
        assert_eq!(result.content(), Some("records.sort_by_key(|r| r.signup)"));
        assert_eq!(
            h.log(),
            vec!["primary:propose:draft", "auxiliary:critique:review"]
        );
        assert_eq!(result.trace.count("completed"), 1);
        assert_eq!(h.sink.kinds(), vec!["decision_trace", "outcome"]);
    }

    #[tokio::test]
    async fn test_blocking_critique_is_refined() {
        let h = harness(
            500,
            vec![Reply::Solution("v1"), Reply::Solution("v2")],
            vec![Reply::Block("unstable for equal dates"), Reply::Approve],
        );

        let result = h.orchestrator.process(task()).await.unwrap();

        assert_eq!(result.outcome, WorkflowOutcome::Accepted);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.content(), Some("v2"));
        assert_eq!(h.primary.calls(), vec!["propose:draft", "refine"]);
        assert_eq!(result.trace.count("refinement_requested"), 1);
    }

    #[tokio::test]
    async fn test_exhausted_returns_last_candidate_unapproved() {
        let h = harness_with(
            500,
            vec![Reply::Solution("v1"), Reply::Solution("v2")],
            vec![Reply::Block("wrong"), Reply::Block("still wrong")],
            config().with_max_iterations(2),
        );

        let result = h.orchestrator.process(task()).await.unwrap();

        assert_eq!(result.outcome, WorkflowOutcome::Exhausted);
        assert!(!result.approved);
        assert_eq!(result.content(), Some("v2"));
        assert_eq!(result.exit_code(), 2);
        assert_eq!(h.auxiliary.calls().len(), 2);
        assert_eq!(h.primary.remaining(), 0);
    }

    #[tokio::test]
    async fn test_refinement_loop_is_bounded() {
        for max in 1..=4 {
            let h = harness_with(
                500,
                (0..max).map(|_| Reply::Solution("attempt")).collect(),
                (0..max).map(|_| Reply::Block("no")).collect(),
                config().with_max_iterations(max),
            );

            let result = h.orchestrator.process(task()).await.unwrap();

            assert_eq!(result.outcome, WorkflowOutcome::Exhausted);
            assert_eq!(result.iterations, max);
            assert_eq!(result.trace.count("critique_received"), max);
            assert!(result.trace.count("candidate_produced") <= max + 1);
        }
    }

    #[tokio::test]
    async fn test_disagreement_on_first_iteration_escalates() {
        let h = harness(
            500,
            vec![
                Reply::Solution("use merge sort"),
                argue(STABLE),
                Reply::Solution("merge sort, insertion sort for short runs"),
            ],
            vec![
                Reply::Disagree {
                    issue: "too slow for this data",
                    alternative: "use quick sort",
                },
                argue("Merge sort is stable and predictable."),
                Reply::Approve,
            ],
        );

        let result = h.orchestrator.process(task()).await.unwrap();

        assert_eq!(result.outcome, WorkflowOutcome::EscalatedToDebate);
        assert_eq!(result.iterations, 1);
        assert!(result.approved);
        assert!(matches!(
            result.resolution,
            Some(Resolution::Consensus { .. })
        ));
        assert_eq!(result.transcript.as_ref().map(|t| t.len()), Some(1));
        assert_eq!(
            result.content(),
            Some("merge sort, insertion sort for short runs")
        );
        assert_eq!(result.trace.count("escalated"), 1);
        assert_eq!(result.trace.count("debate_concluded"), 1);
        assert_eq!(
            h.sink.kinds(),
            vec!["decision_trace", "debate_transcript", "outcome"]
        );
    }

    #[tokio::test]
    async fn test_aborted_debate_still_escalates() {
        let unavailable = || Reply::Fail(AgentError::Unavailable("503".into()));
        let h = harness(
            500,
            vec![
                Reply::Solution("use merge sort"),
                unavailable(),
                unavailable(),
                Reply::Score(0.2),
                Reply::Score(0.2),
                Reply::Score(0.8),
                Reply::Score(0.8),
            ],
            vec![
                Reply::Disagree {
                    issue: "too slow",
                    alternative: "use quick sort",
                },
                argue(FAST),
                argue(FAST),
            ],
        );

        let result = h.orchestrator.process(task()).await.unwrap();

        assert_eq!(result.outcome, WorkflowOutcome::EscalatedToDebate);
        assert!(result.debate_aborted());
        assert!(!result.approved);
        assert_eq!(result.content(), Some("use quick sort"));
        assert_eq!(result.exit_code(), 0);
        assert_eq!(result.trace.count("agent_call_failed"), 2);
    }

    #[tokio::test]
    async fn test_collaborative_protocol_order() {
        let h = harness(
            50_000,
            vec![Reply::Solution("plan"), Reply::Solution("composed")],
            vec![Reply::Solution("analysis"), Reply::Approve],
        );

        let result = h.orchestrator.process(task()).await.unwrap();

        assert_eq!(result.mode(), RoutingTier::Collaborative);
        assert_eq!(result.content(), Some("composed"));
        assert_eq!(
            h.log(),
            vec![
                "primary:propose:plan",
                "auxiliary:propose:analysis",
                "primary:compose",
                "auxiliary:critique:review",
            ]
        );
    }

    #[tokio::test]
    async fn test_delegated_work_is_bracketed_by_primary() {
        let h = harness(
            250_000,
            vec![
                Reply::Solution("find the slow queries"),
                Reply::Block("misread the profile"),
                Reply::Solution("corrected analysis"),
                Reply::Solution("also check the allocator"),
                Reply::Approve,
            ],
            vec![
                Reply::Solution("heavy analysis"),
                Reply::Block("misses allocator pressure"),
                Reply::Solution("reanalysed with allocator"),
                Reply::Approve,
            ],
        );

        let result = h.orchestrator.process(task()).await.unwrap();

        assert_eq!(result.mode(), RoutingTier::Delegated);
        assert_eq!(result.outcome, WorkflowOutcome::Accepted);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.content(), Some("reanalysed with allocator"));
        // Two refine calls deep, still the candidate of iteration 2
        let provenance = result.solution.as_ref().unwrap().provenance();
        assert_eq!(provenance.iteration, 2);
        assert_eq!(provenance.author, AgentRole::Auxiliary);
        let produced: Vec<_> = result
            .trace
            .events()
            .filter_map(|e| match e {
                TraceEvent::CandidateProduced { iteration, .. } => Some(*iteration),
                _ => None,
            })
            .collect();
        assert_eq!(produced, vec![1, 2]);
        assert_eq!(
            h.log(),
            vec![
                "primary:propose:direction",
                "auxiliary:propose:heavy_analysis",
                "primary:critique:validation",
                "primary:refine",
                "auxiliary:critique:review",
                "primary:refine",
                "auxiliary:refine",
                "primary:critique:validation",
                "auxiliary:critique:review",
            ]
        );
    }

    #[tokio::test]
    async fn test_second_failure_ends_task_failed() {
        let unavailable = || Reply::Fail(AgentError::Unavailable("connection refused".into()));
        let h = harness(500, vec![unavailable(), unavailable()], vec![]);

        let result = h.orchestrator.process(task()).await.unwrap();

        assert_eq!(result.outcome, WorkflowOutcome::Failed);
        assert_eq!(result.exit_code(), 3);
        assert!(result.solution.is_none());
        let failure = result.failure.as_ref().unwrap();
        assert_eq!(failure.step, WorkflowStep::Propose);
        assert_eq!(
            failure.reason,
            FailureReason::Agent {
                role: AgentRole::Primary,
                kind: AgentErrorKind::Unavailable,
                message: "connection refused".to_string(),
            }
        );
        assert_eq!(result.trace.count("agent_call_failed"), 2);
        assert_eq!(result.trace.count("failed"), 1);
        assert_eq!(h.sink.kinds(), vec!["decision_trace", "outcome"]);
    }

    #[tokio::test]
    async fn test_retry_recovers_and_keeps_error_kind() {
        let h = harness(
            500,
            vec![
                Reply::Fail(AgentError::RateLimited("429".into())),
                Reply::Solution("v1"),
            ],
            vec![Reply::Approve],
        );

        let result = h.orchestrator.process(task()).await.unwrap();

        assert_eq!(result.outcome, WorkflowOutcome::Accepted);
        let kinds: Vec<_> = result
            .trace
            .events()
            .filter_map(|e| match e {
                TraceEvent::AgentCallFailed { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![AgentErrorKind::RateLimited]);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let h = harness(500, vec![Reply::Hang, Reply::Solution("v1")], vec![Reply::Approve]);

        let result = h.orchestrator.process(task()).await.unwrap();

        assert_eq!(result.outcome, WorkflowOutcome::Accepted);
        assert_eq!(result.trace.count("agent_call_failed"), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_persists_nothing() {
        let h = harness(500, vec![], vec![]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = h.orchestrator.process_with_cancel(task(), &cancel).await;

        assert!(matches!(result, Err(WorkflowError::Cancelled)));
        assert!(h.sink.kinds().is_empty());
        assert!(h.primary.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_drops_in_flight_call() {
        let h = harness_with(
            500,
            vec![Reply::Hang],
            vec![],
            config().with_call_timeout(Duration::from_secs(30)),
        );
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = h.orchestrator.process_with_cancel(task(), &cancel).await;

        assert!(matches!(result, Err(WorkflowError::Cancelled)));
        assert!(h.sink.kinds().is_empty());
    }

    #[tokio::test]
    async fn test_budget_requiring_override_fails_task() {
        let h = harness_with(
            500,
            vec![Reply::Solution("v1")],
            vec![],
            config().with_budget_policy(BudgetPolicy::RequireOverride, false),
        );
        let orchestrator = h.orchestrator.with_budget(Arc::new(LimitedBudget::new(100)));

        let result = orchestrator.process(task()).await.unwrap();

        assert_eq!(result.outcome, WorkflowOutcome::Failed);
        assert_eq!(
            result.failure.map(|f| f.reason),
            Some(FailureReason::BudgetExceeded {
                used: 700,
                limit: 100
            })
        );
        assert_eq!(result.trace.count("budget_exceeded"), 1);
        assert!(h.auxiliary.calls().is_empty());
    }

    #[tokio::test]
    async fn test_budget_warn_or_override_continues() {
        for config in [
            config(),
            config().with_budget_policy(BudgetPolicy::RequireOverride, true),
        ] {
            let h = harness_with(
                500,
                vec![Reply::Solution("v1")],
                vec![Reply::Approve],
                config,
            );
            let orchestrator = h.orchestrator.with_budget(Arc::new(LimitedBudget::new(100)));

            let result = orchestrator.process(task()).await.unwrap();

            assert_eq!(result.outcome, WorkflowOutcome::Accepted);
            assert_eq!(result.trace.count("budget_exceeded"), 1);
        }
    }

    #[tokio::test]
    async fn test_cached_result_is_reused() {
        let h = harness(500, vec![Reply::Solution("v1")], vec![Reply::Approve]);
        let orchestrator = h.orchestrator.with_cache(Arc::new(MapCache::default()));

        let first = orchestrator.process(task()).await.unwrap();
        let again = task();
        let again_id = again.id().clone();
        let second = orchestrator.process(again).await.unwrap();

        assert_eq!(second.task_id, again_id);
        assert_ne!(second.task_id, first.task_id);
        assert_eq!(second.outcome, WorkflowOutcome::Accepted);
        assert_eq!(second.content(), Some("v1"));
        assert_eq!(second.trace.count("cache_hit"), 1);
        assert_eq!(h.primary.calls().len(), 1);
    }

    #[test]
    fn test_construction_checks_roles_and_config() {
        let primary = Arc::new(ScriptedAgent::new(AgentRole::Primary, vec![]));
        let auxiliary = Arc::new(ScriptedAgent::new(AgentRole::Auxiliary, vec![]));

        let swapped = WorkflowOrchestrator::new(
            auxiliary.clone(),
            primary.clone(),
            Arc::new(FixedSizer(1)),
            config(),
        );
        assert!(swapped.is_err());

        let invalid = WorkflowOrchestrator::new(
            primary,
            auxiliary,
            Arc::new(FixedSizer(1)),
            config().with_max_iterations(0),
        );
        assert!(invalid.err().unwrap().is_configuration());
    }
}
