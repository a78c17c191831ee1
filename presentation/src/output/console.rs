//! Console output formatter for workflow results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use tandem_application::{BudgetUsage, GatewayInfo, HealthReport, OrchestratorConfig};
use tandem_domain::{
    AgentRole, DebateTranscript, DecisionTrace, RoutingTier, TraceEvent, WorkflowOutcome,
    WorkflowResult,
};

/// What `tandem status` shows
pub struct StatusView<'a> {
    pub primary: GatewayInfo,
    pub auxiliary: GatewayInfo,
    pub config: &'a OrchestratorConfig,
    pub budget_limit: Option<u64>,
}

/// Formats workflow results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete result, optionally followed by the decision trace
    pub fn format(result: &WorkflowResult, show_trace: bool) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("tandem result"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}   {} {}   {} {}\n",
            "Mode:".cyan().bold(),
            result.mode(),
            "Iterations:".cyan().bold(),
            result.iterations,
            "Outcome:".cyan().bold(),
            Self::outcome_label(result.outcome),
        ));
        if let Some(resolution) = &result.resolution {
            let line = format!("Debate: {}", resolution);
            if result.debate_aborted() {
                output.push_str(&format!("{}\n", line.yellow()));
            } else {
                output.push_str(&format!("{}\n", line.dimmed()));
            }
        }

        if let Some(failure) = &result.failure {
            output.push_str(&format!("\n{} {}\n", "Failed:".red().bold(), failure));
        }

        match &result.solution {
            Some(solution) => {
                let title = if result.approved {
                    "Solution".to_string()
                } else {
                    "Solution (not approved)".to_string()
                };
                output.push_str(&Self::section_header(&title));
                output.push_str(&format!(
                    "{}\n\n{}\n",
                    format!(
                        "by {} agent, {}",
                        solution.author(),
                        solution.provenance().origin.as_str()
                    )
                    .dimmed(),
                    solution.content()
                ));
            }
            None => output.push_str(&format!("\n{}\n", "No solution produced.".dimmed())),
        }

        if let Some(transcript) = &result.transcript
            && !transcript.is_empty()
        {
            output.push_str(&Self::section_header("Debate"));
            output.push_str(&Self::format_transcript(transcript));
        }

        if show_trace {
            output.push_str(&Self::section_header("Decision trace"));
            output.push_str(&Self::format_trace(&result.trace));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(result: &WorkflowResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format as JSON with a `usage` object next to the result fields
    pub fn format_json_with_usage(
        result: &WorkflowResult,
        usage: &BudgetUsage,
        limit: Option<u64>,
    ) -> String {
        let mut value = serde_json::to_value(result).unwrap_or_else(|_| serde_json::json!({}));
        if let Some(object) = value.as_object_mut() {
            object.insert("usage".to_string(), Self::usage_json(usage, limit));
        }
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn usage_json(usage: &BudgetUsage, limit: Option<u64>) -> serde_json::Value {
        serde_json::json!({
            "primary": usage.primary,
            "auxiliary": usage.auxiliary,
            "total": usage.total(),
            "limit": limit,
        })
    }

    /// Token usage table. Units are the sizer's token estimates.
    pub fn format_usage(title: &str, usage: &BudgetUsage, limit: Option<u64>) -> String {
        let mut output = Self::section_header(title);
        for (role, units) in [
            (AgentRole::Primary, usage.primary),
            (AgentRole::Auxiliary, usage.auxiliary),
        ] {
            output.push_str(&format!("  {:<10} {:>12}\n", role.to_string(), units));
        }
        let total = format!("  {:<10} {:>12}", "total", usage.total());
        match limit {
            Some(limit) if usage.total() > limit => output.push_str(&format!(
                "{} {}\n",
                total.bold(),
                format!("(limit {} exceeded)", limit).yellow()
            )),
            Some(limit) => output.push_str(&format!(
                "{} {}\n",
                total.bold(),
                format!("of {}", limit).dimmed()
            )),
            None => output.push_str(&format!("{}\n", total.bold())),
        }
        output
    }

    /// Format the solution only (concise output)
    pub fn format_brief(result: &WorkflowResult) -> String {
        let mut output = format!(
            "{} {} {}\n\n",
            format!("[{}]", result.mode()).dimmed(),
            Self::outcome_label(result.outcome),
            format!("after {} iteration(s)", result.iterations).dimmed()
        );
        if let Some(failure) = &result.failure {
            output.push_str(&format!("{} {}\n", "Failed:".red().bold(), failure));
        }
        if let Some(content) = result.content() {
            output.push_str(content);
            output.push('\n');
        }
        output
    }

    pub fn format_transcript(transcript: &DebateTranscript) -> String {
        let mut output = String::new();
        for round in transcript.rounds() {
            output.push_str(&format!(
                "\n{}\n",
                format!("── Round {} ──", round.round_number).yellow().bold()
            ));
            for (label, argument) in [("A", &round.side_a), ("B", &round.side_b)] {
                output.push_str(&format!(
                    "  {} {} {}\n",
                    format!("{}:", label).bold(),
                    argument.claim(),
                    format!("({:.2})", argument.confidence()).dimmed()
                ));
            }
        }
        output
    }

    pub fn format_trace(trace: &DecisionTrace) -> String {
        trace
            .entries()
            .iter()
            .map(|entry| {
                format!(
                    "  {:>3} {} {}\n",
                    entry.sequence,
                    entry.at.format("%H:%M:%S%.3f").to_string().dimmed(),
                    Self::describe_event(&entry.event)
                )
            })
            .collect()
    }

    fn describe_event(event: &TraceEvent) -> String {
        match event {
            TraceEvent::TaskReceived {
                context_blobs,
                continues,
                ..
            } => match continues {
                Some(previous) => format!(
                    "task received ({} context blobs, continues {})",
                    context_blobs, previous
                ),
                None => format!("task received ({} context blobs)", context_blobs),
            },
            TraceEvent::Routed {
                tier,
                size,
                requires_split,
            } => {
                let split = if *requires_split { ", split" } else { "" };
                format!("routed to {} ({} units{})", tier, size, split)
            }
            TraceEvent::CacheHit { .. } => "served from cache".to_string(),
            TraceEvent::CandidateProduced {
                iteration,
                author,
                origin,
                ..
            } => format!(
                "iteration {}: {} produced {}",
                iteration,
                author,
                origin.as_str()
            ),
            TraceEvent::CritiqueReceived {
                iteration,
                reviewer,
                blocking_issues,
                advisory_issues,
                has_alternative,
                ..
            } => format!(
                "iteration {}: {} critique, {} blocking / {} advisory{}",
                iteration,
                reviewer,
                blocking_issues,
                advisory_issues,
                if *has_alternative {
                    ", with alternative"
                } else {
                    ""
                }
            ),
            TraceEvent::RefinementRequested { iteration } => {
                format!("iteration {}: refinement requested", iteration)
            }
            TraceEvent::Escalated { iteration, .. } => {
                format!("iteration {}: escalated to debate", iteration).yellow().to_string()
            }
            TraceEvent::DebateConcluded {
                resolution,
                rounds_completed,
                ..
            } => format!("debate ended after {} round(s): {}", rounds_completed, resolution),
            TraceEvent::AgentCallFailed {
                step,
                role,
                kind,
                attempt,
                message,
            } => format!(
                "{} agent {} during {} (attempt {}): {}",
                role, kind, step, attempt, message
            )
            .red()
            .to_string(),
            TraceEvent::BudgetExceeded {
                used,
                limit,
                overridden,
            } => format!(
                "budget exceeded: {} of {} units{}",
                used,
                limit,
                if *overridden { " (overridden)" } else { "" }
            )
            .yellow()
            .to_string(),
            TraceEvent::Completed {
                outcome, approved, ..
            } => format!(
                "completed: {}{}",
                outcome,
                if *approved { ", approved" } else { "" }
            ),
            TraceEvent::Failed { report } => format!("failed: {}", report).red().to_string(),
        }
    }

    pub fn format_health(report: &HealthReport) -> String {
        let mut output = String::new();
        for component in &report.components {
            let mark = if component.healthy {
                "ok".green().bold()
            } else {
                "FAIL".red().bold()
            };
            output.push_str(&format!(
                "  [{:^4}] {:<13} {}\n",
                mark, component.component, component.detail
            ));
        }
        let summary = if report.is_healthy() {
            "All components healthy".green().to_string()
        } else {
            "Some components are unhealthy".red().to_string()
        };
        output.push_str(&format!("\n{}\n", summary));
        output
    }

    pub fn format_status(status: &StatusView<'_>) -> String {
        let config = status.config;
        let mut output = String::new();

        output.push_str(&Self::header("tandem status"));
        output.push('\n');

        for (role, info) in [
            (AgentRole::Primary, &status.primary),
            (AgentRole::Auxiliary, &status.auxiliary),
        ] {
            output.push_str(&format!(
                "{} {} via {} ({})\n    context limit {} tokens\n",
                format!("{:<10}", format!("{}:", role)).cyan().bold(),
                info.model,
                info.provider,
                info.endpoint,
                info.context_limit
            ));
        }

        output.push_str(&Self::section_header("Routing"));
        let t = config.routing;
        for (tier, range) in [
            (RoutingTier::Bounded, format!("< {}", t.t_small)),
            (
                RoutingTier::Collaborative,
                format!("{} .. {}", t.t_small, t.t_large),
            ),
            (RoutingTier::Delegated, format!(">= {}", t.t_large)),
        ] {
            let roles = tier.roles();
            output.push_str(&format!(
                "  {:<14} {:<16} {}\n",
                tier.as_str().bold(),
                range,
                format!("primary: {}; auxiliary: {}", roles.primary_role, roles.auxiliary_role)
                    .dimmed()
            ));
        }

        output.push_str(&Self::section_header("Workflow"));
        output.push_str(&format!(
            "  max iterations {}, call timeout {}s, max unit size {}\n",
            config.max_iterations,
            config.call_timeout.as_secs(),
            config.max_unit_size
        ));
        let d = &config.debate;
        output.push_str(&format!(
            "  debate: {} rounds, claim similarity {}, stalemate similarity {}, low confidence {}, evidence overlap {}\n",
            d.max_rounds,
            d.thresholds.claim_similarity,
            d.thresholds.stalemate_similarity,
            d.thresholds.low_confidence,
            d.thresholds.evidence_overlap
        ));
        let weights = config
            .evaluation
            .weights
            .criteria()
            .into_iter()
            .map(|c| format!("{} {}", c, config.evaluation.weights.weight(c)))
            .collect::<Vec<_>>()
            .join(", ");
        output.push_str(&format!(
            "  evaluation: {} (tie margin {})\n",
            weights, config.evaluation.tie_margin
        ));
        output.push_str(&format!(
            "  budget: {} ({:?})\n",
            status
                .budget_limit
                .map(|l| format!("{} units", l))
                .unwrap_or_else(|| "unlimited".to_string()),
            config.budget_policy
        ));

        output.push_str(&Self::footer());
        output
    }

    fn outcome_label(outcome: WorkflowOutcome) -> String {
        match outcome {
            WorkflowOutcome::Accepted => "accepted".green().bold().to_string(),
            WorkflowOutcome::EscalatedToDebate => "settled by debate".green().to_string(),
            WorkflowOutcome::Exhausted => "exhausted".yellow().bold().to_string(),
            WorkflowOutcome::Failed => "failed".red().bold().to_string(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &WorkflowResult) -> String {
        Self::format(result, false)
    }

    fn format_json(&self, result: &WorkflowResult) -> String {
        Self::format_json(result)
    }

    fn format_brief(&self, result: &WorkflowResult) -> String {
        Self::format_brief(result)
    }
}
