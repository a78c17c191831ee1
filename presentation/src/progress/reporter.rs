//! Progress reporting for workflow execution

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use tandem_application::{WorkflowProgress, WorkflowStage};
use tandem_domain::{RoutingDecision, WorkflowOutcome};

fn stage_display_name(stage: WorkflowStage) -> &'static str {
    match stage {
        WorkflowStage::Analysing => "Analysing",
        WorkflowStage::Routing => "Routing",
        WorkflowStage::Proposing => "Proposing",
        WorkflowStage::Reviewing => "Reviewing",
        WorkflowStage::Refining => "Refining",
        WorkflowStage::Debating => "Debating",
        WorkflowStage::Synthesising => "Synthesising",
        WorkflowStage::Complete => "Complete",
    }
}

/// Spinner showing the current stage of a run
pub struct ProgressReporter {
    spinner: ProgressBar,
    /// `(iteration, max)` of the review loop, shown in the prefix
    iteration: Mutex<Option<(usize, usize)>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(Self::spinner_style());
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self {
            spinner,
            iteration: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn prefix(&self, stage: WorkflowStage) -> String {
        let iteration = *self
            .iteration
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match iteration {
            Some((current, max)) => {
                format!("{} [{}/{}]", stage_display_name(stage), current, max)
            }
            None => stage_display_name(stage).to_string(),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

impl WorkflowProgress for ProgressReporter {
    fn on_stage(&self, stage: WorkflowStage, detail: &str) {
        self.spinner.set_prefix(self.prefix(stage));
        self.spinner.set_message(detail.to_string());
    }

    fn on_routed(&self, decision: &RoutingDecision) {
        self.spinner.println(format!(
            "{} routed to {} ({} units)",
            "->".cyan(),
            decision.tier.as_str().bold(),
            decision.size
        ));
    }

    fn on_iteration(&self, iteration: usize, max_iterations: usize) {
        *self
            .iteration
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some((iteration, max_iterations));
    }

    fn on_debate_round(&self, round: usize, max_rounds: usize) {
        self.spinner
            .set_message(format!("round {} of {}", round, max_rounds));
    }

    fn on_complete(&self, outcome: WorkflowOutcome) {
        let mark = if outcome.is_success() {
            "v".green()
        } else {
            "x".red()
        };
        self.spinner
            .finish_with_message(format!("{} {}", mark, outcome));
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl WorkflowProgress for SimpleProgress {
    fn on_stage(&self, stage: WorkflowStage, detail: &str) {
        eprintln!("{} {} {}", "->".cyan(), stage_display_name(stage).bold(), detail);
    }

    fn on_debate_round(&self, round: usize, max_rounds: usize) {
        eprintln!("   round {}/{}", round, max_rounds);
    }

    fn on_complete(&self, outcome: WorkflowOutcome) {
        if outcome.is_success() {
            eprintln!("  {} {}", "v".green(), outcome);
        } else {
            eprintln!("  {} {}", "x".red(), outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_tracks_iteration() {
        let reporter = ProgressReporter::new();
        assert_eq!(reporter.prefix(WorkflowStage::Proposing), "Proposing");

        reporter.on_iteration(2, 3);
        assert_eq!(reporter.prefix(WorkflowStage::Reviewing), "Reviewing [2/3]");

        reporter.on_complete(WorkflowOutcome::Accepted);
    }
}
