//! REPL (Read-Eval-Print Loop) for interactive sessions

use crate::cli::commands::OutputFormat;
use crate::config::{OutputConfig, ReplConfig};
use crate::{ConsoleFormatter, ProgressReporter};
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;
use tandem_application::{BudgetTracker, NoProgress, WorkflowError, WorkflowOrchestrator};
use tandem_domain::{ContextBlob, ConversationRef, Task, TaskId, WorkflowResult};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Previous answer, kept for `/continue`
struct LastAnswer {
    task_id: TaskId,
    content: String,
}

/// Cut `text` to at most `max` characters, marking the cut
fn summarize(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str(" [...]");
    cut
}

/// Interactive REPL
pub struct ChatRepl {
    orchestrator: Arc<WorkflowOrchestrator>,
    attachments: Vec<ContextBlob>,
    repl: ReplConfig,
    output: OutputConfig,
    last: Option<LastAnswer>,
    continuing: bool,
    last_result: Option<WorkflowResult>,
    budget: Option<Arc<dyn BudgetTracker>>,
}

impl ChatRepl {
    pub fn new(orchestrator: Arc<WorkflowOrchestrator>) -> Self {
        Self {
            orchestrator,
            attachments: Vec::new(),
            repl: ReplConfig::default(),
            output: OutputConfig::default(),
            last: None,
            continuing: false,
            last_result: None,
            budget: None,
        }
    }

    /// Report token usage after every task
    pub fn with_budget(mut self, budget: Arc<dyn BudgetTracker>) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Context attached to every task of the session
    pub fn with_attachments(mut self, attachments: Vec<ContextBlob>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_repl_config(mut self, config: ReplConfig) -> Self {
        self.repl = config;
        self
    }

    pub fn with_output_config(mut self, config: OutputConfig) -> Self {
        self.output = config;
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(ref path) = self.repl.history_file {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            let prompt = if self.continuing { "..> " } else { ">>> " };
            match rl.readline(prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    if line.starts_with('/') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    self.process_task(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(ref path) = self.repl.history_file
            && let Err(e) = rl.save_history(path)
        {
            warn!("Could not save history to {}: {}", path.display(), e);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│           tandem - interactive mode          │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        if !self.attachments.is_empty() {
            println!("Attached to every task:");
            for blob in &self.attachments {
                println!("  - {}", blob.label);
            }
            println!();
        }
        Self::print_commands();
    }

    fn print_commands() {
        println!("Commands:");
        println!("  /continue        - Carry the last answer into the next tasks");
        println!("  /new             - Start over without conversation context");
        println!("  /trace           - Show the decision trace of the last task");
        println!("  /help, /h, /?    - Show this help");
        println!("  /quit, /exit, /q - Exit");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                true
            }
            "/help" | "/h" | "/?" => {
                println!();
                Self::print_commands();
                false
            }
            "/continue" => {
                match &self.last {
                    Some(last) => {
                        self.continuing = true;
                        println!("Continuing from {}", last.task_id);
                    }
                    None => println!("Nothing to continue from yet"),
                }
                false
            }
            "/new" => {
                self.continuing = false;
                self.last = None;
                println!("Conversation cleared");
                false
            }
            "/trace" => {
                match &self.last_result {
                    Some(result) => print!("{}", ConsoleFormatter::format_trace(&result.trace)),
                    None => println!("No task has run yet"),
                }
                false
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                false
            }
        }
    }

    fn build_task(&self, goal: &str) -> Result<Task, tandem_domain::DomainError> {
        let mut task = Task::new(goal)?;
        for blob in &self.attachments {
            task = task.with_context(blob.clone());
        }
        if self.continuing
            && let Some(last) = &self.last
        {
            task = task.with_conversation(ConversationRef {
                previous_task: last.task_id.clone(),
                summary: summarize(&last.content, self.repl.continue_summary_chars),
            });
        }
        Ok(task)
    }

    async fn process_task(&mut self, goal: &str) {
        println!();

        let task = match self.build_task(goal) {
            Ok(task) => task,
            Err(e) => {
                eprintln!("{} {}", "Error:".red(), e);
                return;
            }
        };

        let usage_before = self.budget.as_ref().map(|b| b.usage());
        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        let result = if self.repl.show_progress {
            let progress = ProgressReporter::new();
            self.orchestrator
                .process_with_progress(task, &cancel, &progress)
                .await
        } else {
            self.orchestrator
                .process_with_progress(task, &cancel, &NoProgress)
                .await
        };
        watcher.abort();

        match result {
            Ok(result) => {
                let usage = self
                    .budget
                    .as_ref()
                    .zip(usage_before)
                    .map(|(budget, before)| (budget.usage(), before, budget.status().limit));
                let text = match (self.output.format, usage) {
                    (OutputFormat::Json, Some((session, before, limit))) => {
                        ConsoleFormatter::format_json_with_usage(
                            &result,
                            &session.since(before),
                            limit,
                        )
                    }
                    (OutputFormat::Json, None) => ConsoleFormatter::format_json(&result),
                    (OutputFormat::Text, _) => {
                        let mut text = if self.output.show_trace {
                            ConsoleFormatter::format(&result, true)
                        } else {
                            ConsoleFormatter::format_brief(&result)
                        };
                        if let Some((session, before, limit)) = usage {
                            text.push_str(&ConsoleFormatter::format_usage(
                                "Token usage (this task)",
                                &session.since(before),
                                None,
                            ));
                            text.push_str(
                                &format!(
                                    "  session total {} units{}\n",
                                    session.total(),
                                    limit.map(|l| format!(" of {}", l)).unwrap_or_default()
                                )
                                .dimmed()
                                .to_string(),
                            );
                        }
                        text
                    }
                };
                println!("{}", text);

                if result.outcome.is_success()
                    && let Some(content) = result.content()
                {
                    self.last = Some(LastAnswer {
                        task_id: result.task_id.clone(),
                        content: content.to_string(),
                    });
                }
                self.last_result = Some(result);
            }
            Err(WorkflowError::Cancelled) => println!("{}", "Cancelled".yellow()),
            Err(e) => eprintln!("{} {}", "Error:".red(), e),
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_keeps_short_text() {
        assert_eq!(summarize("short answer", 100), "short answer");
    }

    #[test]
    fn test_summarize_cuts_on_chars() {
        assert_eq!(summarize("äöüäöü", 3), "äöü [...]");
    }
}
