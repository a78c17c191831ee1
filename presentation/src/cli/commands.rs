//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for workflow results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Solution, outcome and (optionally) the decision trace
    Text,
    /// The whole result as JSON
    Json,
}

/// CLI arguments for tandem
#[derive(Parser, Debug)]
#[command(name = "tandem")]
#[command(author, version, about = "Two agents, one task - routed, reviewed, debated")]
#[command(long_about = r#"
tandem solves a task with two cooperating language-model agents.

The task's context size picks how they work together:
1. Bounded:       the primary drafts, the auxiliary reviews
2. Collaborative: the primary plans, the auxiliary analyses the full context
3. Delegated:     the auxiliary does the heavy analysis, directed and
                  validated by the primary

When the reviewer proposes a different approach the two agents debate it
until they agree, stall or run out of rounds, and the result is synthesised.

Configuration files are loaded from (in priority order):
1. TANDEM_<SECTION>__<KEY>    Environment variables
2. --config <path>            Explicit config file
3. ./tandem.toml              Project-level config
4. ~/.config/tandem/config.toml   Global config

Exit codes: 0 accepted or settled by debate, 2 exhausted, 3 failed,
1 startup error.

Example:
  tandem run "Why does the nightly import drop rows?" --file 'logs/*.log'
  tandem interactive
  tandem health
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format (overrides the config file)
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long, global = true)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Solve one task and print the result
    Run(RunArgs),

    /// Solve tasks one after another in a REPL
    Interactive(SessionArgs),

    /// Check that both agent endpoints are reachable
    Health,

    /// Show agents, thresholds and effective configuration
    Status,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// The task to solve
    pub task: String,

    /// Inline context attached to the task (repeatable)
    #[arg(short, long, value_name = "TEXT")]
    pub context: Vec<String>,

    #[command(flatten)]
    pub session: SessionArgs,

    /// Print the decision trace after the solution
    #[arg(long)]
    pub trace: bool,
}

/// Options shared by `run` and `interactive`
#[derive(Args, Debug, Default)]
pub struct SessionArgs {
    /// File or glob pattern to attach as context (repeatable)
    #[arg(short, long, value_name = "PATH")]
    pub file: Vec<String>,

    /// Continue past the budget limit when the policy requires an override
    #[arg(long)]
    pub allow_over_budget: bool,
}
