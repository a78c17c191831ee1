//! CLI entrypoint for tandem
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use std::sync::Arc;
use tandem_application::{
    Agent, BudgetTracker, GatewayAgent, LlmGateway, NoProgress, WorkflowError,
    WorkflowOrchestrator,
};
use tandem_domain::{AgentRole, ContextBlob, Task};
use tandem_infrastructure::{
    AttachmentLoader, ConfigLoader, FileConfig, FileOutputFormat, HeuristicSizer, JsonlTraceSink,
    MemoryResultCache, OpenAiCompatibleGateway, SharedBudgetTracker,
};
use tandem_presentation::{
    ChatRepl, Cli, Command, ConsoleFormatter, OutputConfig, OutputFormat, ProgressReporter,
    ReplConfig, RunArgs, SessionArgs, StatusView,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Everything a command needs, built once from the configuration
struct App {
    config: FileConfig,
    primary: Arc<dyn LlmGateway>,
    auxiliary: Arc<dyn LlmGateway>,
    orchestrator: Arc<WorkflowOrchestrator>,
    budget: Arc<SharedBudgetTracker>,
    output: OutputConfig,
}

impl App {
    fn build(config: FileConfig, cli: &Cli, session: &SessionArgs) -> Result<Self> {
        let primary: Arc<dyn LlmGateway> = Arc::new(
            OpenAiCompatibleGateway::from_endpoint(&config.agents.primary)
                .context("Failed to set up the primary agent")?,
        );
        let auxiliary: Arc<dyn LlmGateway> = Arc::new(
            OpenAiCompatibleGateway::from_endpoint(&config.agents.auxiliary)
                .context("Failed to set up the auxiliary agent")?,
        );

        let orchestrator_config = config.to_orchestrator_config(session.allow_over_budget)?;
        let primary_agent: Arc<dyn Agent> =
            Arc::new(GatewayAgent::new(AgentRole::Primary, primary.clone()));
        let auxiliary_agent: Arc<dyn Agent> =
            Arc::new(GatewayAgent::new(AgentRole::Auxiliary, auxiliary.clone()));

        let budget = Arc::new(SharedBudgetTracker::new(config.budget.limit));
        let mut orchestrator = WorkflowOrchestrator::new(
            primary_agent,
            auxiliary_agent,
            Arc::new(HeuristicSizer::new()),
            orchestrator_config,
        )?
        .with_budget(budget.clone());

        if config.workflow.cache_results {
            orchestrator = orchestrator.with_cache(Arc::new(MemoryResultCache::default()));
        }
        if let Some(dir) = config.logging.transcript_path() {
            match JsonlTraceSink::new(&dir) {
                Ok(sink) => {
                    info!("Writing transcripts to {}", dir.display());
                    orchestrator = orchestrator.with_trace_sink(Arc::new(sink));
                }
                Err(e) => warn!("Transcripts disabled, cannot use {}: {}", dir.display(), e),
            }
        }

        let format = cli.output.unwrap_or(match config.output.format {
            Some(FileOutputFormat::Json) => OutputFormat::Json,
            Some(FileOutputFormat::Text) | None => OutputFormat::Text,
        });
        let output = OutputConfig {
            format,
            color: config.output.color,
            show_trace: config.output.show_trace,
        };

        Ok(Self {
            config,
            primary,
            auxiliary,
            orchestrator: Arc::new(orchestrator),
            budget,
            output,
        })
    }
}

fn init_tracing(verbose: u8) -> tracing_appender::non_blocking::WorkerGuard {
    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(writer)
        .init();
    guard
}

/// Load attachments, telling the user about the ones that were skipped
fn load_attachments(files: &[String]) -> Vec<ContextBlob> {
    if files.is_empty() {
        return Vec::new();
    }
    let attachments = AttachmentLoader::new().load(files);
    for failure in &attachments.failures {
        eprintln!("Skipping {}: {}", failure.path, failure.reason);
    }
    attachments.blobs
}

/// Cancel `token` on Ctrl-C
fn cancel_on_ctrl_c(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    })
}

async fn run(app: &App, args: &RunArgs, quiet: bool) -> Result<i32> {
    let mut task = Task::new(args.task.as_str())?;
    for text in &args.context {
        task = task.with_context(ContextBlob::new("inline", text.as_str()));
    }
    for blob in load_attachments(&args.session.file) {
        task = task.with_context(blob);
    }

    let cancel = CancellationToken::new();
    let watcher = cancel_on_ctrl_c(cancel.clone());
    let result = if quiet || app.output.format == OutputFormat::Json {
        app.orchestrator
            .process_with_progress(task, &cancel, &NoProgress)
            .await
    } else {
        let progress = ProgressReporter::new();
        app.orchestrator
            .process_with_progress(task, &cancel, &progress)
            .await
    };
    watcher.abort();

    let result = match result {
        Ok(result) => result,
        Err(WorkflowError::Cancelled) => bail!("Task cancelled"),
        Err(e) => return Err(e.into()),
    };

    let usage = app.budget.usage();
    let output = match app.output.format {
        OutputFormat::Json => {
            ConsoleFormatter::format_json_with_usage(&result, &usage, app.budget.limit())
        }
        OutputFormat::Text => {
            let mut text = ConsoleFormatter::format(&result, args.trace || app.output.show_trace);
            text.push_str(&ConsoleFormatter::format_usage(
                "Token usage",
                &usage,
                app.budget.limit(),
            ));
            text
        }
    };
    println!("{}", output);

    Ok(result.exit_code())
}

async fn health(app: &App) -> i32 {
    let report = app.orchestrator.health().await;
    match app.output.format {
        OutputFormat::Json => {
            let components: Vec<_> = report
                .components
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "component": c.component,
                        "healthy": c.healthy,
                        "detail": c.detail,
                    })
                })
                .collect();
            let body = serde_json::json!({
                "healthy": report.is_healthy(),
                "components": components,
            });
            println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
        }
        OutputFormat::Text => print!("{}", ConsoleFormatter::format_health(&report)),
    }
    if report.is_healthy() { 0 } else { 1 }
}

fn status(app: &App) {
    let view = StatusView {
        primary: app.primary.describe(),
        auxiliary: app.auxiliary.describe(),
        config: app.orchestrator.config(),
        budget_limit: app.config.budget.limit,
    };
    print!("{}", ConsoleFormatter::format_status(&view));
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_guard = init_tracing(cli.verbose);

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        println!("\nEffective configuration:\n");
        println!("{}", ConfigLoader::render(&config)?);
        return Ok(());
    }

    let Some(command) = &cli.command else {
        bail!("A command is required. Run `tandem --help` for usage.");
    };

    let default_session = SessionArgs::default();
    let session = match command {
        Command::Run(args) => &args.session,
        Command::Interactive(args) => args,
        Command::Health | Command::Status => &default_session,
    };

    let app = App::build(config, &cli, session)?;
    if !app.output.color {
        colored::control::set_override(false);
    }
    info!("Starting tandem");

    let code = match command {
        Command::Run(args) => run(&app, args, cli.quiet).await?,
        Command::Interactive(args) => {
            let repl = ReplConfig {
                show_progress: app.config.repl.show_progress && !cli.quiet,
                history_file: app.config.repl.history_path(),
                continue_summary_chars: app.config.repl.continue_summary_chars,
            };
            let mut chat = ChatRepl::new(app.orchestrator.clone())
                .with_attachments(load_attachments(&args.file))
                .with_budget(app.budget.clone())
                .with_repl_config(repl)
                .with_output_config(app.output.clone());
            chat.run().await?;
            0
        }
        Command::Health => health(&app).await,
        Command::Status => {
            status(&app);
            0
        }
    };

    if code != 0 {
        drop(log_guard);
        std::process::exit(code);
    }
    Ok(())
}
