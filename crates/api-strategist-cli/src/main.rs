// crates/api-strategist-cli/src/main.rs
// ============================================================================
// Module: API Strategist CLI Entry Point
// Description: Command dispatcher for strategy runs, catalog listing, and config checks.
// Purpose: Wire config, the FakeStore catalog, and the chat model into one binary.
// Dependencies: clap, api-strategist-core, api-strategist-config, api-strategist-providers, tokio
// ============================================================================

//! ## Overview
//! The `api-strategist` binary asks a language model to pick and run API
//! tests for a set of free-form instructions, then reports the strategy text,
//! every recorded function invocation, and how the invocations compare with
//! the tests the operator expected. Ctrl-C cancels an in-flight run.
//!
//! Security posture: instructions and config are untrusted input; secrets are
//! read from the environment and never echoed.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use api_strategist_config::AuditConfig;
use api_strategist_config::AuditSinkKind;
use api_strategist_config::StrategistConfig;
use api_strategist_core::CancellationSignal;
use api_strategist_core::FunctionCatalog;
use api_strategist_core::FunctionInvocation;
use api_strategist_core::InvocationLedger;
use api_strategist_core::InvocationParameters;
use api_strategist_core::InvocationValidationResult;
use api_strategist_core::StrategyOrchestrator;
use api_strategist_core::StrategyOutcome;
use api_strategist_core::runtime::FileAuditSink;
use api_strategist_core::runtime::NoopAuditSink;
use api_strategist_core::runtime::StderrAuditSink;
use api_strategist_core::runtime::StrategyAuditSink;
use api_strategist_providers::FakeStoreClient;
use api_strategist_providers::FakeStoreRepository;
use api_strategist_providers::OpenAiChatModel;
use api_strategist_providers::register_api_test_functions;
use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "api-strategist", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Determine and execute a test strategy for the given instructions.
    Run(RunCommand),
    /// Function catalog utilities.
    Catalog {
        /// Selected catalog subcommand.
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for a strategy run.
#[derive(Args, Debug)]
struct RunCommand {
    /// Free-form testing instructions for the model.
    #[arg(long, value_name = "TEXT")]
    instructions: String,
    /// Function expected to be invoked (repeatable).
    #[arg(long = "expect", value_name = "NAME", action = ArgAction::Append)]
    expected: Vec<String>,
    /// Config file path (defaults to api-strategist.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Output format for the run report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Catalog subcommands.
#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// List catalog functions grouped by area.
    List(ConfigArgs),
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the config file.
    Validate(ConfigArgs),
}

/// Shared `--config` argument.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Config file path (defaults to api-strategist.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Output formats for run reports.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable sections.
    Text,
    /// Pretty-printed JSON document.
    Json,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(command) => command_run(command).await,
        Commands::Catalog {
            command: CatalogCommand::List(args),
        } => command_catalog_list(&args),
        Commands::Config {
            command: ConfigCommand::Validate(args),
        } => command_config_validate(&args),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Runs one strategy and reports the result.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_ref())?;
    let audit = build_audit_sink(&config.audit)?;
    let catalog = build_catalog(&config, Arc::clone(&audit))?;
    let model = OpenAiChatModel::new(&config.model.openai_config())
        .map_err(|err| CliError::new(format!("model setup failed: {err}")))?;
    let orchestrator = StrategyOrchestrator::new(model, Arc::new(catalog))
        .with_settings(config.model.execution_settings())
        .with_audit_sink(audit);

    let cancel = CancellationSignal::new();
    let watcher = spawn_interrupt_watcher(cancel.clone());
    let outcome = orchestrator.run_strategy(&command.instructions, &cancel).await;
    watcher.abort();

    let report = StrategyReport::new(&outcome, orchestrator.ledger(), &command.expected);
    match command.format {
        OutputFormat::Text => {
            for line in render_text_report(&report) {
                write_stdout_line(&line).map_err(|err| output_error("stdout", &err))?;
            }
        }
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&report)
                .map_err(|err| CliError::new(format!("report serialization failed: {err}")))?;
            write_stdout_line(&rendered).map_err(|err| output_error("stdout", &err))?;
        }
    }
    Ok(report.exit_code())
}

/// Lists catalog functions grouped by area.
fn command_catalog_list(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args.config.as_ref())?;
    let catalog = build_catalog(&config, Arc::new(NoopAuditSink))?;
    for line in render_catalog(&catalog) {
        write_stdout_line(&line).map_err(|err| output_error("stdout", &err))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Validates the config file and prints a one-line summary.
fn command_config_validate(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args.config.as_ref())?;
    write_stdout_line(&config_summary(&config)).map_err(|err| output_error("stdout", &err))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Wiring
// ============================================================================

/// Loads and validates configuration.
fn load_config(path: Option<&PathBuf>) -> CliResult<StrategistConfig> {
    StrategistConfig::load(path.map(PathBuf::as_path))
        .map_err(|err| CliError::new(err.to_string()))
}

/// Builds the audit sink selected by config.
fn build_audit_sink(config: &AuditConfig) -> CliResult<Arc<dyn StrategyAuditSink>> {
    match (config.sink, &config.path) {
        (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
        (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
        (AuditSinkKind::File, Some(path)) => FileAuditSink::new(path)
            .map(|sink| Arc::new(sink) as Arc<dyn StrategyAuditSink>)
            .map_err(|err| {
                CliError::new(format!("failed to open audit log {}: {err}", path.display()))
            }),
        (AuditSinkKind::File, None) => {
            Err(CliError::new("audit.path is required for the file sink".to_string()))
        }
    }
}

/// Builds the FakeStore test catalog over a fresh ledger.
fn build_catalog(
    config: &StrategistConfig,
    audit: Arc<dyn StrategyAuditSink>,
) -> CliResult<FunctionCatalog> {
    let client = FakeStoreClient::new(&config.fakestore.client_config())
        .map_err(|err| CliError::new(err.to_string()))?;
    let repository: Arc<dyn FakeStoreRepository> = Arc::new(client);
    let mut builder = FunctionCatalog::builder().with_audit_sink(audit);
    register_api_test_functions(&mut builder, &repository, &config.fakestore.credentials())
        .map_err(|err| CliError::new(err.to_string()))?;
    Ok(builder.build(InvocationLedger::new()))
}

/// Cancels `cancel` on the first Ctrl-C.
fn spawn_interrupt_watcher(cancel: CancellationSignal) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = write_stderr_line("interrupt received; cancelling run");
            cancel.cancel();
        }
    })
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Serializable summary of a finished run.
#[derive(Debug, Serialize)]
struct StrategyReport {
    /// Run identifier.
    run_id: u64,
    /// Final phase label.
    phase: &'static str,
    /// Strategy text on success.
    strategy: Option<String>,
    /// Failure details when the run did not succeed.
    error: Option<ReportError>,
    /// Ledger snapshot taken after the run.
    invocations: Vec<ReportInvocation>,
    /// Expected-versus-actual comparison.
    validation: InvocationValidationResult,
}

/// Failure details in a run report.
#[derive(Debug, Serialize)]
struct ReportError {
    /// Stable error kind label.
    kind: &'static str,
    /// Error message.
    message: String,
}

/// One ledger record in a run report.
#[derive(Debug, Serialize)]
struct ReportInvocation {
    /// One-based position in the snapshot.
    position: usize,
    /// Function name as recorded.
    function_name: String,
    /// Invocation time in RFC 3339 (UTC).
    invoked_at: String,
    /// Parameters supplied to the function.
    parameters: Option<InvocationParameters>,
}

impl ReportInvocation {
    /// Builds report entries in snapshot order.
    fn from_snapshot(snapshot: &[FunctionInvocation]) -> Vec<Self> {
        snapshot
            .iter()
            .enumerate()
            .map(|(index, invocation)| {
                let stamp = invocation.invoked_at();
                Self {
                    position: index + 1,
                    function_name: invocation.function_name().to_string(),
                    invoked_at: stamp
                        .to_rfc3339()
                        .unwrap_or_else(|| format!("{}ms", stamp.as_unix_millis())),
                    parameters: invocation.parameters().cloned(),
                }
            })
            .collect()
    }
}

impl StrategyReport {
    /// Builds a report from a finished run and the ledger it recorded into.
    fn new(outcome: &StrategyOutcome, ledger: &InvocationLedger, expected: &[String]) -> Self {
        let (strategy, error) = match &outcome.result {
            Ok(text) => (Some(text.clone()), None),
            Err(err) => (
                None,
                Some(ReportError {
                    kind: err.kind().as_str(),
                    message: err.to_string(),
                }),
            ),
        };
        Self {
            run_id: outcome.run.run_id().get(),
            phase: outcome.run.phase().as_str(),
            strategy,
            error,
            invocations: ReportInvocation::from_snapshot(&ledger.get_invocations()),
            validation: ledger.validate_expected_invocations(expected),
        }
    }

    /// Fails when the run failed or an expected function was not invoked.
    fn exit_code(&self) -> ExitCode {
        if self.error.is_none() && self.validation.is_valid {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

/// Renders a report as text lines.
fn render_text_report(report: &StrategyReport) -> Vec<String> {
    let mut lines = vec![format!("== Strategy (run {}, {}) ==", report.run_id, report.phase)];
    match (&report.strategy, &report.error) {
        (Some(text), _) => lines.extend(text.lines().map(str::to_string)),
        (None, Some(error)) => lines.push(format!("error [{}]: {}", error.kind, error.message)),
        (None, None) => {}
    }
    lines.push(String::new());
    lines.push(format!("== Invocations ({}) ==", report.invocations.len()));
    for invocation in &report.invocations {
        let parameters = invocation
            .parameters
            .as_ref()
            .and_then(|parameters| serde_json::to_string(parameters).ok())
            .unwrap_or_default();
        let line = format!(
            "{}. {} @ {} {parameters}",
            invocation.position, invocation.function_name, invocation.invoked_at
        );
        lines.push(line.trim_end().to_string());
    }
    lines.push(String::new());
    lines.push("== Validation ==".to_string());
    lines.push(report.validation.summary());
    if !report.validation.invoked_but_not_expected.is_empty() {
        lines.push(format!(
            "unexpected: {}",
            report.validation.invoked_but_not_expected.join(", ")
        ));
    }
    lines
}

/// Renders catalog functions grouped by area in registration order.
fn render_catalog(catalog: &FunctionCatalog) -> Vec<String> {
    let mut areas: Vec<(&str, Vec<String>)> = Vec::new();
    for descriptor in catalog.descriptors() {
        let line = format!("  {}: {}", descriptor.name, descriptor.description);
        if let Some((_, lines)) = areas.iter_mut().find(|(area, _)| *area == descriptor.area) {
            lines.push(line);
        } else {
            areas.push((descriptor.area.as_str(), vec![line]));
        }
    }
    let mut lines = Vec::new();
    for (area, functions) in areas {
        lines.push(format!("{area}:"));
        lines.extend(functions);
    }
    lines
}

/// Summarizes a validated config without secrets.
fn config_summary(config: &StrategistConfig) -> String {
    let audit = match config.audit.sink {
        AuditSinkKind::Stderr => "stderr",
        AuditSinkKind::File => "file",
        AuditSinkKind::None => "none",
    };
    format!(
        "config valid: model {} at {}, fakestore {}, audit {audit}",
        config.model.model_id, config.model.endpoint, config.fakestore.base_url
    )
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output failure.
fn output_error(stream: &str, error: &std::io::Error) -> CliError {
    CliError::new(format!("failed to write to {stream}: {error}"))
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
