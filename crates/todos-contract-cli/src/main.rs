// crates/todos-contract-cli/src/main.rs
// ============================================================================
// Module: Todos Contract CLI Entry Point
// Description: Command dispatcher for running and listing contract scenarios.
// Purpose: Run the todos contract against an endpoint and map outcomes to exit codes.
// Dependencies: clap, serde_jcs, thiserror, todos-contract, tokio.
// ============================================================================

//! ## Overview
//! `todos-contract run` executes the scenario table against a collection URL
//! and exits `0` when every scenario passed, `1` on a contract violation or a
//! usage/config error, and `2` when the service could not be reached.
//! `todos-contract list` prints the table without sending any request.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use thiserror::Error;
use todos_contract::AuditSinkKind;
use todos_contract::ContractRunner;
use todos_contract::ContractScenario;
use todos_contract::Fixture;
use todos_contract::HarnessConfig;
use todos_contract::RunReport;
use todos_contract::ScenarioGroup;
use todos_contract::ScenarioStatus;
use todos_contract::TodosHttpClient;
use todos_contract::scenario::contract_scenarios;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Exit code for contract violations and usage errors.
const EXIT_VIOLATED: u8 = 1;
/// Exit code for an unreachable service.
const EXIT_UNREACHABLE: u8 = 2;
/// Canonical JSON report file name.
const REPORT_JSON: &str = "report.json";
/// Markdown summary file name.
const SUMMARY_MD: &str = "summary.md";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "todos-contract", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run contract scenarios against a todos endpoint.
    Run(RunCommand),
    /// List the contract scenarios.
    List(ListCommand),
}

/// Arguments for `run`.
#[derive(Args, Debug)]
struct RunCommand {
    /// Path to a TOML config file (overrides `TODOS_CONTRACT_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Collection URL to test.
    #[arg(long, value_name = "URL")]
    collection_url: Option<String>,
    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,
    /// Fixed run identifier.
    #[arg(long, value_name = "ID")]
    run_id: Option<String>,
    /// Send titles without the run id tag.
    #[arg(long)]
    no_tag_titles: bool,
    /// Scenario to run (repeatable).
    #[arg(long = "scenario", value_name = "NAME")]
    scenarios: Vec<String>,
    /// Scenario group to run (repeatable).
    #[arg(long = "group", value_name = "GROUP", value_parser = parse_group)]
    groups: Vec<ScenarioGroup>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Directory receiving `report.json` and `summary.md`.
    #[arg(long, value_name = "DIR")]
    report_dir: Option<PathBuf>,
    /// Audit sink override.
    #[arg(long, value_enum)]
    audit: Option<AuditArg>,
    /// Audit log path for the file sink.
    #[arg(long, value_name = "PATH")]
    audit_path: Option<PathBuf>,
}

/// Arguments for `list`.
#[derive(Args, Debug)]
struct ListCommand {
    /// Scenario group to list (repeatable).
    #[arg(long = "group", value_name = "GROUP", value_parser = parse_group)]
    groups: Vec<ScenarioGroup>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Output formats.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// One line per scenario.
    Text,
    /// Canonical JSON.
    Json,
}

/// Audit sink selection on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum AuditArg {
    /// Discard audit events.
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `--audit-path`.
    File,
}

impl From<AuditArg> for AuditSinkKind {
    fn from(value: AuditArg) -> Self {
        match value {
            AuditArg::None => Self::None,
            AuditArg::Stderr => Self::Stderr,
            AuditArg::File => Self::File,
        }
    }
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
        Commands::List(command) => command_list(&command),
    }
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let config = resolve_config(&command)?;
    let scenarios = select_scenarios(&command.scenarios, &command.groups)?;
    let client = TodosHttpClient::from_config(&config)
        .map_err(|err| CliError::new(format!("http client setup failed: {err}")))?;
    let sink = config
        .audit_sink()
        .map_err(|err| CliError::new(format!("audit sink setup failed: {err}")))?;
    let runner = ContractRunner::new(client, config.run_scope()).with_audit_sink(Arc::from(sink));

    let mut report = runner.run_all(&scenarios, &config.collection_url).await;
    report.transcript = runner.transport().transcript();

    if let Some(dir) = &command.report_dir {
        write_report_artifacts(dir, &report)?;
    }
    match command.format {
        OutputFormat::Text => {
            write_stdout_line(&format!(
                "todos contract run {} against {}",
                report.run_id, report.collection_url
            ))
            .map_err(|err| output_error("stdout", &err))?;
            for line in report.summary_lines() {
                write_stdout_line(&line).map_err(|err| output_error("stdout", &err))?;
            }
        }
        OutputFormat::Json => write_canonical_json(&report)?,
    }
    Ok(ExitCode::from(exit_status(report.worst_status())))
}

/// Layers CLI flags over file and environment configuration.
fn resolve_config(command: &RunCommand) -> CliResult<HarnessConfig> {
    let mut config = HarnessConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    apply_cli_overrides(&mut config, command);
    config.validate().map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    Ok(config)
}

/// Applies command-line overrides in place.
fn apply_cli_overrides(config: &mut HarnessConfig, command: &RunCommand) {
    if let Some(url) = &command.collection_url {
        config.collection_url.clone_from(url);
    }
    if let Some(secs) = command.timeout_secs {
        config.timeout_secs = secs;
    }
    if let Some(run_id) = &command.run_id {
        config.run_id = Some(run_id.clone());
    }
    if command.no_tag_titles {
        config.tag_titles = false;
    }
    if let Some(audit) = command.audit {
        config.audit.sink = audit.into();
    }
    if let Some(path) = &command.audit_path {
        config.audit.path = Some(path.clone());
    }
}

/// Selects scenarios by name or group, preserving table order.
///
/// With no filters the whole table is selected. Otherwise a scenario is
/// selected when its name or its group was requested.
fn select_scenarios(
    names: &[String],
    groups: &[ScenarioGroup],
) -> CliResult<Vec<ContractScenario>> {
    let table = contract_scenarios();
    if let Some(unknown) =
        names.iter().find(|name| !table.iter().any(|scenario| scenario.name == name.as_str()))
    {
        return Err(CliError::new(format!("unknown scenario: {unknown}")));
    }
    if names.is_empty() && groups.is_empty() {
        return Ok(table);
    }
    Ok(table
        .into_iter()
        .filter(|scenario| {
            groups.contains(&scenario.group)
                || names.iter().any(|name| name.as_str() == scenario.name)
        })
        .collect())
}

/// Maps the worst scenario status to a process exit status.
const fn exit_status(status: ScenarioStatus) -> u8 {
    match status {
        ScenarioStatus::Passed => 0,
        ScenarioStatus::Violated => EXIT_VIOLATED,
        ScenarioStatus::Unreachable => EXIT_UNREACHABLE,
    }
}

/// Writes `report.json` and `summary.md` into `dir`.
fn write_report_artifacts(dir: &Path, report: &RunReport) -> CliResult<()> {
    fs::create_dir_all(dir).map_err(|err| {
        CliError::new(format!("failed to create report dir {}: {err}", dir.display()))
    })?;
    let json = report
        .to_canonical_json()
        .map_err(|err| CliError::new(format!("failed to serialize report: {err}")))?;
    write_file(&dir.join(REPORT_JSON), &json)?;
    write_file(&dir.join(SUMMARY_MD), report.summary_markdown().as_bytes())
}

/// Writes bytes to a file.
fn write_file(path: &Path, bytes: &[u8]) -> CliResult<()> {
    fs::write(path, bytes)
        .map_err(|err| CliError::new(format!("failed to write {}: {err}", path.display())))
}

// ============================================================================
// SECTION: List Command
// ============================================================================

/// Executes the `list` command.
fn command_list(command: &ListCommand) -> CliResult<ExitCode> {
    let scenarios = select_scenarios(&[], &command.groups)?;
    match command.format {
        OutputFormat::Text => {
            for scenario in &scenarios {
                write_stdout_line(&format!(
                    "{:<28} {:<8} {:<8} {}",
                    scenario.name,
                    scenario.group.as_str(),
                    fixture_label(scenario.fixture),
                    scenario.summary
                ))
                .map_err(|err| output_error("stdout", &err))?;
            }
        }
        OutputFormat::Json => write_canonical_json(&scenarios)?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Short fixture label for text listings.
const fn fixture_label(fixture: Fixture) -> &'static str {
    match fixture {
        Fixture::None => "-",
        Fixture::Live => "live",
        Fixture::Deleted => "deleted",
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Parses a scenario group argument.
fn parse_group(raw: &str) -> Result<ScenarioGroup, String> {
    raw.parse()
}

/// Writes canonical JSON plus a newline to stdout.
fn write_canonical_json<T: serde::Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(format!("failed to serialize output: {err}")))?;
    bytes.push(b'\n');
    let mut stdout = std::io::stdout();
    stdout.write_all(&bytes).map_err(|err| output_error("stdout", &err))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error.
fn output_error(stream: &str, error: &std::io::Error) -> CliError {
    CliError::new(format!("failed to write to {stream}: {error}"))
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(EXIT_VIOLATED)
}
