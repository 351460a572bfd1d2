// crates/schema-catalog-cli/src/main.rs
// ============================================================================
// Module: Schema Catalog CLI Entry Point
// Description: Command dispatcher for catalog sync and inspection.
// Purpose: Run one-shot or scheduled syncs and print catalog contents.
// Dependencies: clap, schema-catalog-cli, schema-catalog-config, serde_json, tokio
// ============================================================================

//! ## Overview
//! `schema-catalog` loads `schema-catalog.toml`, builds the registry client
//! and catalog store, and then either runs one sync pass (`sync`), runs passes
//! on an interval until Ctrl-C (`serve`), validates config, or prints catalog
//! entries as JSON. Per-subject sync errors are reported in the metrics and do
//! not change the exit code; config and bootstrap failures exit non-zero.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use schema_catalog_cli::bootstrap::build_store;
use schema_catalog_cli::bootstrap::init_logging;
use schema_catalog_cli::build_components;
use schema_catalog_cli::run_periodic;
use schema_catalog_cli::subject_report;
use schema_catalog_config::SchemaCatalogConfig;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "schema-catalog", version, disable_help_subcommand = true)]
struct Cli {
    /// Optional config file path (defaults to schema-catalog.toml or env override).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one sync pass and print its metrics as JSON.
    Sync,
    /// Run sync passes on the configured interval until interrupted.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Catalog inspection utilities.
    Catalog {
        /// Selected catalog subcommand.
        #[command(subcommand)]
        command: CatalogCommand,
    },
}

/// Options for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Override `sync.interval_secs`.
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    interval_secs: Option<u64>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a schema-catalog configuration file.
    Validate,
}

/// Catalog subcommands.
#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// List every cataloged subject.
    List,
    /// Show one subject and its persisted versions.
    Show {
        /// Subject name.
        subject: String,
    },
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
    let config = load_config(&cli)?;
    match cli.command {
        Commands::Sync => command_sync(&config).await,
        Commands::Serve(command) => command_serve(&config, &command).await,
        Commands::Config {
            command: ConfigCommand::Validate,
        } => command_config_validate(),
        Commands::Catalog {
            command,
        } => command_catalog(&config, command),
    }
}

/// Loads and validates configuration.
fn load_config(cli: &Cli) -> CliResult<SchemaCatalogConfig> {
    SchemaCatalogConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

// ============================================================================
// SECTION: Sync Commands
// ============================================================================

/// Executes the `sync` command.
async fn command_sync(config: &SchemaCatalogConfig) -> CliResult<ExitCode> {
    init_logging(&config.logging).map_err(|err| CliError::new(err.to_string()))?;
    let components = build_components(config).map_err(|err| CliError::new(err.to_string()))?;
    let metrics = components.orchestrator.sync_all().await;
    if metrics.errors > 0 {
        warn!(errors = metrics.errors, "sync finished with errors");
    }
    write_json(&metrics)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `serve` command.
async fn command_serve(config: &SchemaCatalogConfig, command: &ServeCommand) -> CliResult<ExitCode> {
    init_logging(&config.logging).map_err(|err| CliError::new(err.to_string()))?;
    let components = build_components(config).map_err(|err| CliError::new(err.to_string()))?;
    let interval = command
        .interval_secs
        .map_or_else(|| config.sync.interval(), std::time::Duration::from_secs);
    info!(interval_secs = interval.as_secs(), "catalog sync scheduler started");
    run_periodic(&components.orchestrator, interval, shutdown_signal()).await;
    Ok(ExitCode::SUCCESS)
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "ctrl-c handler failed; stopping scheduler");
    }
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Executes the config validation command.
fn command_config_validate() -> CliResult<ExitCode> {
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Catalog Commands
// ============================================================================

/// Dispatches catalog subcommands.
fn command_catalog(config: &SchemaCatalogConfig, command: CatalogCommand) -> CliResult<ExitCode> {
    let store = build_store(&config.store).map_err(|err| CliError::new(err.to_string()))?;
    match command {
        CatalogCommand::List => {
            let entries = store
                .list_subject_entries()
                .map_err(|err| CliError::new(format!("catalog read failed: {err}")))?;
            write_json(&entries)?;
            Ok(ExitCode::SUCCESS)
        }
        CatalogCommand::Show {
            subject,
        } => {
            let report = subject_report(store.as_ref(), &subject)
                .map_err(|err| CliError::new(format!("catalog read failed: {err}")))?
                .ok_or_else(|| CliError::new(format!("subject not cataloged: {subject}")))?;
            write_json(&report)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a value as pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to serialize output: {err}")))?;
    write_stdout_line(&text).map_err(|err| CliError::new(output_error("stdout", &err)))
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

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Tests
// ============================================================================
