//! CLI binary entrypoint.

mod commands;
mod error;
mod format;

use clap::{Parser, Subcommand};
use commands::{EmitInput, run_config_show, run_emit};
use ctxlog::LogLevel;
use error::{CliError, ExitCode};
use format::{ConfigFormat, Severity, parse_key_value};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Env var holding the filter for the CLI's own diagnostics (stderr).
const DIAGNOSTICS_ENV: &str = "CTXLOG_DIAGNOSTICS";

#[derive(Debug, Parser)]
#[command(
    name = "ctxlog",
    version,
    about = "Context-aware structured logging CLI",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write one record to the configured output.
    Emit {
        /// Record severity.
        #[arg(value_enum)]
        severity: Severity,
        /// Record message.
        message: String,
        /// Optional config file path (JSON/TOML).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Threshold override (`debug`, `info`, `warn`, `error`).
        #[arg(long)]
        threshold: Option<LogLevel>,
        /// Human-readable console output with caller annotation.
        #[arg(long)]
        dev: bool,
        /// Force debug routing for this record.
        #[arg(long)]
        force_debug: bool,
        /// Call field as `key=value`; repeatable.
        #[arg(long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
        /// Context field as `key=value`; repeatable. Written after call fields.
        #[arg(long = "context-field", value_parser = parse_key_value)]
        context_fields: Vec<(String, String)>,
    },
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Print the effective config after file and env overrides.
    Show {
        /// Optional config file path (JSON/TOML).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = ConfigFormat::Json)]
        format: ConfigFormat,
    },
}

#[derive(Debug)]
pub(crate) struct CliOutput {
    stdout: String,
    stderr: String,
    exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    init_diagnostics();
    let cli = Cli::parse();

    match run(&cli.command) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn init_diagnostics() {
    let filter = EnvFilter::try_from_env(DIAGNOSTICS_ENV).unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .try_init();
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn run(command: &Commands) -> Result<CliOutput, CliError> {
    let env = collect_scoped_env("CTXLOG_");
    match command {
        Commands::Emit {
            severity,
            message,
            config,
            threshold,
            dev,
            force_debug,
            fields,
            context_fields,
        } => {
            let input = EmitInput {
                severity: *severity,
                message,
                config: config.as_deref(),
                threshold: *threshold,
                dev: *dev,
                force_debug: *force_debug,
                fields,
                context_fields,
            };
            run_emit(&input, env)
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show { config, format } => {
                run_config_show(config.as_deref(), *format, &env)
            },
        },
    }
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;
    stdout.flush()?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}

fn collect_scoped_env(prefix: &str) -> BTreeMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with(prefix) && key != DIAGNOSTICS_ENV)
        .collect()
}
