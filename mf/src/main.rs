//! modalform - contact form modal
//!
//! CLI entry point: launches the TUI or validates a submission directly.

use std::fs;
use std::process;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use modalform::cli::{Cli, Command, OutputFormat, get_log_path};
use modalform::config::{Config, TuiConfig};
use modalform::form::{self, Field, FieldErrors, FormInput, FormModal, SubmissionRecord};
use modalform::tui;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None | Some(Command::Tui) => cmd_tui(&config.tui).await,
        Some(Command::Validate {
            name,
            email,
            message,
            format,
        }) => {
            let input = FormInput::new(name, email, message);
            if !cmd_validate(&input, format)? {
                process::exit(1);
            }
            Ok(())
        }
    }
}

/// Launch the TUI with a fresh modal service
async fn cmd_tui(config: &TuiConfig) -> Result<()> {
    debug!(?config, "cmd_tui: called");
    let service = Arc::new(FormModal::new());
    let result = tui::run(service, config).await;
    info!(ok = result.is_ok(), "cmd_tui: TUI exited");
    result
}

/// Validate one submission and print the outcome; returns whether it passed
fn cmd_validate(input: &FormInput, format: OutputFormat) -> Result<bool> {
    debug!(?format, "cmd_validate: called");
    let outcome = form::validate(input);
    match &outcome {
        Ok(_) => info!("cmd_validate: submission accepted"),
        Err(errors) => info!(fields = errors.len(), "cmd_validate: submission rejected"),
    }

    match format {
        OutputFormat::Json => {
            let json = match &outcome {
                Ok(record) => serde_json::json!({ "ok": true, "record": record }),
                Err(errors) => serde_json::json!({ "ok": false, "errors": errors }),
            };
            println!("{}", serde_json::to_string_pretty(&json).context("Failed to serialize result")?);
        }
        OutputFormat::Text => match &outcome {
            Ok(record) => print_record(record),
            Err(errors) => print_errors(errors),
        },
    }

    Ok(outcome.is_ok())
}

fn print_record(record: &SubmissionRecord) {
    println!("{} Submission accepted", "✓".green());
    for field in Field::ALL {
        println!("  {:<8} {}", format!("{}:", field.label()).bold(), record.get(field));
    }
}

fn print_errors(errors: &FieldErrors) {
    println!("{} Submission rejected", "✗".red());
    for field in errors.fields() {
        for message in errors.get(field).unwrap_or_default() {
            println!("  {:<8} {}", format!("{}:", field.label()).bold(), message.red());
        }
    }
}
