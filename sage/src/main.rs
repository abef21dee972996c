//! Task Sage - to-do list with a natural-language task assistant
//!
//! CLI entry point.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use tasksage::app::App;
use tasksage::assistant::{AssistantOutcome, SubmitRejected};
use tasksage::cli::{Cli, Command};
use tasksage::config::Config;
use tasksage::notify::{ConsoleNotifier, Notification};
use tasksage::repl;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tasksage")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Determine log level with priority: CLI --log-level > config file > default (INFO)
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

    let log_file = fs::File::create(log_dir.join("tasksage.log")).context("Failed to create log file")?;

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

    // Setup logging with priority: CLI > config > INFO default
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("Task Sage loaded config: provider={}", config.llm.provider);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        None => repl::run_interactive(&config).await,
        Some(Command::Ask { text, json }) => cmd_ask(&config, &text.join(" "), json).await,
        Some(Command::Config) => cmd_config(&config),
    }
}

/// One-shot assistant extraction
async fn cmd_ask(config: &Config, text: &str, json: bool) -> Result<()> {
    debug!(text_len = text.len(), json, "cmd_ask: called");
    // Notifications are collected so --json output stays clean
    let mut app = App::from_config(config, Vec::<Notification>::new())?;

    let created = match app.ask(text).await {
        Ok(AssistantOutcome::Created(task)) => Ok(task.clone()),
        Ok(AssistantOutcome::Failed(e)) => Err(e.to_string()),
        Err(SubmitRejected::MissingCredential) => {
            let hint = match &config.llm.api_key_env {
                Some(var) => format!("Set the {} environment variable", var),
                None => "Set llm.api-key-env in the config file to an environment variable holding the key".to_string(),
            };
            return Err(eyre::eyre!("No API key available. {}", hint));
        }
        Err(e) => return Err(eyre::eyre!(e)),
    };

    let task = match created {
        Ok(task) => task,
        Err(detail) => {
            for notification in app.sink() {
                eprintln!("{}", ConsoleNotifier::render(notification));
            }
            return Err(eyre::eyre!(detail));
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&task).context("Failed to serialize task")?);
    } else {
        for notification in app.sink() {
            println!("{}", ConsoleNotifier::render(notification));
        }
        println!("  {} {}", "id:".dimmed(), task.id());
    }
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    print!("{}", config.to_yaml()?);
    Ok(())
}
