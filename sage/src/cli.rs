//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Task Sage - a to-do list with a natural-language task assistant
#[derive(Parser)]
#[command(
    name = "sage",
    about = "To-do list with a natural-language task assistant",
    version,
    after_help = "Logs are written to: ~/.local/share/tasksage/logs/tasksage.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute (interactive session when omitted)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Turn a free-text description into a task with the assistant
    Ask {
        /// Task description
        #[arg(required = true, value_name = "TEXT")]
        text: Vec<String>,

        /// Print the created task as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask() {
        let cli = Cli::parse_from(["sage", "-l", "debug", "ask", "call", "the", "dentist", "--json"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Some(Command::Ask { text, json }) => {
                assert_eq!(text.join(" "), "call the dentist");
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_no_command_is_interactive() {
        let cli = Cli::parse_from(["sage", "--config", "/tmp/sage.yml"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/sage.yml")));
    }

    #[test]
    fn test_ask_requires_text() {
        assert!(Cli::try_parse_from(["sage", "ask"]).is_err());
    }
}
