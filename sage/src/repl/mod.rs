//! Interactive REPL for Task Sage
//!
//! Slash commands manage the list; any other line is handed to the assistant.

mod command;
mod session;

pub use command::SlashCommand;
pub use session::ReplSession;

use eyre::{Context, Result};

use crate::app::App;
use crate::config::Config;
use crate::notify::ConsoleNotifier;

/// Run the interactive REPL
///
/// This is the entry point for `sage` without a subcommand.
pub async fn run_interactive(config: &Config) -> Result<()> {
    let resolved = config.llm.resolve()?;
    let app = App::from_config(config, ConsoleNotifier).context("Failed to set up the assistant")?;

    let mut session = ReplSession::new(app, format!("{} ({})", resolved.provider, resolved.model));
    session.run().await
}
