//! REPL session management

use std::sync::mpsc as std_mpsc;
use std::thread;

use chrono::Local;
use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use taskstore::{Priority, Progress, StoreError, Task};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::command::{SlashCommand, keep_in_history};
use crate::app::App;
use crate::assistant::{AssistantState, SubmitRejected};
use crate::llm::LlmError;
use crate::notify::ConsoleNotifier;

/// Input from the reader thread
#[derive(Debug)]
enum ReplEvent {
    Line(String),
    Interrupted,
    Eof,
    Failed(String),
}

enum SlashResult {
    Continue,
    Quit,
}

/// Interactive REPL session
pub struct ReplSession {
    app: App<ConsoleNotifier>,
    model_label: String,
}

impl ReplSession {
    pub fn new(app: App<ConsoleNotifier>, model_label: String) -> Self {
        Self { app, model_label }
    }

    /// Run the REPL main loop
    ///
    /// Lines are read on their own thread. Assistant requests run as spawned
    /// tasks and their results come back over a channel, so typing continues
    /// while a request is in flight.
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        let (line_tx, mut line_rx) = mpsc::unbounded_channel();
        let (ack_tx, ack_rx) = std_mpsc::channel::<()>();
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Result<String, LlmError>>();
        spawn_reader(line_tx, ack_rx)?;

        loop {
            tokio::select! {
                Some(result) = done_rx.recv() => {
                    debug!(ok = result.is_ok(), "run: submission finished");
                    if let Err(e) = self.app.finish_submission(result) {
                        warn!(error = %e, "run: result dropped");
                    }
                }
                event = line_rx.recv() => {
                    let flow = match event {
                        Some(ReplEvent::Line(line)) => self.handle_line(&line, &done_tx),
                        Some(ReplEvent::Interrupted) => {
                            // Ctrl+C - just show new prompt
                            println!("^C");
                            SlashResult::Continue
                        }
                        Some(ReplEvent::Eof) | None => {
                            // Ctrl+D - exit
                            println!();
                            SlashResult::Quit
                        }
                        Some(ReplEvent::Failed(err)) => return Err(eyre::eyre!("Readline error: {}", err)),
                    };
                    match flow {
                        SlashResult::Continue => {
                            let _ = ack_tx.send(());
                        }
                        SlashResult::Quit => break,
                    }
                }
            }
        }

        if self.app.assistant().state() == AssistantState::Submitting {
            warn!("run: quitting with a request in flight");
        }
        println!("Goodbye!");
        Ok(())
    }

    fn handle_line(&mut self, line: &str, done_tx: &mpsc::UnboundedSender<Result<String, LlmError>>) -> SlashResult {
        let input = line.trim();
        if input.is_empty() {
            return SlashResult::Continue;
        }
        if input.starts_with('/') {
            return self.handle_slash_command(input);
        }
        self.submit_to_assistant(input, done_tx);
        SlashResult::Continue
    }

    /// Handle slash commands
    fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let command = SlashCommand::parse(input);
        // Never log the raw line; it may carry a key
        if !matches!(command, SlashCommand::Key(_)) {
            debug!(?command, "handle_slash_command: called");
        }

        match command {
            SlashCommand::Add(title) => {
                // Blank titles are ignored without a message
                if self.app.add_task(title).is_some() {
                    self.print_tasks();
                }
            }
            SlashCommand::Priority(None) => {
                println!("Priority for new tasks: {}", paint_priority(self.app.manual().priority()));
            }
            SlashCommand::Priority(Some(value)) => match value.parse::<Priority>() {
                Ok(priority) => {
                    self.app.set_priority(priority);
                    println!("Priority for new tasks: {}", paint_priority(priority));
                }
                Err(e) => println!("{} {}", "?".yellow(), e),
            },
            SlashCommand::Done(reference) => match self.app.toggle(reference) {
                Ok(true) => println!("{} Marked done", "✓".green()),
                Ok(false) => println!("{} Marked not done", "○".dimmed()),
                Err(e) => print_store_error(&e),
            },
            SlashCommand::Remove(reference) => {
                if let Err(e) = self.app.delete(reference) {
                    print_store_error(&e);
                }
            }
            SlashCommand::List => self.print_tasks(),
            SlashCommand::Key(secret) => {
                if self.app.set_credential(secret) {
                    info!("handle_slash_command: credential set");
                    println!("{} API key set for this session", "✓".green());
                } else {
                    println!("Usage: {} <API_KEY>", "/key".yellow());
                }
            }
            SlashCommand::Open => {
                self.app.open_assistant();
                if self.app.assistant().state() == AssistantState::AwaitingCredential {
                    println!("Enter your API key with {} to use the assistant", "/key <API_KEY>".yellow());
                } else {
                    println!("{}", "Assistant ready. Describe a task in plain words.".dimmed());
                }
            }
            SlashCommand::Close => {
                self.app.close_assistant();
                println!("{}", "Assistant hidden.".dimmed());
            }
            SlashCommand::Status => self.print_status(),
            SlashCommand::Help => self.print_help(),
            SlashCommand::Quit => return SlashResult::Quit,
            SlashCommand::Unknown(cmd) => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
            }
        }
        SlashResult::Continue
    }

    /// Hand free text to the assistant and run the request in the background
    fn submit_to_assistant(&mut self, text: &str, done_tx: &mpsc::UnboundedSender<Result<String, LlmError>>) {
        self.app.open_assistant();
        match self.app.begin_submission(text) {
            Ok(pending) => {
                println!("{}", "Thinking...".dimmed());
                let done_tx = done_tx.clone();
                tokio::spawn(async move {
                    let result = pending.send().await;
                    if done_tx.send(result).is_err() {
                        debug!("submit_to_assistant: session ended before result arrived");
                    }
                });
            }
            Err(SubmitRejected::MissingCredential) => {
                println!("Enter your API key with {} first", "/key <API_KEY>".yellow());
            }
            Err(SubmitRejected::Busy) => {
                println!("{}", "Still working on the previous request.".dimmed());
            }
            Err(SubmitRejected::EmptyMessage | SubmitRejected::NotPending) => {}
        }
    }

    /// Print welcome message
    fn print_welcome(&self) {
        println!();
        println!("{}", "Task Sage".bright_cyan().bold());
        println!("Assistant: {}", self.model_label);
        println!(
            "Type {} to add a task, plain text to ask the assistant, {} for help",
            "/add".yellow(),
            "/help".yellow()
        );
        println!();
    }

    /// Print help message
    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:20} Add a task with the selected priority", "/add <title>".yellow());
        println!("  {:20} Show or set the priority for new tasks", "/priority [level]".yellow());
        println!("  {:20} Toggle a task done/not done", "/done <n|id>".yellow());
        println!("  {:20} Delete a task", "/rm <n|id>".yellow());
        println!("  {:20} Show all tasks", "/list".yellow());
        println!("  {:20} Set the assistant API key", "/key <API_KEY>".yellow());
        println!("  {:20} Show or hide the assistant", "/open, /close".yellow());
        println!("  {:20} Show session status", "/status".yellow());
        println!("  {:20} Show this help", "/help".yellow());
        println!("  {:20} Exit the REPL", "/quit".yellow());
        println!();
        println!("Anything else is sent to the assistant, e.g. {}", "remind me to pay rent friday".dimmed());
        println!();
    }

    fn print_status(&self) {
        let assistant = self.app.assistant();
        println!();
        println!("{}", "Status:".bright_cyan());
        println!("  {:12} {}", "Assistant", self.model_label);
        println!("  {:12} {:?}", "State", assistant.state());
        println!("  {:12} {}", "Visible", if assistant.is_visible() { "yes" } else { "no" });
        println!("  {:12} {}", "API key", if assistant.has_credential() { "set" } else { "not set" });
        println!("  {:12} {}", "Priority", paint_priority(self.app.manual().priority()));
        println!("  {:12} {}", "Progress", render_progress(self.app.progress()));
        println!();
    }

    fn print_tasks(&self) {
        let tasks = self.app.tasks();
        if tasks.is_empty() {
            println!("{}", "No tasks yet.".dimmed());
            return;
        }

        println!();
        for (i, task) in tasks.iter().enumerate() {
            println!("{}", render_task(i + 1, task));
        }
        println!();
        println!("{}", render_progress(self.app.progress()));
        println!();
    }
}

/// Start the line reader thread
///
/// After each line the reader waits for an ack so the prompt is not redrawn
/// before the line's output. Dropping the ack sender stops the thread.
fn spawn_reader(line_tx: mpsc::UnboundedSender<ReplEvent>, ack_rx: std_mpsc::Receiver<()>) -> Result<()> {
    let prompt = format!("{} ", ">".bright_green());

    thread::Builder::new()
        .name("repl-reader".to_string())
        .spawn(move || {
            let mut rl = match DefaultEditor::new() {
                Ok(rl) => rl,
                Err(e) => {
                    let _ = line_tx.send(ReplEvent::Failed(format!("Failed to initialize readline: {}", e)));
                    return;
                }
            };
            loop {
                let event = match rl.readline(&prompt) {
                    Ok(line) => {
                        if keep_in_history(&line) && !line.trim().is_empty() {
                            let _ = rl.add_history_entry(line.trim());
                        }
                        ReplEvent::Line(line)
                    }
                    Err(ReadlineError::Interrupted) => ReplEvent::Interrupted,
                    Err(ReadlineError::Eof) => ReplEvent::Eof,
                    Err(err) => ReplEvent::Failed(err.to_string()),
                };
                let last = matches!(event, ReplEvent::Eof | ReplEvent::Failed(_));
                if line_tx.send(event).is_err() || last || ack_rx.recv().is_err() {
                    break;
                }
            }
        })
        .map_err(|e| eyre::eyre!("Failed to start input thread: {}", e))?;
    Ok(())
}

fn paint_priority(priority: Priority) -> colored::ColoredString {
    match priority {
        Priority::High => priority.as_str().red(),
        Priority::Medium => priority.as_str().yellow(),
        Priority::Low => priority.as_str().green(),
    }
}

/// One task line: position, checkbox, title, priority, short id, creation time
fn render_task(position: usize, task: &Task) -> String {
    let checkbox = if task.is_completed() { "[x]" } else { "[ ]" };
    let title = if task.is_completed() {
        task.title().dimmed().strikethrough()
    } else {
        task.title().normal()
    };
    format!(
        "{:>3}. {} {}  {}  {}  {}",
        position,
        checkbox,
        title,
        paint_priority(task.priority()),
        task.id().short().dimmed(),
        task.created_at().with_timezone(&Local).format("%b %d %H:%M").to_string().dimmed()
    )
}

fn render_progress(progress: Progress) -> String {
    format!(
        "Progress: {}/{} completed ({}%)",
        progress.completed,
        progress.total,
        progress.percent()
    )
}

fn print_store_error(err: &StoreError) {
    println!("{} {}", "✗".red(), err);
    if let StoreError::Ambiguous { candidates, .. } = err {
        let ids: Vec<String> = candidates.iter().map(|id| id.short()).collect();
        println!("  Candidates: {}", ids.join(", "));
    }
}
