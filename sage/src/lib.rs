//! Task Sage - a to-do list with a natural-language task assistant
//!
//! Tasks are created either from a title and priority picked by hand or from
//! free text that an LLM turns into `{title, priority}`.

pub mod app;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod llm;
pub mod manual;
pub mod notify;
pub mod repl;

pub use app::App;
pub use assistant::{AssistantComposer, AssistantError, AssistantOutcome, AssistantState, SubmitRejected};
pub use config::{Config, LlmConfig, Provider};
pub use manual::ManualComposer;
pub use notify::{ConsoleNotifier, Notification, NotificationKind, NotificationSink};
