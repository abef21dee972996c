//! Natural-language task entry
//!
//! Free text goes to the configured LLM; the reply is mined for a
//! `{title, priority}` object that becomes a task.

mod composer;
pub mod payload;

pub use composer::{
    AssistantComposer, AssistantError, AssistantOutcome, AssistantState, FAILURE_DESCRIPTION, PendingSubmission,
    SYSTEM_INSTRUCTION, SubmitRejected,
};
pub use payload::{AssistantResponse, PayloadError, extract_payload};
