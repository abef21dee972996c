//! Application controller
//!
//! `App` is the single owner of the task store, both composers and the
//! notification sink. Front ends drive it; it holds no UI state of its own.

use std::sync::Arc;

use taskstore::{Priority, Progress, StoreError, Task, TaskStore};
use tracing::{debug, info};

use crate::assistant::{AssistantComposer, AssistantOutcome, PendingSubmission, SubmitRejected};
use crate::config::Config;
use crate::llm::{LlmClient, LlmError, create_client_from_resolved};
use crate::manual::ManualComposer;
use crate::notify::{Notification, NotificationSink};

pub struct App<S: NotificationSink> {
    store: TaskStore,
    manual: ManualComposer,
    assistant: AssistantComposer,
    sink: S,
}

impl<S: NotificationSink> App<S> {
    pub fn new(client: Arc<dyn LlmClient>, sink: S) -> Self {
        Self {
            store: TaskStore::new(),
            manual: ManualComposer::new(),
            assistant: AssistantComposer::new(client),
            sink,
        }
    }

    /// Build from configuration
    ///
    /// Creates the configured client and preloads the credential when the
    /// configured environment variable holds one.
    pub fn from_config(config: &Config, sink: S) -> eyre::Result<Self> {
        debug!(provider = %config.llm.provider, "App::from_config: called");
        let resolved = config.llm.resolve()?;
        let client = create_client_from_resolved(&resolved)?;

        let mut app = Self {
            store: TaskStore::new(),
            manual: ManualComposer::new(),
            assistant: AssistantComposer::new(client).with_limits(resolved.max_tokens, resolved.temperature),
            sink,
        };

        if let Some(credential) = config.llm.env_credential() {
            info!("App::from_config: credential loaded from environment");
            app.assistant.set_credential(credential.expose());
        }
        Ok(app)
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn progress(&self) -> Progress {
        self.store.progress()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn manual(&self) -> &ManualComposer {
        &self.manual
    }

    pub fn assistant(&self) -> &AssistantComposer {
        &self.assistant
    }

    /// Add a task with the selected priority
    pub fn add_task(&mut self, title: &str) -> Option<Task> {
        self.manual.set_title(title);
        self.manual.submit(&mut self.store, &mut self.sink)
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.manual.set_priority(priority);
    }

    /// Toggle a task by position or id prefix
    pub fn toggle(&mut self, reference: &str) -> Result<bool, StoreError> {
        debug!(%reference, "toggle: called");
        let id = self.store.resolve(reference)?;
        self.store.toggle_complete(id)
    }

    /// Delete a task by position or id prefix
    pub fn delete(&mut self, reference: &str) -> Result<Task, StoreError> {
        debug!(%reference, "delete: called");
        let id = self.store.resolve(reference)?;
        let task = self
            .store
            .delete(id)
            .ok_or_else(|| StoreError::NotFound(reference.to_string()))?;
        info!(id = %task.id(), "delete: task deleted");
        self.sink.notify(Notification::success(
            "Task deleted",
            "The task has been deleted successfully.",
        ));
        Ok(task)
    }

    pub fn open_assistant(&mut self) {
        self.assistant.open();
    }

    pub fn close_assistant(&mut self) {
        self.assistant.close();
    }

    pub fn set_credential(&mut self, secret: &str) -> bool {
        self.assistant.set_credential(secret)
    }

    /// Start an assistant submission for `text`
    pub fn begin_submission(&mut self, text: &str) -> Result<PendingSubmission, SubmitRejected> {
        self.assistant.set_message(text)?;
        self.assistant.begin_submission()
    }

    /// Apply the result of a submission started with [`Self::begin_submission`]
    pub fn finish_submission(&mut self, result: Result<String, LlmError>) -> Result<&AssistantOutcome, SubmitRejected> {
        self.assistant.finish_submission(result, &mut self.store, &mut self.sink)
    }

    /// Ask the assistant to turn `text` into a task and wait for the outcome
    pub async fn ask(&mut self, text: &str) -> Result<&AssistantOutcome, SubmitRejected> {
        debug!(text_len = text.len(), "ask: called");
        let pending = self.begin_submission(text)?;
        let result = pending.send().await;
        self.finish_submission(result)
    }
}
