//! Assistant task composer
//!
//! Turns free text into a task by asking the configured LLM for a
//! `{title, priority}` object. Submission is split in three steps so a UI
//! loop can keep handling input while the request is in flight:
//!
//! 1. [`AssistantComposer::begin_submission`] moves to `Submitting` and hands
//!    back a self-contained [`PendingSubmission`]
//! 2. [`PendingSubmission::send`] performs the single outbound call
//! 3. [`AssistantComposer::finish_submission`] applies the result
//!
//! While a submission is pending, further submissions are rejected.

use std::sync::Arc;

use taskstore::{Task, TaskStore};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::payload::{PayloadError, extract_payload};
use crate::llm::{CompletionRequest, Credential, LlmClient, LlmError};
use crate::notify::{Notification, NotificationSink};

/// Fixed instruction sent with every submission
pub const SYSTEM_INSTRUCTION: &str = "You are a task management assistant. When users describe tasks, \
extract a concise task title and a priority level (low, medium, or high) based on urgency and importance. \
Respond with a JSON object like this: {\"title\": \"task title\", \"priority\": \"low|medium|high\"}. \
Keep titles concise.";

/// Generic failure text shown for every assistant failure
pub const FAILURE_DESCRIPTION: &str = "Failed to process your request. Please try again.";

/// Where the composer is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantState {
    /// Never opened
    Idle,
    /// Open, but no credential yet
    AwaitingCredential,
    /// Credential held; the message can be edited, and submitted once it
    /// is non-blank
    Composing,
    /// One request in flight
    Submitting,
    /// Last submission created a task; editing the message returns to `Composing`
    Succeeded,
    /// Last submission failed; message and credential are kept for a retry
    Failed,
}

/// Why a submission did not start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("A request is already in flight")]
    Busy,

    #[error("No credential has been entered")]
    MissingCredential,

    #[error("Nothing to submit")]
    EmptyMessage,

    #[error("No submission is pending")]
    NotPending,
}

/// Failures of a submitted request
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Completion request failed: {0}")]
    Completion(#[from] LlmError),

    #[error("Invalid assistant response: {0}")]
    InvalidResponse(#[from] PayloadError),
}

/// Result of a finished submission
#[derive(Debug)]
pub enum AssistantOutcome {
    Created(Task),
    Failed(AssistantError),
}

impl AssistantOutcome {
    pub fn task(&self) -> Option<&Task> {
        match self {
            AssistantOutcome::Created(task) => Some(task),
            AssistantOutcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, AssistantOutcome::Failed(_))
    }
}

/// A request that has been accepted but not yet sent
///
/// Owns everything it needs, so it can be moved into a spawned task.
pub struct PendingSubmission {
    client: Arc<dyn LlmClient>,
    request: CompletionRequest,
    credential: Credential,
}

impl PendingSubmission {
    /// The message being submitted
    pub fn message(&self) -> &str {
        &self.request.user_message
    }

    /// Perform the outbound call and return the raw reply text
    pub async fn send(self) -> Result<String, LlmError> {
        debug!(message_len = self.request.user_message.len(), "PendingSubmission::send: called");
        let response = self.client.complete(self.request, &self.credential).await?;
        response
            .content
            .ok_or_else(|| LlmError::InvalidResponse("Reply had no text content".to_string()))
    }
}

impl std::fmt::Debug for PendingSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingSubmission")
            .field("request", &self.request)
            .field("credential", &self.credential)
            .finish()
    }
}

/// Free-text task composer backed by an LLM
pub struct AssistantComposer {
    client: Arc<dyn LlmClient>,
    state: AssistantState,
    visible: bool,
    credential: Option<Credential>,
    message: String,
    max_tokens: u32,
    temperature: f32,
    last_outcome: Option<AssistantOutcome>,
}

impl AssistantComposer {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            state: AssistantState::Idle,
            visible: false,
            credential: None,
            message: String::new(),
            max_tokens: 256,
            temperature: 0.2,
            last_outcome: None,
        }
    }

    /// Set request limits from configuration
    pub fn with_limits(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn state(&self) -> AssistantState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn last_outcome(&self) -> Option<&AssistantOutcome> {
        self.last_outcome.as_ref()
    }

    /// Show the composer view
    pub fn open(&mut self) {
        debug!(state = ?self.state, "open: called");
        self.visible = true;
        if self.state == AssistantState::Idle {
            self.state = if self.credential.is_some() {
                AssistantState::Composing
            } else {
                AssistantState::AwaitingCredential
            };
        }
    }

    /// Hide the composer view
    ///
    /// An in-flight request keeps running and its result is still applied.
    pub fn close(&mut self) {
        debug!(state = ?self.state, "close: called");
        self.visible = false;
    }

    /// Store the credential for the rest of the session
    ///
    /// A held credential moves an unopened or waiting composer to `Composing`.
    /// Submitting still needs non-blank message text, which
    /// [`Self::begin_submission`] checks. Returns false if the value was blank.
    pub fn set_credential(&mut self, secret: &str) -> bool {
        debug!("set_credential: called");
        let Some(credential) = Credential::new(secret) else {
            debug!("set_credential: blank credential ignored");
            return false;
        };
        self.credential = Some(credential);
        if matches!(self.state, AssistantState::Idle | AssistantState::AwaitingCredential) {
            self.state = AssistantState::Composing;
        }
        true
    }

    /// Replace the message text
    pub fn set_message(&mut self, text: &str) -> Result<(), SubmitRejected> {
        if self.state == AssistantState::Submitting {
            debug!("set_message: rejected while submitting");
            return Err(SubmitRejected::Busy);
        }
        if matches!(self.state, AssistantState::Succeeded | AssistantState::Failed) {
            self.state = AssistantState::Composing;
        }
        self.message = text.to_string();
        Ok(())
    }

    /// Whether the last finished submission failed
    pub fn is_failed(&self) -> bool {
        self.state == AssistantState::Failed
    }

    /// Accept the current message for submission
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, SubmitRejected> {
        debug!(state = ?self.state, "begin_submission: called");
        if self.state == AssistantState::Submitting {
            warn!("begin_submission: request already in flight");
            return Err(SubmitRejected::Busy);
        }
        let credential = self.credential.clone().ok_or(SubmitRejected::MissingCredential)?;
        let message = self.message.trim();
        if message.is_empty() {
            return Err(SubmitRejected::EmptyMessage);
        }

        let request = CompletionRequest::new(SYSTEM_INSTRUCTION, message)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        self.state = AssistantState::Submitting;
        info!(message_len = message.len(), "begin_submission: submitting");

        Ok(PendingSubmission {
            client: Arc::clone(&self.client),
            request,
            credential,
        })
    }

    /// Apply the result of a sent submission
    ///
    /// Every failure is turned into one generic error notification here. A
    /// result that arrives when nothing is pending is dropped with
    /// `NotPending`; the store and sink are left alone.
    pub fn finish_submission(
        &mut self,
        result: Result<String, LlmError>,
        store: &mut TaskStore,
        sink: &mut dyn NotificationSink,
    ) -> Result<&AssistantOutcome, SubmitRejected> {
        debug!(ok = result.is_ok(), "finish_submission: called");
        if self.state != AssistantState::Submitting {
            warn!(state = ?self.state, "finish_submission: no submission was pending");
            return Err(SubmitRejected::NotPending);
        }

        let outcome = match Self::create_task(result, store) {
            Ok(task) => {
                info!(id = %task.id(), priority = %task.priority(), "finish_submission: task created");
                self.state = AssistantState::Succeeded;
                self.message.clear();
                sink.notify(Notification::task_added());
                sink.notify(Notification::success(
                    "Task created",
                    format!("Added \"{}\" with {} priority", task.title(), task.priority()),
                ));
                AssistantOutcome::Created(task)
            }
            Err(e) => {
                warn!(error = %e, "finish_submission: failed");
                self.state = AssistantState::Failed;
                sink.notify(Notification::error("Error", FAILURE_DESCRIPTION));
                AssistantOutcome::Failed(e)
            }
        };

        Ok(self.last_outcome.insert(outcome))
    }

    fn create_task(result: Result<String, LlmError>, store: &mut TaskStore) -> Result<Task, AssistantError> {
        let reply = result?;
        let parsed = extract_payload(&reply)?;
        store
            .add(&parsed.title, parsed.priority)
            .map_err(|_| AssistantError::InvalidResponse(PayloadError::EmptyTitle))
    }

    /// Begin, send and finish in one go
    ///
    /// Returns None when the submission was rejected before sending.
    pub async fn submit(
        &mut self,
        store: &mut TaskStore,
        sink: &mut dyn NotificationSink,
    ) -> Option<&AssistantOutcome> {
        let pending = match self.begin_submission() {
            Ok(pending) => pending,
            Err(rejected) => {
                debug!(%rejected, "submit: rejected");
                return None;
            }
        };
        let result = pending.send().await;
        self.finish_submission(result, store, sink).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::{MockLlmClient, MockReply};
    use crate::notify::{Notification, NotificationKind};
    use taskstore::Priority;

    fn composer(client: MockLlmClient) -> (AssistantComposer, Arc<MockLlmClient>) {
        let client = Arc::new(client);
        (AssistantComposer::new(client.clone()), client)
    }

    fn ready(client: MockLlmClient, message: &str) -> (AssistantComposer, Arc<MockLlmClient>) {
        let (mut composer, client) = composer(client);
        composer.open();
        composer.set_credential("pplx-key");
        composer.set_message(message).unwrap();
        (composer, client)
    }

    #[test]
    fn test_initial_state() {
        let (composer, _) = composer(MockLlmClient::new(vec![]));
        assert_eq!(composer.state(), AssistantState::Idle);
        assert!(!composer.is_visible());
        assert!(!composer.has_credential());
    }

    #[test]
    fn test_open_without_credential_awaits_it() {
        let (mut composer, _) = composer(MockLlmClient::new(vec![]));
        composer.open();
        assert_eq!(composer.state(), AssistantState::AwaitingCredential);
        assert!(composer.is_visible());

        assert!(!composer.set_credential("   "));
        assert_eq!(composer.state(), AssistantState::AwaitingCredential);

        assert!(composer.set_credential("pplx-key"));
        assert_eq!(composer.state(), AssistantState::Composing);
    }

    #[test]
    fn test_no_request_without_credential() {
        let (mut composer, client) = composer(MockLlmClient::replying("{}"));
        composer.open();
        composer.set_message("buy milk").unwrap();

        assert_eq!(composer.begin_submission().unwrap_err(), SubmitRejected::MissingCredential);
        assert_eq!(composer.state(), AssistantState::AwaitingCredential);
        assert_eq!(client.call_count(), 0);
    }

    #[test]
    fn test_blank_message_rejected() {
        let (mut composer, _) = ready(MockLlmClient::new(vec![]), "   ");
        assert_eq!(composer.begin_submission().unwrap_err(), SubmitRejected::EmptyMessage);
        assert_eq!(composer.state(), AssistantState::Composing);
    }

    #[tokio::test]
    async fn test_success_creates_task_and_keeps_credential() {
        let (mut composer, client) = ready(
            MockLlmClient::replying(r#"Sure: {"title": "Buy milk", "priority": "low"}"#),
            "  I need to get milk sometime  ",
        );
        let mut store = TaskStore::new();
        let mut sink: Vec<Notification> = Vec::new();

        let outcome = composer.submit(&mut store, &mut sink).await.unwrap();
        let task = outcome.task().unwrap();
        assert_eq!(task.title(), "Buy milk");
        assert_eq!(task.priority(), Priority::Low);

        assert_eq!(store.len(), 1);
        assert_eq!(composer.state(), AssistantState::Succeeded);
        assert!(!composer.is_failed());
        assert_eq!(composer.message(), "");
        assert!(composer.has_credential());

        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0], Notification::task_added());
        assert_eq!(sink[1].kind, NotificationKind::Success);
        assert_eq!(sink[1].title, "Task created");
        assert_eq!(sink[1].description, "Added \"Buy milk\" with low priority");

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system_prompt, SYSTEM_INSTRUCTION);
        assert_eq!(requests[0].user_message, "I need to get milk sometime");
    }

    #[tokio::test]
    async fn test_invalid_priority_fails_without_task() {
        let (mut composer, _) = ready(
            MockLlmClient::replying(r#"{"title": "Buy milk", "priority": "urgent"}"#),
            "milk!!!",
        );
        let mut store = TaskStore::new();
        let mut sink: Vec<Notification> = Vec::new();

        let outcome = composer.submit(&mut store, &mut sink).await.unwrap();
        assert!(matches!(
            outcome,
            AssistantOutcome::Failed(AssistantError::InvalidResponse(PayloadError::InvalidPriority(_)))
        ));
        assert!(store.is_empty());
        assert_eq!(composer.message(), "milk!!!");
        assert_eq!(composer.state(), AssistantState::Failed);
        assert!(composer.is_failed());
        assert_eq!(sink, vec![Notification::error("Error", FAILURE_DESCRIPTION)]);
    }

    #[tokio::test]
    async fn test_failed_composer_can_retry() {
        let (mut composer, client) = ready(
            MockLlmClient::new(vec![
                MockReply::Timeout,
                MockReply::Text(r#"{"title": "Call mom", "priority": "medium"}"#.to_string()),
            ]),
            "call mom",
        );
        let mut store = TaskStore::new();
        let mut sink: Vec<Notification> = Vec::new();

        composer.submit(&mut store, &mut sink).await.unwrap();
        assert!(composer.is_failed());

        composer.set_message("call mom tonight").unwrap();
        assert_eq!(composer.state(), AssistantState::Composing);
        assert!(!composer.is_failed());

        let outcome = composer.submit(&mut store, &mut sink).await.unwrap();
        assert_eq!(outcome.task().unwrap().title(), "Call mom");
        assert_eq!(composer.state(), AssistantState::Succeeded);
        assert_eq!(client.call_count(), 2);
    }

    #[test]
    fn test_result_without_pending_submission_is_dropped() {
        let (mut composer, _) = composer(MockLlmClient::new(vec![]));
        composer.open();
        composer.set_credential("k");
        let mut store = TaskStore::new();
        let mut sink: Vec<Notification> = Vec::new();

        let result = composer.finish_submission(
            Ok(r#"{"title": "Ghost", "priority": "high"}"#.to_string()),
            &mut store,
            &mut sink,
        );

        assert_eq!(result.unwrap_err(), SubmitRejected::NotPending);
        assert!(store.is_empty());
        assert!(sink.is_empty());
        assert!(composer.last_outcome().is_none());
        assert_eq!(composer.state(), AssistantState::Composing);
    }

    #[tokio::test]
    async fn test_duplicate_result_does_not_add_twice() {
        let reply = r#"{"title": "Buy milk", "priority": "low"}"#;
        let (mut composer, _) = ready(MockLlmClient::replying(reply), "milk");
        let mut store = TaskStore::new();
        let mut sink: Vec<Notification> = Vec::new();

        let pending = composer.begin_submission().unwrap();
        let result = pending.send().await;
        assert!(composer.finish_submission(result, &mut store, &mut sink).is_ok());
        assert_eq!(store.len(), 1);
        let notified = sink.len();

        let again = composer.finish_submission(Ok(reply.to_string()), &mut store, &mut sink);
        assert_eq!(again.unwrap_err(), SubmitRejected::NotPending);
        assert_eq!(store.len(), 1);
        assert_eq!(sink.len(), notified);
        assert_eq!(composer.state(), AssistantState::Succeeded);
    }

    #[tokio::test]
    async fn test_unparsable_reply_fails_without_task() {
        let (mut composer, _) = ready(MockLlmClient::replying("I'm not sure what you mean."), "hmm");
        let mut store = TaskStore::new();
        let mut sink: Vec<Notification> = Vec::new();

        let outcome = composer.submit(&mut store, &mut sink).await.unwrap();
        assert!(matches!(
            outcome,
            AssistantOutcome::Failed(AssistantError::InvalidResponse(PayloadError::NotFound))
        ));
        assert!(store.is_empty());
        assert!(composer.last_outcome().unwrap().is_failed());
    }

    #[tokio::test]
    async fn test_llm_errors_map_to_the_same_failure() {
        for reply in [MockReply::Auth, MockReply::Timeout, MockReply::Api(500)] {
            let (mut composer, _) = ready(MockLlmClient::new(vec![reply]), "call mom");
            let mut store = TaskStore::new();
            let mut sink: Vec<Notification> = Vec::new();

            let outcome = composer.submit(&mut store, &mut sink).await.unwrap();
            assert!(matches!(outcome, AssistantOutcome::Failed(AssistantError::Completion(_))));
            assert!(store.is_empty());
            assert_eq!(composer.message(), "call mom");
            assert!(composer.has_credential());
            assert_eq!(sink, vec![Notification::error("Error", FAILURE_DESCRIPTION)]);
        }
    }

    #[tokio::test]
    async fn test_second_submission_while_in_flight_is_rejected() {
        let (mut composer, client) = ready(
            MockLlmClient::new(vec![
                MockReply::Text(r#"{"title": "First", "priority": "high"}"#.to_string()),
                MockReply::Text(r#"{"title": "Second", "priority": "low"}"#.to_string()),
            ]),
            "first thing",
        );
        let mut store = TaskStore::new();
        let mut sink: Vec<Notification> = Vec::new();

        let pending = composer.begin_submission().unwrap();
        assert_eq!(composer.state(), AssistantState::Submitting);

        assert_eq!(composer.set_message("second thing"), Err(SubmitRejected::Busy));
        assert_eq!(composer.begin_submission().unwrap_err(), SubmitRejected::Busy);
        assert!(composer.submit(&mut store, &mut sink).await.is_none());

        let result = pending.send().await;
        composer.finish_submission(result, &mut store, &mut sink).unwrap();

        assert_eq!(client.call_count(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].title(), "First");
    }

    #[tokio::test]
    async fn test_close_does_not_cancel() {
        let (mut composer, _) = ready(
            MockLlmClient::replying(r#"{"title": "Pay rent", "priority": "high"}"#),
            "rent due tomorrow",
        );
        let mut store = TaskStore::new();
        let mut sink: Vec<Notification> = Vec::new();

        let pending = composer.begin_submission().unwrap();
        composer.close();
        let result = pending.send().await;
        composer.finish_submission(result, &mut store, &mut sink).unwrap();

        assert!(!composer.is_visible());
        assert_eq!(store.len(), 1);
        assert_eq!(sink.len(), 2);

        composer.open();
        assert_eq!(composer.state(), AssistantState::Succeeded);
    }

    #[test]
    fn test_pending_debug_redacts_credential() {
        let (mut composer, _) = ready(MockLlmClient::new(vec![]), "buy milk");
        let pending = composer.begin_submission().unwrap();
        let debug = format!("{:?}", pending);
        assert!(!debug.contains("pplx-key"));
        assert_eq!(pending.message(), "buy milk");
    }
}
