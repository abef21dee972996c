//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, Credential, LlmError};

/// Stateless LLM client - each call is a single round trip
///
/// This is the seam between the assistant and whichever vendor is
/// configured. The credential travels with the call rather than living in
/// the client, since the user supplies it at runtime.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request and wait for the full reply
    async fn complete(&self, request: CompletionRequest, credential: &Credential)
    -> Result<CompletionResponse, LlmError>;
}
