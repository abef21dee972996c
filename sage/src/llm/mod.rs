//! LLM Client module for Task Sage
//!
//! Provides the completion client abstraction and the vendor implementations
//! behind it.

use std::sync::Arc;

use tracing::debug;

mod anthropic;
pub mod client;
mod credential;
mod error;
mod openai;
mod types;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use credential::Credential;
pub use error::LlmError;
pub use openai::OpenAIClient;
pub use types::{CompletionRequest, CompletionResponse, TokenUsage};

use crate::config::{LlmConfig, Provider, ResolvedLlmConfig};

/// Create an LLM client based on the provider specified in config
pub fn create_client(config: &LlmConfig) -> eyre::Result<Arc<dyn LlmClient>> {
    let resolved = config.resolve()?;
    Ok(create_client_from_resolved(&resolved)?)
}

/// Create an LLM client from a resolved configuration
pub fn create_client_from_resolved(config: &ResolvedLlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client_from_resolved: called");
    match config.provider {
        Provider::OpenAI | Provider::Perplexity => {
            debug!("create_client_from_resolved: creating OpenAI-compatible client");
            Ok(Arc::new(OpenAIClient::from_config(config)?))
        }
        Provider::Anthropic => {
            debug!("create_client_from_resolved: creating Anthropic client");
            Ok(Arc::new(AnthropicClient::from_config(config)?))
        }
    }
}
