//! The resilience layer around the remote call.
//!
//! [`CompletionClient::generate`] always yields a reply string. A session keeps going when a
//! request fails: the turn is recorded with a fixed fallback reply, exactly as if the agent had
//! said it, and the next agent answers that.

use std::sync::Arc;

use crate::agent::Agent;
use crate::client_wrapper::{ClientWrapper, Message};

/// Reply recorded when the service answered but produced no choices.
pub const NO_CONTENT_REPLY: &str = "I couldn't generate a response.";

/// Reply recorded when the request failed (transport, HTTP status or decoding).
pub const ERROR_REPLY: &str = "Sorry, I encountered an error.";

/// Collapse every run of whitespace (spaces, tabs, newlines, carriage returns) to a single
/// space and trim both ends. Idempotent.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Wraps a [`ClientWrapper`] so that failures become fallback replies.
#[derive(Clone)]
pub struct CompletionClient {
    client: Arc<dyn ClientWrapper>,
}

impl CompletionClient {
    pub fn new(client: Arc<dyn ClientWrapper>) -> Self {
        Self { client }
    }

    /// Send `messages` with `agent`'s model and sampling parameters.
    ///
    /// Never fails. A single attempt is made; on failure the agent name and error
    /// classification are logged and [`ERROR_REPLY`] is returned.
    pub async fn generate(&self, agent: &Agent, messages: &[Message]) -> String {
        let params = agent.generation_params();

        match self.client.send_message(messages, &params).await {
            Ok(Some(content)) => normalize_whitespace(&content),
            Ok(None) => {
                log::debug!(
                    "CompletionClient::generate(...): {} returned no choices for {}",
                    self.client.provider_name(),
                    agent.name
                );
                NO_CONTENT_REPLY.to_string()
            }
            Err(err) => {
                if log::log_enabled!(log::Level::Error) {
                    log::error!("[Error] {}: {}: {}", agent.name, err.kind(), err);
                }
                ERROR_REPLY.to_string()
            }
        }
    }
}
