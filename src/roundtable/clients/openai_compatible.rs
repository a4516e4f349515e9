//! The `OpenAICompatibleClient` struct implements `ClientWrapper` for any endpoint speaking
//! the OpenAI Chat Completions dialect. OpenRouter is the default target, which lets every
//! agent in a session name a different upstream model (`openai/gpt-4.1`,
//! `anthropic/claude-sonnet-4`, ...) through the same key.
//!
//! # Example
//!
//! ```rust,no_run
//! use roundtable::clients::openai_compatible::OpenAICompatibleClient;
//! use roundtable::client_wrapper::{ClientWrapper, GenerationParams, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let secret_key = std::env::var("OPENROUTER_API_KEY")?;
//!     let client = OpenAICompatibleClient::openrouter(&secret_key)?;
//!
//!     let params = GenerationParams {
//!         model: "openai/gpt-4.1".into(),
//!         temperature: 0.7,
//!         max_tokens: 50,
//!     };
//!     let reply = client
//!         .send_message(&[Message::system("You are terse."), Message::user("Hello!")], &params)
//!         .await?;
//!     println!("Assistant: {:?}", reply);
//!     Ok(())
//! }
//! ```
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;

use crate::client_wrapper::{ClientError, ClientWrapper, GenerationParams, Message};
use crate::clients::common::{first_choice_content, ChatRequest};
use crate::http_client_pool::get_or_create_client;

/// Base URL of the OpenRouter API.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Client wrapper for OpenAI-compatible chat-completion endpoints.
///
/// The model is not fixed at construction time: every request carries the speaking agent's
/// [`GenerationParams`], so one client serves the whole roster.
pub struct OpenAICompatibleClient {
    /// Pooled HTTP client shared with other wrappers targeting the same base URL.
    http: reqwest::Client,
    /// Full URL of the completions endpoint.
    endpoint: String,
    /// Bearer token. Never logged, never shown by `Debug`.
    secret_key: String,
}

impl OpenAICompatibleClient {
    /// Construct a client targeting OpenRouter.
    pub fn openrouter(secret_key: &str) -> Result<Self, ClientError> {
        Self::new_with_base_url(secret_key, OPENROUTER_BASE_URL, None)
    }

    /// Construct a client targeting a custom OpenAI compatible base URL.
    ///
    /// `base_url` is the API root (e.g. `https://openrouter.ai/api/v1`); the client appends
    /// `/chat/completions`. `timeout` optionally bounds every request.
    pub fn new_with_base_url(
        secret_key: &str,
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.trim_end_matches('/');
        Ok(OpenAICompatibleClient {
            http: get_or_create_client(base_url, timeout)?,
            endpoint: format!("{}/chat/completions", base_url),
            secret_key: secret_key.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for OpenAICompatibleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAICompatibleClient")
            .field("endpoint", &self.endpoint)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl ClientWrapper for OpenAICompatibleClient {
    async fn send_message(
        &self,
        messages: &[Message],
        params: &GenerationParams,
    ) -> Result<Option<String>, ClientError> {
        let request = ChatRequest::new(messages, params);

        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        if !status.is_success() {
            if log::log_enabled!(log::Level::Debug) {
                log::debug!(
                    "OpenAICompatibleClient::send_message(...): {} returned {}",
                    self.endpoint,
                    status
                );
            }
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        first_choice_content(&body)
    }

    fn provider_name(&self) -> &str {
        "openai-compatible"
    }
}
