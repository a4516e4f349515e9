use async_trait::async_trait;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// A ClientWrapper is a wrapper around a remote chat-completion service.
/// It provides a common interface to send an assembled prompt and read back the first choice.
/// It does not keep track of the conversation, for that the run loop keeps a
/// [`ConversationHistory`](crate::history::ConversationHistory) and uses a
/// [`CompletionClient`](crate::completion::CompletionClient) to turn every outcome into a reply.
// src/roundtable/client_wrapper.rs

/// Represents the possible roles for a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    // persona framing and the one-time admin instruction
    System,
    // the input an agent is answering (seed prompt or the previous agent's reply)
    User,
    // an agent's reply
    Assistant,
}

impl Role {
    /// Wire name used by OpenAI-compatible chat APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Represents a generic message to be sent to an LLM.
///
/// Content is reference counted so the history window can be cloned into every prompt
/// without copying the text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// The role associated with the message.
    pub role: Role,
    /// The actual content of the message.
    pub content: Arc<str>,
}

impl Message {
    pub fn new(role: Role, content: impl AsRef<str>) -> Self {
        Message {
            role,
            content: Arc::from(content.as_ref()),
        }
    }

    pub fn system(content: impl AsRef<str>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl AsRef<str>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl AsRef<str>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Sampling parameters forwarded with every request, taken from the speaking agent.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Failures a [`ClientWrapper`] can report.
///
/// The run loop never sees these: [`CompletionClient`](crate::completion::CompletionClient)
/// logs them and substitutes a fallback reply.
#[derive(Debug, Clone)]
pub enum ClientError {
    /// The request never produced an HTTP response (DNS, connect, TLS, timeout...).
    Transport(String),
    /// The service answered with a non-success status code.
    HttpStatus { status: u16, body: String },
    /// A success status whose body could not be decoded.
    MalformedResponse(String),
    /// The client itself could not be built.
    Configuration(String),
}

impl ClientError {
    /// Stable classification used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Transport(_) => "TransportError",
            ClientError::HttpStatus { .. } => "HttpStatusError",
            ClientError::MalformedResponse(_) => "MalformedResponse",
            ClientError::Configuration(_) => "ConfigurationError",
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "transport failure: {}", msg),
            ClientError::HttpStatus { status, body } => {
                write!(f, "service returned HTTP {}: {}", status, body)
            }
            ClientError::MalformedResponse(msg) => write!(f, "malformed response: {}", msg),
            ClientError::Configuration(msg) => write!(f, "client configuration: {}", msg),
        }
    }
}

impl Error for ClientError {}

/// Trait defining the interface to a chat-completion service.
#[async_trait]
pub trait ClientWrapper: Send + Sync {
    /// Send the assembled prompt and return the raw content of the first choice.
    ///
    /// `Ok(None)` means the service answered successfully but produced no choices.
    async fn send_message(
        &self,
        messages: &[Message],
        params: &GenerationParams,
    ) -> Result<Option<String>, ClientError>;

    /// Short provider label used in log lines.
    fn provider_name(&self) -> &str {
        "custom"
    }
}
