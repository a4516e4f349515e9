use crate::client_wrapper::{ClientError, GenerationParams, Message};
use serde::{Deserialize, Deserializer, Serialize};

/// One entry of the `messages` array in a chat-completions request.
#[derive(Debug, Serialize)]
pub struct WireMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

/// Body of `POST /chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl<'a> ChatRequest<'a> {
    /// Convert the provided messages into the format expected by the REST API.
    pub fn new(messages: &'a [Message], params: &'a GenerationParams) -> Self {
        let mut formatted_messages = Vec::with_capacity(messages.len());
        for msg in messages {
            formatted_messages.push(WireMessage {
                role: msg.role.as_str(),
                content: &msg.content,
            });
        }

        ChatRequest {
            model: &params.model,
            messages: formatted_messages,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    // Some gateways omit the field, or send `null`, when nothing was generated.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub choices: Vec<ChatChoice>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<ChatChoice>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ChatChoice>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    // `null` content shows up on refusals and tool-only answers.
    #[serde(default)]
    pub content: Option<String>,
}

/// Decode a success body and return the content of the first choice.
///
/// `Ok(None)` when the body is valid but carries no choices. A first choice without text
/// content is a [`ClientError::MalformedResponse`].
pub fn first_choice_content(body: &str) -> Result<Option<String>, ClientError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

    match response.choices.into_iter().next() {
        None => Ok(None),
        Some(choice) => match choice.message.content {
            Some(content) => Ok(Some(content)),
            None => Err(ClientError::MalformedResponse(
                "first choice has no message content".to_string(),
            )),
        },
    }
}
