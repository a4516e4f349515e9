//! Provider specific [`ClientWrapper`](crate::client_wrapper::ClientWrapper) implementations.
//!
//! OpenRouter, OpenAI and self-hosted gateways all speak the same chat-completions dialect,
//! so a single OpenAI-compatible client covers them; `common` holds the wire format.

pub mod common;

pub mod openai_compatible;
