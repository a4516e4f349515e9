//! Builds the message sequence sent for one turn.
//!
//! The order is fixed:
//!
//! ```text
//! system    persona_prompt of the speaking agent
//! system    admin context            (first turn of the session only)
//! ...       recent window of the shared history
//! user      the message being answered
//! ```
//!
//! History is global, so every agent sees what every other agent said within the window.

use crate::agent::Agent;
use crate::client_wrapper::Message;
use crate::history::{ConversationHistory, DEFAULT_HISTORY_WINDOW};

#[derive(Debug, Clone, Copy)]
pub struct PromptAssembler {
    history_window_size: usize,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_WINDOW)
    }
}

impl PromptAssembler {
    pub fn new(history_window_size: usize) -> Self {
        Self {
            history_window_size,
        }
    }

    pub fn history_window_size(&self) -> usize {
        self.history_window_size
    }

    pub fn assemble(
        &self,
        agent: &Agent,
        history: &ConversationHistory,
        input_message: &str,
        admin_context: Option<&str>,
        is_first_turn: bool,
    ) -> Vec<Message> {
        let window = history.recent_window(self.history_window_size);
        let mut messages = Vec::with_capacity(window.len() + 3);

        messages.push(Message::system(&agent.persona_prompt));

        if is_first_turn {
            if let Some(context) = admin_context {
                messages.push(Message::system(context));
            }
        }

        messages.extend_from_slice(window);
        messages.push(Message::user(input_message));
        messages
    }
}
