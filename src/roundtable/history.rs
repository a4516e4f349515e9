//! The shared conversation log.
//!
//! Every completed turn appends exactly two messages: the input the agent answered
//! (`User`) and its reply (`Assistant`). Nothing is ever removed during a session;
//! bounding prompt size is done by [`ConversationHistory::recent_window`], which is a view.

use crate::client_wrapper::Message;

/// Default number of messages shown to an agent from the shared log.
pub const DEFAULT_HISTORY_WINDOW: usize = 40;

#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one turn: `input` then `output`.
    pub fn append(&mut self, input: Message, output: Message) {
        self.messages.reserve(2);
        self.messages.push(input);
        self.messages.push(output);
    }

    /// The last `limit` messages in original order, or all of them if there are fewer.
    pub fn recent_window(&self, limit: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}
