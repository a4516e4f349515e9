//! Session event system.
//!
//! The run loop never prints. Everything an observer might want to show (the admin
//! announcement, a typing indicator, each reply, the end-of-session summary) is delivered as a
//! [`SessionEvent`] to an [`EventHandler`]. The terminal renderer in
//! [`console`](crate::console) is one such handler; tests use handlers that record events or
//! trigger cancellation.
//!
//! # Event Flow
//!
//! ```text
//! SessionStarted
//! AdminInstruction
//!   └─ per turn:
//!       ├─ AgentThinking
//!       └─ TurnCompleted
//! SessionCompleted | SessionCancelled | SessionFailed
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use roundtable::event::{EventHandler, SessionEvent};
//! use async_trait::async_trait;
//!
//! struct Logger;
//!
//! #[async_trait]
//! impl EventHandler for Logger {
//!     async fn on_session_event(&self, event: &SessionEvent) {
//!         if let SessionEvent::TurnCompleted { agent_name, message, .. } = event {
//!             println!("{}: {}", agent_name, message);
//!         }
//!     }
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Local};

#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// History was cleared and the first turn is about to start.
    SessionStarted {
        session_id: String,
        /// Agent names in speaking order.
        agent_names: Vec<String>,
        max_turns: usize,
    },

    /// The one-time admin instruction framing the task. Emitted once per session, and only
    /// when an instruction is configured.
    AdminInstruction {
        session_id: String,
        text: String,
        timestamp: DateTime<Local>,
    },

    /// A request for `agent_name` is about to be sent.
    AgentThinking {
        session_id: String,
        /// Zero-based turn index.
        turn: usize,
        agent_name: String,
        display_tag: String,
    },

    /// An agent's reply is final (possibly a fallback reply).
    TurnCompleted {
        session_id: String,
        /// Zero-based turn index.
        turn: usize,
        agent_name: String,
        message: String,
        display_tag: String,
        timestamp: DateTime<Local>,
    },

    /// The turn budget was exhausted.
    SessionCompleted {
        session_id: String,
        turns_completed: usize,
    },

    /// The operator cancelled the session.
    SessionCancelled {
        session_id: String,
        turns_completed: usize,
    },

    /// The loop hit an unrecoverable bookkeeping error.
    SessionFailed {
        session_id: String,
        turns_completed: usize,
        error_kind: String,
        error: String,
    },
}

/// Receiver for [`SessionEvent`]s. Pure sink: the run loop never reads anything back.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_session_event(&self, _event: &SessionEvent) {}
}
