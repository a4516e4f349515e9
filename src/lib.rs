//! # Roundtable
//!
//! Roundtable runs an unattended, turn-taking conversation among a fixed roster of personas,
//! each voiced by a remote chat-completion model. Agents speak in strict rotation, every one
//! answering the previous agent's reply, until a turn budget runs out or the operator
//! cancels.
//!
//! The crate is layered leaves-first:
//!
//! * **Agents**: [`Agent`] records and the ordered [`AgentRegistry`] that fixes the rotation
//! * **History**: [`history::ConversationHistory`], an append-only shared log with a bounded
//!   recent-window view
//! * **Prompt assembly**: [`prompt::PromptAssembler`] builds persona + one-time admin context
//!   + recent window + input for each turn
//! * **Completion**: the [`ClientWrapper`] transport trait, an OpenAI-compatible
//!   implementation in [`clients`], and [`completion::CompletionClient`] which turns every
//!   failure into a fallback reply so a session never stalls on one bad call
//! * **Scheduling**: [`Orchestration`], the run loop that owns the session and observes a
//!   [`CancellationToken`](tokio_util::sync::CancellationToken) at every suspension point
//! * **Events**: [`event::EventHandler`] receives everything worth displaying;
//!   [`console::ConsoleEventHandler`] renders it to a terminal
//!
//! ## Getting Started
//!
//! ```rust,no_run
//! use roundtable::clients::openai_compatible::OpenAICompatibleClient;
//! use roundtable::config::api_key_from_env;
//! use roundtable::console::ConsoleEventHandler;
//! use roundtable::{Orchestration, RoundtableConfig};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     roundtable::init_logger();
//!
//!     let config = RoundtableConfig::default();
//!     let client = OpenAICompatibleClient::new_with_base_url(
//!         &api_key_from_env()?,
//!         &config.api_base_url,
//!         config.request_timeout(),
//!     )?;
//!
//!     let mut orchestration = Orchestration::new(config.registry()?, Arc::new(client))
//!         .with_settings(config.session_settings())
//!         .with_event_handler(Arc::new(ConsoleEventHandler::new()));
//!
//!     let outcome = orchestration.run(CancellationToken::new()).await?;
//!     println!("{:?} after {} turns", outcome.state, outcome.turns_completed);
//!     Ok(())
//! }
//! ```

use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Initialise the global [`env_logger`] subscriber exactly once.
///
/// `RUST_LOG` controls verbosity; with nothing set only warnings and errors are shown, which
/// keeps the conversation stream readable.
///
/// ```rust
/// roundtable::init_logger();
/// log::info!("Logger is ready");
/// ```
pub fn init_logger() {
    INIT_LOGGER.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .init();
    });
}

// Import the top-level `roundtable` module.
pub mod roundtable;

// Re-exporting key items for easier external access.
pub use roundtable::agent;
pub use roundtable::agent::{Agent, AgentRegistry};
pub use roundtable::client_wrapper;
pub use roundtable::client_wrapper::{ClientError, ClientWrapper, GenerationParams, Message, Role};
pub use roundtable::clients;
pub use roundtable::completion;
pub use roundtable::config;
pub use roundtable::config::RoundtableConfig;
pub use roundtable::console;
pub use roundtable::event;
pub use roundtable::event::{EventHandler, SessionEvent};
pub use roundtable::history;
pub use roundtable::http_client_pool;
pub use roundtable::orchestration;
pub use roundtable::orchestration::{
    Orchestration, OrchestrationError, SessionOutcome, SessionSettings, SessionState,
};
pub use roundtable::prompt;
