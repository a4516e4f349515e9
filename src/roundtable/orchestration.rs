//! The turn scheduler.
//!
//! An [`Orchestration`] owns everything a session touches: the [`AgentRegistry`], the shared
//! [`ConversationHistory`], the [`CompletionClient`] and the per-run [`Session`] value. Agents
//! speak strictly in registry order, one request at a time, each answering the previous
//! agent's reply.
//!
//! # Lifecycle
//!
//! ```text
//! Init ──► Running ──► Completed   (turn budget exhausted)
//!              │
//!              ├─────► Cancelled   (cancellation observed while waiting)
//!              └─────► Failed      (bookkeeping error, returned as Err)
//! ```
//!
//! Cancellation is observed at the two suspension points of a turn: the remote call and the
//! pacing delay. A turn interrupted during the remote call is dropped entirely, so the
//! history only ever holds complete `(user, assistant)` pairs.
//!
//! # Example
//!
//! ```rust,no_run
//! use roundtable::agent::{Agent, AgentRegistry};
//! use roundtable::clients::openai_compatible::OpenAICompatibleClient;
//! use roundtable::orchestration::{Orchestration, SessionSettings};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # async {
//! let client = Arc::new(OpenAICompatibleClient::openrouter("key").unwrap());
//! let registry = AgentRegistry::new(vec![
//!     Agent::new("Alice", "You propose hypotheses.", "openai/gpt-4.1"),
//!     Agent::new("Bob", "You refute hypotheses.", "openai/gpt-4.1"),
//! ])
//! .unwrap();
//!
//! let mut orchestration = Orchestration::new(registry, client).with_settings(SessionSettings {
//!     max_turns: 10,
//!     ..SessionSettings::default()
//! });
//!
//! let outcome = orchestration.run(CancellationToken::new()).await.unwrap();
//! println!("{} turns, last word: {}", outcome.turns_completed, outcome.final_message);
//! # };
//! ```

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::agent::AgentRegistry;
use crate::client_wrapper::{ClientWrapper, Message};
use crate::completion::CompletionClient;
use crate::event::{EventHandler, SessionEvent};
use crate::history::{ConversationHistory, DEFAULT_HISTORY_WINDOW};
use crate::prompt::PromptAssembler;

pub const DEFAULT_MAX_TURNS: usize = 100;

pub const DEFAULT_INTER_TURN_DELAY: Duration = Duration::from_millis(500);

/// First message of every session, answered by the first agent.
pub const DEFAULT_SEED_PROMPT: &str = "EXPLORATION: Share known facts, propose hypotheses H→ about unknowns. What can we discover together?";

/// Prefix applied to the admin instruction when it is injected into the first prompt.
pub const ADMIN_CONTEXT_PREFIX: &str = "[Admin Instruction]: ";

/// Constants for one session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub max_turns: usize,
    pub history_window_size: usize,
    /// Pause between turns. Throttles the request rate and keeps the stream readable.
    pub inter_turn_delay: Duration,
    pub seed_prompt: String,
    /// Shown to the observer once and injected into the first agent's prompt.
    pub admin_instruction: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            history_window_size: DEFAULT_HISTORY_WINDOW,
            inter_turn_delay: DEFAULT_INTER_TURN_DELAY,
            seed_prompt: DEFAULT_SEED_PROMPT.to_string(),
            admin_instruction: String::new(),
        }
    }
}

impl SessionSettings {
    /// Reject settings a session cannot keep its books with.
    pub fn validate(&self) -> Result<(), OrchestrationError> {
        if self.history_window_size == 0 {
            return Err(OrchestrationError::ExecutionFailed(
                "history_window_size must be at least 1".to_string(),
            ));
        }
        if self.seed_prompt.trim().is_empty() {
            return Err(OrchestrationError::ExecutionFailed(
                "seed_prompt is empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// Transient per-run state. Lives only inside [`Orchestration::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub turn_index: usize,
    pub current_agent_index: usize,
    pub current_message: String,
}

impl Session {
    pub fn new(seed_prompt: impl Into<String>) -> Self {
        Self {
            turn_index: 0,
            current_agent_index: 0,
            current_message: seed_prompt.into(),
        }
    }

    /// Hand the floor to the next agent: the reply becomes the next input.
    pub fn advance(&mut self, reply: String, agent_count: usize) {
        self.current_message = reply;
        self.current_agent_index = (self.current_agent_index + 1) % agent_count;
        self.turn_index += 1;
    }
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub session_id: String,
    /// [`SessionState::Completed`] or [`SessionState::Cancelled`].
    pub state: SessionState,
    pub turns_completed: usize,
    /// The last recorded reply, or the seed prompt if no turn completed.
    pub final_message: String,
}

/// Errors that can occur during orchestration configuration or execution.
#[derive(Debug, Clone)]
pub enum OrchestrationError {
    /// The roster has fewer than two agents.
    TooFewAgents(usize),
    /// The rotation pointed at an index the registry does not hold.
    AgentNotFound(usize),
    /// Any other failure while keeping the loop's books.
    ExecutionFailed(String),
}

impl OrchestrationError {
    pub fn kind(&self) -> &'static str {
        match self {
            OrchestrationError::TooFewAgents(_) => "TooFewAgents",
            OrchestrationError::AgentNotFound(_) => "AgentNotFound",
            OrchestrationError::ExecutionFailed(_) => "ExecutionFailed",
        }
    }
}

impl fmt::Display for OrchestrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrchestrationError::TooFewAgents(n) => {
                write!(f, "At least 2 agents are required, got {}", n)
            }
            OrchestrationError::AgentNotFound(index) => {
                write!(f, "No agent at rotation index {}", index)
            }
            OrchestrationError::ExecutionFailed(msg) => write!(f, "Execution failed: {}", msg),
        }
    }
}

impl Error for OrchestrationError {}

enum LoopExit {
    BudgetExhausted,
    Cancelled,
}

pub struct Orchestration {
    registry: AgentRegistry,
    client: CompletionClient,
    assembler: PromptAssembler,
    settings: SessionSettings,
    history: ConversationHistory,
    state: SessionState,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl Orchestration {
    /// Create an orchestration over `registry` with default [`SessionSettings`].
    pub fn new(registry: AgentRegistry, client: Arc<dyn ClientWrapper>) -> Self {
        let settings = SessionSettings::default();
        Self {
            registry,
            client: CompletionClient::new(client),
            assembler: PromptAssembler::new(settings.history_window_size),
            settings,
            history: ConversationHistory::new(),
            state: SessionState::Init,
            event_handler: None,
        }
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.assembler = PromptAssembler::new(settings.history_window_size);
        self.settings = settings;
        self
    }

    pub fn with_event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// History of the current (or most recent) session.
    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    async fn emit(&self, event: SessionEvent) {
        if let Some(handler) = &self.event_handler {
            handler.on_session_event(&event).await;
        }
    }

    /// Run one session to completion or cancellation.
    ///
    /// Every call starts from an empty history, so a failed or cancelled session can be
    /// followed by a fresh one on the same orchestration.
    pub async fn run(
        &mut self,
        cancel: CancellationToken,
    ) -> Result<SessionOutcome, OrchestrationError> {
        let session_id = Uuid::new_v4().to_string();

        self.state = SessionState::Init;
        self.history.clear();
        let mut session = Session::new(self.settings.seed_prompt.clone());

        log::info!(
            "Session {} starting: {} agents, {} turns max, window {}",
            session_id,
            self.registry.len(),
            self.settings.max_turns,
            self.settings.history_window_size
        );

        self.emit(SessionEvent::SessionStarted {
            session_id: session_id.clone(),
            agent_names: self.registry.names(),
            max_turns: self.settings.max_turns,
        })
        .await;

        let result = match self.settings.validate() {
            Ok(()) => {
                let admin_context = if self.settings.admin_instruction.is_empty() {
                    None
                } else {
                    self.emit(SessionEvent::AdminInstruction {
                        session_id: session_id.clone(),
                        text: self.settings.admin_instruction.clone(),
                        timestamp: Local::now(),
                    })
                    .await;
                    Some(format!(
                        "{}{}",
                        ADMIN_CONTEXT_PREFIX, self.settings.admin_instruction
                    ))
                };

                self.state = SessionState::Running;
                self.run_turns(&session_id, &mut session, admin_context.as_deref(), &cancel)
                    .await
            }
            Err(err) => Err(err),
        };
        let turns_completed = session.turn_index;

        match result {
            Ok(LoopExit::BudgetExhausted) => {
                self.state = SessionState::Completed;
                log::info!(
                    "Session {} completed after {} turns",
                    session_id,
                    turns_completed
                );
                self.emit(SessionEvent::SessionCompleted {
                    session_id: session_id.clone(),
                    turns_completed,
                })
                .await;
            }
            Ok(LoopExit::Cancelled) => {
                self.state = SessionState::Cancelled;
                log::info!(
                    "Session {} cancelled after {} turns",
                    session_id,
                    turns_completed
                );
                self.emit(SessionEvent::SessionCancelled {
                    session_id: session_id.clone(),
                    turns_completed,
                })
                .await;
            }
            Err(err) => {
                self.state = SessionState::Failed;
                log::error!(
                    "Session {} failed after {} turns: {}: {}",
                    session_id,
                    turns_completed,
                    err.kind(),
                    err
                );
                self.emit(SessionEvent::SessionFailed {
                    session_id,
                    turns_completed,
                    error_kind: err.kind().to_string(),
                    error: err.to_string(),
                })
                .await;
                return Err(err);
            }
        }

        Ok(SessionOutcome {
            session_id,
            state: self.state,
            turns_completed,
            final_message: session.current_message,
        })
    }

    async fn run_turns(
        &mut self,
        session_id: &str,
        session: &mut Session,
        admin_context: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<LoopExit, OrchestrationError> {
        let agent_count = self.registry.len();

        while session.turn_index < self.settings.max_turns {
            if cancel.is_cancelled() {
                return Ok(LoopExit::Cancelled);
            }

            let agent = self
                .registry
                .get(session.current_agent_index)
                .ok_or(OrchestrationError::AgentNotFound(
                    session.current_agent_index,
                ))?;

            log::debug!(
                "Turn {}: {} answering {} chars",
                session.turn_index,
                agent.name,
                session.current_message.len()
            );

            if let Some(handler) = &self.event_handler {
                handler
                    .on_session_event(&SessionEvent::AgentThinking {
                        session_id: session_id.to_string(),
                        turn: session.turn_index,
                        agent_name: agent.name.clone(),
                        display_tag: agent.display_tag.clone(),
                    })
                    .await;
            }

            let prompt = self.assembler.assemble(
                agent,
                &self.history,
                &session.current_message,
                admin_context,
                session.turn_index == 0,
            );

            let reply = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(LoopExit::Cancelled),
                reply = self.client.generate(agent, &prompt) => reply,
            };

            if let Some(handler) = &self.event_handler {
                handler
                    .on_session_event(&SessionEvent::TurnCompleted {
                        session_id: session_id.to_string(),
                        turn: session.turn_index,
                        agent_name: agent.name.clone(),
                        message: reply.clone(),
                        display_tag: agent.display_tag.clone(),
                        timestamp: Local::now(),
                    })
                    .await;
            }

            self.history.append(
                Message::user(&session.current_message),
                Message::assistant(&reply),
            );
            session.advance(reply, agent_count);

            if session.turn_index < self.settings.max_turns
                && !self.settings.inter_turn_delay.is_zero()
            {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Ok(LoopExit::Cancelled),
                    _ = tokio::time::sleep(self.settings.inter_turn_delay) => {}
                }
            }
        }

        Ok(LoopExit::BudgetExhausted)
    }
}
