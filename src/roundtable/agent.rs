//! Agents and the fixed roster they are drawn from.
//!
//! An [`Agent`] is pure data: a persona prompt, the model that voices it, its sampling
//! parameters and a display tag for whatever renders the conversation. Agents never hold a
//! client or a session; the [`Orchestration`](crate::orchestration::Orchestration) pairs them
//! with the shared [`CompletionClient`](crate::completion::CompletionClient) turn by turn.
//!
//! The [`AgentRegistry`] fixes the speaking order for the lifetime of the process: the agent
//! at turn `t` is always `agents()[t % len()]`.
//!
//! ```rust
//! use roundtable::agent::{Agent, AgentRegistry};
//!
//! let registry = AgentRegistry::new(vec![
//!     Agent::new("Dr. Marcus", "Mathematical explorer.", "openai/gpt-4.1").with_temperature(1.2),
//!     Agent::new("Prof. Elena", "Logical detective.", "openai/gpt-4.1"),
//! ])
//! .unwrap();
//!
//! assert_eq!(registry.agent_for_turn(3).name, "Prof. Elena");
//! ```

use serde::{Deserialize, Serialize};

use crate::client_wrapper::GenerationParams;
use crate::orchestration::OrchestrationError;

fn default_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    50
}

fn default_display_tag() -> String {
    "none".to_string()
}

/// One simulated persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Name shown next to every reply (e.g. `"Agent 1"`).
    pub name: String,
    /// System prompt that gives the agent its identity and private clues.
    pub persona_prompt: String,
    /// Upstream model identifier, e.g. `"openai/gpt-4.1"`.
    pub model_id: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Opaque hint for the display collaborator; the console maps color names to ANSI codes.
    #[serde(default = "default_display_tag")]
    pub display_tag: String,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        persona_prompt: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            persona_prompt: persona_prompt.into(),
            model_id: model_id.into(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            display_tag: default_display_tag(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_display_tag(mut self, display_tag: impl Into<String>) -> Self {
        self.display_tag = display_tag.into();
        self
    }

    /// Model and sampling parameters sent with each of this agent's requests.
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            model: self.model_id.clone(),
            temperature: self.temperature,
            max_tokens: self.max_output_tokens,
        }
    }
}

/// The ordered, immutable roster of a session.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
}

impl AgentRegistry {
    /// Minimum roster size: a dialogue needs somebody to answer.
    pub const MIN_AGENTS: usize = 2;

    pub fn new(agents: Vec<Agent>) -> Result<Self, OrchestrationError> {
        if agents.len() < Self::MIN_AGENTS {
            return Err(OrchestrationError::TooFewAgents(agents.len()));
        }
        Ok(Self { agents })
    }

    /// The agents in rotation order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Always `false`; a registry holds at least [`Self::MIN_AGENTS`] agents.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Agent> {
        self.agents.get(index)
    }

    /// Speaker of the zero-based `turn` under round-robin rotation.
    pub fn agent_for_turn(&self, turn: usize) -> &Agent {
        &self.agents[turn % self.agents.len()]
    }

    pub fn names(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.name.clone()).collect()
    }
}
