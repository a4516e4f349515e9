//! Configuration for a roundtable session.
//!
//! [`RoundtableConfig`] carries everything the core treats as a constant for one session: the
//! roster, the turn budget, the history window, pacing, and the seed and admin texts. The
//! default reproduces the four-detective logic puzzle; a JSON document can override any
//! subset of fields.
//!
//! The API key is deliberately *not* part of the document. It is read from the environment
//! with [`api_key_from_env`] and handed to the client directly.
//!
//! # Example
//!
//! ```rust
//! use roundtable::RoundtableConfig;
//!
//! let config: RoundtableConfig = serde_json::from_str(r#"{ "max_turns": 8 }"#).unwrap();
//! assert_eq!(config.max_turns, 8);
//! assert_eq!(config.agents.len(), 4);
//! config.validate().unwrap();
//! ```

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::agent::{Agent, AgentRegistry};
use crate::clients::openai_compatible::OPENROUTER_BASE_URL;
use crate::history::DEFAULT_HISTORY_WINDOW;
use crate::orchestration::{
    OrchestrationError, SessionSettings, DEFAULT_MAX_TURNS, DEFAULT_SEED_PROMPT,
};

/// Environment variable holding the bearer token for the completion service.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

const DEFAULT_ADMIN_INSTRUCTION: &str = "DISCOVERY MISSION: You have partial clues but the full puzzle has missing pieces. EXPLORE unknown relationships by proposing hypotheses H→. TEST theories through collaborative reasoning. ELIMINATE false ideas ✗. CONFIRM discoveries ✓. Question: What other ages, people, birds, positions exist? Develop symbols for your exploration process and findings.";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    MissingApiKey(&'static str),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "could not read configuration: {}", e),
            ConfigError::Parse(e) => write!(f, "could not parse configuration: {}", e),
            ConfigError::MissingApiKey(var) => write!(f, "{} is not set", var),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<OrchestrationError> for ConfigError {
    fn from(e: OrchestrationError) -> Self {
        ConfigError::Invalid(e.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoundtableConfig {
    /// API root of an OpenAI-compatible service.
    pub api_base_url: String,
    /// Roster in speaking order.
    pub agents: Vec<Agent>,
    pub max_turns: usize,
    pub history_window_size: usize,
    pub inter_turn_delay_ms: u64,
    pub seed_prompt: String,
    pub admin_instruction: String,
    /// Per-request timeout. `None` waits as long as the service does.
    pub request_timeout_secs: Option<u64>,
}

impl Default for RoundtableConfig {
    fn default() -> Self {
        Self {
            api_base_url: OPENROUTER_BASE_URL.to_string(),
            agents: default_agents(),
            max_turns: DEFAULT_MAX_TURNS,
            history_window_size: DEFAULT_HISTORY_WINDOW,
            inter_turn_delay_ms: 500,
            seed_prompt: DEFAULT_SEED_PROMPT.to_string(),
            admin_instruction: DEFAULT_ADMIN_INSTRUCTION.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl RoundtableConfig {
    /// Load a JSON document. Fields it omits keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: RoundtableConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agents.len() < AgentRegistry::MIN_AGENTS {
            return Err(OrchestrationError::TooFewAgents(self.agents.len()).into());
        }
        self.session_settings().validate()?;
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_base_url is empty".to_string()));
        }
        for agent in &self.agents {
            if agent.model_id.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "agent '{}' has no model_id",
                    agent.name
                )));
            }
            if !agent.temperature.is_finite() || agent.temperature < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "agent '{}' has invalid temperature {}",
                    agent.name, agent.temperature
                )));
            }
        }
        Ok(())
    }

    pub fn registry(&self) -> Result<AgentRegistry, ConfigError> {
        Ok(AgentRegistry::new(self.agents.clone())?)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            max_turns: self.max_turns,
            history_window_size: self.history_window_size,
            inter_turn_delay: Duration::from_millis(self.inter_turn_delay_ms),
            seed_prompt: self.seed_prompt.clone(),
            admin_instruction: self.admin_instruction.clone(),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Read the API key from [`API_KEY_ENV`].
pub fn api_key_from_env() -> Result<String, ConfigError> {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(ConfigError::MissingApiKey(API_KEY_ENV)),
    }
}

fn default_agents() -> Vec<Agent> {
    vec![
        Agent::new(
            "Agent 1",
            "Dr. Marcus - mathematical explorer who discovers through hypothesis testing. KNOWN FACTS: (19yr ← Oliver) ∧ (pigeon → Oliver). EXPLORE unknown relationships by proposing hypotheses H1→, H2→. Test them logically. Mark proven facts as ✓, refuted ideas as ✗. Question: What other ages exist? Who else lives where? Create discovery symbols.",
            "openai/gpt-4.1",
        )
        .with_temperature(1.2)
        .with_max_output_tokens(50)
        .with_display_tag("purple"),
        Agent::new(
            "Agent 2",
            "Prof. Elena - logical detective who eliminates false theories. FACTS: (pigeon ∈ {pos1, pos5}) ∧ (Oliver = pos3). MISSION: Challenge assumptions, test hypotheses H→ rigorously. Discover hidden constraints through proof by contradiction. EXPLORE: Are there other birds? More people? Mark wrong theories ✗. Build elimination chains.",
            "openai/gpt-4.1",
        )
        .with_temperature(0.7)
        .with_max_output_tokens(50)
        .with_display_tag("cyan"),
        Agent::new(
            "Agent 3",
            "Alex - pattern discoverer who generates creative hypotheses. DATA: (Joshua = 19yr) ∧ (37yr → wren). EXPLORE connections others miss. Propose wild theories H→ then test systematically. DISCOVER: What ages are missing? Which positions empty? Create innovative notation for findings. Mark breakthroughs ✓.",
            "openai/gpt-4.1",
        )
        .with_temperature(1.0)
        .with_max_output_tokens(50)
        .with_display_tag("yellow"),
        Agent::new(
            "Agent 4",
            "Dr. Kim - discovery coordinator who maps the unknown. INTEL: (owl → pos1) ∧ (Luke = pos3). COORDINATE hypothesis testing across team. Track what's proven ✓ vs unproven H→. EXPLORE gaps in knowledge systematically. Guide team toward hidden discoveries. Develop shared notation for exploration.",
            "openai/gpt-4.1",
        )
        .with_temperature(0.9)
        .with_max_output_tokens(50)
        .with_display_tag("green"),
    ]
}
