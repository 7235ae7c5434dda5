use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ItineraError, Result};

/// Top-level Itinera configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Model-chain settings passed through to the chain provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: 0.0,
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

/// Sliding-window admission control settings, applied per node name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_max_requests() -> usize {
    5
}

fn default_window_secs() -> u64 {
    60
}

/// Workflow loop guards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Times the extractor may run before the conversation is abandoned.
    #[serde(default = "default_max_extraction_attempts")]
    pub max_extraction_attempts: usize,
    /// Times either search node may re-enter its tool loop.
    #[serde(default = "default_max_tool_loop_iterations")]
    pub max_tool_loop_iterations: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_extraction_attempts: default_max_extraction_attempts(),
            max_tool_loop_iterations: default_max_tool_loop_iterations(),
        }
    }
}

fn default_max_extraction_attempts() -> usize {
    3
}

fn default_max_tool_loop_iterations() -> usize {
    5
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| ItineraError::Config(format!("{}: {}", path.display(), e)))
    }
}
