//! User configuration
//!
//! Read from `<config_dir>/canvas-chat/config.yaml` when present. Every
//! field has a default, so a partial file is fine.

use crate::assemble::AssemblyOptions;
use crate::budget::effective_budget;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a critical-thinking assistant bot.
Consider the intent of my questions before responding.
Do not restate my information unless I ask for it.
Do not include caveats or disclaimers.
When formatting lists, use bulleted lists (markdown dash character), not numbered lists.
Use step-by-step reasoning. Be brief.";

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Errors loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("token_budget must be greater than zero")]
    ZeroBudget,

    #[error("temperature {0} outside 0.0..=2.0")]
    Temperature(f32),
}

/// Settings for assembly and completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Chat model name; known models cap the budget at their context window
    pub model: String,
    /// System prompt used when no root note overrides it
    pub system_prompt: String,
    /// Ancestor levels to include (0 = unlimited)
    pub max_depth: usize,
    /// Input budget in tokens, system prompt included
    pub token_budget: usize,
    /// Maximum tokens to generate (0 = let the endpoint decide)
    pub max_response_tokens: usize,
    pub temperature: f32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_depth: 0,
            token_budget: 4096,
            max_response_tokens: 0,
            temperature: 0.0,
        }
    }
}

impl ChatConfig {
    /// Default config file location (~/.config/canvas-chat/config.yaml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("canvas-chat").join("config.yaml"))
    }

    /// Parse YAML and validate
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit path
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Load the default file if it exists, otherwise use defaults
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token_budget == 0 {
            return Err(ConfigError::ZeroBudget);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Temperature(self.temperature));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Budget after capping by the model's context window
    pub fn effective_budget(&self) -> usize {
        effective_budget(self.token_budget, &self.model)
    }

    pub fn assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions {
            max_depth: self.max_depth,
            token_budget: self.effective_budget(),
            system_prompt: self.system_prompt.clone(),
        }
    }
}
