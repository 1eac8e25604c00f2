//! Session configuration
//!
//! Every field has a default, so an empty JSON object is a valid config.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::expr::LexLimits;

/// Environment variable naming a config file for the server
pub const CONFIG_ENV: &str = "SDB_CONFIG";

/// Largest accepted `max_tokens`
pub const MAX_TOKENS_LIMIT: usize = 4096;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of watchpoint slots
    pub watchpoint_capacity: usize,
    /// Maximum tokens in one expression
    pub max_tokens: usize,
    /// Maximum length in bytes of one token
    pub max_token_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let limits = LexLimits::default();
        Self {
            watchpoint_capacity: 32,
            max_tokens: limits.max_tokens,
            max_token_len: limits.max_token_len,
        }
    }
}

impl SessionConfig {
    /// Load a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: SessionConfig = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            anyhow::bail!("max_tokens must be at least 1");
        }
        if self.max_tokens > MAX_TOKENS_LIMIT {
            anyhow::bail!(
                "max_tokens is {}, the limit is {}",
                self.max_tokens,
                MAX_TOKENS_LIMIT
            );
        }
        if self.max_token_len == 0 {
            anyhow::bail!("max_token_len must be at least 1");
        }
        Ok(())
    }

    pub fn lex_limits(&self) -> LexLimits {
        LexLimits {
            max_tokens: self.max_tokens,
            max_token_len: self.max_token_len,
        }
    }
}
