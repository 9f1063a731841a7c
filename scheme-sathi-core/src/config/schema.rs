//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Storage key of the saved-sessions slot
pub const DEFAULT_STORE_KEY: &str = "scheme-sathi-sessions";

/// Number of saved sessions kept before the oldest is evicted
pub const DEFAULT_MAX_SESSIONS: usize = 50;

/// Root configuration for scheme-sathi
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Persistent store configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Session behaviour
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where and how saved sessions are persisted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the sessions slot
    #[serde(default = "default_storage_dir")]
    pub dir: String,
    /// Name of the slot; the file is `<dir>/<key>.json`
    #[serde(default = "default_storage_key")]
    pub key: String,
    /// Maximum number of saved sessions retained
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_storage_dir() -> String {
    "~/.scheme-sathi/data".to_string()
}

fn default_storage_key() -> String {
    DEFAULT_STORE_KEY.to_string()
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            key: default_storage_key(),
            max_sessions: default_max_sessions(),
        }
    }
}

/// Session behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Bot message seeded into every fresh session. Empty (the default)
    /// disables it. A seeded greeting is part of `chat_history` and counts
    /// as an interaction.
    #[serde(default)]
    pub greeting: String,
    /// Maximum length of the history preview line
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

fn default_preview_chars() -> usize {
    80
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: String::new(),
            preview_chars: default_preview_chars(),
        }
    }
}

impl SessionConfig {
    /// Greeting to seed, if any
    pub fn greeting(&self) -> Option<&str> {
        let greeting = self.greeting.trim();
        if greeting.is_empty() {
            None
        } else {
            Some(greeting)
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Days to keep rotated log files
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_retention_days() -> u64 {
    7
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            retention_days: default_retention_days(),
            overrides: HashMap::new(),
        }
    }
}
