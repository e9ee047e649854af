//! # Configuration Module
//!
//! Environment-driven configuration for the bot process and the retry
//! settings used by startup housekeeping calls.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_COURSES_FILE: &str = "courses.json";
pub const DEFAULT_PORT: u16 = 8080;

/// Errors raised while reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TELEGRAM_BOT_TOKEN must be set")]
    MissingToken,
    #[error("PORT must be a valid port number, got {0:?}")]
    InvalidPort(String),
}

/// Process configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Telegram Bot API token
    pub bot_token: String,
    /// Path to the JSON course file. Relative paths, including the
    /// `courses.json` default, resolve against the working directory, so the
    /// file sits next to wherever the process is started from.
    pub courses_file: PathBuf,
    /// HTTP listen port for the health endpoint
    pub port: u16,
    /// Retry settings for startup housekeeping calls
    pub retry: RetryPolicy,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let courses_file = lookup("COURSES_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_COURSES_FILE));

        let port = match lookup("PORT") {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            _ => DEFAULT_PORT,
        };

        Ok(Self {
            bot_token,
            courses_file,
            port,
            retry: RetryPolicy::default(),
        })
    }
}

/// Retry configuration for best-effort transport calls
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Base delay between retries in milliseconds
    pub base_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 5000,
        }
    }
}

impl RetryPolicy {
    /// Backoff before the given retry (1-based), without jitter
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.saturating_sub(1).min(16);
        let delay = self.base_delay_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }
}
