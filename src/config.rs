use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("environment variable {0} is required")]
    Missing(&'static str),
    /// A variable is set but unusable.
    #[error("config validation error: {0}")]
    Validation(String),
}

pub struct Config {
    pub telegram_token: String,
    /// Bearer key for model listing and chat completions.
    pub openrouter_api_key: String,
    /// Bearer key for speech synthesis.
    pub openai_api_key: String,
    /// Directory for state files (logs). Defaults to current directory.
    pub data_dir: PathBuf,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let telegram_token = required("TELEGRAM_TOKEN")?;
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        match telegram_token.split_once(':') {
            Some((id, secret)) if id.parse::<u64>().is_ok() && !secret.is_empty() => {}
            _ => {
                return Err(ConfigError::Validation(
                    "TELEGRAM_TOKEN appears invalid (expected format: 123456789:ABCdefGHI...)".into(),
                ));
            }
        }

        let openrouter_api_key = required("OPENROUTER_API_KEY")?;
        let openai_api_key = required("OPENAI_API_KEY")?;

        let data_dir = lookup("DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            telegram_token,
            openrouter_api_key,
            openai_api_key,
            data_dir,
        })
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}
