//! Configuration management for the weather chat service.
//!
//! Credentials are looked up in a secrets file first and then in the process
//! environment:
//! - `GROQ_API_KEY` - Required for the agent. Your Groq API key.
//! - `OPENWEATHER_API_KEY` - Required for weather lookups. Your OpenWeatherMap key.
//!
//! Other environment variables:
//! - `SECRETS_PATH` - Optional. TOML secrets file. Defaults to `.secrets/secrets.toml`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8501`.
//!
//! A missing credential is not a load error. It is recorded as `None` and the
//! startup gate refuses chat input until it is configured.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const OPENWEATHER_API_KEY: &str = "OPENWEATHER_API_KEY";

pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const DEFAULT_SECRETS_PATH: &str = ".secrets/secrets.toml";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Failed to read secrets from {0}: {1}")]
    Secrets(PathBuf, String),
}

/// Key/value secrets loaded from a TOML file.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    values: HashMap<String, String>,
}

impl Secrets {
    /// Load secrets from `path`. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No secrets file at {}", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Secrets(path.to_path_buf(), e.to_string()))?;
        let table: toml::Table = contents
            .parse()
            .map_err(|e: toml::de::Error| ConfigError::Secrets(path.to_path_buf(), e.to_string()))?;

        let values = table
            .into_iter()
            .filter_map(|(key, value)| match value {
                toml::Value::String(s) => Some((key, s)),
                _ => None,
            })
            .collect();

        tracing::info!("Loaded secrets from {}", path.display());
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Fixed sampling and loop settings of the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSettings {
    /// Model identifier sent to the provider
    pub model: String,

    /// Sampling temperature; kept low for literal answers
    pub temperature: f32,

    /// Log every reasoning step at `info`
    pub verbose: bool,

    /// Upper bound on model calls per turn
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            verbose: true,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Groq API key (LLM provider)
    pub groq_api_key: Option<String>,

    /// OpenWeatherMap API key (weather provider)
    pub openweather_api_key: Option<String>,

    /// Agent model settings
    pub agent: AgentSettings,

    /// OpenAI-compatible base URL of the LLM provider
    pub llm_base_url: String,

    /// Current-weather endpoint of the weather provider
    pub weather_url: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from the secrets file and environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `PORT` is not a valid port and
    /// `ConfigError::Secrets` if the secrets file exists but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secrets_path = std::env::var("SECRETS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SECRETS_PATH));
        let secrets = Secrets::load(&secrets_path)?;

        Self::from_sources(&secrets, |key| std::env::var(key).ok())
    }

    /// Build a config from a secrets store and an environment lookup.
    pub fn from_sources<F>(secrets: &Secrets, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credential = |key: &str| {
            secrets
                .get(key)
                .map(str::to_string)
                .or_else(|| env(key))
                .filter(|v| !v.trim().is_empty())
        };

        let port = env("PORT")
            .unwrap_or_else(|| "8501".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        Ok(Self {
            groq_api_key: credential(GROQ_API_KEY),
            openweather_api_key: credential(OPENWEATHER_API_KEY),
            agent: AgentSettings::default(),
            llm_base_url: GROQ_BASE_URL.to_string(),
            weather_url: OPENWEATHER_URL.to_string(),
            host: env("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
        })
    }

    /// Create a config with explicit credentials (useful for testing).
    pub fn new(groq_api_key: Option<String>, openweather_api_key: Option<String>) -> Self {
        Self {
            groq_api_key,
            openweather_api_key,
            agent: AgentSettings::default(),
            llm_base_url: GROQ_BASE_URL.to_string(),
            weather_url: OPENWEATHER_URL.to_string(),
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }

    /// Names of required credentials that are not configured.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.groq_api_key.is_none() {
            missing.push(GROQ_API_KEY);
        }
        if self.openweather_api_key.is_none() {
            missing.push(OPENWEATHER_API_KEY);
        }
        missing
    }
}
