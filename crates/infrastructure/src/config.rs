//! Application configuration
//!
//! Layered with the `config` crate, later sources winning:
//! 1. built-in defaults
//! 2. `narrator.toml` in the working directory, or an explicit file
//! 3. `NARRATOR_*` environment variables (`__` separates sections, e.g.
//!    `NARRATOR_SPEECH__API_KEY`)
//!
//! `GEMINI_API_KEY` and `API_KEY` fill in the speech API key when no other
//! source sets one.

use std::path::Path;

use ai_speech::SpeechConfig;
use application::NarrationConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::telemetry::TelemetryConfig;

/// Base name of the optional config file in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "narrator";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "NARRATOR";

/// Variables consulted, in order, when no API key is configured
pub const API_KEY_ENV_FALLBACKS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Values were read but are out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Speech service settings
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Narration pipeline settings
    #[serde(default)]
    pub narration: NarrationConfig,

    /// Logging settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from `path`, or from `narrator.toml` if present,
    /// then the environment
    ///
    /// An explicit path must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is missing or malformed, or a value is
    /// invalid.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigLoadError> {
        Self::build(path, Self::environment(), |name| std::env::var(name).ok())
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn build(
        path: Option<&Path>,
        environment: config::Environment,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigLoadError> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let mut app: Self = config::Config::builder()
            .add_source(file)
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        app.apply_api_key_fallback(lookup);
        app.validate().map_err(ConfigLoadError::Invalid)?;

        debug!(
            model = %app.speech.tts_model,
            voice = %app.speech.default_voice,
            fragment_char_limit = app.narration.fragment_char_limit,
            "Configuration loaded"
        );

        Ok(app)
    }

    /// Fill an unset API key from the fallback variables
    fn apply_api_key_fallback(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self
            .speech
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
        {
            return;
        }

        self.speech.api_key = API_KEY_ENV_FALLBACKS
            .iter()
            .find_map(|name| lookup(name).filter(|key| !key.trim().is_empty()));
    }

    /// Validate the settings every command depends on
    ///
    /// The speech section is checked when a provider is built, so commands
    /// that never call the service work without an API key.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid value.
    pub fn validate(&self) -> Result<(), String> {
        self.narration
            .validate()
            .map_err(|e| format!("narration: {e}"))?;
        self.telemetry
            .validate()
            .map_err(|e| format!("telemetry: {e}"))?;
        Ok(())
    }
}
