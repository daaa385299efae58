//! Configuration for speech synthesis

use serde::{Deserialize, Serialize};

/// Configuration for the hosted speech synthesis service
#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// API key sent with every request
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints and tests)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Text-to-speech model
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// Voice used when the caller does not pick one
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Timeout for the availability probe in milliseconds
    #[serde(default = "default_health_timeout_ms")]
    pub health_timeout_ms: u64,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_tts_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_voice() -> String {
    domain::VoiceName::default().id().to_string()
}

const fn default_timeout_ms() -> u64 {
    60_000 // 60 seconds
}

const fn default_health_timeout_ms() -> u64 {
    5_000
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            tts_model: default_tts_model(),
            default_voice: default_voice(),
            timeout_ms: default_timeout_ms(),
            health_timeout_ms: default_health_timeout_ms(),
        }
    }
}

impl std::fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("tts_model", &self.tts_model)
            .field("default_voice", &self.default_voice)
            .field("timeout_ms", &self.timeout_ms)
            .field("health_timeout_ms", &self.health_timeout_ms)
            .finish()
    }
}

impl SpeechConfig {
    /// Create a minimal config for testing
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self
            .api_key
            .as_deref()
            .is_none_or(|key| key.trim().is_empty())
        {
            return Err("API key is required for the speech service".to_string());
        }

        if self.base_url.trim().is_empty() {
            return Err("Base URL must not be empty".to_string());
        }

        if self.tts_model.trim().is_empty() {
            return Err("TTS model must not be empty".to_string());
        }

        if self.default_voice.parse::<domain::VoiceName>().is_err() {
            return Err(format!("Unknown default voice: {}", self.default_voice));
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        if self.health_timeout_ms == 0 {
            return Err("Health check timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}
