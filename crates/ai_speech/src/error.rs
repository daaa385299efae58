//! Speech provider errors

use thiserror::Error;

/// Errors raised by a `TextToSpeech` provider
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The service could not be reached
    #[error("Cannot reach speech service: {0}")]
    Connection(String),

    /// The request failed in transport
    #[error("Speech request failed: {0}")]
    Request(String),

    /// No answer within the configured timeout
    #[error("Speech request timed out after {0}ms")]
    Timeout(u64),

    /// Quota or rate limit exhausted
    #[error("Speech service quota exhausted")]
    RateLimited,

    /// The service reported itself overloaded or down
    #[error("Speech service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The configured model does not exist
    #[error("Model {0} is not available")]
    ModelNotAvailable(String),

    /// Any other non-success answer
    #[error("Speech service rejected the request (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Message from the error body
        message: String,
    },

    /// Blank text was submitted
    #[error("Text to synthesize is empty")]
    EmptyText,

    /// The voice is not in the catalog
    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    /// The response body could not be read
    #[error("Malformed speech response: {0}")]
    MalformedResponse(String),

    /// The payload is not raw PCM
    #[error("Expected raw PCM audio, got {0}")]
    UnsupportedAudio(String),

    /// Invalid provider settings
    #[error("Invalid speech configuration: {0}")]
    Configuration(String),
}

impl SpeechError {
    /// Map a `reqwest` error, reporting `timeout_ms` for timeouts
    #[must_use]
    pub fn from_reqwest(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }

    /// Whether the same request may succeed later
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Timeout(_) | Self::RateLimited | Self::ServiceUnavailable(_)
        )
    }
}
