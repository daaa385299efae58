//! Speech adapter - Implements SpeechSynthesisPort using ai_speech crate

use std::sync::Arc;

use ai_speech::{GeminiSpeechProvider, SpeechConfig, SpeechError, TextToSpeech, VoiceInfo};
use application::error::ApplicationError;
use application::ports::{SpeechSynthesisPort, SynthesisResult};
use async_trait::async_trait;
use domain::VoiceName;
use tracing::{debug, instrument, warn};

/// Adapter for speech services using ai_speech crate
pub struct SpeechAdapter {
    provider: Arc<dyn TextToSpeech>,
}

impl std::fmt::Debug for SpeechAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeechAdapter")
            .field("model", &self.provider.model_name())
            .finish_non_exhaustive()
    }
}

impl SpeechAdapter {
    /// Create a speech adapter backed by the Gemini provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails to initialize.
    pub fn new(config: SpeechConfig) -> Result<Self, ApplicationError> {
        let provider = GeminiSpeechProvider::new(config).map_err(Self::map_error)?;

        Ok(Self::with_provider(Arc::new(provider)))
    }

    /// Create a speech adapter around any `TextToSpeech` provider
    #[must_use]
    pub fn with_provider(provider: Arc<dyn TextToSpeech>) -> Self {
        Self { provider }
    }

    /// Voices offered by the provider
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot list its voices.
    pub async fn list_voices(&self) -> Result<Vec<VoiceInfo>, ApplicationError> {
        self.provider.list_voices().await.map_err(Self::map_error)
    }

    /// Model used for synthesis
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Map speech error to application error
    ///
    /// Settings problems surface as configuration errors; anything the service
    /// itself reported is an external service error.
    fn map_error(err: SpeechError) -> ApplicationError {
        match err {
            SpeechError::RateLimited => ApplicationError::RateLimited,
            SpeechError::Configuration(e) => ApplicationError::Configuration(e),
            e @ (SpeechError::UnknownVoice(_) | SpeechError::ModelNotAvailable(_)) => {
                ApplicationError::Configuration(e.to_string())
            },
            e @ (SpeechError::EmptyText
            | SpeechError::MalformedResponse(_)
            | SpeechError::UnsupportedAudio(_)) => ApplicationError::Internal(e.to_string()),
            e @ (SpeechError::Connection(_)
            | SpeechError::Request(_)
            | SpeechError::Timeout(_)
            | SpeechError::ServiceUnavailable(_)
            | SpeechError::Rejected { .. }) => ApplicationError::ExternalService(e.to_string()),
        }
    }
}

#[async_trait]
impl SpeechSynthesisPort for SpeechAdapter {
    #[instrument(skip(self, text), fields(text_len = text.len(), voice = %voice))]
    async fn synthesize(
        &self,
        text: &str,
        voice: VoiceName,
    ) -> Result<SynthesisResult, ApplicationError> {
        let audio = self
            .provider
            .synthesize(text, Some(voice.id()))
            .await
            .map_err(|e| {
                warn!(error = %e, transient = e.is_transient(), "Speech provider call failed");
                Self::map_error(e)
            })?;

        debug!(
            audio_size = audio.size_bytes(),
            sample_rate = ?audio.sample_rate(),
            "Speech synthesized"
        );

        let sample_rate = audio.sample_rate();
        Ok(SynthesisResult {
            audio_data: audio.into_data(),
            sample_rate,
        })
    }

    async fn is_available(&self) -> bool {
        self.provider.is_available().await
    }
}
