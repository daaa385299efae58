//! The provider-facing speech trait

use async_trait::async_trait;

use crate::error::SpeechError;
use crate::types::{AudioData, VoiceInfo};

/// A text-to-speech backend that answers with raw PCM
///
/// One call covers one request to the backend; callers split long text
/// beforehand.
///
/// # Example
///
/// ```ignore
/// use ai_speech::{SpeechError, TextToSpeech};
///
/// async fn pcm_for(tts: &dyn TextToSpeech, line: &str) -> Result<Vec<u8>, SpeechError> {
///     Ok(tts.synthesize(line, Some("Charon")).await?.into_data())
/// }
/// ```
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Speak `text` with `voice`, or the provider default when `None`
    ///
    /// An `Ok` result with empty audio means the backend answered without
    /// a payload.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` for blank text, an unknown voice or any backend
    /// failure.
    async fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<AudioData, SpeechError>;

    /// Voices this provider accepts
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the provider cannot produce its catalog.
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SpeechError>;

    /// Whether the backend currently answers
    async fn is_available(&self) -> bool;

    /// Model identifier sent with each request
    fn model_name(&self) -> &str;

    /// Voice used when a call names none
    fn default_voice(&self) -> &str;
}
