//! Speech synthesis port - Interface for text-to-speech services

use async_trait::async_trait;
use domain::VoiceName;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Result of a speech synthesis call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthesisResult {
    /// Raw little-endian 16-bit PCM; empty when the service produced no audio
    pub audio_data: Vec<u8>,
    /// Sample rate reported by the service, if any
    pub sample_rate: Option<u32>,
}

impl SynthesisResult {
    /// Audio with a known sample rate
    #[must_use]
    pub const fn new(audio_data: Vec<u8>, sample_rate: u32) -> Self {
        Self {
            audio_data,
            sample_rate: Some(sample_rate),
        }
    }

    /// A response that carried no audio
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            audio_data: Vec::new(),
            sample_rate: None,
        }
    }

    /// Whether the service produced no audio
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.audio_data.is_empty()
    }
}

/// Port for text-to-speech synthesis
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpeechSynthesisPort: Send + Sync {
    /// Synthesize speech for one piece of text
    ///
    /// # Arguments
    /// * `text` - Text to speak
    /// * `voice` - Voice from the catalog
    ///
    /// # Returns
    /// Raw PCM bytes, possibly empty
    async fn synthesize(
        &self,
        text: &str,
        voice: VoiceName,
    ) -> Result<SynthesisResult, ApplicationError>;

    /// Check if the speech service is reachable
    async fn is_available(&self) -> bool;
}
