//! Gemini Speech Provider
//!
//! Implements `TextToSpeech` using the Gemini `generateContent` endpoint with
//! the `AUDIO` response modality.
//!
//! The service answers with base64-encoded raw 16-bit little-endian PCM in
//! `candidates[].content.parts[].inlineData`, tagged with a MIME type such as
//! `audio/L16;codec=pcm;rate=24000`.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use domain::VoiceName;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::TextToSpeech;
use crate::types::{AudioData, VoiceInfo, is_pcm_mime};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini speech provider
#[derive(Debug, Clone)]
pub struct GeminiSpeechProvider {
    client: Client,
    config: SpeechConfig,
}

impl GeminiSpeechProvider {
    /// Create a new Gemini speech provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Get the API key
    fn api_key(&self) -> &str {
        self.config.api_key.as_deref().unwrap_or_default()
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Build the model resource URL
    fn model_url(&self) -> String {
        format!("{}/models/{}", self.base_url(), self.config.tts_model)
    }

    /// Build the synthesis endpoint URL
    fn generate_url(&self) -> String {
        format!("{}:generateContent", self.model_url())
    }

    /// Resolve a requested voice against the catalog
    fn resolve_voice(&self, voice: Option<&str>) -> Result<VoiceName, SpeechError> {
        let requested = voice.unwrap_or(&self.config.default_voice);
        requested
            .parse()
            .map_err(|_| SpeechError::UnknownVoice(requested.to_string()))
    }

    /// Map a non-success response to a `SpeechError`
    fn map_api_error(&self, status: StatusCode, body: &str) -> SpeechError {
        let detail = serde_json::from_str::<ApiError>(body).ok().map(|e| e.error);
        let api_status = detail.as_ref().and_then(|d| d.status.as_deref());

        if status == StatusCode::TOO_MANY_REQUESTS || api_status == Some("RESOURCE_EXHAUSTED") {
            return SpeechError::RateLimited;
        }
        if status == StatusCode::NOT_FOUND {
            return SpeechError::ModelNotAvailable(self.config.tts_model.clone());
        }
        if status == StatusCode::SERVICE_UNAVAILABLE || api_status == Some("UNAVAILABLE") {
            let message = detail.map_or_else(|| format!("HTTP {status}"), |d| d.message);
            return SpeechError::ServiceUnavailable(message);
        }

        SpeechError::Rejected {
            status: status.as_u16(),
            message: detail.map_or_else(|| body.trim().to_string(), |d| d.message),
        }
    }
}

/// `generateContent` request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [TextPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_modalities: [&'static str; 1],
    speech_config: SpeechSettings<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechSettings<'a> {
    voice_config: VoiceSettings<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSettings<'a> {
    prebuilt_voice_config: PrebuiltVoice<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoice<'a> {
    voice_name: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    const fn new(text: &'a str, voice_name: &'a str) -> Self {
        Self {
            contents: [Content {
                parts: [TextPart { text }],
            }],
            generation_config: GenerationConfig {
                response_modalities: ["AUDIO"],
                speech_config: SpeechSettings {
                    voice_config: VoiceSettings {
                        prebuilt_voice_config: PrebuiltVoice { voice_name },
                    },
                },
            },
        }
    }
}

/// `generateContent` response body (only the fields we read)
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

impl GenerateContentResponse {
    /// First inline audio payload across all candidates
    fn into_inline_data(self) -> Option<InlineData> {
        self.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.inline_data)
    }
}

/// Gemini API error response
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Decode an inline payload into `AudioData`
fn decode_inline_data(inline: InlineData) -> Result<AudioData, SpeechError> {
    if let Some(mime_type) = inline.mime_type.as_deref()
        && !is_pcm_mime(mime_type)
    {
        return Err(SpeechError::UnsupportedAudio(mime_type.to_string()));
    }

    let bytes = BASE64
        .decode(inline.data.trim())
        .map_err(|e| SpeechError::MalformedResponse(format!("Invalid base64 audio payload: {e}")))?;

    let audio = AudioData::new(bytes);
    Ok(match inline.mime_type {
        Some(mime_type) => audio.with_mime_type(mime_type),
        None => audio,
    })
}

#[async_trait]
impl TextToSpeech for GeminiSpeechProvider {
    #[instrument(skip(self, text), fields(text_len = text.len(), voice = ?voice))]
    async fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<AudioData, SpeechError> {
        debug!("Synthesizing speech with Gemini TTS");

        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let voice = self.resolve_voice(voice)?;
        let request = GenerateContentRequest::new(text, voice.id());

        let response = self
            .client
            .post(self.generate_url())
            .header(API_KEY_HEADER, self.api_key())
            .json(&request)
            .send()
            .await
            .map_err(|e| SpeechError::from_reqwest(&e, self.config.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(self.map_api_error(status, &error_body));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::MalformedResponse(format!("Failed to parse response: {e}")))?;

        let Some(inline) = body.into_inline_data() else {
            warn!("Gemini response carried no inline audio");
            return Ok(AudioData::empty());
        };

        let audio = decode_inline_data(inline)?;

        debug!(
            audio_size = audio.size_bytes(),
            sample_rate = ?audio.sample_rate(),
            "Speech synthesis complete"
        );

        Ok(audio)
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SpeechError> {
        Ok(VoiceName::ALL.into_iter().map(VoiceInfo::from).collect())
    }

    async fn is_available(&self) -> bool {
        match self
            .client
            .get(self.model_url())
            .header(API_KEY_HEADER, self.api_key())
            .timeout(Duration::from_millis(self.config.health_timeout_ms))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Gemini TTS availability check failed: {}", e);
                false
            },
        }
    }

    fn model_name(&self) -> &str {
        &self.config.tts_model
    }

    fn default_voice(&self) -> &str {
        &self.config.default_voice
    }
}
