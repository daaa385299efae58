//! Types for speech synthesis

use domain::{VoiceGender, VoiceName};
use serde::{Deserialize, Serialize};

/// Audio returned by a speech provider
///
/// Holds raw little-endian 16-bit PCM as delivered by the service, after any
/// transport encoding has been removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioData {
    data: Vec<u8>,
    mime_type: Option<String>,
    sample_rate: Option<u32>,
}

impl AudioData {
    /// Create audio data from raw PCM bytes
    #[must_use]
    pub const fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            mime_type: None,
            sample_rate: None,
        }
    }

    /// An empty payload (the service produced no audio)
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Attach the MIME type reported by the service
    ///
    /// The `rate=` parameter, when present, also sets the sample rate.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        if let Some(rate) = sample_rate_from_mime(&mime_type) {
            self.sample_rate = Some(rate);
        }
        self.mime_type = Some(mime_type);
        self
    }

    /// Set the sample rate explicitly
    #[must_use]
    pub const fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    /// Raw audio bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume and return the raw bytes
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// MIME type reported by the service, if any
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Sample rate reported by the service, if any
    #[must_use]
    pub const fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    /// Size of the payload in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Whether the service returned no audio
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Whether a MIME type describes raw 16-bit PCM
#[must_use]
pub fn is_pcm_mime(mime_type: &str) -> bool {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    matches!(essence.as_str(), "audio/l16" | "audio/pcm")
}

/// Extract `rate=NNNN` from a MIME type such as `audio/L16;codec=pcm;rate=24000`
#[must_use]
pub fn sample_rate_from_mime(mime_type: &str) -> Option<u32> {
    mime_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("rate") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// Information about an available voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Voice identifier sent to the service
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Description of the voice
    pub description: Option<String>,
    /// Voice gender (if known)
    pub gender: Option<VoiceGender>,
}

impl VoiceInfo {
    /// Create a new voice info
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            gender: None,
        }
    }
}

impl From<VoiceName> for VoiceInfo {
    fn from(voice: VoiceName) -> Self {
        Self {
            id: voice.id().to_string(),
            name: voice.id().to_string(),
            description: Some(voice.description().to_string()),
            gender: Some(voice.gender()),
        }
    }
}
