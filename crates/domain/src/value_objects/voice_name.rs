//! Prebuilt synthesis voices
//!
//! The speech service ships a fixed set of named voices. The catalog data
//! (description, gender) is what the front end shows when a user picks one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Perceived gender of a voice, as listed in the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    /// Male-sounding voice
    Male,
    /// Female-sounding voice
    Female,
}

impl fmt::Display for VoiceGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "Male"),
            Self::Female => write!(f, "Female"),
        }
    }
}

/// A prebuilt voice offered by the speech service
///
/// Serialized with the exact identifier the service expects (`"Kore"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VoiceName {
    /// Deep and resonant
    #[default]
    Kore,
    /// Cheerful and energetic
    Puck,
    /// Calm and steady
    Charon,
    /// Authoritative and strong
    Fenrir,
    /// Soft and airy
    Zephyr,
}

impl VoiceName {
    /// Every voice in catalog order
    pub const ALL: [Self; 5] = [
        Self::Kore,
        Self::Puck,
        Self::Charon,
        Self::Fenrir,
        Self::Zephyr,
    ];

    /// Identifier sent to the speech service
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::Kore => "Kore",
            Self::Puck => "Puck",
            Self::Charon => "Charon",
            Self::Fenrir => "Fenrir",
            Self::Zephyr => "Zephyr",
        }
    }

    /// Short description of the voice character
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Kore => "Deep and resonant",
            Self::Puck => "Cheerful and energetic",
            Self::Charon => "Calm and steady",
            Self::Fenrir => "Authoritative and strong",
            Self::Zephyr => "Soft and airy",
        }
    }

    /// Catalog gender
    #[must_use]
    pub const fn gender(&self) -> VoiceGender {
        match self {
            Self::Zephyr => VoiceGender::Female,
            Self::Kore | Self::Puck | Self::Charon | Self::Fenrir => VoiceGender::Male,
        }
    }
}

impl fmt::Display for VoiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for VoiceName {
    type Err = DomainError;

    /// Parse a voice name, ignoring case and surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|voice| voice.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::UnknownVoice(wanted.to_string()))
    }
}
