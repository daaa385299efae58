//! Domain-level errors

use thiserror::Error;

use crate::value_objects::PcmFormat;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Fragment character limit must be positive
    #[error("Invalid fragment limit: {0} (must be greater than 0)")]
    InvalidFragmentLimit(usize),

    /// PCM payload length is not a whole number of frames
    #[error("Malformed PCM payload: {byte_len} bytes is not a multiple of {} ({channels} channel(s) x 2 bytes)", .channels * 2)]
    MalformedPcm {
        /// Length of the rejected payload
        byte_len: usize,
        /// Declared channel count
        channels: usize,
    },

    /// Audio segments do not share one sample rate and channel layout
    #[error("Audio format mismatch: expected {expected}, found {found}")]
    FormatMismatch {
        /// Format of the first segment (or the configured format)
        expected: PcmFormat,
        /// Format of the offending segment
        found: PcmFormat,
    },

    /// Sample rate or channel count out of range
    #[error("Invalid PCM format: {0}")]
    InvalidPcmFormat(String),

    /// Bytes are not a canonical RIFF/WAVE file
    #[error("Invalid WAV container: {0}")]
    InvalidContainer(String),

    /// Audio does not fit into a 32-bit RIFF size field
    #[error("Audio too large for WAV container: {frames} frames x {channels} channel(s)")]
    ContainerTooLarge {
        /// Frame count of the audio
        frames: usize,
        /// Channel count of the audio
        channels: usize,
    },

    /// Voice name is not part of the catalog
    #[error("Unknown voice: {0}")]
    UnknownVoice(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}
