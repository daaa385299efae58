//! PCM format value object
//!
//! Describes the sample rate and channel layout shared by every buffer in one
//! narration run. The format is built once from configuration and handed to
//! the decoder, assembler and orchestrator explicitly.
//!
//! # Examples
//!
//! ```
//! use domain::value_objects::PcmFormat;
//!
//! let format = PcmFormat::new(24_000, 1).expect("valid format");
//! assert_eq!(format.bytes_per_frame(), 2);
//! assert_eq!(format.byte_rate(), 48_000);
//! assert!(PcmFormat::new(0, 1).is_err());
//! ```

use std::fmt;

use serde::Serialize;

use crate::errors::DomainError;

/// Bytes per sample for 16-bit PCM
pub(crate) const BYTES_PER_SAMPLE: usize = 2;

/// Sample rate and channel count of 16-bit PCM audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PcmFormat {
    sample_rate: u32,
    channels: u16,
}

impl PcmFormat {
    /// Sample rate produced by the speech service
    pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

    /// Create a validated PCM format
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPcmFormat` if the sample rate or channel
    /// count is zero, or if the resulting byte rate does not fit a WAV header.
    pub fn new(sample_rate: u32, channels: u16) -> Result<Self, DomainError> {
        if sample_rate == 0 {
            return Err(DomainError::InvalidPcmFormat(
                "sample rate must be greater than 0".to_string(),
            ));
        }
        if channels == 0 {
            return Err(DomainError::InvalidPcmFormat(
                "channel count must be greater than 0".to_string(),
            ));
        }
        if channels.checked_mul(2).is_none() {
            return Err(DomainError::InvalidPcmFormat(format!(
                "{channels} channels exceed the WAV block size"
            )));
        }
        if sample_rate.checked_mul(u32::from(channels) * 2).is_none() {
            return Err(DomainError::InvalidPcmFormat(format!(
                "byte rate of {sample_rate} Hz x {channels} channel(s) overflows"
            )));
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Frames per second
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels
    #[must_use]
    pub const fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of interleaved channels as an index type
    #[must_use]
    pub const fn channel_count(&self) -> usize {
        self.channels as usize
    }

    /// Size of one interleaved 16-bit frame in bytes
    #[must_use]
    pub const fn bytes_per_frame(&self) -> usize {
        self.channel_count() * BYTES_PER_SAMPLE
    }

    /// Size of one frame as stored in the WAV `block align` field
    #[must_use]
    pub const fn block_align(&self) -> u16 {
        // Checked in `new`
        self.channels * 2
    }

    /// Bytes per second of 16-bit PCM (the WAV `byte rate` field)
    #[must_use]
    pub const fn byte_rate(&self) -> u32 {
        // Checked in `new`
        self.sample_rate * self.channels as u32 * BYTES_PER_SAMPLE as u32
    }

    /// Number of frames covering `seconds`, rounded to the nearest frame
    ///
    /// Negative and non-finite durations yield zero frames.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn frames_for(&self, seconds: f64) -> usize {
        if !seconds.is_finite() || seconds <= 0.0 {
            return 0;
        }
        (seconds * f64::from(self.sample_rate)).round() as usize
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            sample_rate: Self::DEFAULT_SAMPLE_RATE,
            channels: 1,
        }
    }
}

impl fmt::Display for PcmFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz/{} ch", self.sample_rate, self.channels)
    }
}
