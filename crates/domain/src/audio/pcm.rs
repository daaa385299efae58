//! 16-bit PCM decoding

use bytes::Buf;

use super::segment::AudioSegment;
use crate::errors::DomainError;
use crate::value_objects::PcmFormat;

/// Divisor mapping `i16` samples onto `[-1.0, 1.0)`
const PCM16_SCALE: f32 = 32_768.0;

/// Decoder for little-endian signed 16-bit interleaved PCM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PcmDecoder {
    format: PcmFormat,
}

impl PcmDecoder {
    /// Create a decoder for payloads in `format`
    #[must_use]
    pub const fn new(format: PcmFormat) -> Self {
        Self { format }
    }

    /// Format every decoded segment carries
    #[must_use]
    pub const fn format(&self) -> PcmFormat {
        self.format
    }

    /// Decode a raw payload into a planar, normalized segment
    ///
    /// Sample `i` of channel `c` is `raw[i * channels + c] / 32768`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MalformedPcm` if the payload is not a whole
    /// number of frames.
    pub fn decode(&self, payload: &[u8]) -> Result<AudioSegment, DomainError> {
        let channel_count = self.format.channel_count();
        let frame_size = self.format.bytes_per_frame();

        if payload.len() % frame_size != 0 {
            return Err(DomainError::MalformedPcm {
                byte_len: payload.len(),
                channels: channel_count,
            });
        }

        let frames = payload.len() / frame_size;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        let mut reader = payload;

        for _ in 0..frames {
            for channel in &mut channels {
                channel.push(f32::from(reader.get_i16_le()) / PCM16_SCALE);
            }
        }

        AudioSegment::new(self.format, channels)
    }
}
