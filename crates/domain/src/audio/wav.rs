//! Canonical RIFF/WAVE container
//!
//! Layout (all numeric fields little-endian):
//!
//! ```text
//! 0  "RIFF"            4  data_len + 36     8  "WAVE"
//! 12 "fmt "            16 16 (fmt size)     20 1 (PCM)
//! 22 channels          24 sample rate       28 byte rate
//! 32 block align       34 16 (bits)         36 "data"
//! 40 data_len          44 interleaved PCM16LE samples
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::pcm::PcmDecoder;
use super::segment::{AssembledAudio, AudioSegment};
use crate::errors::DomainError;
use crate::value_objects::PcmFormat;

/// Size of the canonical header
pub const WAV_HEADER_LEN: usize = 44;

/// Bytes of header counted by the RIFF size field after the data chunk
const RIFF_OVERHEAD: u32 = 36;
const FMT_CHUNK_LEN: u32 = 16;
const FORMAT_PCM: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;

/// Convert a normalized sample to signed 16-bit PCM
///
/// The sample is clamped to `[-1, 1]`; negative values scale by 32768,
/// non-negative values by 32767. NaN encodes as silence.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn quantize_sample(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    let scaled = if clamped < 0.0 {
        clamped * 32_768.0
    } else {
        clamped * 32_767.0
    };
    // Float-to-int `as` saturates at the i16 bounds and maps NaN to 0
    scaled.round() as i16
}

/// Encoder/decoder for 16-bit PCM WAV files
#[derive(Debug, Clone, Copy, Default)]
pub struct WavEncoder;

impl WavEncoder {
    /// Serialize assembled audio into WAV bytes
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ContainerTooLarge` if the data chunk would not
    /// fit the 32-bit RIFF size field.
    pub fn encode(audio: &AssembledAudio) -> Result<Bytes, DomainError> {
        Self::encode_segment(audio.audio())
    }

    /// Serialize a single segment into WAV bytes
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ContainerTooLarge` if the data chunk would not
    /// fit the 32-bit RIFF size field.
    pub fn encode_segment(segment: &AudioSegment) -> Result<Bytes, DomainError> {
        let format = segment.format();
        let frames = segment.frame_count();
        let too_large = || DomainError::ContainerTooLarge {
            frames,
            channels: format.channel_count(),
        };

        let data_len = frames
            .checked_mul(format.bytes_per_frame())
            .and_then(|len| u32::try_from(len).ok())
            .filter(|len| len.checked_add(RIFF_OVERHEAD).is_some())
            .ok_or_else(too_large)?;

        let mut out = BytesMut::with_capacity(WAV_HEADER_LEN + data_len as usize);

        out.put_slice(b"RIFF");
        out.put_u32_le(data_len + RIFF_OVERHEAD);
        out.put_slice(b"WAVE");

        out.put_slice(b"fmt ");
        out.put_u32_le(FMT_CHUNK_LEN);
        out.put_u16_le(FORMAT_PCM);
        out.put_u16_le(format.channels());
        out.put_u32_le(format.sample_rate());
        out.put_u32_le(format.byte_rate());
        out.put_u16_le(format.block_align());
        out.put_u16_le(BITS_PER_SAMPLE);

        out.put_slice(b"data");
        out.put_u32_le(data_len);

        let channels = segment.channels();
        for frame in 0..frames {
            for channel in channels {
                out.put_i16_le(quantize_sample(channel[frame]));
            }
        }

        Ok(out.freeze())
    }

    /// Parse a canonical WAV file back into a segment
    ///
    /// Only the 44-byte layout written by [`WavEncoder::encode`] is accepted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidContainer` for anything that is not a
    /// canonical 16-bit PCM file, or a decode error for a truncated data chunk.
    pub fn decode(bytes: &[u8]) -> Result<AudioSegment, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidContainer(reason.to_string());

        if bytes.len() < WAV_HEADER_LEN {
            return Err(invalid("shorter than the 44-byte header"));
        }

        let mut header = &bytes[..WAV_HEADER_LEN];
        if header.copy_to_bytes(4) != b"RIFF".as_slice() {
            return Err(invalid("missing RIFF tag"));
        }
        let riff_len = header.get_u32_le();
        if header.copy_to_bytes(4) != b"WAVE".as_slice() {
            return Err(invalid("missing WAVE tag"));
        }
        if header.copy_to_bytes(4) != b"fmt ".as_slice() {
            return Err(invalid("missing fmt chunk"));
        }
        if header.get_u32_le() != FMT_CHUNK_LEN {
            return Err(invalid("unexpected fmt chunk size"));
        }
        if header.get_u16_le() != FORMAT_PCM {
            return Err(invalid("not PCM encoded"));
        }
        let channels = header.get_u16_le();
        let sample_rate = header.get_u32_le();
        let byte_rate = header.get_u32_le();
        let block_align = header.get_u16_le();
        if header.get_u16_le() != BITS_PER_SAMPLE {
            return Err(invalid("not 16 bits per sample"));
        }
        if header.copy_to_bytes(4) != b"data".as_slice() {
            return Err(invalid("missing data chunk"));
        }
        let data_len = header.get_u32_le();

        let format = PcmFormat::new(sample_rate, channels)?;
        if byte_rate != format.byte_rate() || block_align != format.block_align() {
            return Err(invalid("byte rate or block align inconsistent with format"));
        }
        if riff_len != data_len.saturating_add(RIFF_OVERHEAD) {
            return Err(invalid("RIFF size does not match data size"));
        }

        let data = &bytes[WAV_HEADER_LEN..];
        let data_len = data_len as usize;
        if data.len() < data_len {
            return Err(invalid("data chunk truncated"));
        }

        PcmDecoder::new(format).decode(&data[..data_len])
    }
}
