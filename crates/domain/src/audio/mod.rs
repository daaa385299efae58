//! Pure audio codec for the narration pipeline
//!
//! - [`PcmDecoder`] turns 16-bit little-endian PCM payloads into normalized
//!   float segments
//! - [`AudioAssembler`] concatenates segments with silence gaps
//! - [`WavEncoder`] serializes assembled audio into a canonical RIFF/WAVE file
//!
//! Everything here is synchronous and allocation-bounded by the output size.

mod assembler;
mod pcm;
mod segment;
mod wav;

pub use assembler::AudioAssembler;
pub use pcm::PcmDecoder;
pub use segment::{AssembledAudio, AudioSegment};
pub use wav::{WAV_HEADER_LEN, WavEncoder, quantize_sample};
