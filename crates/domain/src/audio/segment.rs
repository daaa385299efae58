//! Audio buffers

use crate::errors::DomainError;
use crate::value_objects::PcmFormat;

/// Decoded, normalized audio for one fragment
///
/// Samples are stored planar (one `Vec<f32>` per channel) in `[-1.0, 1.0]`.
/// Every channel holds exactly `frame_count()` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    format: PcmFormat,
    channels: Vec<Vec<f32>>,
    frames: usize,
}

impl AudioSegment {
    /// Create a segment from planar channel data
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPcmFormat` if the number of channel
    /// vectors differs from the format's channel count or the vectors have
    /// different lengths.
    pub fn new(format: PcmFormat, channels: Vec<Vec<f32>>) -> Result<Self, DomainError> {
        if channels.len() != format.channel_count() {
            return Err(DomainError::InvalidPcmFormat(format!(
                "{} channel buffer(s) supplied for {format}",
                channels.len()
            )));
        }

        let frames = channels.first().map_or(0, Vec::len);
        if channels.iter().any(|channel| channel.len() != frames) {
            return Err(DomainError::InvalidPcmFormat(
                "channel buffers differ in length".to_string(),
            ));
        }

        Ok(Self {
            format,
            channels,
            frames,
        })
    }

    /// Create an all-zero segment of `frames` frames
    #[must_use]
    pub fn silent(format: PcmFormat, frames: usize) -> Self {
        Self {
            format,
            channels: vec![vec![0.0; frames]; format.channel_count()],
            frames,
        }
    }

    /// Sample rate and channel layout
    #[must_use]
    pub const fn format(&self) -> PcmFormat {
        self.format
    }

    /// Frames per second
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.format.sample_rate()
    }

    /// Number of channels
    #[must_use]
    pub const fn channel_count(&self) -> usize {
        self.format.channel_count()
    }

    /// Number of frames (samples per channel)
    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.frames
    }

    /// Check if the segment holds no frames
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Samples of one channel, if it exists
    #[must_use]
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// All channels, planar
    #[must_use]
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Playback length in seconds
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / f64::from(self.format.sample_rate())
    }

    /// Consume and return the planar channel data
    #[must_use]
    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }
}

/// The full concatenated timeline of a narration run
///
/// Returned by value to the caller, who owns it from then on. The buffer is
/// only reachable through shared references; when a run decoded a single
/// segment, that segment's buffer is moved in without copying.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledAudio {
    audio: AudioSegment,
    segment_count: usize,
    silence_frames: usize,
}

impl AssembledAudio {
    pub(crate) const fn new(audio: AudioSegment, segment_count: usize, silence_frames: usize) -> Self {
        Self {
            audio,
            segment_count,
            silence_frames,
        }
    }

    /// The concatenated buffer
    #[must_use]
    pub const fn audio(&self) -> &AudioSegment {
        &self.audio
    }

    /// Number of source segments that were concatenated
    #[must_use]
    pub const fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Silence frames inserted between consecutive segments
    #[must_use]
    pub const fn silence_frames(&self) -> usize {
        self.silence_frames
    }

    /// Sample rate and channel layout
    #[must_use]
    pub const fn format(&self) -> PcmFormat {
        self.audio.format()
    }

    /// Number of frames in the whole timeline
    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.audio.frame_count()
    }

    /// Playback length in seconds
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.audio.duration_secs()
    }
}
