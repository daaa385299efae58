//! Segment concatenation with silence gaps

use super::segment::{AssembledAudio, AudioSegment};
use crate::errors::DomainError;
use crate::value_objects::PcmFormat;

/// Concatenates decoded segments into one timeline
///
/// Between consecutive segments `round(gap_seconds * sample_rate)` zero frames
/// are written; nothing is added after the last segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioAssembler {
    format: PcmFormat,
    gap_seconds: f64,
}

impl AudioAssembler {
    /// Create an assembler
    ///
    /// Only the sample rate of `format` is used, for the placeholder buffer
    /// returned when there is nothing to assemble. Negative or non-finite gaps count as no gap.
    #[must_use]
    pub fn new(format: PcmFormat, gap_seconds: f64) -> Self {
        let gap_seconds = if gap_seconds.is_finite() && gap_seconds > 0.0 {
            gap_seconds
        } else {
            0.0
        };
        Self {
            format,
            gap_seconds,
        }
    }

    /// Silence between segments, in seconds
    #[must_use]
    pub const fn gap_seconds(&self) -> f64 {
        self.gap_seconds
    }

    /// Number of silence frames inserted per gap at `format`'s rate
    #[must_use]
    pub fn silence_frames(&self, format: PcmFormat) -> usize {
        format.frames_for(self.gap_seconds)
    }

    /// Total frame count `assemble` would produce for segments of these lengths
    #[must_use]
    pub fn assembled_frame_count(&self, format: PcmFormat, segment_frames: &[usize]) -> usize {
        let gaps = segment_frames.len().saturating_sub(1);
        segment_frames.iter().sum::<usize>() + gaps * self.silence_frames(format)
    }

    /// Concatenate `segments` in order
    ///
    /// - no segments: a single silent mono frame at the configured rate
    /// - one segment: moved into the result without copying samples
    /// - otherwise: one allocation per channel, filled in a single pass
    ///
    /// # Errors
    ///
    /// Returns `DomainError::FormatMismatch` if any segment's sample rate or
    /// channel count differs from the first segment's.
    pub fn assemble(
        &self,
        mut segments: Vec<AudioSegment>,
    ) -> Result<AssembledAudio, DomainError> {
        let Some(first) = segments.first() else {
            let mono = PcmFormat::new(self.format.sample_rate(), 1)?;
            return Ok(AssembledAudio::new(AudioSegment::silent(mono, 1), 0, 0));
        };

        let format = first.format();
        if let Some(mismatch) = segments.iter().find(|s| s.format() != format) {
            return Err(DomainError::FormatMismatch {
                expected: format,
                found: mismatch.format(),
            });
        }

        let segment_count = segments.len();
        if segment_count == 1
            && let Some(only) = segments.pop()
        {
            return Ok(AssembledAudio::new(only, 1, 0));
        }

        let silence = self.silence_frames(format);
        let lengths: Vec<usize> = segments.iter().map(AudioSegment::frame_count).collect();
        let total = self.assembled_frame_count(format, &lengths);

        let mut output: Vec<Vec<f32>> = (0..format.channel_count())
            .map(|_| Vec::with_capacity(total))
            .collect();

        for (position, segment) in segments.into_iter().enumerate() {
            if position > 0 && silence > 0 {
                for channel in &mut output {
                    channel.resize(channel.len() + silence, 0.0);
                }
            }
            for (channel, samples) in output.iter_mut().zip(segment.into_channels()) {
                channel.extend_from_slice(&samples);
            }
        }

        let audio = AudioSegment::new(format, output)?;
        Ok(AssembledAudio::new(audio, segment_count, silence))
    }
}
