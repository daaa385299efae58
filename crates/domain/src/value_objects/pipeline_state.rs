//! Narration pipeline state machine

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stage of one narration run
///
/// ```text
/// Idle -> Segmenting -> {Synthesizing -> Decoding}* -> Assembling -> Done
/// ```
///
/// `Aborted` is entered on fatal errors, `Cancelled` when the cancellation
/// flag is seen before a fragment starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Run not started
    #[default]
    Idle,
    /// Splitting the input text into fragments
    Segmenting,
    /// Waiting for the speech service
    Synthesizing,
    /// Turning a payload into an audio segment
    Decoding,
    /// Concatenating decoded segments
    Assembling,
    /// Assembled audio returned
    Done,
    /// Fatal error, partial output discarded
    Aborted,
    /// Stopped on request
    Cancelled,
}

impl PipelineState {
    /// Check if no further transitions are possible
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted | Self::Cancelled)
    }

    /// Check if moving to `next` is a legal transition
    ///
    /// `Synthesizing -> Synthesizing` covers a skipped fragment followed by
    /// the next synthesis call.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Segmenting)
                | (
                    Self::Segmenting,
                    Self::Synthesizing | Self::Aborted | Self::Cancelled
                )
                | (
                    Self::Synthesizing,
                    Self::Synthesizing
                        | Self::Decoding
                        | Self::Assembling
                        | Self::Aborted
                        | Self::Cancelled
                )
                | (
                    Self::Decoding,
                    Self::Synthesizing | Self::Assembling | Self::Aborted | Self::Cancelled
                )
                | (Self::Assembling, Self::Done | Self::Aborted)
        )
    }

    /// Get a lowercase label for logs
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Segmenting => "segmenting",
            Self::Synthesizing => "synthesizing",
            Self::Decoding => "decoding",
            Self::Assembling => "assembling",
            Self::Done => "done",
            Self::Aborted => "aborted",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
