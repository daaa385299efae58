//! Application-level errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::ExternalService(_))
    }
}

/// Reasons a narration run stops without producing audio
///
/// Fragment indices are 1-based, matching progress reports.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The segmenter could not be configured
    #[error("Segmentation failed: {0}")]
    Segmentation(#[source] DomainError),

    /// The speech service failed for a fragment
    #[error("Speech synthesis failed for fragment {index}: {source}")]
    Service {
        /// Fragment that failed
        index: usize,
        /// Underlying service error
        #[source]
        source: ApplicationError,
    },

    /// Returned audio bytes could not be decoded
    #[error("Could not decode audio for fragment {index}: {source}")]
    Decode {
        /// Fragment whose audio was rejected
        index: usize,
        /// Decoder error
        #[source]
        source: DomainError,
    },

    /// Audio could not be combined into one timeline
    #[error("Audio assembly failed{}: {source}", .index.map(|i| format!(" at fragment {i}")).unwrap_or_default())]
    Assembly {
        /// Offending fragment, when one can be named
        index: Option<usize>,
        /// Assembler error
        #[source]
        source: DomainError,
    },

    /// Every fragment came back without audio
    #[error("No audio was produced for any of {total} fragment(s)")]
    EmptyResult {
        /// Number of fragments attempted
        total: usize,
    },

    /// The run was cancelled between fragments
    #[error("Narration cancelled after {completed} of {total} fragment(s)")]
    Cancelled {
        /// Fragments fully processed before cancellation
        completed: usize,
        /// Fragments in the run
        total: usize,
    },
}

impl PipelineError {
    /// Fragment the error is attributed to, if any
    #[must_use]
    pub const fn fragment_index(&self) -> Option<usize> {
        match self {
            Self::Service { index, .. } | Self::Decode { index, .. } => Some(*index),
            Self::Assembly { index, .. } => *index,
            Self::Segmentation(_) | Self::EmptyResult { .. } | Self::Cancelled { .. } => None,
        }
    }

    /// Whether the run stopped because it was cancelled
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Whether running the same text again may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Service { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use domain::PcmFormat;

    use super::*;

    #[test]
    fn domain_error_converts() {
        let err: ApplicationError = DomainError::UnknownVoice("Nova".to_string()).into();
        assert_eq!(err.to_string(), "Unknown voice: Nova");
    }

    #[test]
    fn retryable_errors() {
        assert!(ApplicationError::RateLimited.is_retryable());
        assert!(ApplicationError::ExternalService("down".to_string()).is_retryable());
        assert!(!ApplicationError::Configuration("bad".to_string()).is_retryable());
        assert!(!ApplicationError::Internal("bug".to_string()).is_retryable());
    }

    #[test]
    fn only_transient_service_failures_are_retryable() {
        let rate_limited = PipelineError::Service {
            index: 3,
            source: ApplicationError::RateLimited,
        };
        let misconfigured = PipelineError::Service {
            index: 1,
            source: ApplicationError::Configuration("no key".to_string()),
        };

        assert!(rate_limited.is_retryable());
        assert!(!misconfigured.is_retryable());
        assert!(!PipelineError::EmptyResult { total: 2 }.is_retryable());
        assert!(
            !PipelineError::Cancelled {
                completed: 1,
                total: 4
            }
            .is_retryable()
        );
    }

    #[test]
    fn service_error_names_fragment() {
        let err = PipelineError::Service {
            index: 2,
            source: ApplicationError::RateLimited,
        };
        assert_eq!(
            err.to_string(),
            "Speech synthesis failed for fragment 2: Rate limit exceeded"
        );
        assert_eq!(err.fragment_index(), Some(2));
        assert!(err.source().is_some());
    }

    #[test]
    fn decode_error_names_fragment() {
        let err = PipelineError::Decode {
            index: 3,
            source: DomainError::MalformedPcm {
                byte_len: 3,
                channels: 1,
            },
        };
        assert!(err.to_string().starts_with("Could not decode audio for fragment 3"));
        assert_eq!(err.fragment_index(), Some(3));
    }

    #[test]
    fn assembly_error_with_and_without_index() {
        let mismatch = || DomainError::FormatMismatch {
            expected: PcmFormat::default(),
            found: PcmFormat::new(16_000, 1).unwrap(),
        };

        let with_index = PipelineError::Assembly {
            index: Some(4),
            source: mismatch(),
        };
        assert!(with_index.to_string().starts_with("Audio assembly failed at fragment 4: "));
        assert_eq!(with_index.fragment_index(), Some(4));

        let without_index = PipelineError::Assembly {
            index: None,
            source: mismatch(),
        };
        assert!(without_index.to_string().starts_with("Audio assembly failed: "));
        assert_eq!(without_index.fragment_index(), None);
    }

    #[test]
    fn empty_result_message() {
        let err = PipelineError::EmptyResult { total: 3 };
        assert_eq!(
            err.to_string(),
            "No audio was produced for any of 3 fragment(s)"
        );
        assert!(!err.is_cancelled());
    }

    #[test]
    fn cancelled_is_cancelled() {
        let err = PipelineError::Cancelled {
            completed: 1,
            total: 4,
        };
        assert!(err.is_cancelled());
        assert_eq!(err.fragment_index(), None);
        assert_eq!(err.to_string(), "Narration cancelled after 1 of 4 fragment(s)");
    }
}
