//! Application layer - Use cases and orchestration
//!
//! Contains text segmentation, the speech synthesis port and the narration
//! pipeline that drives a port through decode and assembly.

pub mod error;
pub mod ports;
pub mod services;
pub mod text_segmenter;

pub use error::{ApplicationError, PipelineError};
pub use ports::*;
pub use services::*;
pub use text_segmenter::{DEFAULT_FRAGMENT_CHAR_LIMIT, TextSegmenter};
