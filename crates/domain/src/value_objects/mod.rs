//! Value Objects - Immutable, identity-less domain primitives

mod pcm_format;
mod pipeline_state;
mod progress;
mod voice_name;

pub use pcm_format::PcmFormat;
pub use pipeline_state::PipelineState;
pub use progress::Progress;
pub use voice_name::{VoiceGender, VoiceName};
