//! Port definitions - Interfaces for external collaborators

mod speech_synthesis_port;

#[cfg(test)]
pub use speech_synthesis_port::MockSpeechSynthesisPort;
pub use speech_synthesis_port::{SpeechSynthesisPort, SynthesisResult};
