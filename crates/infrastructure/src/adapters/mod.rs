//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod speech_adapter;

pub use speech_adapter::SpeechAdapter;
