//! Speech synthesis provider implementations
//!
//! Contains concrete implementations of the `TextToSpeech` trait.

pub mod gemini;

pub use gemini::GeminiSpeechProvider;
