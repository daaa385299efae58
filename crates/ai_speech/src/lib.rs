//! AI Speech - hosted text-to-speech for narration
//!
//! `TextToSpeech` is the seam between the narration pipeline and a speech
//! backend. `GeminiSpeechProvider` talks to the Gemini `generateContent`
//! endpoint and hands back the raw 16-bit PCM it returns, already
//! base64-decoded. Decoding PCM into samples happens downstream.
//!
//! ```ignore
//! use ai_speech::{GeminiSpeechProvider, SpeechConfig, TextToSpeech};
//!
//! let provider = GeminiSpeechProvider::new(SpeechConfig {
//!     api_key: Some(key),
//!     ..Default::default()
//! })?;
//! let audio = provider.synthesize("Chapter one.", Some("Charon")).await?;
//! println!("{} bytes at {:?} Hz", audio.size_bytes(), audio.sample_rate());
//! ```

pub mod config;
pub mod error;
pub mod ports;
pub mod providers;
pub mod types;

pub use config::SpeechConfig;
pub use error::SpeechError;
pub use ports::TextToSpeech;
pub use providers::gemini::GeminiSpeechProvider;
pub use types::{AudioData, VoiceInfo};
