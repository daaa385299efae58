//! Domain layer for Narrator
//!
//! Contains the value objects, entities and pure audio codec that the
//! narration pipeline is built from. This layer performs no I/O.

pub mod audio;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use audio::{AssembledAudio, AudioAssembler, AudioSegment, PcmDecoder, WavEncoder};
pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
