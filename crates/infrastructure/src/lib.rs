//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer and wires up
//! configuration loading and logging.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, ConfigLoadError};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryError, init_telemetry};
