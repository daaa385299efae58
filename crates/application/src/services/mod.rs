//! Application services - Use case implementations

mod cancellation;
mod narration_service;

pub use cancellation::CancellationToken;
pub use narration_service::{
    FragmentOutcome, NarrationConfig, NarrationOutput, NarrationService, NarrationSummary,
};
