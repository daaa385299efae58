//! Progress value object

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position of a narration run within its fragment list
///
/// `current` is 1-based: the first fragment attempt reports `1/total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Progress {
    current: usize,
    total: usize,
}

impl Progress {
    /// Create a progress value
    ///
    /// `current` is capped at `total`.
    #[must_use]
    pub fn new(current: usize, total: usize) -> Self {
        Self {
            current: current.min(total),
            total,
        }
    }

    /// Index of the fragment being attempted
    #[must_use]
    pub const fn current(&self) -> usize {
        self.current
    }

    /// Number of fragments in the run
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Completed share in `0.0..=1.0`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.current as f64 / self.total as f64
    }

    /// Whether the last fragment has been reached
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.current == self.total
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}
