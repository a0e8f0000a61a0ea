//! Progress reporting for long-running pipeline stages.

use serde::{Deserialize, Serialize};

/// Progress event emitted ahead of each pipeline stage.
///
/// Percentages are not guaranteed to be evenly spaced or monotonically
/// increasing across calls; the terminal event of a successful operation
/// always reports 100. Callbacks receiving these events must not panic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub step: String,
    pub percent: u8,
}

impl ProgressEvent {
    pub fn new(step: impl Into<String>, percent: u8) -> Self {
        Self {
            step: step.into(),
            percent: percent.min(100),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.percent == 100
    }
}
