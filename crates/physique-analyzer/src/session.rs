//! Analysis session lifecycle tracking.

use chrono::{DateTime, Utc};
use physique_core::SessionId;
use serde::{Deserialize, Serialize};

/// Lifecycle states for one analysis request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    Uninitialized,
    Initializing,
    Ready,
    Analyzing,
    Completed,
    Failed(String),
}

impl Lifecycle {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Lifecycle::Completed | Lifecycle::Failed(_))
    }
}

/// Mutable state for the request currently owned by the orchestrator.
///
/// Exactly one session is active at a time; a new request replaces the
/// previous session wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSession {
    pub id: SessionId,
    pub lifecycle: Lifecycle,
    pub started_at: DateTime<Utc>,
}

impl AnalysisSession {
    pub fn begin(lifecycle: Lifecycle) -> Self {
        Self {
            id: SessionId::new(),
            lifecycle,
            started_at: Utc::now(),
        }
    }

    pub fn idle() -> Self {
        Self::begin(Lifecycle::Uninitialized)
    }
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::idle()
    }
}
