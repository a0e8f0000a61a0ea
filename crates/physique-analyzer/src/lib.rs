//! # Physique-Analyzer
//!
//! Asynchronous orchestration of the pose-to-rating pipeline: wraps a
//! [`PoseSource`] behind an initialization/analysis state machine, reports
//! progress to the caller, and turns a photograph into a
//! [`physique_analysis::RatingSet`].
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized -> Initializing -> Ready -> Analyzing -> Completed
//!                       |                       |
//!                       +-------> Failed <------+
//! ```
//!
//! `Completed` and `Failed` are terminal for one request; the next request
//! begins a fresh session. A failed initialization rolls back to
//! uninitialized so the caller can retry.

pub mod analyzer;
pub mod progress;
pub mod session;
pub mod source;

pub use analyzer::*;
pub use progress::*;
pub use session::*;
pub use source::*;
