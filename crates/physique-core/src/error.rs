//! Error types for the physique rating pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Model or numerical runtime failed to come up. Carries the underlying
    /// cause; the failed attempt leaves the analyzer uninitialized, so
    /// calling `initialize` again is valid.
    #[error("failed to initialize pose estimation: {0}")]
    Initialization(String),

    /// Analysis was requested before a successful `initialize`.
    #[error("analyzer is not initialized")]
    NotInitialized,

    /// The pose source ran but found nobody in the frame.
    #[error("No person detected in the image")]
    NoSubjectDetected,

    /// Catch-all for runtime faults during analysis. The cause is logged,
    /// never carried in the user-facing message.
    #[error("failed to analyze physique")]
    AnalysisFailed,

    /// Raised by pose-source implementations; converted at the orchestrator
    /// boundary into `Initialization` or `AnalysisFailed`.
    #[error("pose source error: {0}")]
    PoseSource(String),

    #[error("invalid image dimensions: {width}x{height}")]
    InvalidImage { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
