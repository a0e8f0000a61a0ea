//! # Physique-Analysis
//!
//! Pure analysis stages of the physique rating pipeline.
//!
//! ## Stages
//!
//! 1. **Features**: one detected pose plus the image dimensions become a
//!    fixed set of normalized geometric measurements (distances, ratios,
//!    symmetry, posture, average confidence).
//! 2. **Scoring**: each measurement is mapped onto a bounded 1-10 rating
//!    through a parameterized curve, then adjusted by confidence weighting
//!    and a symmetry bonus.
//!
//! Both stages are pure functions of their inputs: missing landmarks degrade
//! to zero-valued or default-valued measurements, never to errors.

pub mod features;
pub mod scoring;

pub use features::*;
pub use scoring::*;
