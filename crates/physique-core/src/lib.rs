//! # Physique-Core
//!
//! Core types and utilities for the photo-to-physique-rating pipeline:
//! raw pose keypoints, normalized landmark coordinates, image frames, and
//! the shared error taxonomy.

pub mod error;
pub mod geometry;
pub mod types;

pub use error::{Error, Result};
pub use geometry::*;
pub use types::*;
