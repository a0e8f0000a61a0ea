//! Planar geometry over normalized image coordinates.
//!
//! Every helper is fail-soft: a missing landmark degrades the measurement
//! instead of raising, so partial pose detections still flow through the
//! pipeline.

use nalgebra::Point2;

use crate::types::NormalizedPoint;

/// Euclidean distance between two landmarks in normalized space.
///
/// A missing endpoint yields exactly 0.0, skewing downstream scores low for
/// the unmeasured region rather than failing the analysis.
pub fn segment_length(a: Option<&NormalizedPoint>, b: Option<&NormalizedPoint>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) => a.distance_to(b),
        _ => 0.0,
    }
}

/// Midpoint of two landmarks. A missing landmark contributes zero
/// coordinates before averaging.
pub fn midpoint(a: Option<&NormalizedPoint>, b: Option<&NormalizedPoint>) -> Point2<f64> {
    let (ax, ay) = a.map(|p| (p.x, p.y)).unwrap_or((0.0, 0.0));
    let (bx, by) = b.map(|p| (p.x, p.y)).unwrap_or((0.0, 0.0));
    Point2::new((ax + bx) / 2.0, (ay + by) / 2.0)
}

/// Distance between the midpoints of two landmark pairs.
pub fn midpoint_distance(
    a1: Option<&NormalizedPoint>,
    a2: Option<&NormalizedPoint>,
    b1: Option<&NormalizedPoint>,
    b2: Option<&NormalizedPoint>,
) -> f64 {
    nalgebra::distance(&midpoint(a1, a2), &midpoint(b1, b2))
}

/// How level a left/right landmark pair sits: `1 - |yL - yR|`, in [0,1]
/// for in-range inputs.
///
/// A missing side is treated as `y = 0`. Known limitation: when both sides
/// are missing at once this reads as perfectly level.
pub fn level_symmetry(left: Option<&NormalizedPoint>, right: Option<&NormalizedPoint>) -> f64 {
    let left_y = left.map(|p| p.y).unwrap_or(0.0);
    let right_y = right.map(|p| p.y).unwrap_or(0.0);
    1.0 - (left_y - right_y).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64) -> NormalizedPoint {
        NormalizedPoint::new(x, y, 1.0)
    }

    #[test]
    fn test_segment_length_fail_soft() {
        let a = point(0.1, 0.2);
        let b = point(0.4, 0.6);
        assert!((segment_length(Some(&a), Some(&b)) - 0.5).abs() < 1e-10);
        assert_eq!(segment_length(Some(&a), None), 0.0);
        assert_eq!(segment_length(None, None), 0.0);
    }

    #[test]
    fn test_midpoint_defaults_missing_to_origin() {
        let a = point(0.4, 0.8);
        let mid = midpoint(Some(&a), None);
        assert!((mid.x - 0.2).abs() < 1e-10);
        assert!((mid.y - 0.4).abs() < 1e-10);
    }

    #[test]
    fn test_midpoint_distance() {
        let ls = point(0.3, 0.2);
        let rs = point(0.7, 0.2);
        let lh = point(0.4, 0.6);
        let rh = point(0.6, 0.6);
        let torso = midpoint_distance(Some(&ls), Some(&rs), Some(&lh), Some(&rh));
        assert!((torso - 0.4).abs() < 1e-10);
    }

    #[test]
    fn test_level_symmetry_policy() {
        let left = point(0.3, 0.42);
        let right = point(0.7, 0.40);
        assert!((level_symmetry(Some(&left), Some(&right)) - 0.98).abs() < 1e-10);

        // Missing side reads as y = 0.
        assert!((level_symmetry(Some(&left), None) - 0.58).abs() < 1e-10);

        // Both sides missing collapses to perfectly level.
        assert_eq!(level_symmetry(None, None), 1.0);
    }
}
