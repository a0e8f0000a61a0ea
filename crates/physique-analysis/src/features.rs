//! Geometric feature extraction from detected pose keypoints.

use physique_core::{
    level_symmetry, midpoint, midpoint_distance, segment_length, Landmark, NormalizedPoint, Pose,
};
use serde::{Deserialize, Serialize};

/// Normalized geometric measurements for one detected pose.
///
/// Distances are computed in normalized [0,1] coordinate space; symmetry and
/// posture values lie in [0,1] for in-range inputs. Computed once per
/// analysis and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Shoulder-to-shoulder span
    pub shoulder_width: f64,
    /// Upper-arm length proxies for bicep development
    pub left_arm_thickness: f64,
    pub right_arm_thickness: f64,
    /// Shoulder span over hip span; 0.0 when the hip span is unmeasured
    pub chest_to_hip_ratio: f64,
    pub hip_width: f64,
    pub left_thigh_length: f64,
    pub right_thigh_length: f64,
    pub left_calf_length: f64,
    pub right_calf_length: f64,
    /// Shoulder midpoint to hip midpoint
    pub torso_length: f64,
    pub shoulder_symmetry: f64,
    pub hip_symmetry: f64,
    /// Blend of level shoulders, level hips, and spinal alignment
    pub posture: f64,
    /// Mean detection score over every keypoint the source reported
    pub average_confidence: f64,
}

impl FeatureSet {
    /// Extract all measurements from a detected pose.
    ///
    /// Image dimensions must be positive; keypoint pixel coordinates are
    /// divided by them to get resolution-independent values. Landmarks
    /// absent from the pose degrade the affected measurements to zero
    /// rather than failing.
    pub fn from_pose(pose: &Pose, image_width: u32, image_height: u32) -> Self {
        let map = LandmarkMap::from_pose(pose, image_width, image_height);

        let nose = map.get(Landmark::Nose);
        let left_shoulder = map.get(Landmark::LeftShoulder);
        let right_shoulder = map.get(Landmark::RightShoulder);
        let left_elbow = map.get(Landmark::LeftElbow);
        let right_elbow = map.get(Landmark::RightElbow);
        let left_hip = map.get(Landmark::LeftHip);
        let right_hip = map.get(Landmark::RightHip);
        let left_knee = map.get(Landmark::LeftKnee);
        let right_knee = map.get(Landmark::RightKnee);
        let left_ankle = map.get(Landmark::LeftAnkle);
        let right_ankle = map.get(Landmark::RightAnkle);

        let shoulder_width = segment_length(left_shoulder, right_shoulder);
        let hip_width = segment_length(left_hip, right_hip);

        // An unmeasured hip span would divide by zero; the ratio collapses
        // to 0.0 so the chest score clamps to the range minimum.
        let chest_to_hip_ratio = if hip_width > 0.0 {
            shoulder_width / hip_width
        } else {
            0.0
        };

        Self {
            shoulder_width,
            left_arm_thickness: segment_length(left_shoulder, left_elbow),
            right_arm_thickness: segment_length(right_shoulder, right_elbow),
            chest_to_hip_ratio,
            hip_width,
            left_thigh_length: segment_length(left_hip, left_knee),
            right_thigh_length: segment_length(right_hip, right_knee),
            left_calf_length: segment_length(left_knee, left_ankle),
            right_calf_length: segment_length(right_knee, right_ankle),
            torso_length: midpoint_distance(left_shoulder, right_shoulder, left_hip, right_hip),
            shoulder_symmetry: level_symmetry(left_shoulder, right_shoulder),
            hip_symmetry: level_symmetry(left_hip, right_hip),
            posture: posture_score(nose, left_shoulder, right_shoulder, left_hip, right_hip),
            average_confidence: pose.mean_score(),
        }
    }

    /// Convert to a flat feature vector.
    pub fn to_feature_vector(&self) -> Vec<f64> {
        vec![
            self.shoulder_width,
            self.left_arm_thickness,
            self.right_arm_thickness,
            self.chest_to_hip_ratio,
            self.hip_width,
            self.left_thigh_length,
            self.right_thigh_length,
            self.left_calf_length,
            self.right_calf_length,
            self.torso_length,
            self.shoulder_symmetry,
            self.hip_symmetry,
            self.posture,
            self.average_confidence,
        ]
    }

    /// Names for the feature vector, in vector order.
    pub fn feature_names() -> Vec<&'static str> {
        vec![
            "shoulder_width",
            "left_arm_thickness",
            "right_arm_thickness",
            "chest_to_hip_ratio",
            "hip_width",
            "left_thigh_length",
            "right_thigh_length",
            "left_calf_length",
            "right_calf_length",
            "torso_length",
            "shoulder_symmetry",
            "hip_symmetry",
            "posture",
            "average_confidence",
        ]
    }
}

/// Typed lookup from landmark to its normalized detection, if any.
struct LandmarkMap {
    points: [Option<NormalizedPoint>; Landmark::COUNT],
}

impl LandmarkMap {
    /// Keypoints with names outside the consumed set are skipped; duplicate
    /// names resolve first-wins, matching detector output order.
    fn from_pose(pose: &Pose, image_width: u32, image_height: u32) -> Self {
        let w = f64::from(image_width);
        let h = f64::from(image_height);

        let mut points = [None; Landmark::COUNT];
        for kp in &pose.keypoints {
            if let Some(landmark) = Landmark::from_name(&kp.name) {
                let slot = &mut points[landmark.index()];
                if slot.is_none() {
                    *slot = Some(NormalizedPoint::new(kp.x / w, kp.y / h, kp.score));
                }
            }
        }

        Self { points }
    }

    fn get(&self, landmark: Landmark) -> Option<&NormalizedPoint> {
        self.points[landmark.index()].as_ref()
    }
}

/// Posture proxy: mean of level shoulders, level hips, and nose-over-hips
/// spinal alignment. Falls back to a neutral 0.5 when the nose or either
/// pair is missing.
fn posture_score(
    nose: Option<&NormalizedPoint>,
    left_shoulder: Option<&NormalizedPoint>,
    right_shoulder: Option<&NormalizedPoint>,
    left_hip: Option<&NormalizedPoint>,
    right_hip: Option<&NormalizedPoint>,
) -> f64 {
    match (nose, left_shoulder, right_shoulder, left_hip, right_hip) {
        (Some(nose), Some(ls), Some(rs), Some(lh), Some(rh)) => {
            let shoulder_level = 1.0 - (ls.y - rs.y).abs();
            let hip_level = 1.0 - (lh.y - rh.y).abs();
            let hip_center = midpoint(Some(lh), Some(rh));
            let spine_alignment = 1.0 - (nose.x - hip_center.x).abs();
            (shoulder_level + hip_level + spine_alignment) / 3.0
        }
        _ => 0.5,
    }
}
