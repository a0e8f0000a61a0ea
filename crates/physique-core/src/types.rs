//! Fundamental types for the physique rating pipeline.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one analysis session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Decoded raster image supplied by the caller.
///
/// The pipeline never decodes, resizes, or validates image formats; it only
/// needs the pixel dimensions to normalize keypoint coordinates. Pixel data
/// is tightly packed RGB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFrame {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageFrame {
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }

    /// Neutral gray frame, used by collaborators when upstream decoding
    /// fails and a stand-in image is passed through instead of an error.
    pub fn placeholder(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize * 3;
        Self {
            pixels: vec![0x80; len],
            width,
            height,
        }
    }

    pub fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Body landmarks consumed by the pipeline (MoveNet naming)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Landmark {
    Nose,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl Landmark {
    pub const COUNT: usize = 13;

    pub const ALL: [Landmark; Landmark::COUNT] = [
        Landmark::Nose,
        Landmark::LeftShoulder,
        Landmark::RightShoulder,
        Landmark::LeftElbow,
        Landmark::RightElbow,
        Landmark::LeftWrist,
        Landmark::RightWrist,
        Landmark::LeftHip,
        Landmark::RightHip,
        Landmark::LeftKnee,
        Landmark::RightKnee,
        Landmark::LeftAnkle,
        Landmark::RightAnkle,
    ];

    /// Parse a detector-reported landmark name. Names outside the consumed
    /// set (eyes, ears, ...) return `None` and are ignored upstream.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "nose" => Some(Self::Nose),
            "left_shoulder" => Some(Self::LeftShoulder),
            "right_shoulder" => Some(Self::RightShoulder),
            "left_elbow" => Some(Self::LeftElbow),
            "right_elbow" => Some(Self::RightElbow),
            "left_wrist" => Some(Self::LeftWrist),
            "right_wrist" => Some(Self::RightWrist),
            "left_hip" => Some(Self::LeftHip),
            "right_hip" => Some(Self::RightHip),
            "left_knee" => Some(Self::LeftKnee),
            "right_knee" => Some(Self::RightKnee),
            "left_ankle" => Some(Self::LeftAnkle),
            "right_ankle" => Some(Self::RightAnkle),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Raw keypoint as reported by a pose source, in pixel coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub score: f64,
}

impl Keypoint {
    pub fn new(name: impl Into<String>, x: f64, y: f64, score: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            score,
        }
    }
}

/// Full set of detected keypoints for one person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
}

impl Pose {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }

    /// First keypoint matching the given landmark, if detected.
    pub fn find(&self, landmark: Landmark) -> Option<&Keypoint> {
        self.keypoints
            .iter()
            .find(|kp| kp.name == landmark.name())
    }

    /// Mean detection score over every reported keypoint, including names
    /// the pipeline does not consume.
    pub fn mean_score(&self) -> f64 {
        if self.keypoints.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.keypoints.iter().map(|kp| kp.score).sum();
        sum / self.keypoints.len() as f64
    }

    /// Area of the pixel-space bounding box covering every keypoint.
    pub fn pixel_extent_area(&self) -> f64 {
        if self.keypoints.is_empty() {
            return 0.0;
        }

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for kp in &self.keypoints {
            min_x = min_x.min(kp.x);
            min_y = min_y.min(kp.y);
            max_x = max_x.max(kp.x);
            max_y = max_y.max(kp.y);
        }

        (max_x - min_x) * (max_y - min_y)
    }
}

/// Landmark position in normalized image coordinates.
///
/// Both coordinates are fractions of the image dimensions, so a value lies
/// in [0,1] regardless of resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
    pub confidence: f64,
}

impl NormalizedPoint {
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self { x, y, confidence }
    }

    pub fn to_point2(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn distance_to(&self, other: &Self) -> f64 {
        nalgebra::distance(&self.to_point2(), &other.to_point2())
    }
}
