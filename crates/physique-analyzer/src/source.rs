//! Boundary contract for pose-detection backends.

use async_trait::async_trait;
use physique_core::{ImageFrame, Pose, Result};

/// Contract the pipeline requires of a pose-detection backend.
///
/// An implementation owns the loaded model weights as process-wide state:
/// `start_runtime` and `load_model` are driven once by the orchestrator,
/// which also serializes `estimate_poses` calls so at most one inference is
/// in flight against the backend at a time.
#[async_trait]
pub trait PoseSource: Send + Sync {
    /// Bring up the numerical runtime backing the model.
    async fn start_runtime(&self) -> Result<()>;

    /// Load the pose-detection model weights.
    async fn load_model(&self) -> Result<()>;

    /// Detect zero or more people in the supplied image, each as a set of
    /// named keypoints with per-point scores in [0,1].
    async fn estimate_poses(&self, image: &ImageFrame) -> Result<Vec<Pose>>;
}

/// Source returning fixed poses, for tests and wiring demos.
pub struct StaticPoseSource {
    poses: Vec<Pose>,
}

impl StaticPoseSource {
    pub fn new(poses: Vec<Pose>) -> Self {
        Self { poses }
    }

    /// Source that never detects anybody.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl PoseSource for StaticPoseSource {
    async fn start_runtime(&self) -> Result<()> {
        Ok(())
    }

    async fn load_model(&self) -> Result<()> {
        Ok(())
    }

    async fn estimate_poses(&self, _image: &ImageFrame) -> Result<Vec<Pose>> {
        Ok(self.poses.clone())
    }
}
