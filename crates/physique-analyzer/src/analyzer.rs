//! Orchestrator driving the pose source, feature extraction, and scoring.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use physique_analysis::{FeatureSet, RatingEngine, RatingSet, ScoringConfig};
use physique_core::{Error, ImageFrame, Pose, Result, SessionId};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::progress::ProgressEvent;
use crate::session::{AnalysisSession, Lifecycle};
use crate::source::PoseSource;

/// Policy for choosing among multiple detected people.
///
/// Taking the first returned pose is a simplification, not a quality
/// heuristic; the alternatives rank detections explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoseSelection {
    /// First pose in detector order
    First,
    /// Pose with the highest mean keypoint score
    HighestMeanScore,
    /// Pose covering the largest pixel-space bounding box
    LargestExtent,
}

impl PoseSelection {
    pub fn select<'a>(&self, poses: &'a [Pose]) -> Option<&'a Pose> {
        match self {
            PoseSelection::First => poses.first(),
            PoseSelection::HighestMeanScore => poses
                .iter()
                .max_by(|a, b| a.mean_score().total_cmp(&b.mean_score())),
            PoseSelection::LargestExtent => poses
                .iter()
                .max_by(|a, b| a.pixel_extent_area().total_cmp(&b.pixel_extent_area())),
        }
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub selection: PoseSelection,
    pub scoring: ScoringConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            selection: PoseSelection::First,
            scoring: ScoringConfig::default(),
        }
    }
}

/// Packaged outcome of one successful analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub session_id: SessionId,
    pub timestamp: DateTime<Utc>,
    pub ratings: RatingSet,
    pub features: FeatureSet,
    /// How many people the source detected before selection
    pub pose_count: usize,
}

/// Asynchronous physique analyzer.
///
/// Owns the lifecycle state machine wrapping a [`PoseSource`]: explicit
/// initialization, one analysis request at a time, progress callbacks, and
/// the most recent successful report. Construct one per pose source and
/// share it behind an `Arc`; concurrent analysis requests are serialized
/// against the source rather than fanned out.
pub struct PhysiqueAnalyzer {
    source: Arc<dyn PoseSource>,
    engine: RatingEngine,
    selection: PoseSelection,

    initialized: AtomicBool,
    init_lock: Mutex<()>,
    inference_lock: Mutex<()>,

    session: RwLock<AnalysisSession>,
    last_report: RwLock<Option<AnalysisReport>>,
}

impl PhysiqueAnalyzer {
    pub fn new(source: Arc<dyn PoseSource>) -> Self {
        Self::with_config(source, AnalyzerConfig::default())
    }

    pub fn with_config(source: Arc<dyn PoseSource>, config: AnalyzerConfig) -> Self {
        Self {
            source,
            engine: RatingEngine::new(config.scoring),
            selection: config.selection,
            initialized: AtomicBool::new(false),
            init_lock: Mutex::new(()),
            inference_lock: Mutex::new(()),
            session: RwLock::new(AnalysisSession::idle()),
            last_report: RwLock::new(None),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Snapshot of the current session state.
    pub fn session(&self) -> AnalysisSession {
        self.session.read().clone()
    }

    /// Most recent successful report. Survives later failed attempts.
    pub fn latest_report(&self) -> Option<AnalysisReport> {
        self.last_report.read().clone()
    }

    pub fn latest_rating(&self) -> Option<RatingSet> {
        self.last_report.read().as_ref().map(|r| r.ratings)
    }

    /// Bring up the numerical runtime and load the pose-detection model.
    ///
    /// Idempotent: once initialization has succeeded, further calls return
    /// immediately without progress events, and a call racing an in-flight
    /// initialization waits for it instead of loading the model twice. A
    /// failed attempt rolls back to uninitialized so the caller can retry.
    pub async fn initialize<F>(&self, mut on_progress: F) -> Result<()>
    where
        F: FnMut(ProgressEvent) + Send,
    {
        if self.is_initialized() {
            return Ok(());
        }

        let _guard = self.init_lock.lock().await;
        if self.is_initialized() {
            return Ok(());
        }

        self.begin_session(Lifecycle::Initializing);

        on_progress(ProgressEvent::new("Starting numerical runtime...", 10));
        if let Err(err) = self.source.start_runtime().await {
            return Err(self.fail_initialization(err));
        }

        on_progress(ProgressEvent::new("Loading pose detection model...", 30));
        if let Err(err) = self.source.load_model().await {
            return Err(self.fail_initialization(err));
        }

        on_progress(ProgressEvent::new("Models loaded successfully!", 100));
        self.initialized.store(true, Ordering::Release);
        self.mark_session(Lifecycle::Ready);
        tracing::info!("pose estimation pipeline initialized");

        Ok(())
    }

    /// Run the full pose-to-rating pipeline on one photograph.
    ///
    /// Requires a prior successful [`initialize`](Self::initialize); the
    /// terminal progress event of a successful run always reports 100%.
    pub async fn analyze_physique<F>(
        &self,
        image: &ImageFrame,
        mut on_progress: F,
    ) -> Result<RatingSet>
    where
        F: FnMut(ProgressEvent) + Send,
    {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }

        self.begin_session(Lifecycle::Analyzing);

        if !image.has_area() {
            let err = Error::InvalidImage {
                width: image.width,
                height: image.height,
            };
            self.fail_session(&err.to_string());
            return Err(err);
        }

        on_progress(ProgressEvent::new("Detecting pose keypoints...", 20));
        let estimation = {
            let _guard = self.inference_lock.lock().await;
            self.source.estimate_poses(image).await
        };

        let poses = match estimation {
            Ok(poses) => poses,
            Err(err) => {
                // The cause stays in the log; callers get the generic error.
                tracing::error!("pose estimation failed: {}", err);
                self.fail_session(&Error::AnalysisFailed.to_string());
                return Err(Error::AnalysisFailed);
            }
        };

        if poses.is_empty() {
            let err = Error::NoSubjectDetected;
            self.fail_session(&err.to_string());
            return Err(err);
        }

        tracing::debug!("detected {} pose(s)", poses.len());
        let pose = match self.selection.select(&poses) {
            Some(pose) => pose,
            None => {
                self.fail_session(&Error::NoSubjectDetected.to_string());
                return Err(Error::NoSubjectDetected);
            }
        };

        on_progress(ProgressEvent::new("Extracting measurements...", 70));
        let features = FeatureSet::from_pose(pose, image.width, image.height);

        on_progress(ProgressEvent::new("Computing scores...", 90));
        let ratings = self.engine.rate(&features);

        on_progress(ProgressEvent::new("Analysis complete!", 100));
        let session_id = self.mark_session(Lifecycle::Completed);
        *self.last_report.write() = Some(AnalysisReport {
            session_id,
            timestamp: Utc::now(),
            ratings,
            features,
            pose_count: poses.len(),
        });
        tracing::debug!("physique analysis complete: {}", ratings.summary());

        Ok(ratings)
    }

    fn fail_initialization(&self, err: Error) -> Error {
        let cause = cause_message(&err);
        tracing::error!("initialization failed: {}", cause);
        self.fail_session(&cause);
        Error::Initialization(cause)
    }

    fn begin_session(&self, lifecycle: Lifecycle) {
        *self.session.write() = AnalysisSession::begin(lifecycle);
    }

    fn mark_session(&self, lifecycle: Lifecycle) -> SessionId {
        let mut session = self.session.write();
        session.lifecycle = lifecycle;
        session.id
    }

    fn fail_session(&self, reason: &str) {
        self.mark_session(Lifecycle::Failed(reason.to_string()));
    }
}

fn cause_message(err: &Error) -> String {
    match err {
        Error::PoseSource(msg) => msg.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::StaticPoseSource;
    use physique_core::Keypoint;
    use std::sync::atomic::AtomicUsize;

    /// Upright figure centered in a 100x200 frame, every score 1.0.
    fn create_full_pose() -> Pose {
        Pose::new(vec![
            Keypoint::new("nose", 50.0, 20.0, 1.0),
            Keypoint::new("left_shoulder", 30.0, 40.0, 1.0),
            Keypoint::new("right_shoulder", 70.0, 40.0, 1.0),
            Keypoint::new("left_elbow", 25.0, 80.0, 1.0),
            Keypoint::new("right_elbow", 75.0, 80.0, 1.0),
            Keypoint::new("left_wrist", 22.0, 110.0, 1.0),
            Keypoint::new("right_wrist", 78.0, 110.0, 1.0),
            Keypoint::new("left_hip", 40.0, 100.0, 1.0),
            Keypoint::new("right_hip", 60.0, 100.0, 1.0),
            Keypoint::new("left_knee", 38.0, 140.0, 1.0),
            Keypoint::new("right_knee", 62.0, 140.0, 1.0),
            Keypoint::new("left_ankle", 36.0, 180.0, 1.0),
            Keypoint::new("right_ankle", 64.0, 180.0, 1.0),
        ])
    }

    fn create_frame() -> ImageFrame {
        ImageFrame::placeholder(100, 200)
    }

    /// Scriptable source counting lifecycle calls.
    struct CountingSource {
        poses: Vec<Pose>,
        loads: AtomicUsize,
        estimates: AtomicUsize,
        fail_load: AtomicBool,
        fail_estimate: bool,
    }

    impl CountingSource {
        fn with_poses(poses: Vec<Pose>) -> Self {
            Self {
                poses,
                loads: AtomicUsize::new(0),
                estimates: AtomicUsize::new(0),
                fail_load: AtomicBool::new(false),
                fail_estimate: false,
            }
        }

        fn failing_estimate() -> Self {
            Self {
                fail_estimate: true,
                ..Self::with_poses(Vec::new())
            }
        }
    }

    #[async_trait::async_trait]
    impl PoseSource for CountingSource {
        async fn start_runtime(&self) -> Result<()> {
            Ok(())
        }

        async fn load_model(&self) -> Result<()> {
            if self.fail_load.load(Ordering::SeqCst) {
                return Err(Error::PoseSource("model weights unavailable".to_string()));
            }
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn estimate_poses(&self, _image: &ImageFrame) -> Result<Vec<Pose>> {
            self.estimates.fetch_add(1, Ordering::SeqCst);
            if self.fail_estimate {
                return Err(Error::PoseSource("runtime tensor fault".to_string()));
            }
            Ok(self.poses.clone())
        }
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let source = Arc::new(CountingSource::with_poses(vec![create_full_pose()]));
        let analyzer = PhysiqueAnalyzer::new(source.clone());

        let mut first_events = Vec::new();
        analyzer
            .initialize(|event| first_events.push(event))
            .await
            .unwrap();

        let mut second_events = Vec::new();
        analyzer
            .initialize(|event| second_events.push(event))
            .await
            .unwrap();

        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
        assert_eq!(first_events.len(), 3);
        assert!(second_events.is_empty());
        assert_eq!(analyzer.session().lifecycle, Lifecycle::Ready);
    }

    #[tokio::test]
    async fn test_analyze_before_initialize_touches_nothing() {
        let source = Arc::new(CountingSource::with_poses(vec![create_full_pose()]));
        let analyzer = PhysiqueAnalyzer::new(source.clone());

        let result = analyzer.analyze_physique(&create_frame(), |_| {}).await;

        assert!(matches!(result, Err(Error::NotInitialized)));
        assert_eq!(source.estimates.load(Ordering::SeqCst), 0);
        assert_eq!(analyzer.session().lifecycle, Lifecycle::Uninitialized);
    }

    #[tokio::test]
    async fn test_zero_poses_is_no_subject() {
        let analyzer = PhysiqueAnalyzer::new(Arc::new(StaticPoseSource::empty()));
        analyzer.initialize(|_| {}).await.unwrap();

        let result = analyzer.analyze_physique(&create_frame(), |_| {}).await;

        assert!(matches!(result, Err(Error::NoSubjectDetected)));
        assert_eq!(
            result.unwrap_err().to_string(),
            "No person detected in the image"
        );
    }

    #[tokio::test]
    async fn test_source_fault_is_generic_failure() {
        let analyzer = PhysiqueAnalyzer::new(Arc::new(CountingSource::failing_estimate()));
        analyzer.initialize(|_| {}).await.unwrap();

        let result = analyzer.analyze_physique(&create_frame(), |_| {}).await;

        let err = result.unwrap_err();
        assert!(matches!(err, Error::AnalysisFailed));
        // The tensor fault stays out of the user-facing message.
        assert!(!err.to_string().contains("tensor"));
    }

    #[tokio::test]
    async fn test_init_failure_rolls_back_and_retries() {
        let source = Arc::new(CountingSource::with_poses(vec![create_full_pose()]));
        source.fail_load.store(true, Ordering::SeqCst);
        let analyzer = PhysiqueAnalyzer::new(source.clone());

        let err = analyzer.initialize(|_| {}).await.unwrap_err();
        assert!(matches!(err, Error::Initialization(_)));
        assert!(err.to_string().contains("model weights unavailable"));
        assert!(!analyzer.is_initialized());
        assert!(matches!(analyzer.session().lifecycle, Lifecycle::Failed(_)));

        source.fail_load.store(false, Ordering::SeqCst);
        analyzer.initialize(|_| {}).await.unwrap();
        assert!(analyzer.is_initialized());
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_full_pose_maxes_shoulders() {
        let analyzer =
            PhysiqueAnalyzer::new(Arc::new(StaticPoseSource::new(vec![create_full_pose()])));
        analyzer.initialize(|_| {}).await.unwrap();

        let ratings = analyzer
            .analyze_physique(&create_frame(), |_| {})
            .await
            .unwrap();

        // Shoulder span 0.4 tops the expected range; full confidence and
        // level shoulders/hips leave the multipliers at 1.
        assert!((ratings.shoulders - 10.0).abs() < 1e-9);
        assert!((1.0..=10.0).contains(&ratings.overall));
        assert_eq!(analyzer.session().lifecycle, Lifecycle::Completed);

        let report = analyzer.latest_report().unwrap();
        assert_eq!(report.pose_count, 1);
        assert!((report.features.shoulder_width - 0.4).abs() < 1e-10);
    }

    #[tokio::test]
    async fn test_missing_ankles_still_produce_ratings() {
        let mut pose = create_full_pose();
        pose.keypoints
            .retain(|kp| kp.name != "left_ankle" && kp.name != "right_ankle");

        let analyzer = PhysiqueAnalyzer::new(Arc::new(StaticPoseSource::new(vec![pose])));
        analyzer.initialize(|_| {}).await.unwrap();

        let ratings = analyzer
            .analyze_physique(&create_frame(), |_| {})
            .await
            .unwrap();

        // Unmeasured calves pull the legs rating down instead of failing.
        assert!(ratings.legs < ratings.shoulders);
        assert!((1.0..=10.0).contains(&ratings.legs));
    }

    #[tokio::test]
    async fn test_progress_ends_at_full() {
        let analyzer =
            PhysiqueAnalyzer::new(Arc::new(StaticPoseSource::new(vec![create_full_pose()])));
        analyzer.initialize(|_| {}).await.unwrap();

        let mut events = Vec::new();
        analyzer
            .analyze_physique(&create_frame(), |event| events.push(event))
            .await
            .unwrap();

        let last = events.last().unwrap();
        assert_eq!(last.percent, 100);
        assert_eq!(last.step, "Analysis complete!");
        assert!(events.iter().take(events.len() - 1).all(|e| !e.is_terminal()));
    }

    #[tokio::test]
    async fn test_failure_preserves_last_report() {
        let good = Arc::new(StaticPoseSource::new(vec![create_full_pose()]));
        let analyzer = PhysiqueAnalyzer::new(good);
        analyzer.initialize(|_| {}).await.unwrap();

        let ratings = analyzer
            .analyze_physique(&create_frame(), |_| {})
            .await
            .unwrap();

        // Zero-dimension frame fails the next request.
        let result = analyzer
            .analyze_physique(&ImageFrame::new(Vec::new(), 0, 0), |_| {})
            .await;
        assert!(matches!(result, Err(Error::InvalidImage { .. })));
        assert!(matches!(analyzer.session().lifecycle, Lifecycle::Failed(_)));

        assert_eq!(analyzer.latest_rating(), Some(ratings));
    }

    #[test]
    fn test_pose_selection_policies() {
        let faint = Pose::new(vec![
            Keypoint::new("left_shoulder", 10.0, 10.0, 0.2),
            Keypoint::new("right_shoulder", 20.0, 10.0, 0.2),
        ]);
        let confident = Pose::new(vec![
            Keypoint::new("left_shoulder", 40.0, 10.0, 0.9),
            Keypoint::new("right_shoulder", 50.0, 10.0, 0.9),
        ]);
        let wide = Pose::new(vec![
            Keypoint::new("left_shoulder", 0.0, 0.0, 0.5),
            Keypoint::new("right_shoulder", 90.0, 90.0, 0.5),
        ]);
        let poses = vec![faint.clone(), confident.clone(), wide.clone()];

        assert_eq!(PoseSelection::First.select(&poses), Some(&faint));
        assert_eq!(
            PoseSelection::HighestMeanScore.select(&poses),
            Some(&confident)
        );
        assert_eq!(PoseSelection::LargestExtent.select(&poses), Some(&wide));
        assert_eq!(PoseSelection::First.select(&[]), None);
    }
}
