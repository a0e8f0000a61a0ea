//! Scoring engine mapping geometric features onto 1-10 physique ratings.
//!
//! ## Rating model
//!
//! | Group | Feature | Expected range | Steepness |
//! |-----------|----------------------------------|----------------|-----------|
//! | Biceps | mean upper-arm length proxy | 0.10-0.30 | 1.5 |
//! | Shoulders | shoulder width | 0.15-0.40 | 1.2 |
//! | Chest | shoulder/hip span ratio | 1.1-1.6 | 1.3 |
//! | Back | posture blended with shoulders | 0.5-1.0 | 2.0 |
//! | Legs | mean thigh/calf segment length | 0.20-0.50 | 1.4 |
//! | Core | inverse hip/shoulder width ratio | 1.1-2.0 | 1.3 |
//!
//! Every group is damped by the average detection confidence (floored at
//! 0.7); biceps and shoulders additionally earn a symmetry bonus, the only
//! groups where left/right level symmetry is meaningful.

use serde::{Deserialize, Serialize};

use crate::features::FeatureSet;

/// Curve mapping a raw measurement onto the 1-10 rating scale.
///
/// The value is normalized against the expected range, raised to the
/// steepness exponent (steepness above 1 compresses mid-range values toward
/// the extremes), and rescaled to land in [1,10] by construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCurve {
    pub min_expected: f64,
    pub max_expected: f64,
    pub steepness: f64,
}

impl ScoreCurve {
    pub const fn new(min_expected: f64, max_expected: f64, steepness: f64) -> Self {
        Self {
            min_expected,
            max_expected,
            steepness,
        }
    }

    pub fn score(&self, value: f64) -> f64 {
        let normalized = ((value - self.min_expected) / (self.max_expected - self.min_expected))
            .clamp(0.0, 1.0);
        1.0 + normalized.powf(self.steepness) * 9.0
    }
}

/// Tuned scoring parameters. These are configuration, not derived values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub biceps: ScoreCurve,
    pub shoulders: ScoreCurve,
    pub chest: ScoreCurve,
    /// Posture component blended 50/50 with the shoulders score for back
    pub posture: ScoreCurve,
    pub legs: ScoreCurve,
    pub core: ScoreCurve,

    /// Lower bound on the confidence multiplier; detection confidence can
    /// only ever dampen a score down to this fraction, never below
    pub confidence_floor: f64,
    /// Share of the paired-limb multiplier driven by the symmetry bonus
    pub symmetry_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            biceps: ScoreCurve::new(0.10, 0.30, 1.5),
            shoulders: ScoreCurve::new(0.15, 0.40, 1.2),
            chest: ScoreCurve::new(1.1, 1.6, 1.3),
            posture: ScoreCurve::new(0.5, 1.0, 2.0),
            legs: ScoreCurve::new(0.20, 0.50, 1.4),
            core: ScoreCurve::new(1.1, 2.0, 1.3),
            confidence_floor: 0.7,
            symmetry_weight: 0.2,
        }
    }
}

/// Muscle groups rated by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MuscleGroup {
    Biceps,
    Shoulders,
    Chest,
    Back,
    Legs,
    Core,
}

impl MuscleGroup {
    pub const ALL: [MuscleGroup; 6] = [
        MuscleGroup::Biceps,
        MuscleGroup::Shoulders,
        MuscleGroup::Chest,
        MuscleGroup::Back,
        MuscleGroup::Legs,
        MuscleGroup::Core,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MuscleGroup::Biceps => "Biceps",
            MuscleGroup::Shoulders => "Shoulders",
            MuscleGroup::Chest => "Chest",
            MuscleGroup::Back => "Back",
            MuscleGroup::Legs => "Legs",
            MuscleGroup::Core => "Core",
        }
    }
}

/// Descriptive tier for a rating value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatingTier {
    Excellent,
    Good,
    Average,
    BelowAverage,
    NeedsWork,
}

impl RatingTier {
    pub fn from_rating(rating: f64) -> Self {
        if rating >= 9.0 {
            RatingTier::Excellent
        } else if rating >= 7.0 {
            RatingTier::Good
        } else if rating >= 5.0 {
            RatingTier::Average
        } else if rating >= 3.0 {
            RatingTier::BelowAverage
        } else {
            RatingTier::NeedsWork
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RatingTier::Excellent => "Excellent",
            RatingTier::Good => "Good",
            RatingTier::Average => "Average",
            RatingTier::BelowAverage => "Below Average",
            RatingTier::NeedsWork => "Needs Work",
        }
    }
}

/// Per-muscle-group physique ratings on a 1-10 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSet {
    pub biceps: f64,
    pub shoulders: f64,
    pub chest: f64,
    pub back: f64,
    pub legs: f64,
    pub core: f64,
    /// Mean of the six group ratings, itself clamped to [1,10]
    pub overall: f64,
}

impl RatingSet {
    pub fn new(biceps: f64, shoulders: f64, chest: f64, back: f64, legs: f64, core: f64) -> Self {
        let biceps = biceps.clamp(1.0, 10.0);
        let shoulders = shoulders.clamp(1.0, 10.0);
        let chest = chest.clamp(1.0, 10.0);
        let back = back.clamp(1.0, 10.0);
        let legs = legs.clamp(1.0, 10.0);
        let core = core.clamp(1.0, 10.0);

        let overall =
            ((biceps + shoulders + chest + back + legs + core) / 6.0).clamp(1.0, 10.0);

        Self {
            biceps,
            shoulders,
            chest,
            back,
            legs,
            core,
            overall,
        }
    }

    pub fn group(&self, group: MuscleGroup) -> f64 {
        match group {
            MuscleGroup::Biceps => self.biceps,
            MuscleGroup::Shoulders => self.shoulders,
            MuscleGroup::Chest => self.chest,
            MuscleGroup::Back => self.back,
            MuscleGroup::Legs => self.legs,
            MuscleGroup::Core => self.core,
        }
    }

    /// Highest-rated muscle group.
    pub fn strongest(&self) -> MuscleGroup {
        MuscleGroup::ALL
            .into_iter()
            .max_by(|a, b| self.group(*a).total_cmp(&self.group(*b)))
            .unwrap_or(MuscleGroup::Biceps)
    }

    /// Lowest-rated muscle group.
    pub fn weakest(&self) -> MuscleGroup {
        MuscleGroup::ALL
            .into_iter()
            .min_by(|a, b| self.group(*a).total_cmp(&self.group(*b)))
            .unwrap_or(MuscleGroup::Biceps)
    }

    pub fn tier(&self) -> RatingTier {
        RatingTier::from_rating(self.overall)
    }

    /// Textual summary of the rating set.
    pub fn summary(&self) -> String {
        format!(
            "Overall: {:.1} ({}) | Strongest: {} {:.1} | Weakest: {} {:.1}",
            self.overall,
            self.tier().label(),
            self.strongest().name(),
            self.group(self.strongest()),
            self.weakest().name(),
            self.group(self.weakest()),
        )
    }

    pub fn to_vector(&self) -> [f64; 6] {
        [
            self.biceps,
            self.shoulders,
            self.chest,
            self.back,
            self.legs,
            self.core,
        ]
    }
}

/// Rating engine applying the scoring configuration to a feature set
pub struct RatingEngine {
    config: ScoringConfig,
}

impl RatingEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Map a feature set onto the six group ratings plus overall.
    pub fn rate(&self, features: &FeatureSet) -> RatingSet {
        let biceps = self
            .config
            .biceps
            .score((features.left_arm_thickness + features.right_arm_thickness) / 2.0);

        let shoulders = self.config.shoulders.score(features.shoulder_width);

        let chest = self.config.chest.score(features.chest_to_hip_ratio);

        // Back quality is posture blended with shoulder development, not an
        // independent measurement.
        let back = (self.config.posture.score(features.posture) + shoulders) / 2.0;

        let legs = self.config.legs.score(
            (features.left_thigh_length
                + features.right_thigh_length
                + features.left_calf_length
                + features.right_calf_length)
                / 4.0,
        );

        // Relatively narrower hips score higher. An unmeasured hip span
        // collapses the ratio to 0.0 and the score to the range minimum.
        let waist_ratio = if features.hip_width > 0.0 {
            features.shoulder_width / features.hip_width
        } else {
            0.0
        };
        let core = self.config.core.score(waist_ratio);

        let confidence = features
            .average_confidence
            .max(self.config.confidence_floor);
        let symmetry_bonus = (features.shoulder_symmetry + features.hip_symmetry) / 2.0;
        let paired = confidence
            * ((1.0 - self.config.symmetry_weight) + symmetry_bonus * self.config.symmetry_weight);

        RatingSet::new(
            biceps * paired,
            shoulders * paired,
            chest * confidence,
            back * confidence,
            legs * confidence,
            core * confidence,
        )
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }
}

impl Default for RatingEngine {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
