//! Squatform: grading core for squat repetitions
//!
//! Per-frame metrics → fault detection → weighted scoring → sequence and
//! session aggregation.

pub mod config;
pub mod core;
pub mod error;
pub mod telemetry;
pub mod types;

pub use config::{GraderConfig, SkillLevel};
pub use error::{GradingError, Result};

// =============================================================================
// FRAME FAULT THRESHOLDS
// =============================================================================

/// Back angle below which the spine is considered rounded (degrees)
pub const BACK_ANGLE_MIN: f64 = 150.0;

/// Knee/ankle width ratio below which knees are caving in
pub const KNEE_VALGUS_RATIO_MIN: f64 = 0.8;

/// Trunk angle above which the torso leans too far forward (degrees)
pub const TRUNK_ANGLE_MAX: f64 = 45.0;

/// Left/right asymmetry above which movement is uneven
pub const ASYMMETRY_MAX: f64 = 0.15;

/// Measurement confidence must exceed this for gated rules to fire
pub const CONFIDENCE_GATE: f64 = 0.6;

/// Depth rule confidence when the tracker reports none
pub const DEPTH_DEFAULT_CONFIDENCE: f64 = 0.8;

/// Asymmetry rule always reports this confidence
pub const ASYMMETRY_CONFIDENCE: f64 = 0.7;

// =============================================================================
// PENALTY SCALING [multiplier caps and normalizers]
// =============================================================================

pub const BACK_PENALTY_CAP: f64 = 2.0;
pub const BACK_PENALTY_SPAN: f64 = 30.0;

pub const KNEE_PENALTY_CAP: f64 = 1.5;
pub const KNEE_PENALTY_SPAN: f64 = 0.2;

pub const LEAN_PENALTY_CAP: f64 = 1.5;
pub const LEAN_PENALTY_SPAN: f64 = 20.0;

pub const ASYMMETRY_PENALTY_CAP: f64 = 1.3;
pub const ASYMMETRY_PENALTY_SPAN: f64 = 0.1;

/// Shallow squat (knee above this) costs extra
pub const DEPTH_SHALLOW_KNEE_ANGLE: f64 = 110.0;
pub const DEPTH_SHALLOW_MULTIPLIER: f64 = 1.2;

/// Near-miss squat (knee below this) costs less
pub const DEPTH_NEAR_KNEE_ANGLE: f64 = 95.0;
pub const DEPTH_NEAR_MULTIPLIER: f64 = 0.7;

// =============================================================================
// SCORING
// =============================================================================

pub const MAX_SCORE: f64 = 100.0;

/// Bonus for depth achieved below this knee angle
pub const DEPTH_BONUS_KNEE_ANGLE: f64 = 85.0;
pub const DEPTH_BONUS: f64 = 5.0;

/// Technique score counts major/minor penalties at this weight
pub const TECHNIQUE_PENALTY_WEIGHT: f64 = 0.7;

/// Maximum number of correction cues returned per frame
pub const MAX_FEEDBACK_CUES: usize = 3;

// =============================================================================
// ATTEMPT CLASSIFICATION
// =============================================================================

/// Knee angle at or below which depth counts as reached (degrees)
pub const ATTEMPT_DEPTH_KNEE_ANGLE: f64 = 90.0;

/// Stricter valgus limit for invalidating an attempt
pub const SEVERE_VALGUS_RATIO_MIN: f64 = 0.6;

/// Ankle angle below which heels are lifting (degrees)
pub const HEEL_RISE_ANKLE_MIN: f64 = 20.0;

/// Completion score lost per invalid attempt
pub const SAFETY_VIOLATION_PENALTY: u8 = 30;

pub const COMPLETION_NO_DEPTH: u8 = 30;
pub const COMPLETION_FULL: u8 = 100;
pub const COMPLETION_BOTTOM: u8 = 80;
pub const COMPLETION_DESCENDING: u8 = 20;

// =============================================================================
// AGGREGATION
// =============================================================================

/// A fault is persistent when its frame frequency strictly exceeds this
pub const PERSISTENT_FAULT_FREQUENCY: f64 = 0.3;

/// Number of improvement priorities reported per sequence
pub const IMPROVEMENT_PRIORITY_COUNT: usize = 3;

/// Minimum attempts before session trends are reported
pub const TREND_MIN_ATTEMPTS: usize = 5;

// =============================================================================
// SKILL LEVELS
// =============================================================================

/// Fully extended back; back tolerance is measured as deviation from this (degrees)
pub const BACK_ANGLE_STRAIGHT: f64 = 180.0;

/// Knees tracking straight over the ankles
pub const KNEE_VALGUS_RATIO_NEUTRAL: f64 = 1.0;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
