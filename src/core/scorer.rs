//! Weighted Scorer: faults + snapshot → overall, safety and technique scores
//!
//! overall   = 100 - Σ(penalty × confidence) + depth bonus
//! safety    = 100 - Σ(penalty × confidence) over CRITICAL faults
//! technique = 100 - 0.7 × Σ(penalty × confidence) over MAJOR and MINOR faults
//!
//! Each score is clamped to [0, 100] and truncated to an integer.

use std::sync::Arc;
use crate::core::FaultCatalog;
use crate::types::{FaultInstance, MetricsSnapshot, ScoreResult, Severity};
use crate::{DEPTH_BONUS, DEPTH_BONUS_KNEE_ANGLE, MAX_FEEDBACK_CUES, MAX_SCORE, TECHNIQUE_PENALTY_WEIGHT};

/// Shown when a frame has nothing to correct
pub const NO_FAULT_FEEDBACK: &str = "Great form! Keep up the excellent work.";

/// Turns detected faults into scores and feedback
#[derive(Debug, Clone)]
pub struct WeightedScorer {
    catalog: Arc<FaultCatalog>,
}

impl Default for WeightedScorer {
    fn default() -> Self {
        Self::new(Arc::new(FaultCatalog::standard()))
    }
}

impl WeightedScorer {
    pub fn new(catalog: Arc<FaultCatalog>) -> Self {
        Self { catalog }
    }

    /// Score one snapshot given the faults detected in it
    pub fn score(&self, snapshot: &MetricsSnapshot, faults: &[FaultInstance]) -> ScoreResult {
        let overall_score = self.overall_score(snapshot, faults);

        ScoreResult {
            overall_score,
            safety_score: self.safety_score(faults),
            technique_score: self.technique_score(faults),
            detected_faults: faults.to_vec(),
            feedback: self.feedback(faults),
            assessment: assessment(overall_score).to_string(),
        }
    }

    pub fn overall_score(&self, snapshot: &MetricsSnapshot, faults: &[FaultInstance]) -> u8 {
        let penalty: f64 = faults.iter().map(FaultInstance::weighted_penalty).sum();
        let bonus = if snapshot.depth_achieved && snapshot.knee_angle < DEPTH_BONUS_KNEE_ANGLE {
            DEPTH_BONUS
        } else {
            0.0
        };
        clamp_score(MAX_SCORE - penalty + bonus)
    }

    pub fn safety_score(&self, faults: &[FaultInstance]) -> u8 {
        let penalty: f64 = faults
            .iter()
            .filter(|fault| counts_against_safety(fault.severity))
            .map(FaultInstance::weighted_penalty)
            .sum();
        clamp_score(MAX_SCORE - penalty)
    }

    pub fn technique_score(&self, faults: &[FaultInstance]) -> u8 {
        let penalty: f64 = faults
            .iter()
            .filter(|fault| !counts_against_safety(fault.severity))
            .map(FaultInstance::weighted_penalty)
            .sum();
        clamp_score(MAX_SCORE - TECHNIQUE_PENALTY_WEIGHT * penalty)
    }

    /// Correction cues in detection order, capped
    fn feedback(&self, faults: &[FaultInstance]) -> Vec<String> {
        if faults.is_empty() {
            return vec![NO_FAULT_FEEDBACK.to_string()];
        }
        faults
            .iter()
            .take(MAX_FEEDBACK_CUES)
            .map(|fault| self.catalog.correction_cue(fault.fault_type).to_string())
            .collect()
    }
}

fn counts_against_safety(severity: Severity) -> bool {
    match severity {
        Severity::Critical => true,
        Severity::Major | Severity::Minor => false,
    }
}

/// Clamp to [0, 100], then truncate
pub(crate) fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, MAX_SCORE) as u8
}

/// Verdict by score band
pub fn assessment(score: u8) -> &'static str {
    match score {
        90..=100 => "Exceptional technique. Excellent movement quality and safety.",
        80..=89 => "Strong performance with minor areas for refinement.",
        70..=79 => "Good foundation with some technical issues to address.",
        60..=69 => "Acceptable form with several improvement opportunities. Prioritize safety and consistency.",
        _ => "Significant form issues detected. Practice with lighter weight or bodyweight.",
    }
}

// =============================================================================
// TESTS
// =============================================================================
