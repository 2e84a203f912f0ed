//! Attempt Classifier: completion and validity of one attempt
//!
//! Completion ("moved far enough") and validity ("moved safely") are decided
//! independently. Safety violations invalidate an attempt and cost completion
//! points but never change whether it counts as complete.

use std::sync::Arc;
use tracing::debug;
use crate::config::ClassifierThresholds;
use crate::core::FaultCatalog;
use crate::types::{AttemptStatus, FaultInstance, FaultType, MetricsSnapshot, Phase};
use crate::{COMPLETION_BOTTOM, COMPLETION_DESCENDING, COMPLETION_FULL, COMPLETION_NO_DEPTH};

/// Classifies attempts from the deepest snapshot and the phase reached
#[derive(Debug, Clone)]
pub struct AttemptClassifier {
    catalog: Arc<FaultCatalog>,
    thresholds: ClassifierThresholds,
}

impl Default for AttemptClassifier {
    fn default() -> Self {
        Self::new(Arc::new(FaultCatalog::standard()), ClassifierThresholds::default())
    }
}

impl AttemptClassifier {
    pub fn new(catalog: Arc<FaultCatalog>, thresholds: ClassifierThresholds) -> Self {
        Self { catalog, thresholds }
    }

    /// Classify with a raw phase tag from the workout state machine
    pub fn classify_tag(&self, snapshot: &MetricsSnapshot, tag: &str) -> AttemptStatus {
        self.classify(snapshot, Phase::from_tag(tag))
    }

    /// Classify one attempt. `None` means the phase tag was not recognised.
    pub fn classify(&self, snapshot: &MetricsSnapshot, phase: Option<Phase>) -> AttemptStatus {
        let depth_reached =
            snapshot.depth_achieved || snapshot.knee_angle <= self.thresholds.depth_knee_angle;

        let mut completion_score = if !depth_reached {
            COMPLETION_NO_DEPTH
        } else {
            match phase {
                Some(Phase::Ascending | Phase::Top) => COMPLETION_FULL,
                Some(Phase::Bottom) => COMPLETION_BOTTOM,
                Some(Phase::Descending) => COMPLETION_DESCENDING,
                None => 0,
            }
        };

        let is_complete = depth_reached && phase.is_some_and(|p| p.is_past_bottom());

        let mut failure_reasons = Vec::new();
        if !depth_reached {
            failure_reasons.push(FaultType::PartialRangeOfMotion);
        } else if !is_complete {
            failure_reasons.push(FaultType::IncompleteAttempt);
        }

        let violations = self.safety_violations(snapshot);
        let is_valid = violations.is_empty();
        if !is_valid {
            completion_score = completion_score.saturating_sub(self.thresholds.safety_penalty);
            failure_reasons.extend(violations);
        }

        debug!(
            ?phase,
            depth_reached,
            is_complete,
            is_valid,
            completion_score,
            "attempt classified"
        );

        AttemptStatus {
            is_complete,
            is_valid,
            failure_reasons,
            completion_score,
            phase_reached: phase,
        }
    }

    /// Safety checks in fixed order: back, severe valgus, heel rise
    fn safety_violations(&self, snapshot: &MetricsSnapshot) -> Vec<FaultType> {
        let t = &self.thresholds;
        let mut violations = Vec::new();
        if snapshot.back_angle < t.back_angle_min {
            violations.push(FaultType::BackRounding);
        }
        if snapshot.knee_valgus_ratio < t.severe_valgus_ratio_min {
            violations.push(FaultType::SevereKneeValgus);
        }
        if snapshot.ankle_angle < t.heel_rise_ankle_min {
            violations.push(FaultType::HeelRise);
        }
        violations
    }

    /// Fault instances for an attempt's failure reasons, at base penalty
    pub fn attempt_faults(&self, status: &AttemptStatus) -> Vec<FaultInstance> {
        status
            .failure_reasons
            .iter()
            .map(|&fault| self.catalog.instantiate_fixed(fault))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
