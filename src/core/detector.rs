//! Frame Fault Detector: five threshold rules over one snapshot
//!
//! Rules run in a fixed order so feedback order is deterministic:
//! 1. Back safety    - back angle below limit, confidence gated
//! 2. Knee tracking  - valgus ratio below limit, confidence gated
//! 3. Depth          - depth not achieved, default confidence
//! 4. Forward lean   - trunk angle above limit, confidence gated
//! 5. Asymmetry      - asymmetry above limit, fixed confidence
//!
//! A gated rule whose measurement confidence is at or below the gate is
//! suppressed, not reported as an error.

use std::sync::Arc;
use tracing::trace;
use crate::config::DetectorThresholds;
use crate::core::FaultCatalog;
use crate::types::{
    FaultInstance, FaultType, MetricsSnapshot, CONF_BACK_ANGLE, CONF_DEPTH, CONF_KNEE_VALGUS,
    CONF_TRUNK_ANGLE,
};
use crate::{
    ASYMMETRY_PENALTY_SPAN, BACK_PENALTY_SPAN, DEPTH_NEAR_KNEE_ANGLE, DEPTH_NEAR_MULTIPLIER,
    DEPTH_SHALLOW_KNEE_ANGLE, DEPTH_SHALLOW_MULTIPLIER, KNEE_PENALTY_SPAN, LEAN_PENALTY_SPAN,
};

/// Applies the per-frame fault rules
#[derive(Debug, Clone)]
pub struct FrameFaultDetector {
    catalog: Arc<FaultCatalog>,
    thresholds: DetectorThresholds,
}

impl Default for FrameFaultDetector {
    fn default() -> Self {
        Self::new(Arc::new(FaultCatalog::standard()), DetectorThresholds::default())
    }
}

impl FrameFaultDetector {
    pub fn new(catalog: Arc<FaultCatalog>, thresholds: DetectorThresholds) -> Self {
        Self { catalog, thresholds }
    }

    pub fn catalog(&self) -> &Arc<FaultCatalog> {
        &self.catalog
    }

    pub fn thresholds(&self) -> &DetectorThresholds {
        &self.thresholds
    }

    /// Evaluate every rule against one snapshot
    pub fn detect(&self, snapshot: &MetricsSnapshot) -> Vec<FaultInstance> {
        [
            self.check_back(snapshot),
            self.check_knee_tracking(snapshot),
            self.check_depth(snapshot),
            self.check_forward_lean(snapshot),
            self.check_asymmetry(snapshot),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn check_back(&self, snapshot: &MetricsSnapshot) -> Option<FaultInstance> {
        let t = &self.thresholds;
        if snapshot.back_angle >= t.back_angle_min {
            return None;
        }
        let confidence = self.gated_confidence(snapshot, CONF_BACK_ANGLE, FaultType::BackRounding)?;
        let multiplier = (t.back_angle_min - snapshot.back_angle) / BACK_PENALTY_SPAN;

        Some(self.catalog.instantiate(
            FaultType::BackRounding,
            confidence,
            multiplier,
            t.back_penalty_cap,
            Some(snapshot.back_angle),
        ))
    }

    fn check_knee_tracking(&self, snapshot: &MetricsSnapshot) -> Option<FaultInstance> {
        let t = &self.thresholds;
        if snapshot.knee_valgus_ratio >= t.knee_valgus_ratio_min {
            return None;
        }
        let confidence = self.gated_confidence(snapshot, CONF_KNEE_VALGUS, FaultType::KneeValgus)?;
        let multiplier = (t.knee_valgus_ratio_min - snapshot.knee_valgus_ratio) / KNEE_PENALTY_SPAN;

        Some(self.catalog.instantiate(
            FaultType::KneeValgus,
            confidence,
            multiplier,
            t.knee_penalty_cap,
            Some(snapshot.knee_valgus_ratio),
        ))
    }

    fn check_depth(&self, snapshot: &MetricsSnapshot) -> Option<FaultInstance> {
        if snapshot.depth_achieved {
            return None;
        }
        let confidence = snapshot
            .confidence(CONF_DEPTH)
            .unwrap_or(self.thresholds.depth_default_confidence);

        let multiplier = if snapshot.knee_angle > DEPTH_SHALLOW_KNEE_ANGLE {
            DEPTH_SHALLOW_MULTIPLIER
        } else if snapshot.knee_angle < DEPTH_NEAR_KNEE_ANGLE {
            DEPTH_NEAR_MULTIPLIER
        } else {
            1.0
        };

        Some(self.catalog.instantiate(
            FaultType::InsufficientDepth,
            confidence,
            multiplier,
            f64::INFINITY,
            Some(snapshot.knee_angle),
        ))
    }

    fn check_forward_lean(&self, snapshot: &MetricsSnapshot) -> Option<FaultInstance> {
        let t = &self.thresholds;
        if snapshot.trunk_angle <= t.trunk_angle_max {
            return None;
        }
        let confidence = self.gated_confidence(snapshot, CONF_TRUNK_ANGLE, FaultType::ForwardLean)?;
        let multiplier = (snapshot.trunk_angle - t.trunk_angle_max) / LEAN_PENALTY_SPAN;

        Some(self.catalog.instantiate(
            FaultType::ForwardLean,
            confidence,
            multiplier,
            t.lean_penalty_cap,
            Some(snapshot.trunk_angle),
        ))
    }

    fn check_asymmetry(&self, snapshot: &MetricsSnapshot) -> Option<FaultInstance> {
        let t = &self.thresholds;
        if snapshot.asymmetry_score <= t.asymmetry_max {
            return None;
        }
        let multiplier = (snapshot.asymmetry_score - t.asymmetry_max) / ASYMMETRY_PENALTY_SPAN;

        Some(self.catalog.instantiate(
            FaultType::AsymmetricMovement,
            t.asymmetry_confidence,
            multiplier,
            t.asymmetry_penalty_cap,
            Some(snapshot.asymmetry_score),
        ))
    }

    /// Confidence for a gated rule, `None` when too low to trust
    fn gated_confidence(&self, snapshot: &MetricsSnapshot, key: &str, fault: FaultType) -> Option<f64> {
        let confidence = snapshot.confidence_or_zero(key);
        if confidence > self.thresholds.confidence_gate {
            Some(confidence)
        } else {
            trace!(fault = fault.code(), confidence, "fault suppressed by confidence gate");
            None
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn clean() -> MetricsSnapshot {
        MetricsSnapshot {
            knee_angle: 85.0,
            depth_achieved: true,
            ..MetricsSnapshot::default()
        }
    }

    fn types(faults: &[FaultInstance]) -> Vec<FaultType> {
        faults.iter().map(|f| f.fault_type).collect()
    }

    #[test]
    fn test_clean_frame_has_no_faults() {
        let detector = FrameFaultDetector::default();
        assert!(detector.detect(&clean()).is_empty());
    }

    #[test]
    fn test_back_rounding_penalty_scales() {
        let detector = FrameFaultDetector::default();
        let snapshot = MetricsSnapshot { back_angle: 135.0, ..clean() };
        let faults = detector.detect(&snapshot);
        assert_eq!(types(&faults), vec![FaultType::BackRounding]);
        // 40 * (15 / 30)
        assert!((faults[0].penalty_weight - 20.0).abs() < 1e-9);
        assert_eq!(faults[0].severity, Severity::Critical);
        assert_eq!(faults[0].measured_value, Some(135.0));
    }

    #[test]
    fn test_back_rounding_penalty_capped() {
        let detector = FrameFaultDetector::default();
        let snapshot = MetricsSnapshot { back_angle: 60.0, ..clean() };
        let faults = detector.detect(&snapshot);
        assert!((faults[0].penalty_weight - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_knee_valgus_penalty() {
        let detector = FrameFaultDetector::default();
        let snapshot = MetricsSnapshot { knee_valgus_ratio: 0.7, ..clean() };
        let faults = detector.detect(&snapshot);
        assert_eq!(types(&faults), vec![FaultType::KneeValgus]);
        // 30 * (0.1 / 0.2)
        assert!((faults[0].penalty_weight - 15.0).abs() < 1e-9);

        let snapshot = MetricsSnapshot { knee_valgus_ratio: 0.1, ..clean() };
        let faults = detector.detect(&snapshot);
        assert!((faults[0].penalty_weight - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_depth_multipliers() {
        let detector = FrameFaultDetector::default();
        let penalty_at = |knee_angle: f64| {
            let snapshot = MetricsSnapshot { knee_angle, depth_achieved: false, ..clean() };
            detector.detect(&snapshot)[0].penalty_weight
        };
        assert!((penalty_at(120.0) - 30.0).abs() < 1e-9);
        assert!((penalty_at(100.0) - 25.0).abs() < 1e-9);
        assert!((penalty_at(110.0) - 25.0).abs() < 1e-9);
        assert!((penalty_at(95.0) - 25.0).abs() < 1e-9);
        assert!((penalty_at(90.0) - 17.5).abs() < 1e-9);
    }

    #[test]
    fn test_depth_confidence_defaults() {
        let detector = FrameFaultDetector::default();
        let mut snapshot = MetricsSnapshot { depth_achieved: false, ..clean() };
        snapshot.confidence_scores.remove(CONF_DEPTH);
        assert_eq!(detector.detect(&snapshot)[0].confidence, 0.8);

        let snapshot = snapshot.with_confidence(CONF_DEPTH, 0.3);
        // Depth is never gated
        assert_eq!(detector.detect(&snapshot)[0].confidence, 0.3);
    }

    #[test]
    fn test_forward_lean_penalty() {
        let detector = FrameFaultDetector::default();
        let snapshot = MetricsSnapshot { trunk_angle: 55.0, ..clean() };
        let faults = detector.detect(&snapshot);
        assert_eq!(types(&faults), vec![FaultType::ForwardLean]);
        // 20 * (10 / 20)
        assert!((faults[0].penalty_weight - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_trunk_at_limit_is_not_lean() {
        let detector = FrameFaultDetector::default();
        let snapshot = MetricsSnapshot { trunk_angle: 45.0, ..clean() };
        assert!(detector.detect(&snapshot).is_empty());
    }

    #[test]
    fn test_asymmetry_fixed_confidence() {
        let detector = FrameFaultDetector::default();
        let mut snapshot = MetricsSnapshot { asymmetry_score: 0.2, ..clean() };
        snapshot.confidence_scores.clear();
        let faults = detector.detect(&snapshot);
        assert_eq!(types(&faults), vec![FaultType::AsymmetricMovement]);
        assert_eq!(faults[0].confidence, 0.7);
        // 15 * (0.05 / 0.1)
        assert!((faults[0].penalty_weight - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_gated_rules_need_confidence_above_gate() {
        let detector = FrameFaultDetector::default();
        let snapshot = MetricsSnapshot {
            back_angle: 100.0,
            knee_valgus_ratio: 0.5,
            trunk_angle: 70.0,
            ..clean()
        }
        .with_confidence(CONF_BACK_ANGLE, 0.6)
        .with_confidence(CONF_KNEE_VALGUS, 0.2)
        .with_confidence(CONF_TRUNK_ANGLE, 0.0);
        assert!(detector.detect(&snapshot).is_empty());
    }

    #[test]
    fn test_missing_confidence_suppresses_gated_rules() {
        let detector = FrameFaultDetector::default();
        let mut snapshot = MetricsSnapshot { back_angle: 100.0, ..clean() };
        snapshot.confidence_scores.clear();
        assert!(detector.detect(&snapshot).is_empty());
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let detector = FrameFaultDetector::default();
        let snapshot = MetricsSnapshot {
            back_angle: 120.0,
            knee_valgus_ratio: 0.6,
            depth_achieved: false,
            knee_angle: 120.0,
            trunk_angle: 60.0,
            asymmetry_score: 0.3,
            ..clean()
        };
        assert_eq!(
            types(&detector.detect(&snapshot)),
            vec![
                FaultType::BackRounding,
                FaultType::KneeValgus,
                FaultType::InsufficientDepth,
                FaultType::ForwardLean,
                FaultType::AsymmetricMovement,
            ]
        );
    }

    #[test]
    fn test_custom_gate() {
        let thresholds = DetectorThresholds { confidence_gate: 0.3, ..DetectorThresholds::default() };
        let detector = FrameFaultDetector::new(Arc::new(FaultCatalog::standard()), thresholds);
        let snapshot = MetricsSnapshot { back_angle: 120.0, ..clean() }
            .with_confidence(CONF_BACK_ANGLE, 0.5);
        assert_eq!(types(&detector.detect(&snapshot)), vec![FaultType::BackRounding]);
    }
}
