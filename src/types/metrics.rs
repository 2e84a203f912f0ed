//! Per-frame biomechanical reading

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Confidence key for the back angle measurement
pub const CONF_BACK_ANGLE: &str = "back_angle";
/// Confidence key for the knee valgus ratio
pub const CONF_KNEE_VALGUS: &str = "knee_valgus";
/// Confidence key for the trunk angle measurement
pub const CONF_TRUNK_ANGLE: &str = "trunk_angle";
/// Confidence key for the depth flag
pub const CONF_DEPTH: &str = "depth";

/// One frame of joint angles, ratios and tracker confidences.
///
/// Produced upstream once per frame and only read here. Angles are in
/// degrees, confidences in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub knee_angle: f64,
    pub hip_angle: f64,
    pub back_angle: f64,
    pub trunk_angle: f64,
    pub ankle_angle: f64,
    /// Knee width over ankle width; below 1.0 the knees cave in
    pub knee_valgus_ratio: f64,
    /// 0.0 = perfectly symmetric
    pub asymmetry_score: f64,
    pub depth_achieved: bool,
    #[serde(default)]
    pub confidence_scores: BTreeMap<String, f64>,
}

impl Default for MetricsSnapshot {
    /// Standing upright, symmetric, fully tracked
    fn default() -> Self {
        let confidence_scores = [CONF_BACK_ANGLE, CONF_KNEE_VALGUS, CONF_TRUNK_ANGLE, CONF_DEPTH]
            .into_iter()
            .map(|key| (key.to_string(), 1.0))
            .collect();

        Self {
            knee_angle: 170.0,
            hip_angle: 170.0,
            back_angle: 170.0,
            trunk_angle: 10.0,
            ankle_angle: 80.0,
            knee_valgus_ratio: 1.0,
            asymmetry_score: 0.0,
            depth_achieved: false,
            confidence_scores,
        }
    }
}

impl MetricsSnapshot {
    /// Confidence reported for a measurement, if any
    pub fn confidence(&self, key: &str) -> Option<f64> {
        self.confidence_scores.get(key).copied()
    }

    /// Confidence for a measurement, 0.0 when the tracker reported none
    pub fn confidence_or_zero(&self, key: &str) -> f64 {
        self.confidence(key).unwrap_or(0.0)
    }

    /// Copy with one confidence replaced
    pub fn with_confidence(mut self, key: &str, value: f64) -> Self {
        self.confidence_scores.insert(key.to_string(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_clean_standing_frame() {
        let snapshot = MetricsSnapshot::default();
        assert!(!snapshot.depth_achieved);
        assert_eq!(snapshot.confidence(CONF_BACK_ANGLE), Some(1.0));
    }

    #[test]
    fn test_missing_confidence_reads_zero() {
        let mut snapshot = MetricsSnapshot::default();
        snapshot.confidence_scores.clear();
        assert_eq!(snapshot.confidence(CONF_TRUNK_ANGLE), None);
        assert_eq!(snapshot.confidence_or_zero(CONF_TRUNK_ANGLE), 0.0);
    }

    #[test]
    fn test_deserialize_without_confidences() {
        let json = r#"{
            "knee_angle": 85.0, "hip_angle": 70.0, "back_angle": 160.0,
            "trunk_angle": 30.0, "ankle_angle": 60.0, "knee_valgus_ratio": 0.95,
            "asymmetry_score": 0.05, "depth_achieved": true
        }"#;
        let snapshot: MetricsSnapshot = serde_json::from_str(json).unwrap();
        assert!(snapshot.confidence_scores.is_empty());
        assert!(snapshot.depth_achieved);
    }
}
