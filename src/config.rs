//! Grader configuration.
//!
//! Every threshold is fixed at construction and read-only afterwards. Defaults
//! equal the crate-level constants; a TOML document may override any subset.

use serde::{Deserialize, Serialize};
use crate::error::{GradingError, Result};
use crate::{
    ASYMMETRY_CONFIDENCE, ASYMMETRY_MAX, ASYMMETRY_PENALTY_CAP, ATTEMPT_DEPTH_KNEE_ANGLE,
    BACK_ANGLE_MIN, BACK_ANGLE_STRAIGHT, BACK_PENALTY_CAP, CONFIDENCE_GATE, DEPTH_DEFAULT_CONFIDENCE,
    HEEL_RISE_ANKLE_MIN, IMPROVEMENT_PRIORITY_COUNT, KNEE_PENALTY_CAP, KNEE_VALGUS_RATIO_MIN,
    KNEE_VALGUS_RATIO_NEUTRAL,
    LEAN_PENALTY_CAP, PERSISTENT_FAULT_FREQUENCY, SAFETY_VIOLATION_PENALTY,
    SEVERE_VALGUS_RATIO_MIN, TREND_MIN_ATTEMPTS, TRUNK_ANGLE_MAX,
};

/// Lifter experience. Beginners get wider limits and softer penalties,
/// experts tighter limits and harsher penalties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

impl SkillLevel {
    pub const ALL: [SkillLevel; 4] = [
        SkillLevel::Beginner,
        SkillLevel::Intermediate,
        SkillLevel::Advanced,
        SkillLevel::Expert,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
            SkillLevel::Expert => "expert",
        }
    }

    /// Scale on the allowed deviation of every limit
    pub fn tolerance(&self) -> f64 {
        match self {
            SkillLevel::Beginner => 1.3,
            SkillLevel::Intermediate => 1.0,
            SkillLevel::Advanced => 0.8,
            SkillLevel::Expert => 0.6,
        }
    }

    /// Scale on penalty caps and the attempt safety penalty
    pub fn penalty_factor(&self) -> f64 {
        match self {
            SkillLevel::Beginner => 0.7,
            SkillLevel::Intermediate => 1.0,
            SkillLevel::Advanced => 1.2,
            SkillLevel::Expert => 1.5,
        }
    }
}

impl std::str::FromStr for SkillLevel {
    type Err = GradingError;

    fn from_str(code: &str) -> Result<Self> {
        SkillLevel::ALL
            .into_iter()
            .find(|level| level.code().eq_ignore_ascii_case(code.trim()))
            .ok_or_else(|| GradingError::configuration(format!("unknown skill level '{code}'")))
    }
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Widen or narrow a lower limit by scaling its distance from the ideal value
fn scale_lower_limit(limit: f64, ideal: f64, tolerance: f64) -> f64 {
    ideal - (ideal - limit) * tolerance
}

/// Thresholds for the per-frame fault rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorThresholds {
    pub back_angle_min: f64,
    pub knee_valgus_ratio_min: f64,
    pub trunk_angle_max: f64,
    pub asymmetry_max: f64,
    /// Back, knee and lean rules need confidence strictly above this
    pub confidence_gate: f64,
    pub depth_default_confidence: f64,
    pub asymmetry_confidence: f64,
    pub back_penalty_cap: f64,
    pub knee_penalty_cap: f64,
    pub lean_penalty_cap: f64,
    pub asymmetry_penalty_cap: f64,
}

impl Default for DetectorThresholds {
    fn default() -> Self {
        Self {
            back_angle_min: BACK_ANGLE_MIN,
            knee_valgus_ratio_min: KNEE_VALGUS_RATIO_MIN,
            trunk_angle_max: TRUNK_ANGLE_MAX,
            asymmetry_max: ASYMMETRY_MAX,
            confidence_gate: CONFIDENCE_GATE,
            depth_default_confidence: DEPTH_DEFAULT_CONFIDENCE,
            asymmetry_confidence: ASYMMETRY_CONFIDENCE,
            back_penalty_cap: BACK_PENALTY_CAP,
            knee_penalty_cap: KNEE_PENALTY_CAP,
            lean_penalty_cap: LEAN_PENALTY_CAP,
            asymmetry_penalty_cap: ASYMMETRY_PENALTY_CAP,
        }
    }
}

/// Thresholds for attempt completion and safety.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    pub depth_knee_angle: f64,
    pub back_angle_min: f64,
    pub severe_valgus_ratio_min: f64,
    pub heel_rise_ankle_min: f64,
    pub safety_penalty: u8,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            depth_knee_angle: ATTEMPT_DEPTH_KNEE_ANGLE,
            back_angle_min: BACK_ANGLE_MIN,
            severe_valgus_ratio_min: SEVERE_VALGUS_RATIO_MIN,
            heel_rise_ankle_min: HEEL_RISE_ANKLE_MIN,
            safety_penalty: SAFETY_VIOLATION_PENALTY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorSettings {
    pub persistent_fault_frequency: f64,
    pub priority_count: usize,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            persistent_fault_frequency: PERSISTENT_FAULT_FREQUENCY,
            priority_count: IMPROVEMENT_PRIORITY_COUNT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsSettings {
    pub trend_min_attempts: usize,
}

impl Default for StatisticsSettings {
    fn default() -> Self {
        Self {
            trend_min_attempts: TREND_MIN_ATTEMPTS,
        }
    }
}

/// Top-level configuration for all grading components.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraderConfig {
    pub detector: DetectorThresholds,
    pub classifier: ClassifierThresholds,
    pub aggregator: AggregatorSettings,
    pub statistics: StatisticsSettings,
}

impl GraderConfig {
    /// Default thresholds adapted to a skill level.
    ///
    /// Upper limits (trunk lean, asymmetry, attempt depth) scale with the
    /// tolerance. Lower limits (back angle, valgus ratios) scale their distance
    /// from a straight back or neutral knees, heel rise divides by it. Penalty
    /// caps and the attempt safety penalty scale with the penalty factor.
    pub fn for_level(level: SkillLevel) -> Self {
        let t = level.tolerance();
        let p = level.penalty_factor();
        let mut config = Self::default();

        let d = &mut config.detector;
        d.back_angle_min = scale_lower_limit(d.back_angle_min, BACK_ANGLE_STRAIGHT, t);
        d.knee_valgus_ratio_min = scale_lower_limit(d.knee_valgus_ratio_min, KNEE_VALGUS_RATIO_NEUTRAL, t);
        d.trunk_angle_max *= t;
        d.asymmetry_max *= t;
        d.back_penalty_cap *= p;
        d.knee_penalty_cap *= p;
        d.lean_penalty_cap *= p;
        d.asymmetry_penalty_cap *= p;

        let c = &mut config.classifier;
        c.depth_knee_angle *= t;
        c.back_angle_min = scale_lower_limit(c.back_angle_min, BACK_ANGLE_STRAIGHT, t);
        c.severe_valgus_ratio_min =
            scale_lower_limit(c.severe_valgus_ratio_min, KNEE_VALGUS_RATIO_NEUTRAL, t);
        c.heel_rise_ankle_min /= t;
        c.safety_penalty = (f64::from(c.safety_penalty) * p).round().clamp(0.0, f64::from(u8::MAX)) as u8;

        config
    }

    /// Parse and validate a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: GraderConfig = toml::from_str(source)
            .map_err(|e| GradingError::configuration(format!("invalid grader config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no rule can work with.
    pub fn validate(&self) -> Result<()> {
        let d = &self.detector;
        for (name, value) in [
            ("detector.confidence_gate", d.confidence_gate),
            ("detector.depth_default_confidence", d.depth_default_confidence),
            ("detector.asymmetry_confidence", d.asymmetry_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GradingError::configuration(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        for (name, value) in [
            ("detector.back_penalty_cap", d.back_penalty_cap),
            ("detector.knee_penalty_cap", d.knee_penalty_cap),
            ("detector.lean_penalty_cap", d.lean_penalty_cap),
            ("detector.asymmetry_penalty_cap", d.asymmetry_penalty_cap),
        ] {
            if !(value > 0.0) {
                return Err(GradingError::configuration(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let freq = self.aggregator.persistent_fault_frequency;
        if !(0.0..1.0).contains(&freq) {
            return Err(GradingError::configuration(format!(
                "aggregator.persistent_fault_frequency must be within [0, 1), got {freq}"
            )));
        }

        if self.statistics.trend_min_attempts < 2 {
            return Err(GradingError::configuration(
                "statistics.trend_min_attempts must be at least 2",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = GraderConfig::default();
        assert_eq!(config.detector.back_angle_min, 150.0);
        assert_eq!(config.classifier.severe_valgus_ratio_min, 0.6);
        assert_eq!(config.aggregator.persistent_fault_frequency, 0.3);
        assert_eq!(config.statistics.trend_min_attempts, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GraderConfig::from_toml_str(
            r#"
            [detector]
            confidence_gate = 0.5

            [aggregator]
            priority_count = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.detector.confidence_gate, 0.5);
        assert_eq!(config.detector.trunk_angle_max, 45.0);
        assert_eq!(config.aggregator.priority_count, 2);
        assert_eq!(config.classifier, ClassifierThresholds::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(GraderConfig::from_toml_str("").unwrap(), GraderConfig::default());
    }

    #[test]
    fn test_out_of_range_gate_rejected() {
        let err = GraderConfig::from_toml_str("[detector]\nconfidence_gate = 1.5\n").unwrap_err();
        assert!(err.is_fatal());
        assert!(err.to_string().contains("confidence_gate"));
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_intermediate_level_is_default() {
        assert_eq!(GraderConfig::for_level(SkillLevel::Intermediate), GraderConfig::default());
        assert_eq!(SkillLevel::default(), SkillLevel::Intermediate);
    }

    #[test]
    fn test_beginner_level_is_lenient() {
        let config = GraderConfig::for_level(SkillLevel::Beginner);
        assert!(close(config.detector.back_angle_min, 141.0));
        assert!(close(config.detector.knee_valgus_ratio_min, 0.74));
        assert!(close(config.detector.trunk_angle_max, 58.5));
        assert!(close(config.detector.asymmetry_max, 0.195));
        assert!(close(config.detector.back_penalty_cap, 1.4));
        assert!(close(config.classifier.depth_knee_angle, 117.0));
        assert!(close(config.classifier.severe_valgus_ratio_min, 0.48));
        assert!(close(config.classifier.heel_rise_ankle_min, 20.0 / 1.3));
        assert_eq!(config.classifier.safety_penalty, 21);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_advanced_level_is_stricter() {
        let config = GraderConfig::for_level(SkillLevel::Advanced);
        assert!(close(config.detector.back_angle_min, 156.0));
        assert!(close(config.detector.knee_valgus_ratio_min, 0.84));
        assert!(close(config.detector.trunk_angle_max, 36.0));
        assert!(close(config.detector.lean_penalty_cap, 1.8));
        assert!(close(config.classifier.depth_knee_angle, 72.0));
        assert!(close(config.classifier.heel_rise_ankle_min, 25.0));
        assert_eq!(config.classifier.safety_penalty, 36);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_expert_level_is_strictest() {
        let config = GraderConfig::for_level(SkillLevel::Expert);
        assert!(close(config.detector.back_angle_min, 162.0));
        assert!(close(config.detector.knee_valgus_ratio_min, 0.88));
        assert!(close(config.detector.trunk_angle_max, 27.0));
        assert!(close(config.detector.asymmetry_max, 0.09));
        assert!(close(config.detector.back_penalty_cap, 3.0));
        assert!(close(config.detector.asymmetry_penalty_cap, 1.95));
        assert!(close(config.classifier.severe_valgus_ratio_min, 0.76));
        assert_eq!(config.classifier.safety_penalty, 45);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_limits_tighten_with_level() {
        let configs: Vec<GraderConfig> = SkillLevel::ALL.into_iter().map(GraderConfig::for_level).collect();
        for pair in configs.windows(2) {
            assert!(pair[1].detector.back_angle_min > pair[0].detector.back_angle_min);
            assert!(pair[1].detector.trunk_angle_max < pair[0].detector.trunk_angle_max);
            assert!(pair[1].detector.knee_penalty_cap > pair[0].detector.knee_penalty_cap);
            assert!(pair[1].classifier.safety_penalty > pair[0].classifier.safety_penalty);
        }
    }

    #[test]
    fn test_skill_level_codes() {
        assert_eq!("Expert".parse::<SkillLevel>().unwrap(), SkillLevel::Expert);
        assert_eq!(SkillLevel::Beginner.to_string(), "beginner");
        let err = "elite".parse::<SkillLevel>().unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
        assert_eq!(serde_json::to_string(&SkillLevel::Advanced).unwrap(), "\"advanced\"");
    }

    #[test]
    fn test_malformed_toml_rejected() {
        let err = GraderConfig::from_toml_str("[detector\n").unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }
}
