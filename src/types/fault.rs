//! Fault definitions and detected instances

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::error::GradingError;

/// Fault severity. Drives which sub-score a penalty counts against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Injury risk; counts against the safety score
    Critical,
    /// Counts against technique
    Major,
    /// Counts against technique
    Minor,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Severity::Critical => "CRITICAL",
            Severity::Major => "MAJOR",
            Severity::Minor => "MINOR",
        };
        write!(f, "{}", name)
    }
}

/// Every fault the grader knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultType {
    BackRounding,
    KneeValgus,
    InsufficientDepth,
    ForwardLean,
    AsymmetricMovement,
    HeelRise,
    IncompleteAttempt,
    SevereKneeValgus,
    PartialRangeOfMotion,
}

impl FaultType {
    pub const COUNT: usize = 9;

    /// All fault types in catalog order
    pub const ALL: [FaultType; FaultType::COUNT] = [
        FaultType::BackRounding,
        FaultType::KneeValgus,
        FaultType::InsufficientDepth,
        FaultType::ForwardLean,
        FaultType::AsymmetricMovement,
        FaultType::HeelRise,
        FaultType::IncompleteAttempt,
        FaultType::SevereKneeValgus,
        FaultType::PartialRangeOfMotion,
    ];

    /// Get the code string (for logging and wire formats)
    pub fn code(&self) -> &'static str {
        match self {
            Self::BackRounding => "BACK_ROUNDING",
            Self::KneeValgus => "KNEE_VALGUS",
            Self::InsufficientDepth => "INSUFFICIENT_DEPTH",
            Self::ForwardLean => "FORWARD_LEAN",
            Self::AsymmetricMovement => "ASYMMETRIC_MOVEMENT",
            Self::HeelRise => "HEEL_RISE",
            Self::IncompleteAttempt => "INCOMPLETE_ATTEMPT",
            Self::SevereKneeValgus => "SEVERE_KNEE_VALGUS",
            Self::PartialRangeOfMotion => "PARTIAL_RANGE_OF_MOTION",
        }
    }

    /// Position in `ALL`
    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl FromStr for FaultType {
    type Err = GradingError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        FaultType::ALL
            .into_iter()
            .find(|fault| fault.code() == code)
            .ok_or_else(|| GradingError::UnknownFaultType { code: code.to_string() })
    }
}

impl std::fmt::Display for FaultType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Static description of a fault. Never mutated after catalog construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaultDefinition {
    pub fault_type: FaultType,
    pub severity: Severity,
    pub description: String,
    /// Short instruction shown to the athlete
    pub correction_cue: String,
    /// Points removed at multiplier 1.0 and confidence 1.0
    pub base_penalty: f64,
    /// Confidence used when the fault is raised without a measurement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_confidence: Option<f64>,
}

impl FaultDefinition {
    pub fn new(
        fault_type: FaultType,
        severity: Severity,
        base_penalty: f64,
        description: impl Into<String>,
        correction_cue: impl Into<String>,
    ) -> Self {
        Self {
            fault_type,
            severity,
            description: description.into(),
            correction_cue: correction_cue.into(),
            base_penalty,
            fixed_confidence: None,
        }
    }

    pub fn with_fixed_confidence(mut self, confidence: f64) -> Self {
        self.fixed_confidence = Some(confidence);
        self
    }
}

/// One detection of a fault in one frame or attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaultInstance {
    pub fault_type: FaultType,
    pub severity: Severity,
    /// How sure the detector is (0.0-1.0)
    pub confidence: f64,
    /// Base penalty after the rule's capped multiplier
    pub penalty_weight: f64,
    /// The reading that triggered the rule, if there was one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measured_value: Option<f64>,
}

impl FaultInstance {
    /// Points this detection removes from the overall score
    pub fn weighted_penalty(&self) -> f64 {
        self.penalty_weight * self.confidence
    }
}
