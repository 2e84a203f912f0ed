//! Attempt classification types

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::types::FaultType;

/// Movement phase supplied by the workout state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Descending,
    Bottom,
    Ascending,
    Top,
}

impl Phase {
    /// Parse an external phase tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Phase> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "descending" => Some(Phase::Descending),
            "bottom" => Some(Phase::Bottom),
            "ascending" => Some(Phase::Ascending),
            "top" => Some(Phase::Top),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Phase::Descending => "descending",
            Phase::Bottom => "bottom",
            Phase::Ascending => "ascending",
            Phase::Top => "top",
        }
    }

    /// Phases at or past the bottom of the squat
    pub fn is_past_bottom(&self) -> bool {
        matches!(self, Phase::Bottom | Phase::Ascending | Phase::Top)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Completion and safety verdict for one attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptStatus {
    /// Went deep enough and reached the bottom
    pub is_complete: bool,
    /// No safety violation
    pub is_valid: bool,
    /// First entry is the primary reason
    pub failure_reasons: Vec<FaultType>,
    /// 0-100
    pub completion_score: u8,
    /// `None` when the phase tag was not recognised
    pub phase_reached: Option<Phase>,
}

impl AttemptStatus {
    /// Complete and valid
    pub fn is_success(&self) -> bool {
        self.is_complete && self.is_valid
    }

    pub fn primary_failure(&self) -> Option<FaultType> {
        self.failure_reasons.first().copied()
    }
}

/// An attempt as stored in a session log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// 1-based position in the session
    pub attempt_number: usize,
    pub status: AttemptStatus,
    pub recorded_at: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn new(attempt_number: usize, status: AttemptStatus) -> Self {
        Self {
            attempt_number,
            status,
            recorded_at: Utc::now(),
        }
    }
}

impl AsRef<AttemptStatus> for AttemptRecord {
    fn as_ref(&self) -> &AttemptStatus {
        &self.status
    }
}

impl AsRef<AttemptStatus> for AttemptStatus {
    fn as_ref(&self) -> &AttemptStatus {
        self
    }
}
