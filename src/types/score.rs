//! Per-frame scoring output

use serde::{Deserialize, Serialize};
use crate::types::FaultInstance;

/// Scores and feedback for one snapshot.
///
/// The three scores are independent views and do not sum to anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// 0-100, all faults weighted, depth bonus applied
    pub overall_score: u8,
    /// 0-100, critical faults only
    pub safety_score: u8,
    /// 0-100, major and minor faults at reduced weight
    pub technique_score: u8,
    /// Faults in detection order
    pub detected_faults: Vec<FaultInstance>,
    /// Correction cues, most urgent first
    pub feedback: Vec<String>,
    /// One-line verdict for the overall score
    pub assessment: String,
}

impl ScoreResult {
    pub fn has_faults(&self) -> bool {
        !self.detected_faults.is_empty()
    }

    /// Format for parseable output
    pub fn to_parseable_string(&self) -> String {
        let faults: Vec<&str> = self
            .detected_faults
            .iter()
            .map(|fault| fault.fault_type.code())
            .collect();

        format!(
            "overall={} | safety={} | technique={} | faults={}",
            self.overall_score,
            self.safety_score,
            self.technique_score,
            if faults.is_empty() { "NONE".to_string() } else { faults.join(",") }
        )
    }
}
