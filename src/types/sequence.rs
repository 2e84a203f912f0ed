//! Whole-sequence analysis output

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::types::FaultType;

/// Result of grading every frame of one video or repetition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceAnalysis {
    pub frame_count: usize,
    /// Overall score of each frame, in order
    pub frame_scores: Vec<u8>,
    /// Mean of `frame_scores`, halves rounded away from zero (92.5 → 93)
    pub average_score: u8,
    /// 100 minus the population standard deviation of `frame_scores`.
    /// Not clamped below.
    pub consistency: f64,
    /// Frames in which each observed fault fired
    pub fault_counts: BTreeMap<FaultType, usize>,
    /// Frame frequency of faults seen in more than the persistence threshold
    pub persistent_faults: BTreeMap<FaultType, f64>,
    /// Correction cues for the most costly persistent faults, most urgent first
    pub improvement_priorities: Vec<String>,
}

impl SequenceAnalysis {
    /// Well-defined result for an empty sequence
    pub fn empty() -> Self {
        Self {
            frame_count: 0,
            frame_scores: Vec::new(),
            average_score: 0,
            consistency: 0.0,
            fault_counts: BTreeMap::new(),
            persistent_faults: BTreeMap::new(),
            improvement_priorities: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count == 0
    }

    pub fn is_persistent(&self, fault: FaultType) -> bool {
        self.persistent_faults.contains_key(&fault)
    }
}
