//! Sequence Aggregator: grades every frame of a video or repetition
//!
//! Produces the average score, a consistency figure, the faults that persist
//! across the sequence and the correction cues worth working on first.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use crate::config::{AggregatorSettings, GraderConfig};
use crate::core::{FaultCatalog, FrameFaultDetector, WeightedScorer};
use crate::types::{FaultType, MetricsSnapshot, ScoreResult, SequenceAnalysis, Severity};
use crate::MAX_SCORE;

/// Runs detection and scoring across a sequence of snapshots
#[derive(Debug, Clone)]
pub struct SequenceAggregator {
    detector: FrameFaultDetector,
    scorer: WeightedScorer,
    settings: AggregatorSettings,
}

impl Default for SequenceAggregator {
    fn default() -> Self {
        Self::from_config(Arc::new(FaultCatalog::standard()), &GraderConfig::default())
    }
}

impl SequenceAggregator {
    pub fn new(detector: FrameFaultDetector, scorer: WeightedScorer, settings: AggregatorSettings) -> Self {
        Self { detector, scorer, settings }
    }

    /// Wire detector and scorer to one shared catalog
    pub fn from_config(catalog: Arc<FaultCatalog>, config: &GraderConfig) -> Self {
        Self::new(
            FrameFaultDetector::new(Arc::clone(&catalog), config.detector.clone()),
            WeightedScorer::new(catalog),
            config.aggregator.clone(),
        )
    }

    pub fn detector(&self) -> &FrameFaultDetector {
        &self.detector
    }

    /// Detect and score a single frame
    pub fn grade_frame(&self, snapshot: &MetricsSnapshot) -> ScoreResult {
        let faults = self.detector.detect(snapshot);
        self.scorer.score(snapshot, &faults)
    }

    /// Grade every frame and aggregate. Empty input gives an empty analysis.
    pub fn analyze(&self, frames: &[MetricsSnapshot]) -> SequenceAnalysis {
        if frames.is_empty() {
            return SequenceAnalysis::empty();
        }

        let mut frame_scores = Vec::with_capacity(frames.len());
        let mut fault_counts: BTreeMap<FaultType, usize> = BTreeMap::new();

        for snapshot in frames {
            let result = self.grade_frame(snapshot);
            frame_scores.push(result.overall_score);
            for fault in &result.detected_faults {
                *fault_counts.entry(fault.fault_type).or_insert(0) += 1;
            }
        }

        let frame_count = frames.len();
        let (mean, stdev) = mean_and_stdev(&frame_scores);
        let persistent_faults: BTreeMap<FaultType, f64> = fault_counts
            .iter()
            .map(|(&fault, &count)| (fault, count as f64 / frame_count as f64))
            .filter(|&(_, frequency)| frequency > self.settings.persistent_fault_frequency)
            .collect();
        let improvement_priorities = self.improvement_priorities(&persistent_faults);

        debug!(
            frame_count,
            average = mean,
            persistent = persistent_faults.len(),
            "sequence analyzed"
        );

        SequenceAnalysis {
            frame_count,
            frame_scores,
            average_score: mean.round().clamp(0.0, MAX_SCORE) as u8,
            consistency: MAX_SCORE - stdev,
            fault_counts,
            persistent_faults,
            improvement_priorities,
        }
    }

    /// Cues for the costliest persistent faults.
    ///
    /// Cost = frequency × base penalty, doubled for CRITICAL. Ties fall back to
    /// the fault code so the order never depends on map iteration.
    fn improvement_priorities(&self, persistent: &BTreeMap<FaultType, f64>) -> Vec<String> {
        let catalog = self.detector.catalog();
        let mut ranked: Vec<(FaultType, f64)> = persistent
            .iter()
            .map(|(&fault, &frequency)| {
                let definition = catalog.lookup(fault);
                let severity_factor = match definition.severity {
                    Severity::Critical => 2.0,
                    Severity::Major | Severity::Minor => 1.0,
                };
                (fault, frequency * definition.base_penalty * severity_factor)
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.code().cmp(b.0.code()))
        });

        ranked
            .into_iter()
            .take(self.settings.priority_count)
            .map(|(fault, _)| catalog.correction_cue(fault).to_string())
            .collect()
    }
}

/// Mean and population standard deviation
fn mean_and_stdev(scores: &[u8]) -> (f64, f64) {
    let n = scores.len() as f64;
    let mean = scores.iter().map(|&s| f64::from(s)).sum::<f64>() / n;
    let variance = scores
        .iter()
        .map(|&s| (f64::from(s) - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean, variance.sqrt())
}

// =============================================================================
// TESTS
// =============================================================================
