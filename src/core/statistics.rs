//! Session Statistics Engine: attempt records → success rate, failure
//! patterns and trends
//!
//! Attempts accumulate in a caller-owned `SessionLog`; the engine itself keeps
//! no state, so any number of sessions can be tracked side by side.

use std::collections::BTreeMap;
use tracing::debug;
use crate::config::StatisticsSettings;
use crate::types::{AttemptRecord, AttemptStatus, FaultType, SessionStatistics};

/// Ordered attempt history for one session
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    records: Vec<AttemptRecord>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attempt and return the stored record
    pub fn record(&mut self, status: AttemptStatus) -> &AttemptRecord {
        let record = AttemptRecord::new(self.records.len() + 1, status);
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[AttemptRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

/// Computes session statistics from attempt records
#[derive(Debug, Clone, Default)]
pub struct SessionStatisticsEngine {
    settings: StatisticsSettings,
}

impl SessionStatisticsEngine {
    pub fn new(settings: StatisticsSettings) -> Self {
        Self { settings }
    }

    /// Statistics for everything recorded in a log
    pub fn compute_log(&self, log: &SessionLog) -> SessionStatistics {
        self.compute(log.records())
    }

    /// Statistics over attempts in session order
    pub fn compute<S: AsRef<AttemptStatus>>(&self, attempts: &[S]) -> SessionStatistics {
        if attempts.is_empty() {
            return SessionStatistics::empty();
        }

        let attempts: Vec<&AttemptStatus> = attempts.iter().map(|a| a.as_ref()).collect();
        let total = attempts.len();
        let successful = attempts.iter().filter(|a| a.is_success()).count();
        let failed = total - successful;

        // Encounter order is kept for tie-breaking most_common_failure
        let mut failure_counts: Vec<(FaultType, usize)> = Vec::new();
        for attempt in attempts.iter().filter(|a| !a.is_success()) {
            for &reason in &attempt.failure_reasons {
                match failure_counts.iter_mut().find(|(fault, _)| *fault == reason) {
                    Some((_, count)) => *count += 1,
                    None => failure_counts.push((reason, 1)),
                }
            }
        }

        let failure_patterns: BTreeMap<FaultType, f64> = failure_counts
            .iter()
            .map(|&(fault, count)| (fault, count as f64 / failed as f64 * 100.0))
            .collect();

        let mut most_common: Option<(FaultType, usize)> = None;
        for &(fault, count) in &failure_counts {
            if most_common.map_or(true, |(_, best)| count > best) {
                most_common = Some((fault, count));
            }
        }

        let improvement_trends = if total >= self.settings.trend_min_attempts {
            trends(&attempts)
        } else {
            Vec::new()
        };

        let stats = SessionStatistics {
            total_attempts: total,
            successful_attempts: successful,
            failed_attempts: failed,
            success_rate: success_rate(&attempts),
            average_completion_score: average_completion(&attempts),
            failure_patterns,
            improvement_trends,
            most_common_failure: most_common.map(|(fault, _)| fault),
        };

        debug!(
            total,
            success_rate = stats.success_rate,
            trends = stats.improvement_trends.len(),
            "session statistics computed"
        );

        stats
    }
}

/// Compare the first and second halves of the session
fn trends(attempts: &[&AttemptStatus]) -> Vec<String> {
    let (first, second) = attempts.split_at(attempts.len() / 2);
    let mut statements = Vec::new();

    let (early_rate, late_rate) = (success_rate(first), success_rate(second));
    if late_rate > early_rate {
        statements.push(format!(
            "Success rate improving: {:.0}% → {:.0}%",
            early_rate, late_rate
        ));
    } else if late_rate < early_rate {
        statements.push(format!(
            "Success rate declining: {:.0}% → {:.0}%",
            early_rate, late_rate
        ));
    }

    let (early_completion, late_completion) = (average_completion(first), average_completion(second));
    if late_completion > early_completion {
        statements.push(format!(
            "Form quality improving: {:.0} → {:.0} average completion",
            early_completion, late_completion
        ));
    }

    statements
}

fn success_rate(attempts: &[&AttemptStatus]) -> f64 {
    if attempts.is_empty() {
        return 0.0;
    }
    let successes = attempts.iter().filter(|a| a.is_success()).count();
    successes as f64 / attempts.len() as f64 * 100.0
}

fn average_completion(attempts: &[&AttemptStatus]) -> f64 {
    if attempts.is_empty() {
        return 0.0;
    }
    let total: u32 = attempts.iter().map(|a| u32::from(a.completion_score)).sum();
    f64::from(total) / attempts.len() as f64
}

// =============================================================================
// TESTS
// =============================================================================
