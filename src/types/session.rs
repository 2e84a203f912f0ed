//! Session statistics and summary types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::types::FaultType;

/// Aggregate of all attempts in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatistics {
    pub total_attempts: usize,
    pub successful_attempts: usize,
    pub failed_attempts: usize,
    /// Percent of attempts that were complete and valid
    pub success_rate: f64,
    pub average_completion_score: f64,
    /// Percent of failed attempts listing each fault
    pub failure_patterns: BTreeMap<FaultType, f64>,
    /// Trend statements, success rate first
    pub improvement_trends: Vec<String>,
    pub most_common_failure: Option<FaultType>,
}

impl SessionStatistics {
    /// Statistics of a session with no attempts
    pub fn empty() -> Self {
        Self {
            total_attempts: 0,
            successful_attempts: 0,
            failed_attempts: 0,
            success_rate: 0.0,
            average_completion_score: 0.0,
            failure_patterns: BTreeMap::new(),
            improvement_trends: Vec::new(),
            most_common_failure: None,
        }
    }

    /// Failure share of a fault type, 0.0 when never seen
    pub fn failure_rate(&self, fault: FaultType) -> f64 {
        self.failure_patterns.get(&fault).copied().unwrap_or(0.0)
    }

    pub fn has_trend(&self, keyword: &str) -> bool {
        self.improvement_trends
            .iter()
            .any(|trend| trend.to_lowercase().contains(keyword))
    }
}

/// Letter grade for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    D,
    F,
}

impl Grade {
    pub fn label(&self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Coaching report for a finished session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub grade: Grade,
    /// Internal 0-100 score the grade was read from
    pub score: f64,
    pub statistics: SessionStatistics,
    pub achievements: Vec<String>,
    pub focus_areas: Vec<String>,
    pub recommendations: Vec<String>,
    pub goals: Vec<String>,
    /// Caller-supplied metrics, passed through untouched
    pub overall_metrics: BTreeMap<String, serde_json::Value>,
    pub has_detailed_metrics: bool,
}
