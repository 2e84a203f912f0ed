//! Session Summary Generator: statistics → grade and coaching report
//!
//! Score = success component (stepped, max 40)
//!       + 0.4 × average completion (max 40)
//!       + trend bucket (improving 20, declining 10, otherwise 15)

use std::collections::BTreeMap;
use crate::types::{FaultType, Grade, SessionStatistics, SessionSummary};

/// Failure share at or above which depth becomes a focus area (%)
pub const DEPTH_FOCUS_RATE: f64 = 30.0;
/// Failure share at or above which spinal safety becomes a focus area (%)
pub const SPINE_FOCUS_RATE: f64 = 20.0;
/// Failure share at or above which knee tracking becomes a focus area (%)
pub const KNEE_FOCUS_RATE: f64 = 15.0;

/// Grade ladder, highest first
const GRADE_LADDER: [(f64, Grade); 7] = [
    (95.0, Grade::APlus),
    (90.0, Grade::A),
    (85.0, Grade::BPlus),
    (80.0, Grade::B),
    (75.0, Grade::CPlus),
    (70.0, Grade::C),
    (60.0, Grade::D),
];

/// A focus area with everything it contributes to the report
struct FocusBlock {
    focus: &'static str,
    recommendations: &'static [&'static str],
    goal: &'static str,
}

static DEPTH_BLOCK: FocusBlock = FocusBlock {
    focus: "Squat depth: many attempts stopped short of full range",
    recommendations: &[
        "Practice box squats to a parallel target to groove consistent depth",
        "Add ankle and hip mobility work before each session",
    ],
    goal: "Reach depth on at least 80% of attempts next session",
};

static SPINE_BLOCK: FocusBlock = FocusBlock {
    focus: "Spinal safety: the back rounded under load",
    recommendations: &[
        "Brace your core before every descent and keep your chest up",
        "Reduce load until you can hold a neutral spine through the whole rep",
    ],
    goal: "Finish the next session without a back rounding failure",
};

static KNEE_BLOCK: FocusBlock = FocusBlock {
    focus: "Knee tracking: knees caved inward during the movement",
    recommendations: &[
        "Cue 'knees out' and keep them tracking over your toes",
        "Strengthen glutes with banded squats and lateral walks",
    ],
    goal: "Cut knee tracking failures in half next session",
};

/// Builds the end-of-session coaching report
#[derive(Debug, Clone, Default)]
pub struct SessionSummaryGenerator;

impl SessionSummaryGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate the report. `overall_metrics` is passed through untouched.
    pub fn generate(
        &self,
        statistics: &SessionStatistics,
        overall_metrics: BTreeMap<String, serde_json::Value>,
    ) -> SessionSummary {
        let score = session_score(statistics);
        let blocks = focus_blocks(statistics);

        let focus_areas = blocks.iter().map(|b| b.focus.to_string()).collect();

        let mut recommendations: Vec<String> = blocks
            .iter()
            .flat_map(|b| b.recommendations.iter().map(|r| r.to_string()))
            .collect();
        recommendations.extend(rate_recommendations(statistics).into_iter().map(String::from));

        let mut goals: Vec<String> = blocks.iter().map(|b| b.goal.to_string()).collect();
        goals.push(rate_goal(statistics));

        SessionSummary {
            grade: grade_for(score),
            score,
            statistics: statistics.clone(),
            achievements: achievements(statistics),
            focus_areas,
            recommendations,
            goals,
            has_detailed_metrics: !overall_metrics.is_empty(),
            overall_metrics,
        }
    }
}

/// Internal 0-100 session score
pub fn session_score(statistics: &SessionStatistics) -> f64 {
    let rate = statistics.success_rate;
    let success_component = if rate >= 90.0 {
        40.0
    } else if rate >= 80.0 {
        35.0
    } else if rate >= 70.0 {
        30.0
    } else if rate >= 60.0 {
        25.0
    } else {
        rate * 0.4
    };

    let completion_component = statistics.average_completion_score * 0.4;

    let trend_component = if statistics.has_trend("improving") {
        20.0
    } else if statistics.has_trend("declining") {
        10.0
    } else {
        15.0
    };

    success_component + completion_component + trend_component
}

pub fn grade_for(score: f64) -> Grade {
    GRADE_LADDER
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map(|&(_, grade)| grade)
        .unwrap_or(Grade::F)
}

fn achievements(statistics: &SessionStatistics) -> Vec<String> {
    let rate = statistics.success_rate;
    let table: [(bool, &str); 5] = [
        (rate >= 90.0, "Excellent consistency: 90% or more of attempts were clean"),
        (
            (70.0..90.0).contains(&rate),
            "Solid session: most attempts were complete and safe",
        ),
        (
            statistics.average_completion_score >= 80.0,
            "Full range of motion on most attempts",
        ),
        (statistics.total_attempts >= 20, "High volume: 20 or more attempts"),
        (statistics.has_trend("improving"), "Improved as the session went on"),
    ];

    let mut earned: Vec<String> = table
        .iter()
        .filter(|(earned, _)| *earned)
        .map(|(_, text)| text.to_string())
        .collect();

    if earned.is_empty() && statistics.total_attempts > 0 {
        earned.push("Completed a training session".to_string());
    }
    earned
}

fn focus_blocks(statistics: &SessionStatistics) -> Vec<&'static FocusBlock> {
    let worst = |faults: &[FaultType]| {
        faults
            .iter()
            .map(|&fault| statistics.failure_rate(fault))
            .fold(0.0_f64, f64::max)
    };

    let table: [(bool, &'static FocusBlock); 3] = [
        (
            worst(&[
                FaultType::InsufficientDepth,
                FaultType::PartialRangeOfMotion,
                FaultType::IncompleteAttempt,
            ]) >= DEPTH_FOCUS_RATE,
            &DEPTH_BLOCK,
        ),
        (worst(&[FaultType::BackRounding]) >= SPINE_FOCUS_RATE, &SPINE_BLOCK),
        (
            worst(&[FaultType::KneeValgus, FaultType::SevereKneeValgus]) >= KNEE_FOCUS_RATE,
            &KNEE_BLOCK,
        ),
    ];

    table
        .into_iter()
        .filter(|(applies, _)| *applies)
        .map(|(_, block)| block)
        .collect()
}

fn rate_recommendations(statistics: &SessionStatistics) -> Vec<&'static str> {
    if statistics.total_attempts == 0 {
        return vec!["Record a few attempts to get personalised feedback"];
    }
    let rate = statistics.success_rate;
    if rate < 50.0 {
        vec![
            "Drop to bodyweight or a lighter load and rebuild the movement pattern",
            "Slow the descent to a three-second count",
        ]
    } else if rate < 70.0 {
        vec!["Film a set from the side and compare it against a reference squat"]
    } else if rate < 90.0 {
        vec!["Keep the current load and aim for cleaner reps before progressing"]
    } else {
        vec!["Form is consistent: consider a small load increase next session"]
    }
}

fn rate_goal(statistics: &SessionStatistics) -> String {
    let rate = statistics.success_rate;
    if rate < 70.0 {
        "Reach a 70% success rate next session".to_string()
    } else if rate < 90.0 {
        "Reach a 90% success rate next session".to_string()
    } else {
        "Hold a success rate of 90% or more while adding volume".to_string()
    }
}

// =============================================================================
// TESTS
// =============================================================================
