//! Integration tests for frame grading
//!
//! Tests the full path: config → catalog → detector → scorer → sequence analysis

use pretty_assertions::assert_eq;
use std::sync::Arc;
use squatform::core::{FaultCatalog, SequenceAggregator};
use squatform::core::scorer::NO_FAULT_FEEDBACK;
use squatform::types::{FaultType, MetricsSnapshot, CONF_BACK_ANGLE};
use squatform::{GraderConfig, GradingError, SkillLevel};

fn deep_frame() -> MetricsSnapshot {
    MetricsSnapshot {
        knee_angle: 80.0,
        depth_achieved: true,
        ..MetricsSnapshot::default()
    }
}

/// Rounded back at the bottom of a deep squat
#[test]
fn test_rounded_back_frame() {
    let aggregator = SequenceAggregator::default();
    let catalog = FaultCatalog::standard();
    let frame = MetricsSnapshot { back_angle: 120.0, ..deep_frame() };

    let result = aggregator.grade_frame(&frame);

    // 100 - 40 + 5 depth bonus
    assert_eq!(result.overall_score, 65);
    assert_eq!(result.safety_score, 60);
    assert_eq!(result.technique_score, 100);
    assert_eq!(
        result.feedback,
        vec![catalog.correction_cue(FaultType::BackRounding).to_string()]
    );
    assert!(result.assessment.starts_with("Acceptable form"));
    assert_eq!(
        result.to_parseable_string(),
        "overall=65 | safety=60 | technique=100 | faults=BACK_ROUNDING"
    );
}

/// Low tracker confidence hides the fault entirely
#[test]
fn test_low_confidence_frame_is_clean() {
    let aggregator = SequenceAggregator::default();
    let frame = MetricsSnapshot { back_angle: 120.0, ..deep_frame() }.with_confidence(CONF_BACK_ANGLE, 0.6);

    let result = aggregator.grade_frame(&frame);
    assert!(!result.has_faults());
    assert_eq!(result.overall_score, 100);
    assert_eq!(result.feedback, vec![NO_FAULT_FEEDBACK.to_string()]);
}

/// Shallow squats cost more the higher they stop
#[test]
fn test_depth_penalty_bands() {
    let aggregator = SequenceAggregator::default();
    let shallow = |knee_angle| MetricsSnapshot {
        knee_angle,
        depth_achieved: false,
        ..MetricsSnapshot::default()
    };

    // 25 × 1.2, 25 × 1.0, 25 × 0.7
    assert_eq!(aggregator.grade_frame(&shallow(120.0)).overall_score, 70);
    assert_eq!(aggregator.grade_frame(&shallow(100.0)).overall_score, 75);
    assert_eq!(aggregator.grade_frame(&shallow(90.0)).overall_score, 82);
    assert_eq!(aggregator.grade_frame(&shallow(120.0)).technique_score, 79);
}

/// Thresholds come from TOML and flow into every component
#[test]
fn test_config_drives_detection() {
    let config = GraderConfig::from_toml_str(
        r#"
        [detector]
        back_angle_min = 130.0
        "#,
    )
    .unwrap();
    let aggregator = SequenceAggregator::from_config(Arc::new(FaultCatalog::standard()), &config);
    let frame = MetricsSnapshot { back_angle: 140.0, ..deep_frame() };

    assert!(!aggregator.grade_frame(&frame).has_faults());
    assert!(SequenceAggregator::default().grade_frame(&frame).has_faults());
}

/// Skill level presets move the limits every rule uses
#[test]
fn test_skill_level_changes_grading() {
    let catalog = Arc::new(FaultCatalog::standard());
    let grader = |level| SequenceAggregator::from_config(Arc::clone(&catalog), &GraderConfig::for_level(level));
    let frame = MetricsSnapshot { back_angle: 145.0, trunk_angle: 50.0, ..deep_frame() };

    // Beginner limits: back 141, lean 58.5
    assert!(!grader(SkillLevel::Beginner).grade_frame(&frame).has_faults());

    // Default limits: back 40 × 5/30, lean 20 × 5/20
    let result = grader(SkillLevel::Intermediate).grade_frame(&frame);
    assert_eq!(result.detected_faults.len(), 2);

    // Expert limits: back 40 × 17/30, lean 20 × 23/20
    let expert = grader(SkillLevel::Expert).grade_frame(&frame);
    assert!(expert.overall_score < result.overall_score);
}

/// A sequence report over a mixed repetition
#[test]
fn test_sequence_report() {
    let aggregator = SequenceAggregator::default();
    let leaning = MetricsSnapshot { trunk_angle: 65.0, ..deep_frame() };
    let frames = vec![deep_frame(), leaning.clone(), leaning, deep_frame()];

    let analysis = aggregator.analyze(&frames);
    assert_eq!(analysis.frame_count, 4);
    // 100, 85 (100 - 20 + 5), 85, 100
    assert_eq!(analysis.frame_scores, vec![100, 85, 85, 100]);
    assert_eq!(analysis.average_score, 93);
    assert!((analysis.consistency - 92.5).abs() < 1e-9);
    assert!(analysis.is_persistent(FaultType::ForwardLean));
    assert_eq!(analysis.improvement_priorities.len(), 1);
}

/// Raw fault ids are validated against the catalog
#[test]
fn test_unknown_fault_code() {
    let catalog = FaultCatalog::standard();
    assert_eq!(catalog.lookup_code("HEEL_RISE").unwrap().base_penalty, 10.0);

    let err = catalog.lookup_code("SHALLOW_SQUAT").unwrap_err();
    assert_eq!(err, GradingError::UnknownFaultType { code: "SHALLOW_SQUAT".to_string() });
}

/// Same frames always give the same report
#[test]
fn test_determinism_full_path() {
    let aggregator = SequenceAggregator::default();
    let frames = vec![
        MetricsSnapshot { asymmetry_score: 0.3, ..deep_frame() },
        MetricsSnapshot { knee_valgus_ratio: 0.65, ..deep_frame() },
        deep_frame(),
    ];

    let first = aggregator.analyze(&frames);
    for _ in 0..5 {
        assert_eq!(aggregator.analyze(&frames), first);
    }
}
