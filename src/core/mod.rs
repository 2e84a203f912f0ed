//! Core grading components

pub mod catalog;
pub mod detector;
pub mod scorer;
pub mod classifier;
pub mod aggregator;
pub mod statistics;
pub mod summary;
pub mod worker;

pub use catalog::FaultCatalog;
pub use detector::FrameFaultDetector;
pub use scorer::WeightedScorer;
pub use classifier::AttemptClassifier;
pub use aggregator::SequenceAggregator;
pub use statistics::{SessionLog, SessionStatisticsEngine};
pub use summary::{grade_for, session_score, SessionSummaryGenerator};
pub use worker::{GradingOutcome, GradingTicket, GradingWorker};
