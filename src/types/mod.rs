//! Core types for Squatform

mod attempt;
mod fault;
mod metrics;
mod score;
mod sequence;
mod session;

pub use attempt::{AttemptRecord, AttemptStatus, Phase};
pub use fault::{FaultDefinition, FaultInstance, FaultType, Severity};
pub use metrics::{MetricsSnapshot, CONF_BACK_ANGLE, CONF_DEPTH, CONF_KNEE_VALGUS, CONF_TRUNK_ANGLE};
pub use score::ScoreResult;
pub use sequence::SequenceAnalysis;
pub use session::{Grade, SessionStatistics, SessionSummary};
