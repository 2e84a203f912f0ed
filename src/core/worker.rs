//! Grading Worker: grades a finished repetition off the capture loop
//!
//! One task in flight per worker. The outcome arrives on a oneshot channel;
//! errors and panics inside the task become `GradingOutcome::Failed` and never
//! reach the caller as a crash.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{info, warn};
use crate::core::SequenceAggregator;
use crate::error::{GradingError, Result};
use crate::types::{MetricsSnapshot, SequenceAnalysis};

type GradeFn = dyn Fn(&[MetricsSnapshot]) -> Result<SequenceAnalysis> + Send + Sync;

/// What the background task produced
#[derive(Debug, Clone, PartialEq)]
pub enum GradingOutcome {
    Graded(SequenceAnalysis),
    /// Carries the error text of the failed task
    Failed(String),
}

impl GradingOutcome {
    pub fn is_graded(&self) -> bool {
        matches!(self, GradingOutcome::Graded(_))
    }

    /// Convert to a `Result`, failures as `BackgroundTask` errors
    pub fn into_result(self) -> Result<SequenceAnalysis> {
        match self {
            GradingOutcome::Graded(analysis) => Ok(analysis),
            GradingOutcome::Failed(message) => Err(GradingError::BackgroundTask { message }),
        }
    }
}

/// Receiving end for one submitted repetition
#[derive(Debug)]
pub struct GradingTicket {
    rx: oneshot::Receiver<GradingOutcome>,
}

impl GradingTicket {
    /// Wait for the outcome
    pub async fn outcome(self) -> GradingOutcome {
        self.rx
            .await
            .unwrap_or_else(|_| GradingOutcome::Failed("grading task dropped its result".to_string()))
    }
}

/// Runs repetition grading on tokio's blocking pool
#[derive(Clone)]
pub struct GradingWorker {
    grade: Arc<GradeFn>,
    in_flight: Arc<AtomicBool>,
}

impl std::fmt::Debug for GradingWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GradingWorker")
            .field("in_flight", &self.is_busy())
            .finish()
    }
}

impl GradingWorker {
    /// Worker grading with a sequence aggregator
    pub fn new(aggregator: SequenceAggregator) -> Self {
        Self::from_fn(move |frames| Ok(aggregator.analyze(frames)))
    }

    /// Worker grading with any function
    pub fn from_fn<F>(grade: F) -> Self
    where
        F: Fn(&[MetricsSnapshot]) -> Result<SequenceAnalysis> + Send + Sync + 'static,
    {
        Self {
            grade: Arc::new(grade),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Is a repetition being graded right now?
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Start grading a repetition on the current tokio runtime.
    ///
    /// Fails with `RuntimeUnavailable` outside a runtime and with `TaskInFlight`
    /// if the previous repetition is still being graded. Neither leaves the
    /// worker busy.
    pub fn submit(&self, frames: Vec<MetricsSnapshot>) -> Result<GradingTicket> {
        let handle = Handle::try_current().map_err(|_| GradingError::RuntimeUnavailable)?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(GradingError::TaskInFlight);
        }

        let (tx, rx) = oneshot::channel();
        let grade = Arc::clone(&self.grade);
        let in_flight = Arc::clone(&self.in_flight);
        let frame_count = frames.len();

        let blocking = handle.clone();
        handle.spawn(async move {
            let joined = blocking.spawn_blocking(move || grade(&frames)).await;

            let outcome = match joined {
                Ok(Ok(analysis)) => {
                    info!(frame_count, average = analysis.average_score, "repetition graded");
                    GradingOutcome::Graded(analysis)
                }
                Ok(Err(e)) => {
                    warn!(code = e.error_code(), "repetition grading failed: {}", e);
                    GradingOutcome::Failed(e.to_string())
                }
                Err(join_error) => {
                    let message = if join_error.is_panic() {
                        panic_message(join_error.into_panic())
                    } else {
                        "grading task was cancelled".to_string()
                    };
                    warn!("repetition grading panicked: {}", message);
                    GradingOutcome::Failed(message)
                }
            };

            in_flight.store(false, Ordering::Release);
            let _ = tx.send(outcome);
        });

        Ok(GradingTicket { rx })
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "grading task panicked".to_string()
    }
}

// =============================================================================
// TESTS
// =============================================================================
