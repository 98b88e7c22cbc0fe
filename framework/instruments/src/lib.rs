mod aggregate;
mod report;
mod verdict;

use std::time::Duration;

pub use aggregate::{
    counts_by_status, mean_latency, throughput, RunSummary, RunningTotals, StatusBucket,
    StatusTally,
};
pub use report::{InMemoryReporter, NoopReporter, ReportCollector, Reporter, SummaryTable};
pub use verdict::Verdict;

/// Status code recorded when the request never got an HTTP response.
pub const TRANSPORT_FAILURE: u16 = 0;

/// Which side of the backend a request exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum Phase {
    #[display("WRITE")]
    Write,
    #[display("READ")]
    Read,
}

/// The outcome of exactly one dispatched request. Never modified once created.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    phase: Phase,
    status_code: u16,
    duration: Duration,
    error: Option<String>,
}

impl OperationRecord {
    /// A request that got an HTTP response, whatever its status.
    pub fn completed(phase: Phase, status_code: u16, duration: Duration) -> Self {
        Self {
            phase,
            status_code,
            duration,
            error: None,
        }
    }

    /// A request that failed before any HTTP response arrived.
    pub fn transport_failure(phase: Phase, duration: Duration, error: impl Into<String>) -> Self {
        Self {
            phase,
            status_code: TRANSPORT_FAILURE,
            duration,
            error: Some(error.into()),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn bucket(&self) -> StatusBucket {
        StatusBucket::of(self.status_code)
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status_code == TRANSPORT_FAILURE
    }
}
