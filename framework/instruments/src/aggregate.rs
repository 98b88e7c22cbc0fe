//! Pure reductions over collections of [OperationRecord]s.
//!
//! None of these functions divide by zero. Anything that cannot be computed from the input, such as
//! the mean latency of an empty collection, is reported as `None` and rendered as "no data".

use std::collections::BTreeMap;
use std::time::Duration;

use itertools::Itertools;

use crate::{OperationRecord, Phase};

/// How a status code counts towards a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBucket {
    /// Any 2xx, the booking or read went through.
    Success,
    /// 409, the seat or group was already held. Expected under contention.
    Conflict,
    /// Transport failures, 5xx and anything unrecognised.
    Error,
}

impl StatusBucket {
    pub fn of(status_code: u16) -> Self {
        match status_code {
            200..=299 => StatusBucket::Success,
            409 => StatusBucket::Conflict,
            _ => StatusBucket::Error,
        }
    }
}

/// Success, conflict and error counts for a collection of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTally {
    pub success: usize,
    pub conflict: usize,
    pub error: usize,
}

impl StatusTally {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a OperationRecord>) -> Self {
        records
            .into_iter()
            .fold(StatusTally::default(), |mut tally, record| {
                tally.add(record.bucket());
                tally
            })
    }

    pub fn add(&mut self, bucket: StatusBucket) {
        match bucket {
            StatusBucket::Success => self.success += 1,
            StatusBucket::Conflict => self.conflict += 1,
            StatusBucket::Error => self.error += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.conflict + self.error
    }
}

/// Number of records per status code, ordered by status code. Transport failures are counted
/// under status `0`.
pub fn counts_by_status(records: &[OperationRecord]) -> BTreeMap<u16, usize> {
    records
        .iter()
        .map(OperationRecord::status_code)
        .counts()
        .into_iter()
        .collect()
}

/// Mean duration of the records in `phase`, or `None` if there are none.
pub fn mean_latency(records: &[OperationRecord], phase: Phase) -> Option<Duration> {
    let (count, total) = records
        .iter()
        .filter(|r| r.phase() == phase)
        .fold((0u32, Duration::ZERO), |(count, total), r| {
            (count + 1, total + r.duration())
        });

    if count == 0 {
        None
    } else {
        Some(total / count)
    }
}

/// Requests per second, or `None` if no time has elapsed.
pub fn throughput(count: usize, elapsed: Duration) -> Option<f64> {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        Some(count as f64 / secs)
    } else {
        None
    }
}

/// Statistics derived once from the full set of records for a scenario run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub counts: BTreeMap<u16, usize>,
    pub tally: StatusTally,
    pub write_requests: usize,
    pub read_requests: usize,
    pub mean_write_latency: Option<Duration>,
    pub mean_read_latency: Option<Duration>,
    pub elapsed: Duration,
    pub throughput: Option<f64>,
}

impl RunSummary {
    pub fn from_records(records: &[OperationRecord], elapsed: Duration) -> Self {
        let write_requests = records.iter().filter(|r| r.phase() == Phase::Write).count();

        Self {
            counts: counts_by_status(records),
            tally: StatusTally::from_records(records),
            write_requests,
            read_requests: records.len() - write_requests,
            mean_write_latency: mean_latency(records, Phase::Write),
            mean_read_latency: mean_latency(records, Phase::Read),
            elapsed,
            throughput: throughput(records.len(), elapsed),
        }
    }

    pub fn total(&self) -> usize {
        self.tally.total()
    }

    /// Number of records with exactly this status code.
    pub fn count_of(&self, status_code: u16) -> usize {
        self.counts.get(&status_code).copied().unwrap_or(0)
    }

    /// Successes as a fraction of `expected`, or `None` if nothing was expected.
    pub fn success_ratio(&self, expected: usize) -> Option<f64> {
        if expected == 0 {
            None
        } else {
            Some(self.tally.success as f64 / expected as f64)
        }
    }
}

/// Incrementally maintained totals for open ended runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningTotals {
    pub dispatched: usize,
    pub survived: usize,
    pub failed: usize,
    pub batches: usize,
}

impl RunningTotals {
    /// Statuses that show the backend is still doing its job. A conflict is a correct answer.
    pub fn is_acceptable(status_code: u16) -> bool {
        matches!(status_code, 200 | 201 | 409)
    }

    pub fn record(&mut self, record: &OperationRecord) {
        self.dispatched += 1;
        if Self::is_acceptable(record.status_code()) {
            self.survived += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn finish_batch(&mut self) {
        self.batches += 1;
    }

    /// Survived requests as a fraction of everything dispatched so far.
    pub fn survival_ratio(&self) -> Option<f64> {
        if self.dispatched == 0 {
            None
        } else {
            Some(self.survived as f64 / self.dispatched as f64)
        }
    }
}
