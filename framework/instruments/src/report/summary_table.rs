use std::fmt;
use std::time::Duration;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::{RunSummary, StatusBucket};

#[derive(Tabled)]
struct StatusRow {
    status: String,
    meaning: &'static str,
    count: usize,
}

#[derive(Tabled)]
struct PhaseRow {
    phase: &'static str,
    requests: usize,
    #[tabled(display = "millis_or_no_data")]
    mean_latency: Option<Duration>,
}

fn millis_or_no_data(value: &Option<Duration>) -> String {
    match value {
        Some(d) => format!("{:.0}ms", d.as_secs_f64() * 1000.0),
        None => "no data".to_string(),
    }
}

/// Console rendering of a [RunSummary].
pub struct SummaryTable<'a> {
    summary: &'a RunSummary,
}

impl<'a> SummaryTable<'a> {
    pub fn new(summary: &'a RunSummary) -> Self {
        Self { summary }
    }

    fn status_rows(&self) -> Vec<StatusRow> {
        self.summary
            .counts
            .iter()
            .map(|(status, count)| StatusRow {
                status: if *status == crate::TRANSPORT_FAILURE {
                    "-".to_string()
                } else {
                    status.to_string()
                },
                meaning: match (*status, StatusBucket::of(*status)) {
                    (crate::TRANSPORT_FAILURE, _) => "transport failure",
                    (_, StatusBucket::Success) => "success",
                    (_, StatusBucket::Conflict) => "conflict",
                    (_, StatusBucket::Error) => "backend error",
                },
                count: *count,
            })
            .collect()
    }

    fn phase_rows(&self) -> Vec<PhaseRow> {
        vec![
            PhaseRow {
                phase: "WRITE",
                requests: self.summary.write_requests,
                mean_latency: self.summary.mean_write_latency,
            },
            PhaseRow {
                phase: "READ",
                requests: self.summary.read_requests,
                mean_latency: self.summary.mean_read_latency,
            },
        ]
    }
}

impl fmt::Display for SummaryTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.summary.total() == 0 {
            return writeln!(f, "no data");
        }

        let mut statuses = Table::new(self.status_rows());
        statuses.with(Style::modern());
        writeln!(f, "{statuses}")?;

        let mut phases = Table::new(self.phase_rows());
        phases.with(Style::modern());
        writeln!(f, "{phases}")?;

        writeln!(
            f,
            "Elapsed: {:.2}s | Throughput: {}",
            self.summary.elapsed.as_secs_f64(),
            match self.summary.throughput {
                Some(rps) => format!("{rps:.2} req/s"),
                None => "no data".to_string(),
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OperationRecord, Phase};

    #[test]
    fn empty_summary_renders_no_data() {
        let summary = RunSummary::from_records(&[], Duration::ZERO);

        assert_eq!("no data\n", SummaryTable::new(&summary).to_string());
    }

    #[test]
    fn render_statuses_and_missing_phase() {
        let records = vec![
            OperationRecord::completed(Phase::Write, 201, Duration::from_millis(12)),
            OperationRecord::completed(Phase::Write, 409, Duration::from_millis(12)),
            OperationRecord::transport_failure(Phase::Write, Duration::from_millis(12), "refused"),
        ];
        let summary = RunSummary::from_records(&records, Duration::from_secs(1));

        let rendered = SummaryTable::new(&summary).to_string();

        assert!(rendered.contains("transport failure"));
        assert!(rendered.contains("conflict"));
        assert!(rendered.contains("12ms"));
        // No reads were made
        assert!(rendered.contains("no data"));
        assert!(rendered.contains("3.00 req/s"));
    }
}
