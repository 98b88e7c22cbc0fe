mod operations_table;

use crate::report::in_memory_reporter::operations_table::OperationRow;
use crate::report::ReportCollector;
use crate::{OperationRecord, Phase};
use std::collections::BTreeMap;
use std::time::Duration;
use tabled::settings::Style;
use tabled::Table;

#[derive(Debug, Clone, Copy, PartialEq)]
struct OperationStats {
    count: usize,
    total: Duration,
    min: Duration,
    max: Duration,
    transport_failures: usize,
}

impl OperationStats {
    fn new(record: &OperationRecord) -> Self {
        Self {
            count: 1,
            total: record.duration(),
            min: record.duration(),
            max: record.duration(),
            transport_failures: usize::from(record.is_transport_failure()),
        }
    }

    fn add(&mut self, record: &OperationRecord) {
        self.count += 1;
        self.total += record.duration();
        self.min = self.min.min(record.duration());
        self.max = self.max.max(record.duration());
        self.transport_failures += usize::from(record.is_transport_failure());
    }
}

/// Keeps running statistics per scenario and phase, and prints them as a table at the end of the
/// run. Individual records are not retained so open ended scenarios do not grow memory.
#[derive(Debug, Default)]
pub struct InMemoryReporter {
    operations: BTreeMap<(String, Phase), OperationStats>,
}

impl InMemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> Vec<OperationRow> {
        self.operations
            .iter()
            .map(|((scenario, phase), stats)| OperationRow {
                scenario: scenario.clone(),
                phase: phase.to_string(),
                total_operations: stats.count,
                avg_time_ms: (stats.total.as_secs_f64() * 1000.0) / stats.count as f64,
                min_time_ms: stats.min.as_secs_f64() * 1000.0,
                max_time_ms: stats.max.as_secs_f64() * 1000.0,
                transport_failures: stats.transport_failures,
            })
            .collect()
    }

    pub(crate) fn print_summary_of_operations(&self) {
        println!("\nSummary of operations");
        if self.operations.is_empty() {
            println!("no data");
            return;
        }

        let mut table = Table::new(self.rows());
        table.with(Style::modern());

        println!("{table}");
    }
}

impl ReportCollector for InMemoryReporter {
    fn add_operation(&mut self, scenario: &str, operation_record: &OperationRecord) {
        self.operations
            .entry((scenario.to_string(), operation_record.phase()))
            .and_modify(|stats| stats.add(operation_record))
            .or_insert_with(|| OperationStats::new(operation_record));
    }

    fn finalize(&self) {
        self.print_summary_of_operations();
    }
}
