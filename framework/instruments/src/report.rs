mod in_memory_reporter;
mod summary_table;

use parking_lot::Mutex;

use crate::OperationRecord;

pub use in_memory_reporter::InMemoryReporter;
pub use summary_table::SummaryTable;

pub trait ReportCollector {
    /// Record one completed request for the named scenario.
    fn add_operation(&mut self, scenario: &str, operation_record: &OperationRecord);

    /// Called once when the run is over.
    fn finalize(&self);
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NoopReporter;

impl ReportCollector for NoopReporter {
    fn add_operation(&mut self, _scenario: &str, _operation_record: &OperationRecord) {}

    fn finalize(&self) {}
}

/// Fans records out to the configured collectors. Shared between worker tasks, so every call
/// takes the lock for the duration of a single record.
pub struct Reporter {
    collectors: Mutex<Vec<Box<dyn ReportCollector + Send>>>,
}

impl Reporter {
    pub fn new(collectors: Vec<Box<dyn ReportCollector + Send>>) -> Self {
        Self {
            collectors: Mutex::new(collectors),
        }
    }

    pub fn add_operation(&self, scenario: &str, operation_record: &OperationRecord) {
        for collector in self.collectors.lock().iter_mut() {
            collector.add_operation(scenario, operation_record);
        }
    }

    pub fn finalize(&self) {
        let collectors = self.collectors.lock();
        log::debug!("Finalizing {} report collectors", collectors.len());
        for collector in collectors.iter() {
            collector.finalize();
        }
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("collectors", &self.collectors.lock().len())
            .finish()
    }
}
