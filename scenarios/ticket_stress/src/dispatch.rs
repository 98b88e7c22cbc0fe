use std::time::{Duration, Instant};

use indicatif::ProgressBar;
use reservations_client_instrumented::prelude::{RequestSpec, ReservationsClient};
use ticket_tunnel_runner::prelude::{OperationRecord, RequestTask, WorkerPool};

/// Every record from one bounded dispatch, in completion order.
#[derive(Debug)]
pub struct Dispatched {
    pub records: Vec<OperationRecord>,
    /// Wall time from the first submission until the last record was collected.
    pub elapsed: Duration,
}

/// Run all of `specs` with at most `width` in flight and wait for every one of them.
///
/// Each collected record is passed to `on_record` and advances `progress` as it arrives. The pool
/// is owned by the returned future, so dropping the future aborts whatever is still in flight.
pub async fn dispatch(
    client: &ReservationsClient,
    specs: Vec<RequestSpec>,
    width: usize,
    progress: &ProgressBar,
    on_record: impl Fn(&OperationRecord),
) -> anyhow::Result<Dispatched> {
    let mut pool = WorkerPool::new(width)?;
    let mut records = Vec::with_capacity(specs.len());

    let started = Instant::now();
    pool.submit_all(
        specs
            .into_iter()
            .map(|spec| RequestTask::new(spec.phase(), client.clone().execute(spec))),
    );

    while let Some(record) = pool.next_completed().await {
        on_record(&record);
        progress.inc(1);
        records.push(record);
    }
    let elapsed = started.elapsed();
    progress.finish_and_clear();

    Ok(Dispatched { records, elapsed })
}
