use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use futures::FutureExt;
use ticket_tunnel_instruments::{OperationRecord, Phase};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// One request waiting to be dispatched by a [WorkerPool].
pub struct RequestTask {
    phase: Phase,
    future: BoxFuture<'static, OperationRecord>,
}

impl RequestTask {
    pub fn new(
        phase: Phase,
        future: impl Future<Output = OperationRecord> + Send + 'static,
    ) -> Self {
        Self {
            phase,
            future: future.boxed(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

/// Runs request tasks with at most `width` of them in flight, yielding their records in the order
/// they complete.
///
/// Every submitted task yields exactly one [OperationRecord]. A task that panics is recorded as a
/// transport failure for its phase.
///
/// A pool is meant to be scoped to one scenario run, or one batch of a run. Dropping the pool
/// aborts any task that has not been collected yet.
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    tasks: JoinSet<OperationRecord>,
}

impl WorkerPool {
    pub fn new(width: usize) -> anyhow::Result<Self> {
        anyhow::ensure!(width > 0, "Worker pool width must be greater than zero");

        Ok(Self {
            permits: Arc::new(Semaphore::new(width)),
            tasks: JoinSet::new(),
        })
    }

    /// Queue a task. It starts as soon as one of the `width` slots is free.
    ///
    /// Must be called from within the async runtime.
    pub fn submit(&mut self, task: RequestTask) {
        let permits = self.permits.clone();
        self.tasks.spawn(async move {
            let RequestTask { phase, future } = task;
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return OperationRecord::transport_failure(
                        phase,
                        Duration::ZERO,
                        "worker pool closed before the request started",
                    )
                }
            };

            let started = Instant::now();
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(record) => record,
                Err(panic) => OperationRecord::transport_failure(
                    phase,
                    started.elapsed(),
                    format!("worker task panicked: {}", panic_message(panic.as_ref())),
                ),
            }
        });
    }

    pub fn submit_all(&mut self, tasks: impl IntoIterator<Item = RequestTask>) {
        for task in tasks {
            self.submit(task);
        }
    }

    /// Tasks submitted but not yet collected, whether running or waiting for a slot.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for the next task to complete. Returns `None` once every submitted task has been
    /// collected.
    pub async fn next_completed(&mut self) -> Option<OperationRecord> {
        loop {
            match self.tasks.join_next().await? {
                Ok(record) => return Some(record),
                // Tasks catch their own panics, so this only happens if the runtime is going away.
                Err(e) => log::error!("Worker task did not complete: {e:?}"),
            }
        }
    }

    /// Collect every outstanding task, in completion order.
    pub async fn drain(&mut self) -> Vec<OperationRecord> {
        let mut records = Vec::with_capacity(self.tasks.len());
        while let Some(record) = self.next_completed().await {
            records.push(record);
        }
        records
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}
