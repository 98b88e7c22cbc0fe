use std::future::Future;

use ticket_tunnel_core::prelude::{DelegatedShutdownListener, ShutdownSignalError};

/// Bridges the synchronous scenario hooks onto the async runtime that drives requests.
#[derive(Debug)]
pub struct Executor {
    runtime: tokio::runtime::Runtime,
}

impl Executor {
    pub(crate) fn new(runtime: tokio::runtime::Runtime) -> Self {
        Self { runtime }
    }

    /// Run async code in place, blocking until it completes.
    ///
    /// Note that the future will be cancelled if `shutdown_listener` has received, or receives, the
    /// shutdown signal. Anything owned by the future is dropped at that point, which aborts any
    /// [crate::pool::WorkerPool] it holds.
    pub fn execute_in_place<T>(
        &self,
        mut shutdown_listener: DelegatedShutdownListener,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        self.runtime.block_on(async move {
            tokio::select! {
                result = fut => result,
                _ = shutdown_listener.wait_for_shutdown() => {
                    Err(anyhow::anyhow!(ShutdownSignalError::default()))
                },
            }
        })
    }

    /// Run async code in place without racing it against the shutdown signal.
    ///
    /// The future is responsible for checking for shutdown itself. Use this when in-flight work
    /// must be allowed to finish so that it can be accounted for.
    pub fn execute_to_completion<T>(
        &self,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        self.runtime.block_on(fut)
    }

    /// Submit async code to be run in the background.
    ///
    /// Note that the future will not be cancelled if the scenario is shut down. It is also not
    /// guaranteed that the runner will wait for the future to complete before shutting down.
    pub fn spawn(&self, fut: impl Future<Output = ()> + Send + 'static) {
        self.runtime.spawn(fut);
    }
}
