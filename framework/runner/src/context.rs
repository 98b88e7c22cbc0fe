use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use indicatif::ProgressBar;
use ticket_tunnel_core::prelude::{DelegatedShutdownListener, HarnessConfig, ShutdownHandle};
use ticket_tunnel_instruments::{OperationRecord, Reporter};

use crate::executor::Executor;
use crate::progress::{request_progress, start_progress};

pub trait UserValuesConstraint: Default + Debug + Send + Sync + 'static {}

/// State shared by every scenario in a run.
#[derive(Debug)]
pub struct RunnerContext<RV: UserValuesConstraint> {
    executor: Arc<Executor>,
    reporter: Arc<Reporter>,
    config: HarnessConfig,
    run_id: String,
    no_progress: bool,
    value: RV,
}

impl<RV: UserValuesConstraint> RunnerContext<RV> {
    pub(crate) fn new(
        executor: Arc<Executor>,
        reporter: Arc<Reporter>,
        config: HarnessConfig,
        run_id: String,
        no_progress: bool,
    ) -> Self {
        Self {
            executor,
            reporter,
            config,
            run_id,
            no_progress,
            value: Default::default(),
        }
    }

    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// A short random id chosen when the runner starts. Unique for each run.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn show_progress(&self) -> bool {
        !self.no_progress
    }

    pub fn get_mut(&mut self) -> &mut RV {
        &mut self.value
    }

    pub fn get(&self) -> &RV {
        &self.value
    }
}

/// State for one scenario run. A new context, with its own shutdown handle, is created every time a
/// scenario is started.
pub struct ScenarioContext<RV: UserValuesConstraint> {
    runner_context: Arc<RunnerContext<RV>>,
    scenario_name: String,
    shutdown_handle: ShutdownHandle,
    shutdown_listener: DelegatedShutdownListener,
}

impl<RV: UserValuesConstraint> ScenarioContext<RV> {
    pub(crate) fn new(
        runner_context: Arc<RunnerContext<RV>>,
        scenario_name: String,
        shutdown_handle: ShutdownHandle,
        shutdown_listener: DelegatedShutdownListener,
    ) -> Self {
        Self {
            runner_context,
            scenario_name,
            shutdown_handle,
            shutdown_listener,
        }
    }

    pub fn runner_context(&self) -> &Arc<RunnerContext<RV>> {
        &self.runner_context
    }

    pub fn config(&self) -> &HarnessConfig {
        self.runner_context.config()
    }

    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }

    /// The listener that observes cancellation of this scenario run.
    pub fn shutdown_listener(&mut self) -> &mut DelegatedShutdownListener {
        &mut self.shutdown_listener
    }

    /// Signal cancellation of this scenario run once `duration` has elapsed.
    pub fn stop_after(&self, duration: Duration) {
        let shutdown_handle = self.shutdown_handle.clone();
        let mut listener = self.shutdown_handle.new_listener();
        self.runner_context.executor().spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(duration) => {
                    log::debug!("Scenario time limit of {duration:?} reached");
                    shutdown_handle.shutdown();
                }
                // Already stopped for another reason
                _ = listener.wait_for_shutdown() => {}
            }
        });
    }

    /// See [Executor::execute_in_place]. The future is cancelled if this scenario is cancelled,
    /// including by a signal that arrived before this call.
    pub fn execute_in_place<T>(
        &self,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        self.runner_context
            .executor()
            .execute_in_place(self.shutdown_listener.clone(), fut)
    }

    /// See [Executor::execute_to_completion].
    pub fn execute_to_completion<T>(
        &self,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> anyhow::Result<T> {
        self.runner_context.executor().execute_to_completion(fut)
    }

    /// Hand a record to the run's reporter, attributed to this scenario.
    pub fn record(&self, operation_record: &OperationRecord) {
        self.runner_context
            .reporter
            .add_operation(&self.scenario_name, operation_record);
    }

    /// A progress bar for `total` requests, hidden when progress display is turned off.
    pub fn request_progress(&self, total: usize) -> ProgressBar {
        request_progress(total, !self.runner_context.show_progress())
    }

    /// Show a time based progress bar until this scenario run ends.
    pub fn start_timed_progress(&self, planned_runtime: Duration) {
        if !self.runner_context.show_progress() {
            return;
        }

        if let Err(e) = start_progress(planned_runtime, self.shutdown_handle.new_listener()) {
            log::warn!("Failed to start progress display: {e:?}");
        }
    }
}
