use std::sync::Arc;

use anyhow::Context;
use ticket_tunnel_core::prelude::ShutdownSignalError;
use ticket_tunnel_instruments::{InMemoryReporter, NoopReporter, ReportCollector, Reporter, Verdict};

use crate::cli::ReporterOpt;
use crate::context::{RunnerContext, ScenarioContext, UserValuesConstraint};
use crate::definition::{NamedScenario, RunMode, ScenarioDefinitionBuilder};
use crate::executor::Executor;
use crate::menu::run_menu;
use crate::monitor::start_monitor;
use crate::shutdown::{start_shutdown_listener, ShutdownRelay};

/// How a single scenario run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioOutcome {
    Finished(Verdict),
    /// Stopped by a shutdown signal before it could produce a verdict.
    Cancelled,
    /// The scenario hook returned an error.
    Failed(String),
}

/// Every scenario run in the order they ran.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOutcome {
    pub scenarios: Vec<(String, ScenarioOutcome)>,
}

impl RunOutcome {
    /// `false` if any scenario failed or found a critical violation.
    pub fn is_success(&self) -> bool {
        self.scenarios.iter().all(|(_, outcome)| match outcome {
            ScenarioOutcome::Finished(verdict) => !verdict.is_critical(),
            ScenarioOutcome::Cancelled => true,
            ScenarioOutcome::Failed(_) => false,
        })
    }
}

pub fn run<RV: UserValuesConstraint>(
    definition: ScenarioDefinitionBuilder<RV>,
) -> anyhow::Result<RunOutcome> {
    let definition = definition.build()?;

    let run_id = nanoid::nanoid!();
    log::info!(
        "Starting {} run {} against {} at {}",
        definition.name,
        run_id,
        definition.config.base_url,
        chrono::Utc::now().to_rfc3339()
    );

    let collector: Box<dyn ReportCollector + Send> = match definition.reporter {
        ReporterOpt::Noop => Box::new(NoopReporter),
        ReporterOpt::InMemory => Box::new(InMemoryReporter::new()),
    };
    let reporter = Arc::new(Reporter::new(vec![collector]));

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let relay = ShutdownRelay::default();
    start_shutdown_listener(&runtime, relay.clone(), reporter.clone());
    let executor = Arc::new(Executor::new(runtime));

    let mut runner_context = RunnerContext::new(
        executor,
        reporter.clone(),
        definition.config.clone(),
        run_id,
        definition.no_progress,
    );

    if let Some(setup_fn) = &definition.setup_fn {
        setup_fn(&mut runner_context)?;
    }

    let runner_context = Arc::new(runner_context);
    let mut outcome = RunOutcome::default();

    match &definition.mode {
        RunMode::Interactive => {
            let stdin = std::io::stdin();
            run_menu(
                stdin.lock(),
                std::io::stdout(),
                &definition.name,
                &definition.scenarios,
                |index| {
                    let scenario = &definition.scenarios[index];
                    outcome.scenarios.push((
                        scenario.name.clone(),
                        run_scenario(runner_context.clone(), &relay, scenario),
                    ));
                },
            )
            .context("Failed to read menu input")?;
        }
        RunMode::Single(name) => {
            if let Some(scenario) = definition.scenarios.iter().find(|s| &s.name == name) {
                outcome.scenarios.push((
                    scenario.name.clone(),
                    run_scenario(runner_context.clone(), &relay, scenario),
                ));
            }
        }
        RunMode::All => {
            for (i, scenario) in definition.scenarios.iter().enumerate() {
                if i > 0 && !definition.pause_between.is_zero() {
                    std::thread::sleep(definition.pause_between);
                }
                outcome.scenarios.push((
                    scenario.name.clone(),
                    run_scenario(runner_context.clone(), &relay, scenario),
                ));
            }
        }
    }

    reporter.finalize();

    Ok(outcome)
}

fn run_scenario<RV: UserValuesConstraint>(
    runner_context: Arc<RunnerContext<RV>>,
    relay: &ShutdownRelay,
    scenario: &NamedScenario<RV>,
) -> ScenarioOutcome {
    log::info!("Running scenario: {}", scenario.name);

    let (shutdown_handle, shutdown_listener) = relay.begin();

    // Started per scenario so that the warning is attributed to the scenario that was running.
    if let Err(e) = start_monitor(shutdown_handle.new_listener()) {
        log::warn!("Failed to start resource monitor: {e:?}");
    }

    let mut context = ScenarioContext::new(
        runner_context,
        scenario.name.clone(),
        shutdown_handle,
        shutdown_listener,
    );
    let result = (scenario.hook)(&mut context);

    relay.end();

    match result {
        Ok(verdict) => {
            if verdict.is_critical() {
                log::error!("Scenario {} found a critical violation: {}", scenario.name, verdict);
            } else {
                log::info!("Scenario {} finished: {}", scenario.name, verdict);
            }
            ScenarioOutcome::Finished(verdict)
        }
        Err(e) if e.is::<ShutdownSignalError>() => {
            println!("Scenario {} was cancelled", scenario.name);
            ScenarioOutcome::Cancelled
        }
        Err(e) => {
            log::error!("Scenario {} failed: {:?}", scenario.name, e);
            ScenarioOutcome::Failed(e.to_string())
        }
    }
}
