use std::time::Duration;

use ticket_tunnel_core::prelude::HarnessConfig;
use ticket_tunnel_instruments::Verdict;

use crate::cli::{ReporterOpt, TicketTunnelCli};
use crate::context::{RunnerContext, ScenarioContext, UserValuesConstraint};
use crate::init::init;
use crate::types::TunnelResult;

pub type HookResult = anyhow::Result<()>;

pub type GlobalHookMut<RV> = fn(&mut RunnerContext<RV>) -> HookResult;
pub type ScenarioHook<RV> = fn(&mut ScenarioContext<RV>) -> TunnelResult<Verdict>;

/// A scenario that can be picked from the menu or run by name.
pub struct NamedScenario<RV: UserValuesConstraint> {
    pub name: String,
    pub description: String,
    pub hook: ScenarioHook<RV>,
}

/// How the runner chooses which scenarios to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RunMode {
    /// Show a menu until the user exits.
    Interactive,
    /// Run one scenario by name.
    Single(String),
    /// Run every scenario in the order they were defined.
    All,
}

/// The builder for a scenario definition.
///
/// This must be used in `main` to define the scenarios that the harness offers.
pub struct ScenarioDefinitionBuilder<RV: UserValuesConstraint> {
    /// The name of the harness, shown in the menu and in logs.
    ///
    /// Recommended value is `env!("CARGO_PKG_NAME")`.
    name: String,
    /// This value is initialised for you and you cannot change it.
    #[doc(hidden)]
    cli: TicketTunnelCli,
    /// Global setup hook. It will be run once, before any scenario is started.
    setup_fn: Option<GlobalHookMut<RV>>,
    /// The scenarios, in the order they are offered and run.
    scenarios: Vec<NamedScenario<RV>>,
}

pub struct ScenarioDefinition<RV: UserValuesConstraint> {
    pub name: String,
    pub config: HarnessConfig,
    pub(crate) mode: RunMode,
    pub pause_between: Duration,
    pub no_progress: bool,
    pub reporter: ReporterOpt,
    pub setup_fn: Option<GlobalHookMut<RV>>,
    pub scenarios: Vec<NamedScenario<RV>>,
}

impl<RV: UserValuesConstraint> ScenarioDefinitionBuilder<RV> {
    /// Initialise a new scenario definition from the harness name and command line arguments.
    pub fn new(name: &str, cli: TicketTunnelCli) -> Self {
        Self {
            name: name.to_string(),
            cli,
            setup_fn: None,
            scenarios: Vec::new(),
        }
    }

    /// Initialise logging and parse the command line, then create a new scenario definition.
    pub fn new_with_init(name: &str) -> Self {
        Self::new(name, init())
    }

    /// Set the global setup hook [ScenarioDefinitionBuilder::setup_fn].
    pub fn use_setup(mut self, setup_fn: fn(&mut RunnerContext<RV>) -> HookResult) -> Self {
        self.setup_fn = Some(setup_fn);
        self
    }

    /// Add a named scenario [ScenarioDefinitionBuilder::scenarios].
    pub fn use_scenario(
        mut self,
        name: &str,
        description: &str,
        hook: fn(&mut ScenarioContext<RV>) -> TunnelResult<Verdict>,
    ) -> Self {
        if self.scenarios.iter().any(|s| s.name == name) {
            panic!("Scenario [{}] is already defined", name);
        }

        self.scenarios.push(NamedScenario {
            name: name.to_string(),
            description: description.to_string(),
            hook,
        });
        self
    }

    pub(crate) fn build(self) -> anyhow::Result<ScenarioDefinition<RV>> {
        let config = self.cli.to_config()?;
        config.validate()?;

        let mode = match (&self.cli.scenario, self.cli.all) {
            (Some(name), _) => {
                if !self.scenarios.iter().any(|s| &s.name == name) {
                    anyhow::bail!(
                        "Unknown scenario '{}', expected one of: {}",
                        name,
                        self.scenarios
                            .iter()
                            .map(|s| s.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                }
                RunMode::Single(name.clone())
            }
            (None, true) => RunMode::All,
            (None, false) => RunMode::Interactive,
        };

        Ok(ScenarioDefinition {
            name: self.name,
            config,
            mode,
            pause_between: Duration::from_secs(self.cli.pause_s),
            no_progress: self.cli.no_progress,
            reporter: self.cli.reporter,
            setup_fn: self.setup_fn,
            scenarios: self.scenarios,
        })
    }
}
