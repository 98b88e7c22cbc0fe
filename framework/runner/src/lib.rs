mod cli;
mod context;
mod definition;
mod executor;
mod init;
mod menu;
mod monitor;
mod pool;
mod progress;
mod run;
mod shutdown;
mod types;

pub mod prelude {
    pub use crate::cli::{ContractOpt, ReporterOpt, TicketTunnelCli};
    pub use crate::context::UserValuesConstraint;
    pub use crate::context::{RunnerContext, ScenarioContext};
    pub use crate::definition::{HookResult, ScenarioDefinitionBuilder};
    pub use crate::executor::Executor;
    pub use crate::init::init;
    pub use crate::pool::{RequestTask, WorkerPool};
    pub use crate::run::{run, RunOutcome, ScenarioOutcome};
    pub use crate::types::TunnelResult;

    pub use ticket_tunnel_core::prelude::*;
    pub use ticket_tunnel_instruments::*;
}
