use anyhow::Context;
use reservations_client_instrumented::prelude::ReservationsClient;
use ticket_tunnel_runner::prelude::{HookResult, RunnerContext, UserValuesConstraint};

/// Values shared by every scenario in a run.
#[derive(Debug, Default)]
pub struct StressRunnerContext {
    client: Option<ReservationsClient>,
}

impl UserValuesConstraint for StressRunnerContext {}

impl StressRunnerContext {
    /// A handle to the shared client. Clones share a connection pool.
    pub fn client(&self) -> anyhow::Result<ReservationsClient> {
        self.client
            .clone()
            .context("Reservations client is not configured, was the setup hook registered?")
    }
}

/// Setup hook that builds the reservations client from the run's configuration.
pub fn configure_client(ctx: &mut RunnerContext<StressRunnerContext>) -> HookResult {
    let client = ReservationsClient::new(ctx.config())?;
    log::info!("Targeting {}", client.reservations_url());
    ctx.get_mut().client = Some(client);

    Ok(())
}
