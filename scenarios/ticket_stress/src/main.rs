use ticket_stress::{batch, chaos, configure_client, integrity, load, mixed, StressRunnerContext};
use ticket_tunnel_runner::prelude::*;

fn main() -> TunnelResult<()> {
    let builder = ScenarioDefinitionBuilder::<StressRunnerContext>::new_with_init(env!(
        "CARGO_PKG_NAME"
    ))
    .use_setup(configure_client)
    .use_scenario(
        "integrity",
        "Integrity: many users race for one seat",
        integrity,
    )
    .use_scenario("load", "Load: sell a block of unique seats", load)
    .use_scenario(
        "batch",
        "Batch: many users race for the same seat group",
        batch,
    )
    .use_scenario("mixed", "Mixed: steady reads and writes for a while", mixed)
    .use_scenario(
        "chaos",
        "Chaos: continuous traffic while you break the backend",
        chaos,
    );

    let outcome = run(builder)?;

    if !outcome.is_success() {
        anyhow::bail!("At least one scenario failed or found a critical violation");
    }

    Ok(())
}
