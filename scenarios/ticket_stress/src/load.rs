use indicatif::ProgressBar;
use reservations_client_instrumented::prelude::{RequestSpec, ReservationsClient};
use ticket_tunnel_runner::prelude::{
    LoadConfig, OperationRecord, RunSummary, ScenarioContext, TunnelResult, Verdict,
};

use crate::context::StressRunnerContext;
use crate::dispatch::dispatch;
use crate::report;

#[derive(Debug)]
pub struct LoadOutcome {
    pub summary: RunSummary,
    /// Number of seats offered for sale.
    pub expected: usize,
}

impl LoadOutcome {
    pub fn success_ratio(&self) -> Option<f64> {
        self.summary.success_ratio(self.expected)
    }
}

/// The seat window sold by the load scenario, one seat per request.
pub fn load_seats(config: &LoadConfig) -> Vec<u32> {
    (0..config.requests)
        .map(|offset| config.first_seat + offset as u32)
        .collect()
}

/// Reserve each of `seats` once, at most `width` in flight.
pub async fn sell_unique_seats(
    client: &ReservationsClient,
    seats: Vec<u32>,
    width: usize,
    progress: &ProgressBar,
    on_record: impl Fn(&OperationRecord),
) -> anyhow::Result<LoadOutcome> {
    let expected = seats.len();
    let specs = seats
        .into_iter()
        .map(|seat| RequestSpec::reserve([seat]))
        .collect();
    let dispatched = dispatch(client, specs, width, progress, on_record).await?;

    Ok(LoadOutcome {
        summary: RunSummary::from_records(&dispatched.records, dispatched.elapsed),
        expected,
    })
}

pub fn load(ctx: &mut ScenarioContext<StressRunnerContext>) -> TunnelResult<Verdict> {
    let client = ctx.runner_context().get().client()?;
    let config = ctx.config().load.clone();
    let seats = load_seats(&config);

    report::print_heading(
        ctx.runner_context().run_id(),
        &format!(
            "LOAD: selling {} seats from {} with {} workers",
            config.requests, config.first_seat, config.workers
        ),
    );

    let progress = ctx.request_progress(seats.len());
    let outcome = ctx.execute_in_place(sell_unique_seats(
        &client,
        seats,
        config.workers,
        &progress,
        |record| ctx.record(record),
    ))?;

    report::print_load(&outcome);

    if outcome.summary.tally.success < outcome.expected {
        log::warn!(
            "Only {} of {} unique seats were sold",
            outcome.summary.tally.success,
            outcome.expected
        );
    }

    Ok(Verdict::Measured)
}
