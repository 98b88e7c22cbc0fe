use indicatif::ProgressBar;
use rand::Rng;
use reservations_client_instrumented::prelude::{RequestSpec, ReservationsClient};
use ticket_tunnel_runner::prelude::{
    OperationRecord, RunSummary, ScenarioContext, TunnelResult, Verdict,
};

use crate::context::StressRunnerContext;
use crate::dispatch::dispatch;
use crate::report;

/// The outcome of identical reservations racing for the same seats.
#[derive(Debug)]
pub struct SeatContest {
    pub seats: Vec<u32>,
    pub summary: RunSummary,
    pub verdict: Verdict,
}

/// Race `competitors` reservations for `seat`, all in flight at once.
pub async fn contend_for_seat(
    client: &ReservationsClient,
    seat: u32,
    competitors: usize,
    progress: &ProgressBar,
    on_record: impl Fn(&OperationRecord),
) -> anyhow::Result<SeatContest> {
    let specs = vec![RequestSpec::reserve([seat]); competitors];
    let dispatched = dispatch(client, specs, competitors, progress, on_record).await?;

    let summary = RunSummary::from_records(&dispatched.records, dispatched.elapsed);
    let verdict = Verdict::single_winner(&summary.tally, competitors);

    Ok(SeatContest {
        seats: vec![seat],
        summary,
        verdict,
    })
}

pub fn integrity(ctx: &mut ScenarioContext<StressRunnerContext>) -> TunnelResult<Verdict> {
    let client = ctx.runner_context().get().client()?;
    let config = ctx.config().integrity.clone();
    let seat = rand::thread_rng().gen_range(config.seat_range.clone());

    report::print_heading(
        ctx.runner_context().run_id(),
        &format!(
            "INTEGRITY: {} requests racing for seat {}",
            config.competitors, seat
        ),
    );

    let progress = ctx.request_progress(config.competitors);
    let contest = ctx.execute_in_place(contend_for_seat(
        &client,
        seat,
        config.competitors,
        &progress,
        |record| ctx.record(record),
    ))?;

    report::print_contest(&contest);

    Ok(contest.verdict)
}
