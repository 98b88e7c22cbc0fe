use indicatif::ProgressBar;
use rand::Rng;
use reservations_client_instrumented::prelude::{RequestSpec, ReservationsClient};
use ticket_tunnel_runner::prelude::{
    ContractVersion, OperationRecord, RunSummary, ScenarioContext, TunnelResult, Verdict,
};

use crate::context::StressRunnerContext;
use crate::dispatch::dispatch;
use crate::integrity::SeatContest;
use crate::report;

/// `size` consecutive seats starting at `start`.
pub fn seat_group(start: u32, size: usize) -> Vec<u32> {
    (0..size).map(|offset| start + offset as u32).collect()
}

/// Race `competitors` reservations for the whole of `group`, at most `width` in flight.
pub async fn contend_for_group(
    client: &ReservationsClient,
    group: Vec<u32>,
    competitors: usize,
    width: usize,
    progress: &ProgressBar,
    on_record: impl Fn(&OperationRecord),
) -> anyhow::Result<SeatContest> {
    let specs = vec![RequestSpec::reserve(group.clone()); competitors];
    let dispatched = dispatch(client, specs, width, progress, on_record).await?;

    let summary = RunSummary::from_records(&dispatched.records, dispatched.elapsed);
    let verdict = Verdict::atomic_group(&summary.tally);

    Ok(SeatContest {
        seats: group,
        summary,
        verdict,
    })
}

pub fn batch(ctx: &mut ScenarioContext<StressRunnerContext>) -> TunnelResult<Verdict> {
    anyhow::ensure!(
        ctx.config().contract == ContractVersion::SeatGroups,
        "The batch scenario books seat groups, run it with `--contract seat-groups`"
    );

    let client = ctx.runner_context().get().client()?;
    let config = ctx.config().batch.clone();
    let start = rand::thread_rng().gen_range(config.seat_range.clone());
    let group = seat_group(start, config.group_size);

    report::print_heading(
        ctx.runner_context().run_id(),
        &format!(
            "BATCH: {} requests racing for seat group {:?}",
            config.competitors, group
        ),
    );

    let progress = ctx.request_progress(config.competitors);
    let contest = ctx.execute_in_place(contend_for_group(
        &client,
        group,
        config.competitors,
        config.workers,
        &progress,
        |record| ctx.record(record),
    ))?;

    report::print_contest(&contest);

    Ok(contest.verdict)
}
