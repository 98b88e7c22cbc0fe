use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reservations_client_instrumented::prelude::{RequestSpec, ReservationsClient};
use ticket_tunnel_runner::prelude::{
    MixedConfig, OperationRecord, RequestTask, RunSummary, ScenarioContext, TunnelResult,
    Verdict, WorkerPool,
};

use crate::context::StressRunnerContext;
use crate::dispatch::Dispatched;
use crate::report;

/// A write to a random seat with probability `write_ratio`, otherwise a read.
pub fn mixed_request(config: &MixedConfig, rng: &mut impl Rng) -> RequestSpec {
    if rng.gen_bool(config.write_ratio) {
        RequestSpec::reserve([rng.gen_range(config.seat_range.clone())])
    } else {
        RequestSpec::Read
    }
}

/// Keep `workers` mixed requests in flight until the configured duration has passed, then wait
/// for the last of them.
pub async fn run_mixed(
    client: &ReservationsClient,
    config: &MixedConfig,
    on_record: impl Fn(&OperationRecord),
) -> anyhow::Result<Dispatched> {
    let mut rng = StdRng::from_entropy();
    let mut pool = WorkerPool::new(config.workers)?;
    let mut records = Vec::new();

    let next_task = |rng: &mut StdRng| {
        let spec = mixed_request(config, rng);
        RequestTask::new(spec.phase(), client.clone().execute(spec))
    };

    let started = Instant::now();
    for _ in 0..config.workers {
        pool.submit(next_task(&mut rng));
    }

    while let Some(record) = pool.next_completed().await {
        on_record(&record);
        records.push(record);

        if started.elapsed() < config.duration {
            pool.submit(next_task(&mut rng));
        }
    }

    Ok(Dispatched {
        records,
        elapsed: started.elapsed(),
    })
}

pub fn mixed(ctx: &mut ScenarioContext<StressRunnerContext>) -> TunnelResult<Verdict> {
    let client = ctx.runner_context().get().client()?;
    let config = ctx.config().mixed.clone();

    report::print_heading(
        ctx.runner_context().run_id(),
        &format!(
            "MIXED: {:.0}% writes with {} workers for {}s",
            config.write_ratio * 100.0,
            config.workers,
            config.duration.as_secs_f64()
        ),
    );

    ctx.start_timed_progress(config.duration);
    let dispatched = ctx.execute_in_place(run_mixed(&client, &config, |record| {
        ctx.record(record)
    }))?;

    let summary = RunSummary::from_records(&dispatched.records, dispatched.elapsed);
    report::print_summary(&summary);

    Ok(Verdict::Measured)
}
