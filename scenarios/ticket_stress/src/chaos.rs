use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use reservations_client_instrumented::prelude::{RequestSpec, ReservationsClient};
use ticket_tunnel_runner::prelude::{
    ChaosConfig, DelegatedShutdownListener, OperationRecord, RequestTask, RunningTotals,
    ScenarioContext, TunnelResult, Verdict, WorkerPool,
};

use crate::context::StressRunnerContext;
use crate::report;

/// One chaos batch: `round(batch_size * write_ratio)` writes to random seats, the rest reads, in
/// random order.
pub fn plan_chaos_batch(config: &ChaosConfig, rng: &mut impl Rng) -> Vec<RequestSpec> {
    let writes = ((config.batch_size as f64 * config.write_ratio).round() as usize)
        .min(config.batch_size);

    let mut batch = Vec::with_capacity(config.batch_size);
    batch.extend(
        (0..writes).map(|_| RequestSpec::reserve([rng.gen_range(config.seat_range.clone())])),
    );
    batch.extend(std::iter::repeat(RequestSpec::Read).take(config.batch_size - writes));
    batch.shuffle(rng);

    batch
}

/// Dispatch chaos batches until `shutdown_listener` fires.
///
/// Shutdown is only checked between batches. A batch that has started is always collected in full,
/// so every dispatched request is counted in the returned totals. `on_batch` sees the totals after
/// each batch.
pub async fn run_chaos(
    client: &ReservationsClient,
    config: &ChaosConfig,
    mut shutdown_listener: DelegatedShutdownListener,
    on_record: impl Fn(&OperationRecord),
    on_batch: impl Fn(&RunningTotals),
) -> anyhow::Result<RunningTotals> {
    let mut rng = StdRng::from_entropy();
    let mut totals = RunningTotals::default();

    loop {
        if shutdown_listener.should_shutdown() {
            break;
        }

        let mut pool = WorkerPool::new(config.workers)?;
        pool.submit_all(
            plan_chaos_batch(config, &mut rng)
                .into_iter()
                .map(|spec| RequestTask::new(spec.phase(), client.clone().execute(spec))),
        );
        while let Some(record) = pool.next_completed().await {
            on_record(&record);
            totals.record(&record);
        }
        totals.finish_batch();
        on_batch(&totals);

        tokio::select! {
            _ = tokio::time::sleep(config.pause) => {}
            _ = shutdown_listener.wait_for_shutdown() => break,
        }
    }

    Ok(totals)
}

pub fn chaos(ctx: &mut ScenarioContext<StressRunnerContext>) -> TunnelResult<Verdict> {
    let client = ctx.runner_context().get().client()?;
    let config = ctx.config().chaos.clone();

    report::print_heading(
        ctx.runner_context().run_id(),
        &format!(
            "CHAOS: batches of {} ({:.0}% writes) with {} workers",
            config.batch_size,
            config.write_ratio * 100.0,
            config.workers
        ),
    );
    match config.duration {
        Some(duration) => {
            println!("Stopping after {}s", duration.as_secs_f64());
            ctx.stop_after(duration);
        }
        None => println!("Kill a backend node now. Press Ctrl-C to stop."),
    }

    let shutdown_listener = ctx.shutdown_listener().clone();
    let started = Instant::now();
    // In-flight requests are drained on cancellation, so this must not be raced against shutdown.
    let totals = ctx.execute_to_completion(run_chaos(
        &client,
        &config,
        shutdown_listener,
        |record| ctx.record(record),
        report::print_chaos_status,
    ))?;

    report::print_chaos_final(&totals, started.elapsed());

    Ok(Verdict::Measured)
}
