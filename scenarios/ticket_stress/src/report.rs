use std::io::Write;
use std::time::Duration;

use ticket_tunnel_runner::prelude::{RunSummary, RunningTotals, SummaryTable};

use crate::integrity::SeatContest;
use crate::load::LoadOutcome;

pub(crate) fn print_heading(run_id: &str, title: &str) {
    print!("{}", heading(run_id, title));
}

/// The title framed by rules, with the run id so the output can be matched to the run's logs.
fn heading(run_id: &str, title: &str) -> String {
    let rule = "-".repeat(60);
    format!("\n{rule}\n{title}\nRun: {run_id}\n{rule}\n")
}

pub(crate) fn print_summary(summary: &RunSummary) {
    print!("{}", SummaryTable::new(summary));
}

pub(crate) fn print_contest(contest: &SeatContest) {
    print_summary(&contest.summary);
    println!("Target seats: {:?}", contest.seats);
    println!("{}", contest.verdict);
}

pub(crate) fn print_load(outcome: &LoadOutcome) {
    print_summary(&outcome.summary);
    println!(
        "Sold {} of {} seats ({})",
        outcome.summary.tally.success,
        outcome.expected,
        percent_or_no_data(outcome.success_ratio())
    );
}

fn percent_or_no_data(ratio: Option<f64>) -> String {
    match ratio {
        Some(ratio) => format!("{:.1}%", ratio * 100.0),
        None => "no data".to_string(),
    }
}

pub(crate) fn chaos_status_line(totals: &RunningTotals) -> String {
    format!(
        "Batch {} | sent: {} | survived: {} | failed: {}",
        totals.batches, totals.dispatched, totals.survived, totals.failed
    )
}

/// Rewrites the same console line after every batch.
pub(crate) fn print_chaos_status(totals: &RunningTotals) {
    let mut stdout = std::io::stdout().lock();
    // A lost status line is not worth stopping the run for.
    let _ = write!(stdout, "\r{}", chaos_status_line(totals));
    let _ = stdout.flush();
}

pub(crate) fn print_chaos_final(totals: &RunningTotals, elapsed: Duration) {
    println!();
    println!(
        "Chaos stopped after {} batches in {:.2}s",
        totals.batches,
        elapsed.as_secs_f64()
    );
    println!("Survived (200/201/409): {}", totals.survived);
    println!("Failed (errors and timeouts): {}", totals.failed);
    println!(
        "Survival rate: {}",
        percent_or_no_data(totals.survival_ratio())
    );
}
