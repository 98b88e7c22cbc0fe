use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use ticket_tunnel_core::prelude::{
    BatchConfig, ChaosConfig, ContractVersion, HarnessConfig, IntegrityConfig, LoadConfig,
    MixedConfig,
};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReporterOpt {
    /// Do not report anything beyond the per-scenario output.
    Noop,
    /// Print a table of every operation, grouped by scenario and phase, when the run ends.
    InMemory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContractOpt {
    /// `{"seat_number": n}` without a section.
    SingleSeat,
    /// `{"section_id": s, "seat_numbers": [..]}`.
    SeatGroups,
}

impl From<ContractOpt> for ContractVersion {
    fn from(value: ContractOpt) -> Self {
        match value {
            ContractOpt::SingleSeat => ContractVersion::SingleSeat,
            ContractOpt::SeatGroups => ContractVersion::SeatGroups,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(about, long_about = None)]
pub struct TicketTunnelCli {
    /// Base URL of the reservation service under test
    #[clap(long, default_value = "http://localhost:1234")]
    pub base_url: String,

    /// The event that all reservations are made for
    #[clap(long, default_value = "1")]
    pub event_id: String,

    /// The section that all reservations are made in. Ignored by the single seat contract.
    #[clap(long, default_value = "A")]
    pub section_id: String,

    /// The user name sent with every reservation
    #[clap(long, default_value = "StressBot")]
    pub user_name: String,

    /// Client side timeout for each request, in milliseconds. At most 30000.
    #[clap(long, default_value = "5000")]
    pub timeout_ms: u64,

    /// The request body shape the backend expects
    #[clap(long, value_enum, default_value = "seat-groups")]
    pub contract: ContractOpt,

    /// Run this scenario and exit instead of showing the menu
    #[clap(long, conflicts_with = "all")]
    pub scenario: Option<String>,

    /// Run every scenario in order and exit instead of showing the menu
    #[clap(long, default_value = "false")]
    pub all: bool,

    /// Seconds to pause between scenarios when running with `--all`
    #[clap(long, default_value = "1")]
    pub pause_s: u64,

    /// Do not show progress bars.
    ///
    /// This is recommended for CI/CD environments where the progress bar isn't being looked at by
    /// anyone and is just adding noise to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,

    /// How operations are reported once the run is over
    #[clap(long, value_enum, default_value = "noop")]
    pub reporter: ReporterOpt,

    /// Number of requests racing for the same seat
    #[clap(long, default_value = "1000")]
    pub integrity_threads: usize,

    /// Number of distinct seats to sell in the load scenario
    #[clap(long, default_value = "5000")]
    pub load_count: usize,

    /// Concurrent requests in the load scenario
    #[clap(long, default_value = "50")]
    pub load_workers: usize,

    /// First seat of the load scenario's seat window
    #[clap(long, default_value = "1000")]
    pub load_first_seat: u32,

    /// Number of seats in the contested group
    #[clap(long, default_value = "3")]
    pub batch_group_size: usize,

    /// Number of requests racing for the same seat group
    #[clap(long, default_value = "200")]
    pub batch_competitors: usize,

    /// Concurrent requests in the batch scenario
    #[clap(long, default_value = "50")]
    pub batch_workers: usize,

    /// Number of seconds to run the mixed scenario for
    #[clap(long, default_value = "15")]
    pub mixed_duration: u64,

    /// Concurrent requests in the mixed scenario
    #[clap(long, default_value = "20")]
    pub mixed_workers: usize,

    /// Probability that a mixed request is a write
    #[clap(long, default_value = "0.2")]
    pub mixed_write_ratio: f64,

    /// Concurrent requests in the chaos scenario
    #[clap(long, default_value = "20")]
    pub chaos_workers: usize,

    /// Requests per chaos batch
    #[clap(long, default_value = "50")]
    pub chaos_batch_size: usize,

    /// Fraction of each chaos batch that are writes
    #[clap(long, default_value = "0.2")]
    pub chaos_write_ratio: f64,

    /// Milliseconds to pause between chaos batches
    #[clap(long, default_value = "50")]
    pub chaos_pause_ms: u64,

    /// Stop the chaos scenario after this many seconds instead of waiting for Ctrl-C.
    ///
    /// With `--all` the mixed duration is used when this is not set, so that the run finishes
    /// unattended.
    #[clap(long)]
    pub chaos_duration: Option<u64>,
}

impl TicketTunnelCli {
    /// Build the engine configuration. The result has not been validated yet.
    pub fn to_config(&self) -> anyhow::Result<HarnessConfig> {
        let base_url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base url '{}'", self.base_url))?;

        let mut config = HarnessConfig::new(base_url);
        config.event_id = self.event_id.clone();
        config.contract = self.contract.into();
        config.section_id = match config.contract {
            ContractVersion::SingleSeat => None,
            ContractVersion::SeatGroups => Some(self.section_id.clone()),
        };
        config.user_name = self.user_name.clone();
        config.request_timeout = Duration::from_millis(self.timeout_ms);

        config.integrity = IntegrityConfig {
            competitors: self.integrity_threads,
            ..Default::default()
        };
        config.load = LoadConfig {
            requests: self.load_count,
            workers: self.load_workers,
            first_seat: self.load_first_seat,
        };
        config.batch = BatchConfig {
            group_size: self.batch_group_size,
            competitors: self.batch_competitors,
            workers: self.batch_workers,
            ..Default::default()
        };
        config.mixed = MixedConfig {
            duration: Duration::from_secs(self.mixed_duration),
            workers: self.mixed_workers,
            write_ratio: self.mixed_write_ratio,
            ..Default::default()
        };
        config.chaos = ChaosConfig {
            workers: self.chaos_workers,
            batch_size: self.chaos_batch_size,
            write_ratio: self.chaos_write_ratio,
            pause: Duration::from_millis(self.chaos_pause_ms),
            duration: self
                .chaos_duration
                .or(self.all.then_some(self.mixed_duration))
                .map(Duration::from_secs),
            ..Default::default()
        };

        Ok(config)
    }
}
