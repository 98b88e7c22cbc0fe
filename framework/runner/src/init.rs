use crate::cli::TicketTunnelCli;
use clap::Parser;

/// Initialise the CLI and logging for the ticket tunnel runner.
pub fn init() -> TicketTunnelCli {
    env_logger::init();

    TicketTunnelCli::parse()
}
