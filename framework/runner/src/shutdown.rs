use std::sync::Arc;

use parking_lot::Mutex;
use ticket_tunnel_core::prelude::{DelegatedShutdownListener, ShutdownHandle};
use ticket_tunnel_instruments::Reporter;
use tokio::signal;

/// Routes Ctrl-C to whichever scenario is currently running.
///
/// Each scenario run gets its own [ShutdownHandle] so that cancelling one scenario does not
/// leave a stale signal behind for the next one.
#[derive(Debug, Clone, Default)]
pub(crate) struct ShutdownRelay {
    active: Arc<Mutex<Option<ShutdownHandle>>>,
}

impl ShutdownRelay {
    /// Start routing signals to a fresh handle for a scenario run.
    ///
    /// The returned listener is subscribed before the handle is published, so it sees every signal
    /// relayed to this run.
    pub(crate) fn begin(&self) -> (ShutdownHandle, DelegatedShutdownListener) {
        let handle = ShutdownHandle::new();
        let listener = handle.new_listener();
        *self.active.lock() = Some(handle.clone());
        (handle, listener)
    }

    /// Stop routing signals to the current scenario and tell its helpers to stop.
    pub(crate) fn end(&self) {
        if let Some(handle) = self.active.lock().take() {
            handle.shutdown();
        }
    }

    /// Deliver a signal to the running scenario. Returns `false` if no scenario is running.
    pub(crate) fn relay(&self) -> bool {
        match self.active.lock().as_ref() {
            Some(handle) => {
                handle.shutdown();
                true
            }
            None => false,
        }
    }
}

/// What the process does after receiving Ctrl-C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SignalAction {
    /// A scenario was running and has been told to stop.
    Relayed,
    /// Nothing was running. Reports have been finalized and the process should exit.
    Exit,
}

/// Relay the signal to the running scenario, or finalize `reporter` when idle.
pub(crate) fn handle_signal(relay: &ShutdownRelay, reporter: &Reporter) -> SignalAction {
    if relay.relay() {
        SignalAction::Relayed
    } else {
        reporter.finalize();
        SignalAction::Exit
    }
}

pub(crate) fn start_shutdown_listener(
    runtime: &tokio::runtime::Runtime,
    relay: ShutdownRelay,
    reporter: Arc<Reporter>,
) {
    runtime.spawn(async move {
        loop {
            if let Err(e) = signal::ctrl_c().await {
                log::error!("Failed to listen for Ctrl-C, cancellation is unavailable: {e:?}");
                return;
            }

            match handle_signal(&relay, &reporter) {
                SignalAction::Relayed => {
                    println!("Received shutdown signal, stopping the current scenario...");
                }
                SignalAction::Exit => {
                    println!("Received shutdown signal, exiting");
                    std::process::exit(130);
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use ticket_tunnel_instruments::{OperationRecord, ReportCollector};

    struct CountFinalize(Arc<AtomicUsize>);

    impl ReportCollector for CountFinalize {
        fn add_operation(&mut self, _scenario: &str, _operation_record: &OperationRecord) {}

        fn finalize(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn relay_reaches_active_scenario_only() {
        let relay = ShutdownRelay::default();
        assert!(!relay.relay());

        let (_handle, mut listener) = relay.begin();
        assert!(relay.relay());
        assert!(listener.should_shutdown());

        relay.end();
        assert!(!relay.relay());
    }

    #[test]
    fn signal_relayed_during_setup_is_not_missed() {
        let relay = ShutdownRelay::default();
        let (_handle, listener) = relay.begin();

        // Arrives before the scenario has started any cancellable work
        relay.relay();

        let mut work_listener = listener.clone();
        assert!(work_listener.should_shutdown());
    }

    #[test]
    fn end_stops_scenario_helpers() {
        let relay = ShutdownRelay::default();
        let (handle, _listener) = relay.begin();
        let mut helper = handle.new_listener();

        relay.end();

        assert!(helper.should_shutdown());
    }

    #[test]
    fn new_scenario_does_not_inherit_old_signal() {
        let relay = ShutdownRelay::default();
        let (_first, _first_listener) = relay.begin();
        relay.relay();
        relay.end();

        let (_second, mut listener) = relay.begin();
        assert!(!listener.should_shutdown());
    }

    #[test]
    fn idle_signal_finalizes_reports_before_exit() {
        let finalized = Arc::new(AtomicUsize::new(0));
        let reporter = Reporter::new(vec![Box::new(CountFinalize(finalized.clone()))]);
        let relay = ShutdownRelay::default();

        assert_eq!(SignalAction::Exit, handle_signal(&relay, &reporter));
        assert_eq!(1, finalized.load(Ordering::SeqCst));
    }

    #[test]
    fn running_scenario_signal_does_not_finalize() {
        let finalized = Arc::new(AtomicUsize::new(0));
        let reporter = Reporter::new(vec![Box::new(CountFinalize(finalized.clone()))]);
        let relay = ShutdownRelay::default();
        let (_handle, _listener) = relay.begin();

        assert_eq!(SignalAction::Relayed, handle_signal(&relay, &reporter));
        assert_eq!(0, finalized.load(Ordering::SeqCst));
    }
}
