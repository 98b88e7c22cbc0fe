mod batch;
mod chaos;
mod context;
mod dispatch;
mod integrity;
mod load;
mod mixed;
mod report;

pub use batch::{batch, contend_for_group, seat_group};
pub use chaos::{chaos, plan_chaos_batch, run_chaos};
pub use context::{configure_client, StressRunnerContext};
pub use dispatch::{dispatch, Dispatched};
pub use integrity::{contend_for_seat, integrity, SeatContest};
pub use load::{load, load_seats, sell_unique_seats, LoadOutcome};
pub use mixed::{mixed, mixed_request, run_mixed};
