mod client;
mod error;
mod request;

pub mod prelude {
    pub use crate::client::ReservationsClient;
    pub use crate::error::describe_transport_error;
    pub use crate::request::{RequestSpec, ReservationRequest, SeatSelection};
}
