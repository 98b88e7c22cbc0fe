use std::time::Instant;

use anyhow::Context;
use ticket_tunnel_core::prelude::{ContractVersion, HarnessConfig};
use ticket_tunnel_instruments::{OperationRecord, Phase};
use url::Url;

use crate::error::describe_transport_error;
use crate::request::{RequestSpec, ReservationRequest, SeatSelection};

/// Client for the reservations endpoint of the backend under test.
///
/// Every call produces exactly one [OperationRecord] and never returns an error. Failures to get a
/// response are recorded with status `0`. Cloning is cheap and clones share a connection pool.
#[derive(Debug, Clone)]
pub struct ReservationsClient {
    http: reqwest::Client,
    reservations_url: Url,
    event_id: String,
    section_id: Option<String>,
    user_name: String,
    contract: ContractVersion,
}

impl ReservationsClient {
    pub fn new(config: &HarnessConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            reservations_url: reservations_url(&config.base_url)?,
            event_id: config.event_id.clone(),
            section_id: config.section_id.clone(),
            user_name: config.user_name.clone(),
            contract: config.contract,
        })
    }

    pub fn reservations_url(&self) -> &Url {
        &self.reservations_url
    }

    /// Build the body for a reservation of `seats`, on behalf of a new unique user.
    pub fn reservation_request(&self, seats: &[u32]) -> ReservationRequest {
        ReservationRequest {
            event_id: self.event_id.clone(),
            section_id: self.section_id.clone(),
            seats: SeatSelection::for_contract(self.contract, seats),
            user_id: format!("user_{}", nanoid::nanoid!()),
            user_name: self.user_name.clone(),
        }
    }

    /// `POST {base}/reservations` for `seats`, as a new user.
    pub async fn attempt_reservation(&self, seats: &[u32]) -> OperationRecord {
        let body = self.reservation_request(seats);
        log::trace!("Reserving seats {:?} for {}", seats, body.user_id);

        let started = Instant::now();
        let result = self
            .http
            .post(self.reservations_url.clone())
            .json(&body)
            .send()
            .await;

        Self::to_record(Phase::Write, started, result)
    }

    /// `GET {base}/reservations`.
    pub async fn read_availability(&self) -> OperationRecord {
        let started = Instant::now();
        let result = self.http.get(self.reservations_url.clone()).send().await;

        Self::to_record(Phase::Read, started, result)
    }

    /// Run one request described by `spec`.
    pub async fn execute(self, spec: RequestSpec) -> OperationRecord {
        match spec {
            RequestSpec::Reserve { seats } => self.attempt_reservation(&seats).await,
            RequestSpec::Read => self.read_availability().await,
        }
    }

    fn to_record(
        phase: Phase,
        started: Instant,
        result: reqwest::Result<reqwest::Response>,
    ) -> OperationRecord {
        // Only the status line matters, the body is not read.
        let duration = started.elapsed();
        match result {
            Ok(response) => OperationRecord::completed(phase, response.status().as_u16(), duration),
            Err(e) => {
                let error = describe_transport_error(&e);
                log::debug!("{phase} request failed after {duration:?}: {error}");
                OperationRecord::transport_failure(phase, duration, error)
            }
        }
    }
}

fn reservations_url(base_url: &Url) -> anyhow::Result<Url> {
    let url = format!("{}/reservations", base_url.as_str().trim_end_matches('/'));
    Url::parse(&url).with_context(|| format!("Invalid reservations url: {url}"))
}
