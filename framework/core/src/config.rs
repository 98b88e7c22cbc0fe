use std::ops::RangeInclusive;
use std::time::Duration;

use url::Url;

/// The body shape the reservation backend expects for `POST /reservations`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContractVersion {
    /// One seat per request, sent as `seat_number`, without a section.
    SingleSeat,
    /// Atomic seat groups, sent as `seat_numbers` alongside the `section_id`.
    #[default]
    SeatGroups,
}

/// Many identical writes racing for one seat.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrityConfig {
    /// Number of competing requests. All of them are dispatched at once, so this is also the pool
    /// width.
    pub competitors: usize,
    /// The contested seat is drawn from this range once per run.
    pub seat_range: RangeInclusive<u32>,
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            competitors: 1000,
            seat_range: 9000..=9999,
        }
    }
}

/// Bulk sale of distinct seats.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadConfig {
    pub requests: usize,
    pub workers: usize,
    /// Seats `first_seat..first_seat + requests` are sold, one per request.
    pub first_seat: u32,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            requests: 5000,
            workers: 50,
            first_seat: 1000,
        }
    }
}

/// Many requests racing for the same group of seats.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub group_size: usize,
    pub competitors: usize,
    pub workers: usize,
    /// The first seat of the group is drawn from this range once per run.
    pub seat_range: RangeInclusive<u32>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            group_size: 3,
            competitors: 200,
            workers: 50,
            seat_range: 20_000..=29_999,
        }
    }
}

/// Steady mixed read/write traffic for a fixed time.
#[derive(Debug, Clone, PartialEq)]
pub struct MixedConfig {
    pub duration: Duration,
    pub workers: usize,
    /// Probability that a new request is a write.
    pub write_ratio: f64,
    pub seat_range: RangeInclusive<u32>,
}

impl Default for MixedConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(15),
            workers: 20,
            write_ratio: 0.2,
            seat_range: 2000..=10_000,
        }
    }
}

/// Repeated mixed batches until cancelled.
#[derive(Debug, Clone, PartialEq)]
pub struct ChaosConfig {
    pub workers: usize,
    pub batch_size: usize,
    /// Fraction of each batch that are writes, the rest are reads.
    pub write_ratio: f64,
    pub seat_range: RangeInclusive<u32>,
    /// Pause between batches. The pause is interrupted by cancellation.
    pub pause: Duration,
    /// Stop on our own after this long. `None` runs until cancelled.
    pub duration: Option<Duration>,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        Self {
            workers: 20,
            batch_size: 50,
            write_ratio: 0.2,
            seat_range: 2000..=10_000,
            pause: Duration::from_millis(50),
            duration: None,
        }
    }
}

/// Everything the engine needs to know, built once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    pub base_url: Url,
    pub event_id: String,
    pub section_id: Option<String>,
    pub user_name: String,
    pub request_timeout: Duration,
    pub contract: ContractVersion,
    pub integrity: IntegrityConfig,
    pub load: LoadConfig,
    pub batch: BatchConfig,
    pub mixed: MixedConfig,
    pub chaos: ChaosConfig,
}

/// Upper bound on the client side request timeout.
///
/// Chaos only stops between batches, so this also bounds how long cancelling it can take.
pub const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

impl HarnessConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            event_id: "1".to_string(),
            section_id: Some("A".to_string()),
            user_name: "StressBot".to_string(),
            request_timeout: Duration::from_secs(5),
            contract: ContractVersion::default(),
            integrity: IntegrityConfig::default(),
            load: LoadConfig::default(),
            batch: BatchConfig::default(),
            mixed: MixedConfig::default(),
            chaos: ChaosConfig::default(),
        }
    }

    /// Check the configuration before anything is dispatched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.base_url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::new(format!(
                    "base url must use http or https, got '{other}'"
                )))
            }
        }
        if self.base_url.cannot_be_a_base() {
            return Err(ConfigError::new(format!(
                "base url '{}' cannot be used as a base",
                self.base_url
            )));
        }
        if self.event_id.is_empty() {
            return Err(ConfigError::new("event id must not be empty"));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::new("request timeout must be greater than zero"));
        }
        if self.request_timeout > MAX_REQUEST_TIMEOUT {
            return Err(ConfigError::new(format!(
                "request timeout must be at most {}ms, got {}ms",
                MAX_REQUEST_TIMEOUT.as_millis(),
                self.request_timeout.as_millis()
            )));
        }

        non_zero("integrity competitors", self.integrity.competitors)?;
        non_empty("integrity seat range", &self.integrity.seat_range)?;

        non_zero("load requests", self.load.requests)?;
        non_zero("load workers", self.load.workers)?;
        let last_seat = u64::from(self.load.first_seat) + self.load.requests as u64 - 1;
        if last_seat > u64::from(u32::MAX) {
            return Err(ConfigError::new(format!(
                "load seat window starting at {} does not fit {} seats",
                self.load.first_seat, self.load.requests
            )));
        }

        non_zero("batch group size", self.batch.group_size)?;
        non_zero("batch competitors", self.batch.competitors)?;
        non_zero("batch workers", self.batch.workers)?;
        non_empty("batch seat range", &self.batch.seat_range)?;
        let last_group_seat =
            u64::from(*self.batch.seat_range.end()) + self.batch.group_size as u64 - 1;
        if last_group_seat > u64::from(u32::MAX) {
            return Err(ConfigError::new(
                "batch seat range leaves no room for the seat group",
            ));
        }

        if self.mixed.duration.is_zero() {
            return Err(ConfigError::new("mixed duration must be greater than zero"));
        }
        non_zero("mixed workers", self.mixed.workers)?;
        ratio("mixed write ratio", self.mixed.write_ratio)?;
        non_empty("mixed seat range", &self.mixed.seat_range)?;

        non_zero("chaos workers", self.chaos.workers)?;
        non_zero("chaos batch size", self.chaos.batch_size)?;
        ratio("chaos write ratio", self.chaos.write_ratio)?;
        non_empty("chaos seat range", &self.chaos.seat_range)?;
        if self.chaos.duration.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::new("chaos duration must be greater than zero"));
        }

        Ok(())
    }
}

/// Returned when the configuration cannot be used to run any scenario.
#[derive(derive_more::Error, derive_more::Display, Debug, Clone, PartialEq)]
#[display("Invalid configuration: {msg}")]
pub struct ConfigError {
    msg: String,
}

impl ConfigError {
    fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

fn non_zero(name: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::new(format!("{name} must be greater than zero")));
    }
    Ok(())
}

fn non_empty(name: &str, range: &RangeInclusive<u32>) -> Result<(), ConfigError> {
    if range.is_empty() {
        return Err(ConfigError::new(format!(
            "{name} {}..={} is empty",
            range.start(),
            range.end()
        )));
    }
    Ok(())
}

fn ratio(name: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::new(format!(
            "{name} must be between 0 and 1, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> HarnessConfig {
        HarnessConfig::new(Url::parse("http://localhost:1234").unwrap())
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(Ok(()), config().validate());
    }

    #[test]
    fn reject_non_http_base_url() {
        let mut cfg = config();
        cfg.base_url = Url::parse("ftp://localhost").unwrap();

        let err = cfg.validate().unwrap_err();
        assert_eq!(
            "Invalid configuration: base url must use http or https, got 'ftp'",
            err.to_string()
        );
    }

    #[test]
    fn request_timeout_is_bounded() {
        let mut cfg = config();
        cfg.request_timeout = MAX_REQUEST_TIMEOUT;
        assert_eq!(Ok(()), cfg.validate());

        cfg.request_timeout = Duration::from_secs(600);
        let err = cfg.validate().unwrap_err();
        assert_eq!(
            "Invalid configuration: request timeout must be at most 30000ms, got 600000ms",
            err.to_string()
        );

        cfg.request_timeout = Duration::ZERO;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn reject_zero_widths() {
        let mut cfg = config();
        cfg.load.workers = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = config();
        cfg.chaos.workers = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = config();
        cfg.integrity.competitors = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn reject_empty_seat_range() {
        let mut cfg = config();
        #[allow(clippy::reversed_empty_ranges)]
        {
            cfg.mixed.seat_range = 10..=5;
        }

        let err = cfg.validate().unwrap_err();
        assert_eq!(
            "Invalid configuration: mixed seat range 10..=5 is empty",
            err.to_string()
        );
    }

    #[test]
    fn reject_write_ratio_out_of_bounds() {
        let mut cfg = config();
        cfg.chaos.write_ratio = 1.5;
        assert!(cfg.validate().is_err());

        let mut cfg = config();
        cfg.mixed.write_ratio = -0.1;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn reject_load_window_overflow() {
        let mut cfg = config();
        cfg.load.first_seat = u32::MAX;
        cfg.load.requests = 2;
        assert!(cfg.validate().is_err());

        cfg.load.requests = 1;
        assert_eq!(Ok(()), cfg.validate());
    }

    #[test]
    fn reject_zero_timeout() {
        let mut cfg = config();
        cfg.request_timeout = Duration::ZERO;
        assert!(cfg.validate().is_err());
    }
}
