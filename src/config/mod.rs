//! Configuration for the check-in coordinator.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use log::{info, warn};
use url::Url;

use crate::error::{Error, Result};

/// Default interval between scheduled registration refreshes
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Configuration for the `CheckInCoordinator` and its HTTP backend
#[derive(Debug, Clone)]
pub struct CheckInConfig {
    /// Single endpoint serving every backend action
    pub base_url: String,
    /// Interval between scheduled cache refreshes
    pub refresh_interval: Duration,
    /// Timeout applied to each backend request
    pub request_timeout: Duration,
    /// User agent sent with each request
    pub user_agent: String,
}

impl Default for CheckInConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("vax-checkin/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl CheckInConfig {
    /// Create a configuration pointing at the given endpoint
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the scheduled refresh interval
    #[must_use]
    pub const fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Build a configuration from `CHECKIN_*` environment variables
    ///
    /// Missing or unparseable values keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("CHECKIN_API_URL").unwrap_or_else(|_| {
                warn!("CHECKIN_API_URL not set");
                defaults.base_url.clone()
            }),
            refresh_interval: Duration::from_secs(try_load(
                "CHECKIN_REFRESH_SECS",
                defaults.refresh_interval.as_secs(),
            )),
            request_timeout: Duration::from_secs(try_load(
                "CHECKIN_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            user_agent: defaults.user_agent,
        }
    }

    /// Check the configuration before any backend call is made
    pub fn validate(&self) -> Result<Url> {
        if self.base_url.trim().is_empty() {
            return Err(Error::Config("backend URL is empty".to_string()));
        }
        if self.refresh_interval.is_zero() {
            return Err(Error::Config(
                "refresh interval must be greater than zero".to_string(),
            ));
        }
        Ok(Url::parse(self.base_url.trim())?)
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        Err(_) => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}
