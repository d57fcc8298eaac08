//! Configuration for the dashboard client

use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Environment variable consulted by [`DashboardConfigBuilder::with_env_origin`]
pub const ORIGIN_ENV: &str = "DASHBOARD_URL";

/// Origin used when nothing else is configured
pub const DEFAULT_ORIGIN: &str = "http://localhost:8000";

/// Path of the live update channel relative to the origin
pub const CHANNEL_PATH: &str = "/ws";

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PROGRESS_CAP: f64 = 90.0;
pub const DEFAULT_PROGRESS_STEP: f64 = 10.0;

/// Configuration for the dashboard client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Backend origin (`http` or `https`); REST and channel URLs derive from it
    pub origin: Url,

    /// Fixed delay before every reconnect attempt
    pub reconnect_delay: Duration,

    /// Interval of the status poller during a run
    pub poll_interval: Duration,

    /// Timeout applied to each REST request
    pub request_timeout: Duration,

    /// Upper bound of the progress meter while a run is in flight
    pub progress_cap: f64,

    /// Exclusive upper bound of a single random progress increment
    pub progress_step: f64,

    /// Interval of keepalive pings on an open channel (disabled when `None`)
    pub keepalive_interval: Option<Duration>,
}

impl DashboardConfig {
    /// Configuration for `origin` with default timings
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            progress_cap: DEFAULT_PROGRESS_CAP,
            progress_step: DEFAULT_PROGRESS_STEP,
            keepalive_interval: None,
        }
    }

    /// Create a new configuration builder
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        match self.origin.scheme() {
            "http" | "https" => {}
            other => {
                return Err(DashboardError::Config(format!(
                    "origin scheme must be http or https, got '{other}'"
                )));
            }
        }

        if self.origin.host_str().is_none() {
            return Err(DashboardError::Config("origin has no host".to_string()));
        }

        if self.poll_interval.is_zero() {
            return Err(DashboardError::Config(
                "poll_interval must be greater than 0".to_string(),
            ));
        }

        // `contains` is false for NaN
        if !(0.0..100.0).contains(&self.progress_cap) {
            return Err(DashboardError::Config(
                "progress_cap must be in [0, 100)".to_string(),
            ));
        }

        if !(self.progress_step > 0.0 && self.progress_step.is_finite()) {
            return Err(DashboardError::Config(
                "progress_step must be a finite number greater than 0".to_string(),
            ));
        }

        if self.keepalive_interval.is_some_and(|d| d.is_zero()) {
            return Err(DashboardError::Config(
                "keepalive_interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Absolute URL of a REST endpoint, e.g. `endpoint("/api/status")`
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.origin.join(path)?)
    }

    /// URL of the live update channel; `ws` for `http` origins, `wss` for `https`
    pub fn channel_url(&self) -> Result<Url> {
        let mut url = self.origin.join(CHANNEL_PATH)?;
        let scheme = match self.origin.scheme() {
            "https" => "wss",
            "http" => "ws",
            other => {
                return Err(DashboardError::Config(format!(
                    "cannot derive channel scheme from '{other}'"
                )));
            }
        };
        url.set_scheme(scheme).map_err(|()| {
            DashboardError::Config(format!("cannot switch {url} to {scheme}"))
        })?;
        Ok(url)
    }
}

/// Builder for DashboardConfig
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    origin: Option<String>,
    reconnect_delay: Option<Duration>,
    poll_interval: Option<Duration>,
    request_timeout: Option<Duration>,
    progress_cap: Option<f64>,
    progress_step: Option<f64>,
    keepalive_interval: Option<Duration>,
}

impl DashboardConfigBuilder {
    /// Set the backend origin
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Load the origin from `DASHBOARD_URL` when it is set
    pub fn with_env_origin(self) -> Self {
        self.origin_if_set(std::env::var(ORIGIN_ENV).ok())
    }

    fn origin_if_set(mut self, origin: Option<String>) -> Self {
        if let Some(origin) = origin.filter(|o| !o.trim().is_empty()) {
            self.origin = Some(origin);
        }
        self
    }

    /// Set the reconnect delay
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = Some(delay);
        self
    }

    /// Set the status poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    /// Set the REST request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Set the progress cap
    pub fn progress_cap(mut self, cap: f64) -> Self {
        self.progress_cap = Some(cap);
        self
    }

    /// Set the maximum progress increment per tick
    pub fn progress_step(mut self, step: f64) -> Self {
        self.progress_step = Some(step);
        self
    }

    /// Enable keepalive pings
    pub fn keepalive_interval(mut self, interval: Duration) -> Self {
        self.keepalive_interval = Some(interval);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<DashboardConfig> {
        let origin = Url::parse(self.origin.as_deref().unwrap_or(DEFAULT_ORIGIN).trim())?;
        let defaults = DashboardConfig::new(origin);

        let config = DashboardConfig {
            reconnect_delay: self.reconnect_delay.unwrap_or(defaults.reconnect_delay),
            poll_interval: self.poll_interval.unwrap_or(defaults.poll_interval),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            progress_cap: self.progress_cap.unwrap_or(defaults.progress_cap),
            progress_step: self.progress_step.unwrap_or(defaults.progress_step),
            keepalive_interval: self.keepalive_interval.or(defaults.keepalive_interval),
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::builder().build().unwrap();
        assert_eq!(config.origin.as_str(), "http://localhost:8000/");
        assert_eq!(config.reconnect_delay, Duration::from_secs(3));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert!(config.keepalive_interval.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = DashboardConfig::builder()
            .origin("https://dash.example.com")
            .poll_interval(Duration::from_millis(500))
            .keepalive_interval(Duration::from_secs(20))
            .build()
            .unwrap();

        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.keepalive_interval, Some(Duration::from_secs(20)));
        assert_eq!(config.reconnect_delay, Duration::from_secs(3));
    }

    #[test]
    fn test_channel_url_follows_origin_scheme() {
        let plain = DashboardConfig::builder()
            .origin("http://127.0.0.1:5000")
            .build()
            .unwrap();
        assert_eq!(plain.channel_url().unwrap().as_str(), "ws://127.0.0.1:5000/ws");

        let secure = DashboardConfig::builder()
            .origin("https://dash.example.com/")
            .build()
            .unwrap();
        assert_eq!(secure.channel_url().unwrap().as_str(), "wss://dash.example.com/ws");
    }

    #[test]
    fn test_endpoint() {
        let config = DashboardConfig::builder().build().unwrap();
        assert_eq!(
            config.endpoint("/api/status").unwrap().as_str(),
            "http://localhost:8000/api/status"
        );
    }

    #[test]
    fn test_validation_rejects_non_http_origin() {
        let result = DashboardConfig::builder().origin("ftp://example.com").build();
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }

    #[test]
    fn test_validation_rejects_bad_progress() {
        let result = DashboardConfig::builder().progress_cap(100.0).build();
        assert!(result.is_err());

        let result = DashboardConfig::builder().progress_step(0.0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_non_finite_progress() {
        for step in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = DashboardConfig::builder().progress_step(step).build();
            assert!(matches!(result, Err(DashboardError::Config(_))), "step {step}");
        }
        for cap in [f64::NAN, f64::INFINITY] {
            let result = DashboardConfig::builder().progress_cap(cap).build();
            assert!(matches!(result, Err(DashboardError::Config(_))), "cap {cap}");
        }
    }

    #[test]
    fn test_new_uses_default_timings() {
        let origin = Url::parse(DEFAULT_ORIGIN).unwrap();
        let config = DashboardConfig::new(origin.clone());
        assert_eq!(config.origin, origin);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.progress_cap, DEFAULT_PROGRESS_CAP);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_origin_only_applies_when_set() {
        let from_env = DashboardConfig::builder()
            .origin_if_set(Some(" https://env.example.com ".to_string()))
            .build()
            .unwrap();
        assert_eq!(from_env.origin.as_str(), "https://env.example.com/");

        let unset = DashboardConfig::builder()
            .origin("http://127.0.0.1:9000")
            .origin_if_set(None)
            .origin_if_set(Some("  ".to_string()))
            .build()
            .unwrap();
        assert_eq!(unset.origin.as_str(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn test_validation_rejects_zero_poll_interval() {
        let config = DashboardConfig {
            poll_interval: Duration::ZERO,
            ..DashboardConfig::builder().build().unwrap()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unparsable_origin() {
        let result = DashboardConfig::builder().origin("not a url").build();
        assert!(matches!(result, Err(DashboardError::InvalidUrl(_))));
    }
}
