//! Serializable backoff configuration.

use super::ExponentialBackoff;
use super::exponential::{
    DEFAULT_INITIAL_INTERVAL, DEFAULT_MAX_INTERVAL, DEFAULT_MULTIPLIER,
    DEFAULT_RANDOMIZATION_FACTOR,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Plain-data description of an [`ExponentialBackoff`].
///
/// Intended for embedding in application config files. Every field is
/// optional on input and falls back to the standard tuning. Durations are
/// expressed in milliseconds.
///
/// # Examples
///
/// ```rust
/// use rebound::BackoffConfig;
/// use std::time::Duration;
///
/// let config: BackoffConfig = serde_json::from_str(r#"{ "initial_interval_ms": 100 }"#).unwrap();
/// let backoff = config.build();
///
/// assert_eq!(backoff.initial_interval(), Duration::from_millis(100));
/// assert_eq!(backoff.max_interval(), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay the sequence starts from.
    pub initial_interval_ms: u64,
    /// Jitter factor in `[0, 1]`.
    pub randomization_factor: f64,
    /// Growth factor applied after every delay.
    pub multiplier: f64,
    /// Cap on the pre-jitter interval.
    pub max_interval_ms: u64,
    /// Give up after this long since the last reset; `0` never gives up.
    pub max_elapsed_time_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: DEFAULT_INITIAL_INTERVAL.as_millis() as u64,
            randomization_factor: DEFAULT_RANDOMIZATION_FACTOR,
            multiplier: DEFAULT_MULTIPLIER,
            max_interval_ms: DEFAULT_MAX_INTERVAL.as_millis() as u64,
            max_elapsed_time_ms: 0,
        }
    }
}

impl BackoffConfig {
    /// Build a fresh generator from this configuration.
    pub fn build(&self) -> ExponentialBackoff {
        ExponentialBackoff::builder()
            .initial_interval(Duration::from_millis(self.initial_interval_ms))
            .randomization_factor(self.randomization_factor)
            .multiplier(self.multiplier)
            .max_interval(Duration::from_millis(self.max_interval_ms))
            .max_elapsed_time(Duration::from_millis(self.max_elapsed_time_ms))
            .build()
    }
}

impl From<BackoffConfig> for ExponentialBackoff {
    fn from(config: BackoffConfig) -> Self {
        config.build()
    }
}
