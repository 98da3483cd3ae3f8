//! Exponential backoff with jitter.

use super::Backoff;
use crate::clock::{Clock, SystemClock};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default delay returned by the first call to `next_backoff`.
pub const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_millis(500);
/// Default randomization factor: delays vary by ±50%.
pub const DEFAULT_RANDOMIZATION_FACTOR: f64 = 0.5;
/// Default growth factor: each interval is 50% longer than the previous one.
pub const DEFAULT_MULTIPLIER: f64 = 1.5;
/// Default cap on the (pre-jitter) interval.
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(60);
/// Largest interval the generator can represent: `u64::MAX` nanoseconds.
pub const MAX_REPRESENTABLE_INTERVAL: Duration = Duration::from_nanos(u64::MAX);

/// Exponential backoff with configurable jitter.
///
/// Each call to [`Backoff::next_backoff`] returns the current interval
/// perturbed by `± randomization_factor`, then grows the interval by
/// `multiplier`, capped at `max_interval`.
///
/// # Mathematical Formula
///
/// ```text
/// delta       = current_interval * randomization_factor
/// returned    = random(current_interval - delta, current_interval + delta)
/// next        = min(current_interval * multiplier, max_interval)
/// ```
///
/// With the defaults (500ms, ×1.5, ±50%) the pre-jitter sequence is:
///
/// ```text
/// attempt  interval   returned range
///       1     500ms    [250ms,   750ms]
///       2     750ms    [375ms,  1125ms]
///       3    1125ms    [562ms,  1687ms]
///      ..        ..                 ..
///      10   19221ms    [9610ms, 28832ms]
///      12   43248ms   [21624ms, 64872ms]
///     13+   60000ms   [30000ms, 90000ms]
/// ```
///
/// When `max_elapsed_time` is non-zero, `next_backoff` returns `None` once
/// that much time has passed since construction or the last reset.
///
/// # Examples
///
/// ```rust
/// use rebound::backoff::{Backoff, ExponentialBackoff};
/// use std::time::Duration;
///
/// let mut backoff = ExponentialBackoff::builder()
///     .initial_interval(Duration::from_millis(100))
///     .randomization_factor(0.0)
///     .multiplier(2.0)
///     .max_interval(Duration::from_millis(300))
///     .build();
///
/// assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(100)));
/// assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(200)));
/// assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(300)));
/// assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(300)));
/// ```
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_interval: Duration,
    randomization_factor: f64,
    multiplier: f64,
    max_interval: Duration,
    max_elapsed_time: Duration,
    clock: Arc<dyn Clock>,
    current_interval: Duration,
    start_time: Instant,
}

impl ExponentialBackoff {
    /// Create a new builder for configuring exponential backoff.
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// The interval the next call will be based on, before jitter.
    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    /// Time elapsed since construction or the last reset.
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.start_time)
    }

    /// The configured initial interval.
    pub fn initial_interval(&self) -> Duration {
        self.initial_interval
    }

    /// The configured randomization factor, in `[0, 1]`.
    pub fn randomization_factor(&self) -> f64 {
        self.randomization_factor
    }

    /// The configured growth factor.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// The configured interval cap.
    pub fn max_interval(&self) -> Duration {
        self.max_interval
    }

    /// The configured elapsed-time cap; zero means unbounded.
    pub fn max_elapsed_time(&self) -> Duration {
        self.max_elapsed_time
    }

    fn advance(&mut self) {
        let next = self.current_interval.as_nanos() as f64 * self.multiplier;
        let max = self.max_interval.as_nanos() as f64;
        self.current_interval = if !next.is_finite() || next >= max {
            self.max_interval
        } else {
            Duration::from_nanos(next as u64)
        };
    }
}

impl Default for ExponentialBackoff {
    /// Create an exponential backoff with the standard tuning.
    ///
    /// Defaults:
    /// - `initial_interval`: 500ms
    /// - `randomization_factor`: 0.5
    /// - `multiplier`: 1.5
    /// - `max_interval`: 60s
    /// - `max_elapsed_time`: zero (unbounded; the retry driver applies its own cap)
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Backoff for ExponentialBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        if !self.max_elapsed_time.is_zero() && self.elapsed() > self.max_elapsed_time {
            return None;
        }

        let interval = self.current_interval;
        self.advance();
        Some(randomized_interval(
            self.randomization_factor,
            rand::random::<f64>(),
            interval,
        ))
    }

    fn reset(&mut self) {
        self.current_interval = self.initial_interval;
        self.start_time = self.clock.now();
    }
}

/// Pick a value from `interval ± interval * factor` using `random` in `[0, 1)`.
///
/// Negative results clamp to zero; a zero factor returns `interval` exactly.
pub(crate) fn randomized_interval(factor: f64, random: f64, interval: Duration) -> Duration {
    if factor == 0.0 {
        return interval;
    }

    let nanos = interval.as_nanos() as f64;
    let delta = factor * nanos;
    let min = nanos - delta;
    let max = nanos + delta;
    let value = min + random * (max - min);

    // `as u64` saturates and maps NaN to zero.
    Duration::from_nanos(value.max(0.0) as u64)
}

/// Builder for configuring [`ExponentialBackoff`].
///
/// # Examples
///
/// ```rust
/// use rebound::backoff::ExponentialBackoff;
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .initial_interval(Duration::from_millis(100))
///     .max_interval(Duration::from_secs(30))
///     .multiplier(2.0)
///     .randomization_factor(0.1)
///     .max_elapsed_time(Duration::from_secs(120))
///     .build();
///
/// assert_eq!(backoff.max_interval(), Duration::from_secs(30));
/// ```
#[derive(Debug, Default)]
pub struct ExponentialBackoffBuilder {
    initial_interval: Option<Duration>,
    randomization_factor: Option<f64>,
    multiplier: Option<f64>,
    max_interval: Option<Duration>,
    max_elapsed_time: Option<Duration>,
    clock: Option<Arc<dyn Clock>>,
}

impl ExponentialBackoffBuilder {
    /// Set the delay the sequence starts from.
    ///
    /// Lowered to [`MAX_REPRESENTABLE_INTERVAL`] if larger.
    ///
    /// Default: 500ms
    pub fn initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = Some(interval);
        self
    }

    /// Set the randomization factor (0.0 to 1.0).
    ///
    /// A factor of 0.5 means each delay can vary by ±50%. Values outside
    /// the range are clamped.
    ///
    /// Default: 0.5
    pub fn randomization_factor(mut self, factor: f64) -> Self {
        self.randomization_factor = Some(if factor.is_nan() {
            0.0
        } else {
            factor.clamp(0.0, 1.0)
        });
        self
    }

    /// Set the growth factor applied after every call.
    ///
    /// Values below 1.0 (and NaN) are raised to 1.0.
    ///
    /// Default: 1.5
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier.max(1.0));
        self
    }

    /// Set the cap on the pre-jitter interval.
    ///
    /// Intervals are tracked in whole nanoseconds as `u64`, so caps above
    /// [`MAX_REPRESENTABLE_INTERVAL`] (about 584 years) are lowered to it.
    ///
    /// Default: 60s
    pub fn max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = Some(interval);
        self
    }

    /// Stop producing delays after this much time since the last reset.
    ///
    /// Default: zero (never stop)
    pub fn max_elapsed_time(mut self, limit: Duration) -> Self {
        self.max_elapsed_time = Some(limit);
        self
    }

    /// Use a custom clock for elapsed-time tracking.
    ///
    /// Default: [`SystemClock`]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the `ExponentialBackoff` instance.
    ///
    /// Uses default values for any unset parameters.
    pub fn build(self) -> ExponentialBackoff {
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let initial_interval = self
            .initial_interval
            .unwrap_or(DEFAULT_INITIAL_INTERVAL)
            .min(MAX_REPRESENTABLE_INTERVAL);
        let start_time = clock.now();
        ExponentialBackoff {
            initial_interval,
            randomization_factor: self
                .randomization_factor
                .unwrap_or(DEFAULT_RANDOMIZATION_FACTOR),
            multiplier: self.multiplier.unwrap_or(DEFAULT_MULTIPLIER),
            max_interval: self
                .max_interval
                .unwrap_or(DEFAULT_MAX_INTERVAL)
                .min(MAX_REPRESENTABLE_INTERVAL),
            max_elapsed_time: self.max_elapsed_time.unwrap_or(Duration::ZERO),
            clock,
            current_interval: initial_interval,
            start_time,
        }
    }
}
