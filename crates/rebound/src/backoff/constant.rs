//! Fixed-delay policies.

use super::Backoff;
use std::time::Duration;

/// Waits the same interval before every retry and never stops on its own.
///
/// # Examples
///
/// ```rust
/// use rebound::backoff::{Backoff, ConstantBackoff};
/// use std::time::Duration;
///
/// let mut backoff = ConstantBackoff::new(Duration::from_secs(1));
/// assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(1)));
/// assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(1)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantBackoff {
    interval: Duration,
}

impl ConstantBackoff {
    /// Create a policy that always returns `interval`.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// The fixed interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Backoff for ConstantBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        Some(self.interval)
    }
}

/// Retries immediately, forever.
///
/// Mostly useful in tests, or combined with [`super::MaxRetries`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZeroBackoff;

impl Backoff for ZeroBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        Some(Duration::ZERO)
    }
}

/// Never retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StopBackoff;

impl Backoff for StopBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        None
    }
}
