//! Limits layered over another generator.

use super::Backoff;
use crate::clock::{Clock, SystemClock};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Stops the wrapped generator once a wall-clock budget is spent.
///
/// The budget is measured from construction or the most recent
/// [`Backoff::reset`]. A zero `limit` disables the check; delays from the
/// wrapped generator pass through unmodified.
///
/// # Examples
///
/// ```rust
/// use rebound::backoff::{Backoff, BackoffExt, ZeroBackoff};
/// use rebound::ManualClock;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let mut backoff = ZeroBackoff
///     .with_max_elapsed_time(Duration::from_secs(1))
///     .with_clock(Arc::new(clock.clone()));
///
/// assert!(backoff.next_backoff().is_some());
/// clock.advance(Duration::from_secs(2));
/// assert!(backoff.next_backoff().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct MaxElapsed<B> {
    inner: B,
    limit: Duration,
    clock: Arc<dyn Clock>,
    start: Instant,
}

impl<B> MaxElapsed<B> {
    /// Wrap `inner` with an elapsed-time budget measured by the system clock.
    pub fn new(inner: B, limit: Duration) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let start = clock.now();
        Self {
            inner,
            limit,
            clock,
            start,
        }
    }

    /// Measure elapsed time with `clock`; the budget restarts from its current instant.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.start = clock.now();
        self.clock = clock;
        self
    }

    /// Time elapsed since construction or the last reset.
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.start)
    }

    /// The wrapped generator.
    pub fn get_ref(&self) -> &B {
        &self.inner
    }

    /// Unwrap the inner generator.
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B: Backoff> Backoff for MaxElapsed<B> {
    fn next_backoff(&mut self) -> Option<Duration> {
        if !self.limit.is_zero() && self.elapsed() > self.limit {
            return None;
        }
        self.inner.next_backoff()
    }

    fn reset(&mut self) {
        self.start = self.clock.now();
        self.inner.reset();
    }
}

/// Stops the wrapped generator after a fixed number of delays.
///
/// A limit of zero stops immediately.
#[derive(Debug, Clone)]
pub struct MaxRetries<B> {
    inner: B,
    limit: u32,
    handed_out: u32,
}

impl<B> MaxRetries<B> {
    /// Wrap `inner`, allowing at most `limit` delays between resets.
    pub fn new(inner: B, limit: u32) -> Self {
        Self {
            inner,
            limit,
            handed_out: 0,
        }
    }

    /// Delays still available before the generator stops.
    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.handed_out)
    }

    /// The wrapped generator.
    pub fn get_ref(&self) -> &B {
        &self.inner
    }

    /// Unwrap the inner generator.
    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B: Backoff> Backoff for MaxRetries<B> {
    fn next_backoff(&mut self) -> Option<Duration> {
        if self.handed_out >= self.limit {
            return None;
        }
        self.handed_out += 1;
        self.inner.next_backoff()
    }

    fn reset(&mut self) {
        self.handed_out = 0;
        self.inner.reset();
    }
}
