//! Backoff generators.
//!
//! A [`Backoff`] produces the delay to wait before each retry, or `None` once
//! the policy has decided to give up.
//!
//! # Key Types
//!
//! - [`Backoff`] - Core trait for delay generators
//! - [`ExponentialBackoff`] - Exponential growth with jitter
//! - [`ConstantBackoff`], [`ZeroBackoff`], [`StopBackoff`] - Fixed policies
//! - [`MaxElapsed`], [`MaxRetries`] - Limits layered over any generator
//! - [`BackoffConfig`] - Serde-friendly description of an exponential generator
//!
//! # Examples
//!
//! ```rust
//! use rebound::backoff::{Backoff, BackoffExt, ExponentialBackoff};
//! use std::time::Duration;
//!
//! let mut backoff = ExponentialBackoff::builder()
//!     .initial_interval(Duration::from_millis(100))
//!     .randomization_factor(0.0)
//!     .multiplier(2.0)
//!     .build()
//!     .with_max_retries(2);
//!
//! assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(100)));
//! assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(200)));
//! assert_eq!(backoff.next_backoff(), None);
//! ```

mod config;
mod constant;
mod exponential;
mod limit;

use std::time::Duration;

pub use config::BackoffConfig;
pub use constant::{ConstantBackoff, StopBackoff, ZeroBackoff};
pub use exponential::{
    DEFAULT_INITIAL_INTERVAL, DEFAULT_MAX_INTERVAL, DEFAULT_MULTIPLIER,
    DEFAULT_RANDOMIZATION_FACTOR, ExponentialBackoff, ExponentialBackoffBuilder,
    MAX_REPRESENTABLE_INTERVAL,
};
pub use limit::{MaxElapsed, MaxRetries};

#[cfg(test)]
pub(crate) use exponential::randomized_interval;

/// A stateful policy producing successive retry delays.
///
/// Implementations are single-sequence: one instance drives one retry loop.
/// Independent loops need independent instances.
pub trait Backoff: Send {
    /// Returns the delay before the next attempt, or `None` to stop retrying.
    fn next_backoff(&mut self) -> Option<Duration>;

    /// Restore the generator to its initial state.
    ///
    /// Default implementation does nothing, which suits stateless policies.
    fn reset(&mut self) {}
}

impl<B: Backoff + ?Sized> Backoff for Box<B> {
    fn next_backoff(&mut self) -> Option<Duration> {
        (**self).next_backoff()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

impl<B: Backoff + ?Sized> Backoff for &mut B {
    fn next_backoff(&mut self) -> Option<Duration> {
        (**self).next_backoff()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Combinators available on every [`Backoff`].
pub trait BackoffExt: Backoff + Sized {
    /// Stop once `limit` has elapsed since construction or the last reset.
    ///
    /// A zero `limit` never stops.
    fn with_max_elapsed_time(self, limit: Duration) -> MaxElapsed<Self> {
        MaxElapsed::new(self, limit)
    }

    /// Stop after `limit` delays have been handed out.
    fn with_max_retries(self, limit: u32) -> MaxRetries<Self> {
        MaxRetries::new(self, limit)
    }
}

impl<B: Backoff> BackoffExt for B {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxed_backoff_delegates() {
        let mut boxed: Box<dyn Backoff> = Box::new(ConstantBackoff::new(Duration::from_secs(1)));
        assert_eq!(boxed.next_backoff(), Some(Duration::from_secs(1)));
        boxed.reset();
        assert_eq!(boxed.next_backoff(), Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_mut_ref_backoff_shares_state() {
        fn first_delay<B: Backoff>(mut backoff: B) -> Option<Duration> {
            backoff.next_backoff()
        }

        let mut inner = ZeroBackoff.with_max_retries(1);
        assert_eq!(first_delay(&mut inner), Some(Duration::ZERO));
        assert_eq!(inner.next_backoff(), None);
    }
}
