//! Configuration for a single retry call.

use crate::backoff::{Backoff, ExponentialBackoff};
use crate::clock::{Clock, SystemClock};
use crate::error::OperationError;
use crate::timer::{Timer, TokioTimer};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default wall-clock budget for one [`crate::retry()`] call.
pub const DEFAULT_MAX_ELAPSED_TIME: Duration = Duration::from_secs(15 * 60);

/// Callback invoked with the failure and the upcoming delay before each wait.
///
/// It is not called when the driver returns.
pub type Notify<E> = Box<dyn FnMut(&OperationError<E>, Duration) + Send>;

/// Settings for one [`crate::retry()`] call.
///
/// Built with [`RetryOptions::builder`]; consumed by the call.
///
/// # Default Configuration
///
/// - `backoff`: [`ExponentialBackoff::default()`]
/// - `timer`: [`TokioTimer`]
/// - `notify`: none
/// - `max_elapsed_time`: 15 minutes (zero disables the check)
/// - `max_tries`: 0 (unbounded)
pub struct RetryOptions<E> {
    pub(crate) backoff: Box<dyn Backoff>,
    pub(crate) timer: Box<dyn Timer>,
    pub(crate) notify: Option<Notify<E>>,
    pub(crate) max_elapsed_time: Duration,
    pub(crate) max_tries: u32,
    pub(crate) clock: Arc<dyn Clock>,
}

impl<E> RetryOptions<E> {
    /// Create a new builder starting from the defaults.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rebound::{ConstantBackoff, RetryOptions};
    /// use std::time::Duration;
    ///
    /// let options: RetryOptions<std::io::Error> = RetryOptions::builder()
    ///     .backoff(ConstantBackoff::new(Duration::from_millis(50)))
    ///     .max_tries(5)
    ///     .notify(|err, delay| eprintln!("retrying in {delay:?}: {err}"))
    ///     .build();
    ///
    /// assert_eq!(options.max_tries(), 5);
    /// ```
    pub fn builder() -> RetryOptionsBuilder<E> {
        RetryOptionsBuilder {
            options: Self::default(),
        }
    }

    /// The attempt cap; zero means unbounded.
    pub fn max_tries(&self) -> u32 {
        self.max_tries
    }

    /// The wall-clock budget; zero disables the check.
    pub fn max_elapsed_time(&self) -> Duration {
        self.max_elapsed_time
    }
}

impl<E> Default for RetryOptions<E> {
    fn default() -> Self {
        Self {
            backoff: Box::new(ExponentialBackoff::default()),
            timer: Box::new(TokioTimer::default()),
            notify: None,
            max_elapsed_time: DEFAULT_MAX_ELAPSED_TIME,
            max_tries: 0,
            clock: Arc::new(SystemClock),
        }
    }
}

impl<E> fmt::Debug for RetryOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("notify", &self.notify.is_some())
            .field("max_elapsed_time", &self.max_elapsed_time)
            .field("max_tries", &self.max_tries)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

/// Builder for [`RetryOptions`].
///
/// Each setter replaces the previous value; later calls win.
pub struct RetryOptionsBuilder<E> {
    options: RetryOptions<E>,
}

impl<E> RetryOptionsBuilder<E> {
    /// Set the delay generator.
    ///
    /// Default: [`ExponentialBackoff::default()`]
    pub fn backoff(mut self, backoff: impl Backoff + 'static) -> Self {
        self.options.backoff = Box::new(backoff);
        self
    }

    /// Set the timer used to wait between attempts.
    ///
    /// Default: [`TokioTimer`]
    pub fn timer(mut self, timer: impl Timer + 'static) -> Self {
        self.options.timer = Box::new(timer);
        self
    }

    /// Observe each failure and the delay that follows it.
    pub fn notify(
        mut self,
        notify: impl FnMut(&OperationError<E>, Duration) + Send + 'static,
    ) -> Self {
        self.options.notify = Some(Box::new(notify));
        self
    }

    /// Give up once this much time has passed since the call started.
    ///
    /// Enforced independently of any limit inside the generator. Zero
    /// disables the check.
    ///
    /// Default: 15 minutes
    pub fn max_elapsed_time(mut self, limit: Duration) -> Self {
        self.options.max_elapsed_time = limit;
        self
    }

    /// Give up after this many attempts, counting the first.
    ///
    /// Default: 0 (unbounded)
    pub fn max_tries(mut self, tries: u32) -> Self {
        self.options.max_tries = tries;
        self
    }

    /// Measure elapsed time with a custom clock.
    ///
    /// Default: [`SystemClock`]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.options.clock = clock;
        self
    }

    /// Finish building.
    pub fn build(self) -> RetryOptions<E> {
        self.options
    }
}

impl<E> fmt::Debug for RetryOptionsBuilder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptionsBuilder")
            .field("options", &self.options)
            .finish()
    }
}
