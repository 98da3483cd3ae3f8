//! The retry loop.

use super::options::RetryOptions;
use crate::error::{OperationError, RetryError};
use crate::logging::debug;
use crate::timer::TimerGuard;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Retry `operation` until it succeeds or a stop condition is reached.
///
/// The operation always runs at least once. Attempts run one after another
/// in the calling task; nothing is spawned.
///
/// # Stop conditions
///
/// - the operation returns `Ok`;
/// - `max_tries` attempts were made;
/// - `max_elapsed_time` passed since the call started;
/// - the operation returned [`OperationError::Permanent`];
/// - the generator returned `None`;
/// - `token` was cancelled before or during a wait.
///
/// On [`OperationError::RetryAfter`] the generator is still asked for a delay,
/// and a `None` still ends the loop. Otherwise the driver waits exactly the
/// requested duration instead of the generator's, then resets the generator
/// so growth restarts from its initial interval.
///
/// # Returns
///
/// - `Ok(T)`: the first successful result
/// - `Err(RetryError::Operation(e))`: the last failure, or the error wrapped in `Permanent`
/// - `Err(RetryError::RetryAfter(d))`: gave up while the last failure was a retry-after
/// - `Err(RetryError::Cancelled)`: `token` fired
///
/// # Examples
///
/// ```rust
/// use rebound::prelude::*;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), RetryError<std::io::Error>> {
/// let attempts = &AtomicU32::new(0);
/// let options: RetryOptions<std::io::Error> = RetryOptions::builder()
///     .backoff(ConstantBackoff::new(Duration::from_millis(1)))
///     .build();
///
/// let value = retry(
///     &CancellationToken::new(),
///     || async move {
///         if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
///             return Err(OperationError::transient(std::io::Error::other("retry me")));
///         }
///         Ok(42)
///     },
///     options,
/// )
/// .await?;
///
/// assert_eq!(value, 42);
/// assert_eq!(attempts.load(Ordering::SeqCst), 3);
/// # Ok(())
/// # }
/// ```
pub async fn retry<T, E, F, Fut>(
    token: &CancellationToken,
    mut operation: F,
    options: RetryOptions<E>,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OperationError<E>>>,
{
    let RetryOptions {
        mut backoff,
        timer,
        mut notify,
        max_elapsed_time,
        max_tries,
        clock,
    } = options;

    let mut timer = TimerGuard::new(timer);
    let started_at = clock.now();
    backoff.reset();

    let mut attempt: u32 = 0;
    loop {
        attempt = attempt.saturating_add(1);

        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if max_tries > 0 && attempt >= max_tries {
            debug!(attempt, max_tries, "giving up: max tries reached");
            return Err(err.into());
        }

        if !max_elapsed_time.is_zero()
            && clock.now().saturating_duration_since(started_at) > max_elapsed_time
        {
            debug!(attempt, ?max_elapsed_time, "giving up: max elapsed time exceeded");
            return Err(err.into());
        }

        if err.is_permanent() {
            debug!(attempt, "giving up: permanent error");
            return Err(err.into());
        }

        // The generator is consulted for retry-after errors too, so it can
        // still end the loop; only its delay is replaced.
        let Some(next) = backoff.next_backoff() else {
            debug!(attempt, "giving up: backoff stopped");
            return Err(err.into());
        };
        let (delay, reset_after_wait) = match err.retry_after_delay() {
            Some(after) => (after, true),
            None => (next, false),
        };

        if token.is_cancelled() {
            debug!(attempt, "retry cancelled before wait");
            return Err(RetryError::Cancelled);
        }

        if let Some(notify) = notify.as_mut() {
            notify(&err, delay);
        }

        debug!(attempt, ?delay, retry_after = reset_after_wait, "retrying after delay");
        timer.start(delay);
        tokio::select! {
            _ = timer.fired() => {}
            _ = token.cancelled() => {
                debug!(attempt, "retry cancelled during wait");
                return Err(RetryError::Cancelled);
            }
        }

        if reset_after_wait {
            backoff.reset();
        }
    }
}

/// [`retry`] with [`RetryOptions::default()`].
pub async fn retry_with_defaults<T, E, F, Fut>(
    token: &CancellationToken,
    operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, OperationError<E>>>,
{
    retry(token, operation, RetryOptions::default()).await
}
