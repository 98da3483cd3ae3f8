//! Signal and terminal error types.
//!
//! An operation reports failure as an [`OperationError`], which tells the
//! driver how to react:
//!
//! | Variant                              | Driver reaction                                  |
//! |--------------------------------------|--------------------------------------------------|
//! | [`OperationError::Transient`]        | retry after the generator's next delay           |
//! | [`OperationError::Permanent`]        | stop now, return the wrapped error               |
//! | [`OperationError::RetryAfter`]       | wait exactly that long, then reset the generator |
//!
//! The driver itself returns a [`RetryError`].

use std::time::Duration;
use thiserror::Error;

/// Failure reported by a retried operation.
///
/// `?` inside an operation converts any `E` into [`OperationError::Transient`].
///
/// # Examples
///
/// ```rust
/// use rebound::{OperationError, permanent};
///
/// fn parse(input: &str) -> Result<u32, OperationError<std::num::ParseIntError>> {
///     match input.parse::<u32>() {
///         Ok(n) => Ok(n),
///         // Malformed input will not get better on retry.
///         Err(e) => Err(permanent(e)),
///     }
/// }
///
/// assert!(parse("x").unwrap_err().is_permanent());
/// ```
#[derive(Debug, Error)]
pub enum OperationError<E> {
    /// A failure worth retrying.
    #[error(transparent)]
    Transient(E),

    /// A failure that must not be retried.
    #[error(transparent)]
    Permanent(E),

    /// Wait exactly this long before the next attempt and restart backoff growth.
    #[error("retry after {0:?}")]
    RetryAfter(Duration),
}

impl<E> OperationError<E> {
    /// Mark `err` as worth retrying.
    pub fn transient(err: E) -> Self {
        Self::Transient(err)
    }

    /// Mark `err` as not worth retrying.
    pub fn permanent(err: E) -> Self {
        Self::Permanent(err)
    }

    /// Mark an optional error as permanent; `None` stays `None`.
    pub fn permanent_opt(err: Option<E>) -> Option<Self> {
        err.map(Self::Permanent)
    }

    /// Ask the driver to wait `seconds` seconds before the next attempt.
    pub fn retry_after(seconds: u64) -> Self {
        Self::RetryAfter(Duration::from_secs(seconds))
    }

    /// Whether this error stops the retry loop.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent(_))
    }

    /// The operation-specified wait, if any.
    pub fn retry_after_delay(&self) -> Option<Duration> {
        match self {
            Self::RetryAfter(delay) => Some(*delay),
            _ => None,
        }
    }

    /// The underlying error, if this is not a retry-after directive.
    pub fn inner(&self) -> Option<&E> {
        match self {
            Self::Transient(err) | Self::Permanent(err) => Some(err),
            Self::RetryAfter(_) => None,
        }
    }

    /// Unwrap the underlying error, if this is not a retry-after directive.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Transient(err) | Self::Permanent(err) => Some(err),
            Self::RetryAfter(_) => None,
        }
    }
}

impl<E> From<E> for OperationError<E> {
    fn from(err: E) -> Self {
        Self::Transient(err)
    }
}

/// Wrap `err` so the driver stops retrying and returns it.
pub fn permanent<E>(err: E) -> OperationError<E> {
    OperationError::Permanent(err)
}

/// Ask the driver to wait `seconds` seconds and restart backoff growth.
pub fn retry_after<E>(seconds: u64) -> OperationError<E> {
    OperationError::retry_after(seconds)
}

/// Terminal error returned by [`crate::retry()`].
///
/// Exhaustion (tries, elapsed time, or the generator stopping) surfaces the
/// last operation error unchanged; it is not reported separately.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The last error the operation returned, unwrapped from any signal.
    #[error(transparent)]
    Operation(E),

    /// The driver gave up while the last failure was a retry-after directive.
    #[error("gave up while honoring retry-after of {0:?}")]
    RetryAfter(Duration),

    /// The cancellation token fired before or during a wait.
    #[error("retry cancelled")]
    Cancelled,
}

impl<E> RetryError<E> {
    /// Whether the retry loop ended because of cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The operation's own error, if the loop ended on one.
    pub fn operation_error(&self) -> Option<&E> {
        match self {
            Self::Operation(err) => Some(err),
            _ => None,
        }
    }

    /// Unwrap the operation's own error, if the loop ended on one.
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            Self::Operation(err) => Some(err),
            _ => None,
        }
    }
}

impl<E> From<OperationError<E>> for RetryError<E> {
    fn from(err: OperationError<E>) -> Self {
        match err {
            OperationError::Transient(err) | OperationError::Permanent(err) => Self::Operation(err),
            OperationError::RetryAfter(delay) => Self::RetryAfter(delay),
        }
    }
}
