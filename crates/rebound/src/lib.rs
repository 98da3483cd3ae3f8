#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Retry with backoff for async Rust.
//!
//! This crate re-invokes a fallible async operation until it succeeds, a
//! caller-defined limit is reached, the operation reports that its failure is
//! permanent, or the caller cancels. It provides:
//!
//! - **Backoff generators** via the [`Backoff`] trait
//!   - Exponential backoff with jitter ([`ExponentialBackoff`])
//!   - Constant, zero and stop policies
//!   - Elapsed-time and retry-count limits as decorators
//! - **A retry driver** via [`retry`], configured with [`RetryOptions`]
//! - **A ticker** via [`Ticker`], for callers that want to drive their own loop
//! - **Signal errors** via [`OperationError`]: transient, permanent, retry-after
//!
//! # State machine
//!
//! ```text
//!              ┌──────────────┐  Ok            ┌───────────┐
//!   start ───► │  Attempting  │ ─────────────► │ Succeeded │
//!              └──────┬───────┘                └───────────┘
//!                     │ Err
//!   ┌─────────────────┼──────────────────────┬──────────────────────┐
//!   ▼ Permanent       ▼ max tries / elapsed  ▼ Transient/RetryAfter │
//! ┌────────────────┐ ┌──────────────┐  ┌───────────┐  cancelled     │
//! │ FailedPermanent│ │  Exhausted   │  │  Waiting  │ ─────────────► Cancelled
//! └────────────────┘ └──────────────┘  └─────┬─────┘
//!                           ▲ backoff stop   │ timer fired
//!                           └────────────────┴──► Attempting
//! ```
//!
//! # Examples
//!
//! ```rust
//! use rebound::prelude::*;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), RetryError<std::io::Error>> {
//! let token = CancellationToken::new();
//! let options = RetryOptions::builder()
//!     .backoff(
//!         ExponentialBackoff::builder()
//!             .initial_interval(Duration::from_millis(100))
//!             .build(),
//!     )
//!     .max_tries(3)
//!     .build();
//!
//! let value = retry(&token, || async { Ok::<_, OperationError<std::io::Error>>(42) }, options).await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod clock;
pub mod error;
pub mod retry;
pub mod ticker;
pub mod timer;

mod logging;


pub use backoff::{
    Backoff, BackoffConfig, BackoffExt, ConstantBackoff, ExponentialBackoff,
    ExponentialBackoffBuilder, MaxElapsed, MaxRetries, StopBackoff, ZeroBackoff,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{OperationError, RetryError, permanent, retry_after};
pub use retry::{
    DEFAULT_MAX_ELAPSED_TIME, Notify, RetryOptions, RetryOptionsBuilder, retry,
    retry_with_defaults,
};
pub use ticker::Ticker;
pub use timer::{Timer, TokioTimer};

/// Convenient re-exports of commonly used items.
///
/// Import all core abstractions with:
///
/// ```rust
/// use rebound::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backoff::{
        Backoff, BackoffExt, ConstantBackoff, ExponentialBackoff, StopBackoff, ZeroBackoff,
    };
    pub use crate::error::{OperationError, RetryError, permanent, retry_after};
    pub use crate::retry::{RetryOptions, retry};
    pub use crate::ticker::Ticker;
}
