//! The retry driver.
//!
//! [`retry`] calls an async operation until it succeeds or one of the stop
//! conditions is reached.
//!
//! ```text
//! loop {
//!   ├─► attempt += 1
//!   ├─► operation().await
//!   │       ├─ Ok                        ─► return Ok(value)
//!   │       └─ Err:
//!   │            ├─ attempt >= max_tries ─► return last error
//!   │            ├─ elapsed > max_elapsed─► return last error
//!   │            ├─ Permanent(e)         ─► return e
//!   │            └─ otherwise            ─► next = backoff.next_backoff()
//!   │                                          ├─ None ─► return last error
//!   │                                          └─ delay = next, or d for
//!   │                                             RetryAfter(d) (reset after wait)
//!   ├─► token cancelled?                 ─► return Cancelled
//!   ├─► notify(&err, delay)
//!   └─► select! { timer fired, token cancelled ─► return Cancelled }
//! }
//! ```

mod driver;
mod options;

pub use driver::{retry, retry_with_defaults};
pub use options::{DEFAULT_MAX_ELAPSED_TIME, Notify, RetryOptions, RetryOptionsBuilder};
