//! Backoff-paced tick stream.
//!
//! A [`Ticker`] turns a [`Backoff`] into a stream of `()` ticks. The caller
//! reads a tick, runs its own operation, and stops the ticker once satisfied.
//! Unlike [`crate::retry()`], the ticker never calls the operation and never
//! stops on success by itself.
//!
//! ```text
//!  background task                                consumer
//!  ───────────────                                ────────
//!  loop {
//!    next_backoff() ── None ─► close channel ───► tick() == None
//!    timer.start(delay)
//!    select! { timer fired, stop ─► exit }
//!    select! { send(()) ──────────────[cap 1]───► tick() == Some(())
//!              stop ─► exit }
//!  }
//! ```
//!
//! # Buffering
//!
//! The channel holds at most one tick. After its wait completes, the
//! background task waits for a free slot before it asks the generator for the
//! next delay. Ticks are never dropped and never pile up. A slow consumer
//! delays later ticks instead, because their waits only begin once the
//! previous tick has been queued.

use crate::backoff::Backoff;
use crate::logging::trace;
use crate::timer::{Timer, TimerGuard, TokioTimer};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A stream of ticks spaced by a [`Backoff`].
///
/// A generator that yields N delays and then stops produces exactly N ticks,
/// after which [`Ticker::tick`] returns `None`. Ticks that are already
/// buffered can still be read after the generator stops.
///
/// # Examples
///
/// ```rust
/// use rebound::backoff::{BackoffExt, ConstantBackoff};
/// use rebound::Ticker;
/// use std::time::Duration;
///
/// # async fn example() {
/// let mut ticker = Ticker::new(ConstantBackoff::new(Duration::from_millis(10)).with_max_retries(5));
///
/// while ticker.tick().await.is_some() {
///     if try_connect().await {
///         ticker.stop();
///     }
/// }
/// # }
/// # async fn try_connect() -> bool { true }
/// ```
#[derive(Debug)]
pub struct Ticker {
    ticks: mpsc::Receiver<()>,
    stop: CancellationToken,
}

impl Ticker {
    /// Start ticking with `backoff`, waiting on a [`TokioTimer`].
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn new<B>(backoff: B) -> Self
    where
        B: Backoff + 'static,
    {
        Self::with_timer(backoff, TokioTimer::default())
    }

    /// Start ticking with `backoff`, waiting on `timer`.
    ///
    /// The generator is reset before the first delay is requested.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn with_timer<B, T>(backoff: B, timer: T) -> Self
    where
        B: Backoff + 'static,
        T: Timer + 'static,
    {
        let (tx, ticks) = mpsc::channel(1);
        let stop = CancellationToken::new();
        tokio::spawn(run(
            backoff,
            TimerGuard::new(Box::new(timer)),
            tx,
            stop.clone(),
        ));
        Self { ticks, stop }
    }

    /// Wait for the next tick.
    ///
    /// Returns `None` once the ticker is stopped or the generator is exhausted
    /// and the buffer is drained.
    pub async fn tick(&mut self) -> Option<()> {
        if self.stop.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.stop.cancelled() => None,
            tick = self.ticks.recv() => tick,
        }
    }

    /// Stop producing ticks and release the timer.
    ///
    /// Idempotent; safe to call from any thread while another task is
    /// waiting in [`Ticker::tick`].
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// Whether [`Ticker::stop`] has been called.
    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }
}

impl Stream for Ticker {
    type Item = ();

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<()>> {
        let this = self.get_mut();
        if this.stop.is_cancelled() {
            return Poll::Ready(None);
        }
        // Stopping drops the sender, which wakes a pending receive.
        this.ticks.poll_recv(cx)
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}

async fn run<B: Backoff>(
    mut backoff: B,
    mut timer: TimerGuard,
    tx: mpsc::Sender<()>,
    stop: CancellationToken,
) {
    backoff.reset();
    loop {
        let Some(delay) = backoff.next_backoff() else {
            trace!("backoff stopped; closing ticker");
            return;
        };

        timer.start(delay);
        tokio::select! {
            _ = timer.fired() => {}
            _ = stop.cancelled() => return,
        }

        tokio::select! {
            sent = tx.send(()) => {
                if sent.is_err() {
                    return;
                }
                trace!(?delay, "tick");
            }
            _ = stop.cancelled() => return,
        }
    }
}
