//! Suspend/wake primitive used between attempts.
//!
//! The retry driver and the ticker never sleep directly; they start a
//! [`Timer`] and await [`Timer::fired`]. The default is [`TokioTimer`].
//! Tests substitute timers that fire immediately and record the requested
//! delays.

use async_trait::async_trait;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::Sleep;

/// A restartable one-shot timer.
///
/// # Examples
///
/// ```rust
/// use rebound::{Timer, TokioTimer};
/// use std::time::Duration;
///
/// # async fn example() {
/// let mut timer = TokioTimer::default();
/// timer.start(Duration::from_millis(10));
/// timer.fired().await;
/// timer.stop();
/// # }
/// ```
#[async_trait]
pub trait Timer: Send {
    /// Arm the timer to fire after `duration`, replacing any pending deadline.
    fn start(&mut self, duration: Duration);

    /// Completes once the armed deadline passes.
    ///
    /// Pends forever if the timer is not armed.
    async fn fired(&mut self);

    /// Disarm the timer and release its resources.
    fn stop(&mut self);
}

#[async_trait]
impl<T: Timer + ?Sized> Timer for Box<T> {
    fn start(&mut self, duration: Duration) {
        (**self).start(duration)
    }

    async fn fired(&mut self) {
        (**self).fired().await
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

/// Timer backed by [`tokio::time::sleep`].
#[derive(Debug, Default)]
pub struct TokioTimer {
    sleep: Option<Pin<Box<Sleep>>>,
}

#[async_trait]
impl Timer for TokioTimer {
    fn start(&mut self, duration: Duration) {
        self.sleep = Some(Box::pin(tokio::time::sleep(duration)));
    }

    async fn fired(&mut self) {
        match self.sleep.as_mut() {
            Some(sleep) => sleep.as_mut().await,
            None => std::future::pending().await,
        }
    }

    fn stop(&mut self) {
        self.sleep = None;
    }
}

/// Owns a timer and stops it when dropped, whatever the exit path.
pub(crate) struct TimerGuard {
    timer: Box<dyn Timer>,
}

impl TimerGuard {
    pub(crate) fn new(timer: Box<dyn Timer>) -> Self {
        Self { timer }
    }

    pub(crate) fn start(&mut self, duration: Duration) {
        self.timer.start(duration);
    }

    pub(crate) async fn fired(&mut self) {
        self.timer.fired().await;
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.timer.stop();
    }
}
