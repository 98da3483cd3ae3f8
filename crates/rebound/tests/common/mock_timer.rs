//! Mock timer for testing without real waits
//!
//! Fires as soon as it is awaited and records every requested delay, so
//! tests can assert on the exact pacing the retry driver or ticker asked for.

use async_trait::async_trait;
use rebound::Timer;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A timer that never actually waits.
///
/// Clones share their recordings, so a test keeps one handle and hands the
/// other to the code under test.
#[derive(Debug, Clone, Default)]
pub struct MockTimer {
    delays: Arc<Mutex<Vec<Duration>>>,
    stops: Arc<AtomicUsize>,
}

impl MockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay passed to `start`, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }

    /// Number of times `stop` was called.
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Timer for MockTimer {
    fn start(&mut self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }

    async fn fired(&mut self) {
        tokio::task::yield_now().await;
    }

    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}
