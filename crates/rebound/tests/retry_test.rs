//! Integration tests for the retry driver
//!
//! Most tests run against `MockTimer`, which fires immediately and records
//! the delays it was asked for. A few use the real Tokio timer where the
//! wall-clock behavior itself is under test.

mod common;

use common::mock_timer::MockTimer;
use rebound::prelude::*;
use rebound::ManualClock;
use rstest::rstest;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

fn unjittered(initial: Duration, multiplier: f64) -> ExponentialBackoff {
    ExponentialBackoff::builder()
        .initial_interval(initial)
        .multiplier(multiplier)
        .randomization_factor(0.0)
        .build()
}

#[tokio::test]
async fn test_fails_twice_then_succeeds() {
    let timer = MockTimer::new();
    let attempts = &AtomicU32::new(0);
    let options = RetryOptions::builder()
        .backoff(unjittered(Duration::from_millis(10), 2.0))
        .timer(timer.clone())
        .build();

    let result = retry(
        &CancellationToken::new(),
        || async move {
            if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(OperationError::transient(io::Error::other("flaky")))
            } else {
                Ok("ok")
            }
        },
        options,
    )
    .await;

    assert_eq!(result.unwrap(), "ok");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(
        timer.delays(),
        vec![Duration::from_millis(10), Duration::from_millis(20)]
    );
    assert_eq!(timer.stop_count(), 1);
}

#[tokio::test]
async fn test_permanent_error_is_unwrapped_without_waiting() {
    let timer = MockTimer::new();
    let attempts = &AtomicU32::new(0);
    let options = RetryOptions::builder()
        .backoff(unjittered(Duration::from_secs(1), 2.0))
        .timer(timer.clone())
        .build();

    let result: Result<(), RetryError<io::Error>> = retry(
        &CancellationToken::new(),
        || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(permanent(io::Error::other("x")))
        },
        options,
    )
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "x");
    assert_eq!(err.into_operation_error().unwrap().to_string(), "x");
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(timer.delays().is_empty());
    assert_eq!(timer.stop_count(), 1);
}

#[rstest]
#[case::single(1)]
#[case::two(2)]
#[case::five(5)]
#[tokio::test]
async fn test_max_tries_caps_attempts(#[case] max_tries: u32) {
    let timer = MockTimer::new();
    let attempts = &AtomicU32::new(0);
    let options = RetryOptions::builder()
        .backoff(ZeroBackoff)
        .timer(timer.clone())
        .max_tries(max_tries)
        .build();

    let result: Result<(), _> = retry(
        &CancellationToken::new(),
        || async move {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            Err(OperationError::transient(io::Error::other(format!(
                "attempt {n}"
            ))))
        },
        options,
    )
    .await;

    assert_eq!(attempts.load(Ordering::SeqCst), max_tries);
    assert_eq!(
        result.unwrap_err().to_string(),
        format!("attempt {max_tries}")
    );
    assert_eq!(timer.delays().len() as u32, max_tries - 1);
}

#[tokio::test]
async fn test_retry_after_overrides_backoff_and_resets_it() {
    let timer = MockTimer::new();
    let attempts = &AtomicU32::new(0);
    let options = RetryOptions::builder()
        .backoff(unjittered(Duration::from_millis(100), 2.0))
        .timer(timer.clone())
        .build();

    let result = retry(
        &CancellationToken::new(),
        || async move {
            match attempts.fetch_add(1, Ordering::SeqCst) {
                0 | 1 | 3 => Err(OperationError::transient(io::Error::other("busy"))),
                2 => Err(retry_after(1)),
                _ => Ok(7),
            }
        },
        options,
    )
    .await;

    assert_eq!(result.unwrap(), 7);
    assert_eq!(attempts.load(Ordering::SeqCst), 5);
    assert_eq!(
        timer.delays(),
        vec![
            Duration::from_millis(100),
            Duration::from_millis(200),
            Duration::from_secs(1),
            Duration::from_millis(100),
        ]
    );
}

#[tokio::test]
async fn test_retry_after_waits_requested_duration() {
    let attempts = &AtomicU32::new(0);
    let options = RetryOptions::builder()
        .backoff(ConstantBackoff::new(Duration::from_secs(10)))
        .build();
    let started = Instant::now();

    let result = retry(
        &CancellationToken::new(),
        || async move {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(retry_after::<io::Error>(1))
            } else {
                Ok(())
            }
        },
        options,
    )
    .await;

    let elapsed = started.elapsed();
    assert!(result.is_ok());
    assert!(elapsed >= Duration::from_secs(1), "waited only {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "used the backoff delay: {elapsed:?}");
}

#[tokio::test]
async fn test_retry_after_exhaustion_reports_delay() {
    let options = RetryOptions::builder()
        .timer(MockTimer::new())
        .max_tries(2)
        .build();

    let result: Result<(), RetryError<io::Error>> = retry(
        &CancellationToken::new(),
        || async { Err(retry_after::<io::Error>(3)) },
        options,
    )
    .await;

    match result {
        Err(RetryError::RetryAfter(delay)) => assert_eq!(delay, Duration::from_secs(3)),
        other => panic!("expected RetryAfter, got {other:?}"),
    }
}

#[tokio::test]
async fn test_stopped_generator_ends_retry_after() {
    let timer = MockTimer::new();
    let attempts = &AtomicU32::new(0);
    let options = RetryOptions::builder()
        .backoff(StopBackoff)
        .timer(timer.clone())
        .build();

    let result: Result<(), RetryError<io::Error>> = retry(
        &CancellationToken::new(),
        || async move {
            if attempts.fetch_add(1, Ordering::SeqCst) < 5 {
                Err(retry_after::<io::Error>(0))
            } else {
                Ok(())
            }
        },
        options,
    )
    .await;

    assert!(matches!(result, Err(RetryError::RetryAfter(d)) if d.is_zero()));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert!(timer.delays().is_empty());
    assert_eq!(timer.stop_count(), 1);
}

#[tokio::test]
async fn test_retry_limit_counts_retry_after_attempts() {
    let timer = MockTimer::new();
    let attempts = &AtomicU32::new(0);
    let options = RetryOptions::builder()
        .backoff(ZeroBackoff.with_max_retries(2))
        .timer(timer.clone())
        .max_tries(20)
        .build();

    let result: Result<(), RetryError<io::Error>> = retry(
        &CancellationToken::new(),
        || async move {
            match attempts.fetch_add(1, Ordering::SeqCst) {
                1 | 2 => Err(OperationError::transient(io::Error::other("busy"))),
                _ => Err(retry_after::<io::Error>(2)),
            }
        },
        options,
    )
    .await;

    // The first retry-after takes one retry, then resets the count. The two
    // transient failures use it up, so the next retry-after ends the loop.
    assert!(matches!(result, Err(RetryError::RetryAfter(d)) if d == Duration::from_secs(2)));
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert_eq!(
        timer.delays(),
        vec![Duration::from_secs(2), Duration::ZERO, Duration::ZERO]
    );
}

#[tokio::test]
async fn test_elapsed_limit_on_generator_ends_retry_after() {
    let clock = ManualClock::new();
    let tick = clock.clone();
    let attempts = &AtomicU32::new(0);
    let options = RetryOptions::builder()
        .backoff(
            ZeroBackoff
                .with_max_elapsed_time(Duration::from_secs(10))
                .with_clock(Arc::new(clock)),
        )
        .timer(MockTimer::new())
        .max_tries(20)
        .build();

    let result: Result<(), RetryError<io::Error>> = retry(
        &CancellationToken::new(),
        || {
            tick.advance(Duration::from_secs(20));
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(retry_after::<io::Error>(1))
            }
        },
        options,
    )
    .await;

    assert!(matches!(result, Err(RetryError::RetryAfter(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancellation_interrupts_wait() {
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let options = RetryOptions::builder()
        .backoff(ConstantBackoff::new(Duration::from_secs(60)))
        .build();
    let started = Instant::now();

    let result: Result<(), RetryError<io::Error>> = retry(
        &token,
        || async { Err(OperationError::transient(io::Error::other("down"))) },
        options,
    )
    .await;

    assert!(result.unwrap_err().is_cancelled());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_cancellation_stops_timer_once() {
    let token = CancellationToken::new();
    token.cancel();
    let timer = MockTimer::new();
    let options = RetryOptions::builder()
        .backoff(ZeroBackoff)
        .timer(timer.clone())
        .build();

    let result: Result<(), RetryError<io::Error>> = retry(
        &token,
        || async { Err(OperationError::transient(io::Error::other("down"))) },
        options,
    )
    .await;

    assert!(result.unwrap_err().is_cancelled());
    assert!(timer.delays().is_empty());
    assert_eq!(timer.stop_count(), 1);
}

#[tokio::test]
async fn test_max_elapsed_time_gives_up_with_last_error() {
    let clock = ManualClock::new();
    let timer = MockTimer::new();
    let attempts = &AtomicU32::new(0);
    let tick = clock.clone();
    let options = RetryOptions::builder()
        .backoff(ZeroBackoff)
        .timer(timer.clone())
        .clock(Arc::new(clock))
        .max_elapsed_time(Duration::from_secs(30))
        .build();

    let result: Result<(), _> = retry(
        &CancellationToken::new(),
        || {
            tick.advance(Duration::from_secs(10));
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                Err(OperationError::transient(io::Error::other(format!(
                    "attempt {n}"
                ))))
            }
        },
        options,
    )
    .await;

    // 10s, 20s and 30s are within budget; the fourth attempt ends at 40s.
    assert_eq!(attempts.load(Ordering::SeqCst), 4);
    assert_eq!(result.unwrap_err().to_string(), "attempt 4");
    assert_eq!(timer.delays().len(), 3);
    assert_eq!(timer.stop_count(), 1);
}

#[tokio::test]
async fn test_zero_max_elapsed_time_is_unbounded() {
    let clock = ManualClock::new();
    let tick = clock.clone();
    let attempts = &AtomicU32::new(0);
    let options = RetryOptions::builder()
        .backoff(ZeroBackoff)
        .timer(MockTimer::new())
        .clock(Arc::new(clock))
        .max_elapsed_time(Duration::ZERO)
        .build();

    let result = retry(
        &CancellationToken::new(),
        || {
            tick.advance(Duration::from_secs(3600));
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) < 5 {
                    Err(OperationError::transient(io::Error::other("slow")))
                } else {
                    Ok(())
                }
            }
        },
        options,
    )
    .await;

    assert!(result.is_ok());
    assert_eq!(attempts.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_notify_receives_error_and_delay() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let attempts = &AtomicU32::new(0);
    let options = RetryOptions::builder()
        .backoff(unjittered(Duration::from_millis(5), 3.0))
        .timer(MockTimer::new())
        .notify(move |err: &OperationError<io::Error>, delay| {
            sink.lock().unwrap().push((err.retry_after_delay(), delay));
        })
        .build();

    let result = retry(
        &CancellationToken::new(),
        || async move {
            match attempts.fetch_add(1, Ordering::SeqCst) {
                0 => Err(OperationError::transient(io::Error::other("a"))),
                1 => Err(retry_after(2)),
                _ => Ok(()),
            }
        },
        options,
    )
    .await;

    assert!(result.is_ok());
    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            (None, Duration::from_millis(5)),
            (Some(Duration::from_secs(2)), Duration::from_secs(2)),
        ]
    );
}

#[tokio::test]
async fn test_generator_limit_ends_retries() {
    let timer = MockTimer::new();
    let attempts = &AtomicU32::new(0);
    let options = RetryOptions::builder()
        .backoff(ConstantBackoff::new(Duration::from_millis(1)).with_max_retries(2))
        .timer(timer.clone())
        .build();

    let result: Result<(), _> = retry(
        &CancellationToken::new(),
        || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(OperationError::transient(io::Error::other("down")))
        },
        options,
    )
    .await;

    assert!(matches!(result, Err(RetryError::Operation(_))));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(timer.delays(), vec![Duration::from_millis(1); 2]);
    assert_eq!(timer.stop_count(), 1);
}

#[tokio::test]
async fn test_operation_error_converts_with_question_mark() {
    fn read_sensor(attempt: u32) -> io::Result<u32> {
        if attempt == 0 {
            return Err(io::Error::other("first call fails"));
        }
        Ok(attempt)
    }

    async fn fetch(attempt: u32) -> Result<u32, OperationError<io::Error>> {
        let value = read_sensor(attempt)?;
        Ok(value)
    }

    let attempts = &AtomicU32::new(0);
    let options = RetryOptions::builder()
        .backoff(ZeroBackoff)
        .timer(MockTimer::new())
        .build();

    let value = retry(
        &CancellationToken::new(),
        || fetch(attempts.fetch_add(1, Ordering::SeqCst)),
        options,
    )
    .await
    .unwrap();

    assert_eq!(value, 1);
}
