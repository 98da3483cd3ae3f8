//! Example: Retrying an unreliable call with rebound
//!
//! This example demonstrates:
//! 1. Exponential backoff with a notify hook
//! 2. Permanent errors and server-requested retry-after delays
//! 3. Driving your own loop with a Ticker
//! 4. Cancelling a retry in flight
//!
//! Run with:
//! ```bash
//! cargo run -p rebound --example retry_example
//! ```

use rebound::prelude::*;
use std::error::Error;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// A simulated API that fails the first few times
struct UnreliableApi {
    attempts: AtomicU32,
    fail_count: u32,
}

impl UnreliableApi {
    fn new(fail_count: u32) -> Self {
        Self {
            attempts: AtomicU32::new(0),
            fail_count,
        }
    }

    async fn call(&self) -> Result<String, OperationError<io::Error>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;

        if attempt <= self.fail_count {
            println!("  Attempt {attempt}: FAILED (transient)");
            Err(io::Error::other(format!("connection reset on attempt {attempt}")).into())
        } else {
            println!("  Attempt {attempt}: SUCCESS");
            Ok("API response data".to_string())
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

/// Example 1: Exponential backoff with a notify hook
async fn example_exponential() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 1: Exponential Backoff ===\n");

    let api = &UnreliableApi::new(3);
    let options = RetryOptions::builder()
        .backoff(
            ExponentialBackoff::builder()
                .initial_interval(Duration::from_millis(50))
                .multiplier(2.0)
                .randomization_factor(0.0) // predictable output
                .build(),
        )
        .max_tries(5)
        .notify(|err: &OperationError<io::Error>, delay| {
            println!("  -> {err}; retrying in {delay:?}");
        })
        .build();

    let start = Instant::now();
    let result = retry(&CancellationToken::new(), || async move { api.call().await }, options).await?;

    println!("\nResult: {result}");
    println!("Total attempts: {}", api.total_attempts());
    println!("Total time: {:?} (expected ~350ms)", start.elapsed());

    Ok(())
}

/// Example 2: Permanent errors and retry-after
async fn example_signals() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 2: Permanent and Retry-After Signals ===\n");

    println!("Auth failure (should NOT retry)");
    let result: Result<(), RetryError<io::Error>> = retry(
        &CancellationToken::new(),
        || async {
            Err(permanent(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "auth failed",
            )))
        },
        RetryOptions::default(),
    )
    .await;
    println!("  Gave up immediately: {}", result.unwrap_err());

    println!("\nRate limited (server asks for 1s)");
    let attempts = &AtomicU32::new(0);
    let start = Instant::now();
    let result = retry(
        &CancellationToken::new(),
        || async move {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                println!("  Attempt 1: 429 Too Many Requests, Retry-After: 1");
                Err(retry_after::<io::Error>(1))
            } else {
                println!("  Attempt 2: SUCCESS");
                Ok("quota restored")
            }
        },
        RetryOptions::default(),
    )
    .await?;
    println!("  Result: {result} after {:?}", start.elapsed());

    Ok(())
}

/// Example 3: A ticker drives a caller-owned loop
async fn example_ticker() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 3: Ticker ===\n");

    let api = UnreliableApi::new(2);
    let mut ticker = Ticker::new(
        ConstantBackoff::new(Duration::from_millis(20)).with_max_retries(5),
    );

    let mut response = None;
    while ticker.tick().await.is_some() {
        if let Ok(body) = api.call().await {
            response = Some(body);
            ticker.stop();
        }
    }

    println!("\nResponse: {response:?}");
    println!("Total attempts: {}", api.total_attempts());

    Ok(())
}

/// Example 4: Cancelling a retry that is waiting
async fn example_cancellation() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 4: Cancellation ===\n");

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        println!("  Shutdown requested");
        canceller.cancel();
    });

    let options = RetryOptions::builder()
        .backoff(ConstantBackoff::new(Duration::from_secs(30)))
        .build();

    let start = Instant::now();
    let result: Result<(), RetryError<io::Error>> = retry(
        &token,
        || async { Err(OperationError::transient(io::Error::other("service down"))) },
        options,
    )
    .await;

    match result {
        Err(err) if err.is_cancelled() => {
            println!("  Retry cancelled after {:?}", start.elapsed());
        }
        other => println!("  Unexpected outcome: {other:?}"),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    println!("==============================================");
    println!("   rebound: Retry Examples");
    println!("==============================================");

    example_exponential().await?;
    example_signals().await?;
    example_ticker().await?;
    example_cancellation().await?;

    println!("\n==============================================");
    println!("   All examples completed successfully!");
    println!("==============================================\n");

    Ok(())
}
