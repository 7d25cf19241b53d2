//! # Example: retry_with_backoff
//!
//! Demonstrates how [`Retry::run`] retries a failing operation with
//! exponentially growing delays, and how [`LogWriter`] renders the
//! `Retry`/`Timeout` events published along the way.
//!
//! The operation fails twice before succeeding.
//!
//! ## Flow
//! ```text
//! Retry::run()
//!   ├─► attempt 1 → Err("boom #1")
//!   ├─► publish(Retry{retries=1})
//!   ├─► sleep(100ms)
//!   ├─► publish(Timeout{next=200ms})
//!   ├─► attempt 2 → Err("boom #2")
//!   ├─► publish(Retry{retries=2})
//!   ├─► sleep(200ms)
//!   ├─► publish(Timeout{next=400ms})
//!   └─► attempt 3 → Ok("payload")
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example retry_with_backoff --features logging
//! ```

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use retryvisor::{LogWriter, Retry, RetryOptions, RunOptions, Subscribe};

static FAIL_COUNT: AtomicU64 = AtomicU64::new(0);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // 1. Configure the engine (100ms first delay, doubling, capped at 2s)
    let retry = Retry::new(RetryOptions {
        min_timeout: Some(Duration::from_millis(100)),
        max_timeout: Some(Duration::from_secs(2)),
        factor: Some(2.0),
        retries: Some(5),
        ..Default::default()
    })?;

    // 2. Forward events to the built-in logger
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let observers = retry.attach(subs);

    // 3. Run an operation that fails 2 times before succeeding
    let payload = retry
        .run(
            |task| async move {
                let attempt = FAIL_COUNT.fetch_add(1, Ordering::Relaxed) + 1;
                println!("[flaky] attempt {attempt} (retries so far: {})", task.retries());

                if attempt <= 2 {
                    println!("[flaky] simulated failure #{attempt}");
                    Err(format!("boom #{attempt}"))
                } else {
                    println!("[flaky] success on attempt {attempt}");
                    Ok("payload")
                }
            },
            RunOptions::new().with_id("flaky"),
        )
        .await?;

    observers.shutdown().await;
    println!("[main] done: {payload}");
    Ok(())
}
