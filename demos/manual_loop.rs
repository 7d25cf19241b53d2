//! # Example: manual_loop
//!
//! Drives a [`Task`] by hand with `should_retry` / `timeout` instead of
//! [`Retry::run`], and cancels it from another task through an
//! [`AbortController`].
//!
//! ## Flow
//! ```text
//! task.start_with(signal)
//! loop {
//!   ├─► attempt → Err(e)
//!   ├─► task.should_retry(Some(e))?  no ─► give up
//!   └─► task.timeout().await         Cancelled ─► stop
//! }
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example manual_loop
//! ```

use std::time::Duration;
use retryvisor::{AbortController, Retry, RetryError, RetryOptions, Task, TaskOptions};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let retry = Retry::new(RetryOptions {
        min_timeout: Some(Duration::from_millis(200)),
        retries: Some(10),
        ..Default::default()
    })?;

    let controller = AbortController::new();
    let task: Task<String> = retry.pick(TaskOptions::new().with_id("poller"));
    task.start_with(controller.signal())?;

    // Cancel the loop after one second.
    let aborter = controller.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        aborter.abort("deadline reached");
    });

    loop {
        let error = format!("not ready (retries={})", task.retries());
        println!("[poller] {error}, next delay {:?}", task.current_timeout());

        if !task.should_retry(Some(error)) {
            println!("[poller] giving up after {} retries", task.retries());
            break;
        }
        match task.timeout().await {
            Ok(()) => {}
            Err(RetryError::Cancelled { reason }) => {
                println!("[poller] cancelled: {reason}");
                break;
            }
            Err(other) => return Err(other.into()),
        }
    }

    println!("[main] recorded {} failures", task.history().len());
    Ok(())
}
