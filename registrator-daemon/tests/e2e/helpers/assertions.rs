//! Polling assertions for E2E tests.

use std::time::Duration;

use registrator_daemon::LifecycleState;
use tokio::sync::watch;

/// Default timeout for waiting on an asynchronous condition.
#[allow(dead_code)]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Poll `condition` every 10ms until it holds.
///
/// # Panics
///
/// Panics if the condition does not hold within `timeout`.
#[allow(dead_code)]
pub async fn wait_until(timeout: Duration, what: &str, condition: impl Fn() -> bool) {
    let result = tokio::time::timeout(timeout, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    if result.is_err() {
        panic!("timed out after {:?} waiting for {}", timeout, what);
    }
}

/// Wait until the orchestrator reports `target`.
///
/// # Panics
///
/// Panics on timeout or if the orchestrator is dropped first.
#[allow(dead_code)]
pub async fn wait_for_state(rx: &mut watch::Receiver<LifecycleState>, target: LifecycleState) {
    let result = tokio::time::timeout(DEFAULT_TIMEOUT, rx.wait_for(|s| *s == target)).await;
    match result {
        Ok(Ok(_)) => {}
        Ok(Err(_)) => panic!("orchestrator dropped before reaching {target}"),
        Err(_) => panic!("timed out waiting for state {target}"),
    }
}
