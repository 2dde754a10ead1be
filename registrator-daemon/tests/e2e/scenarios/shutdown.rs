//! External stop at every stage ends the daemon cleanly.

use std::time::Duration;

use registrator_daemon::LifecycleState;

use crate::helpers::CallLog;
use crate::helpers::assertions::{DEFAULT_TIMEOUT, wait_for_state, wait_until};
use crate::helpers::config::{Harness, base_config, with_refresh, with_resync, with_retries};
use crate::helpers::mock_bridge::MockBridge;
use crate::helpers::mock_runtime::MockRuntime;

#[tokio::test(start_paused = true)]
async fn test_e2e_stop_while_running_returns_ok() {
    // Given: a running daemon with both loops armed
    let harness = Harness::new(&with_resync(with_refresh(base_config(), 1), 2));
    let mut state = harness.orchestrator.watch_state();
    let handle = harness.spawn();
    wait_for_state(&mut state, LifecycleState::Running).await;
    tokio::time::sleep(Duration::from_millis(2_500)).await;

    // When
    assert!(harness.orchestrator.shutdown_signal().trigger());

    // Then
    handle.await.unwrap().unwrap();
    assert_eq!(harness.orchestrator.state(), LifecycleState::Stopped);

    let calls = harness.log.snapshot().len();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(harness.log.snapshot().len(), calls);
}

#[tokio::test(start_paused = true)]
async fn test_e2e_stop_abandons_unbounded_retries() {
    // Given: unbounded retries against a dead registry
    let config = with_retries(base_config(), -1, 1_000);
    let log = CallLog::new();
    let harness = Harness::with_mocks(
        &config,
        log.clone(),
        MockBridge::new(log.clone()).unreachable(),
        MockRuntime::new(log),
    );
    let handle = harness.spawn();
    wait_until(DEFAULT_TIMEOUT, "three pings", || harness.bridge.pings() >= 3).await;

    // When
    harness.orchestrator.shutdown_signal().trigger();

    // Then: clean exit, nothing after establishment ran
    handle.await.unwrap().unwrap();
    let pings = harness.bridge.pings();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(harness.bridge.pings(), pings);
    assert_eq!(harness.runtime.subscriptions(), 0);
    assert_eq!(harness.orchestrator.state(), LifecycleState::Stopped);
}

#[tokio::test]
async fn test_e2e_stop_before_run_exits_without_calls() {
    let harness = Harness::new(&base_config());
    harness.orchestrator.shutdown_signal().trigger();

    harness.orchestrator.run().await.unwrap();

    assert!(harness.log.snapshot().is_empty());
    assert_eq!(harness.orchestrator.state(), LifecycleState::Stopped);
}

#[tokio::test]
async fn test_e2e_second_trigger_is_a_noop() {
    let harness = Harness::new(&base_config());
    let signal = harness.orchestrator.shutdown_signal();

    assert!(signal.trigger());
    assert!(!signal.trigger());
    assert!(signal.is_triggered());
}
