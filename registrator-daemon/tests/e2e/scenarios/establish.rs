//! Connection establishment before anything else starts.

use std::time::Duration;

use registrator_core::error::{ConnectionError, RegistratorError};
use registrator_daemon::LifecycleState;
use tokio::time::Instant;

use crate::helpers::CallLog;
use crate::helpers::assertions::wait_for_state;
use crate::helpers::config::{Harness, base_config, with_retries};
use crate::helpers::mock_bridge::MockBridge;
use crate::helpers::mock_runtime::MockRuntime;

fn harness_with(bridge: impl FnOnce(MockBridge) -> MockBridge, attempts: i64, interval_ms: i64) -> Harness {
    let config = with_retries(base_config(), attempts, interval_ms);
    let log = CallLog::new();
    Harness::with_mocks(
        &config,
        log.clone(),
        bridge(MockBridge::new(log.clone())),
        MockRuntime::new(log),
    )
}

#[tokio::test(start_paused = true)]
async fn test_e2e_limited_retries_ping_n_plus_one_times() {
    // Given: 3 retries 500ms apart against a registry that never answers
    let harness = harness_with(MockBridge::unreachable, 3, 500);
    let start = Instant::now();

    // When
    let result = harness.orchestrator.run().await;

    // Then: 4 pings, at least 3 intervals elapsed, fatal exhaustion
    match result {
        Err(RegistratorError::Connection(ConnectionError::Exhausted { attempts, .. })) => {
            assert_eq!(attempts, 4);
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
    assert_eq!(harness.bridge.pings(), 4);
    assert!(start.elapsed() >= Duration::from_millis(1_500));

    // Nothing after establishment ran
    assert_eq!(harness.runtime.subscriptions(), 0);
    assert_eq!(harness.log.snapshot().len(), 4);
    assert_eq!(harness.orchestrator.state(), LifecycleState::Stopped);
}

#[tokio::test(start_paused = true)]
async fn test_e2e_zero_retries_is_a_single_attempt() {
    let harness = harness_with(MockBridge::unreachable, 0, 2_000);
    let start = Instant::now();

    let result = harness.orchestrator.run().await;

    assert!(matches!(
        result,
        Err(RegistratorError::Connection(ConnectionError::Exhausted { attempts: 1, .. }))
    ));
    assert_eq!(harness.bridge.pings(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_e2e_unbounded_retries_stop_at_first_success() {
    // Given: unbounded retries, registry fails 5 times then recovers
    let harness = harness_with(|b| b.failing_pings(5), -1, 500);
    let mut state = harness.orchestrator.watch_state();

    // When
    let handle = harness.spawn();
    wait_for_state(&mut state, LifecycleState::Running).await;

    // Then: exactly 6 pings, and no more afterwards
    assert_eq!(harness.bridge.pings(), 6);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(harness.bridge.pings(), 6);
    assert_eq!(harness.runtime.subscriptions(), 1);

    harness.orchestrator.shutdown_signal().trigger();
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_e2e_limited_retries_recover_within_budget() {
    let harness = harness_with(|b| b.failing_pings(2), 2, 100);
    let mut state = harness.orchestrator.watch_state();

    let handle = harness.spawn();
    wait_for_state(&mut state, LifecycleState::Running).await;

    assert_eq!(harness.bridge.pings(), 3);

    harness.orchestrator.shutdown_signal().trigger();
    handle.await.unwrap().unwrap();
}
