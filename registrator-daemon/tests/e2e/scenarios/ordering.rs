//! Subscription opens before the initial sync; events seen during the sync survive.

use std::sync::Arc;
use std::time::Duration;

use registrator_daemon::LifecycleState;

use crate::helpers::assertions::{DEFAULT_TIMEOUT, wait_for_state, wait_until};
use crate::helpers::config::{Harness, base_config};
use crate::helpers::mock_bridge::MockBridge;
use crate::helpers::mock_runtime::MockRuntime;
use crate::helpers::{Call, CallLog};

#[tokio::test]
async fn test_e2e_subscribe_precedes_initial_sync() {
    let harness = Harness::new(&base_config());
    let mut state = harness.orchestrator.watch_state();

    let handle = harness.spawn();
    wait_for_state(&mut state, LifecycleState::Running).await;

    let subscribe = harness.log.position(&Call::Subscribe).unwrap();
    let sync = harness.log.position(&Call::Sync(false)).unwrap();
    let ping = harness.log.position(&Call::Ping).unwrap();
    assert!(ping < subscribe);
    assert!(subscribe < sync);

    harness.orchestrator.shutdown_signal().trigger();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_e2e_start_during_initial_sync_is_added_once() {
    // Given: the container X starts while the initial sync is still running
    let log = CallLog::new();
    let runtime = Arc::new(MockRuntime::new(log.clone()));
    let emitter = Arc::clone(&runtime);
    let bridge = MockBridge::new(log.clone())
        .with_sync_delay(Duration::from_millis(200))
        .with_sync_hook(move |force| {
            if !force {
                emitter.emit("X", "start");
            }
        });
    let harness = Harness::from_arcs(&base_config(), log, Arc::new(bridge), runtime);

    // When
    let handle = harness.spawn();
    wait_until(DEFAULT_TIMEOUT, "add(X)", || harness.bridge.adds("X") == 1).await;

    // Then: exactly one add, dispatched after the sync finished
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(harness.bridge.adds("X"), 1);
    let sync = harness.log.position(&Call::Sync(false)).unwrap();
    let add = harness.log.position(&Call::Add("X".to_owned())).unwrap();
    assert!(sync < add);

    harness.orchestrator.shutdown_signal().trigger();
    handle.await.unwrap().unwrap();
}
