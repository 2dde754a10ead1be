//! Invalid configuration is rejected before any connection attempt.

use std::sync::Arc;

use registrator_core::error::RegistratorError;
use registrator_daemon::Orchestrator;

use crate::helpers::CallLog;
use crate::helpers::config::base_config;
use crate::helpers::mock_bridge::MockBridge;
use crate::helpers::mock_runtime::MockRuntime;

fn build(ttl: i64, ttl_refresh: i64) -> (Result<(), RegistratorError>, Arc<MockBridge>) {
    let mut config = base_config();
    config.bridge.ttl = ttl;
    config.bridge.ttl_refresh = ttl_refresh;

    let log = CallLog::new();
    let bridge = Arc::new(MockBridge::new(log.clone()));
    let runtime = Arc::new(MockRuntime::new(log));
    let result = Orchestrator::from_config(Arc::clone(&bridge), runtime, &config).map(|_| ());
    (result, bridge)
}

#[test]
fn test_e2e_ttl_pairs() {
    for (ttl, ttl_refresh, valid) in [(0, 5, false), (5, 5, false), (0, 0, true), (10, 5, true)] {
        let (result, bridge) = build(ttl, ttl_refresh);

        assert_eq!(
            result.is_ok(),
            valid,
            "ttl={ttl} ttl_refresh={ttl_refresh}: {result:?}"
        );
        if !valid {
            assert!(matches!(result, Err(RegistratorError::Config(_))));
        }
        assert_eq!(bridge.pings(), 0);
    }
}

#[test]
fn test_e2e_non_positive_retry_interval_rejected() {
    let mut config = base_config();
    config.connection.retry_interval_ms = 0;

    let log = CallLog::new();
    let result = Orchestrator::from_config(
        Arc::new(MockBridge::new(log.clone())),
        Arc::new(MockRuntime::new(log)),
        &config,
    );

    let err = result.err().expect("zero retry interval must be rejected");
    assert!(err.to_string().contains("retry_interval_ms"));
}

#[test]
fn test_e2e_unknown_deregister_mode_rejected() {
    let mut config = base_config();
    config.bridge.deregister = "sometimes".to_owned();

    let log = CallLog::new();
    let result = Orchestrator::from_config(
        Arc::new(MockBridge::new(log.clone())),
        Arc::new(MockRuntime::new(log)),
        &config,
    );

    assert!(matches!(result, Err(RegistratorError::Config(_))));
}

#[test]
fn test_e2e_unknown_stream_close_policy_rejected() {
    let mut config = base_config();
    config.connection.on_stream_closed = "retry".to_owned();

    let log = CallLog::new();
    let result = Orchestrator::from_config(
        Arc::new(MockBridge::new(log.clone())),
        Arc::new(MockRuntime::new(log)),
        &config,
    );

    assert!(matches!(result, Err(RegistratorError::Config(_))));
}
