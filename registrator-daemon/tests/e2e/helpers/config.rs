//! Config builders and the orchestrator harness.

use std::sync::Arc;

use registrator_core::config::RegistratorConfig;
use registrator_core::error::RegistratorError;
use registrator_daemon::{Orchestrator, OrchestratorOptions};
use tokio::task::JoinHandle;

use super::CallLog;
use super::mock_bridge::MockBridge;
use super::mock_runtime::MockRuntime;

/// Valid config with fast retries and both periodic loops disabled.
#[allow(dead_code)]
pub fn base_config() -> RegistratorConfig {
    let mut config = RegistratorConfig::default();
    config.connection.retry_interval_ms = 100;
    config
}

/// `base_config` with a refresh loop every `ttl_refresh` seconds.
#[allow(dead_code)]
pub fn with_refresh(mut config: RegistratorConfig, ttl_refresh: i64) -> RegistratorConfig {
    config.bridge.ttl = ttl_refresh * 3;
    config.bridge.ttl_refresh = ttl_refresh;
    config
}

#[allow(dead_code)]
pub fn with_resync(mut config: RegistratorConfig, secs: i64) -> RegistratorConfig {
    config.sync.resync_interval_secs = secs;
    config
}

#[allow(dead_code)]
pub fn with_retries(mut config: RegistratorConfig, attempts: i64, interval_ms: i64) -> RegistratorConfig {
    config.connection.retry_attempts = attempts;
    config.connection.retry_interval_ms = interval_ms;
    config
}

#[allow(dead_code)]
pub fn reconnecting(mut config: RegistratorConfig) -> RegistratorConfig {
    config.connection.on_stream_closed = "reconnect".to_owned();
    config
}

/// An orchestrator wired to mocks that share one call log.
#[allow(dead_code)]
pub struct Harness {
    pub log: CallLog,
    pub bridge: Arc<MockBridge>,
    pub runtime: Arc<MockRuntime>,
    pub orchestrator: Arc<Orchestrator<MockBridge, MockRuntime>>,
}

#[allow(dead_code)]
impl Harness {
    pub fn new(config: &RegistratorConfig) -> Self {
        let log = CallLog::new();
        Self::with_mocks(
            config,
            log.clone(),
            MockBridge::new(log.clone()),
            MockRuntime::new(log),
        )
    }

    /// Harness around mocks the test already configured.
    pub fn with_mocks(
        config: &RegistratorConfig,
        log: CallLog,
        bridge: MockBridge,
        runtime: MockRuntime,
    ) -> Self {
        Self::from_arcs(config, log, Arc::new(bridge), Arc::new(runtime))
    }

    pub fn from_arcs(
        config: &RegistratorConfig,
        log: CallLog,
        bridge: Arc<MockBridge>,
        runtime: Arc<MockRuntime>,
    ) -> Self {
        let options = OrchestratorOptions::from_config(config).expect("test config must be valid");
        let orchestrator = Arc::new(Orchestrator::new(
            Arc::clone(&bridge),
            Arc::clone(&runtime),
            options,
        ));
        Self {
            log,
            bridge,
            runtime,
            orchestrator,
        }
    }

    /// Run the orchestrator on its own task.
    pub fn spawn(&self) -> JoinHandle<Result<(), RegistratorError>> {
        let orchestrator = Arc::clone(&self.orchestrator);
        tokio::spawn(async move { orchestrator.run().await })
    }
}
