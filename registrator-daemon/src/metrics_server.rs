//! Prometheus metrics HTTP listener.
//!
//! Uses the built-in HTTP listener from `metrics-exporter-prometheus`. Until
//! [`install_metrics_recorder`] runs, every `metrics::counter!()` / `gauge!()` call
//! in the workspace is a no-op.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use registrator_core::config::MetricsConfig;
use registrator_core::metrics as m;
use tokio::task::JoinHandle;

use crate::shutdown::ShutdownSignal;

const UPTIME_UPDATE_INTERVAL: Duration = Duration::from_secs(15);

/// Parse `listen_addr:port` into a socket address.
pub fn listen_addr(config: &MetricsConfig) -> Result<SocketAddr> {
    format!("{}:{}", config.listen_addr, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid metrics listen address: {}", e))
}

/// Install the global recorder and start the HTTP listener.
///
/// Call once per process.
///
/// # Errors
///
/// - invalid listen address
/// - socket binding fails
/// - a global recorder is already installed
pub fn install_metrics_recorder(config: &MetricsConfig) -> Result<()> {
    let addr = listen_addr(config)?;

    if addr.ip().is_unspecified() {
        tracing::warn!(
            listen_addr = %addr,
            "metrics endpoint is exposed on all interfaces; restrict listen_addr in untrusted networks"
        );
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {}", e))?;

    m::describe_all();
    record_build_info();

    tracing::info!(listen_addr = %addr, "Prometheus metrics endpoint active");
    Ok(())
}

/// Set the build info gauge (always 1, labelled with the crate version).
pub fn record_build_info() {
    metrics::gauge!(m::DAEMON_BUILD_INFO, "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Keep the uptime gauge current until `shutdown` fires.
pub fn spawn_uptime_updater(start: Instant, shutdown: ShutdownSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(UPTIME_UPDATE_INTERVAL);
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => return,
                _ = ticker.tick() => {
                    metrics::gauge!(m::DAEMON_UPTIME_SECONDS).set(start.elapsed().as_secs_f64());
                }
            }
        }
    })
}
