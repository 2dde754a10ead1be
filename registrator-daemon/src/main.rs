//! `registrator` -- container service registrator daemon.
//!
//! Loads configuration (file, env, flags), installs logging and metrics, connects to
//! Docker, builds the reference bridge, and runs the orchestration loop until a
//! signal arrives or a fatal error occurs.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use registrator_core::config::{GeneralConfig, RegistratorConfig};
use registrator_daemon::Orchestrator;
use registrator_daemon::cli::DaemonCli;
use registrator_daemon::logging::init_tracing;
use registrator_daemon::metrics_server;
use registrator_daemon::shutdown::{join_background, spawn_signal_listener};
use registrator_docker::BollardDockerClient;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = DaemonCli::parse();

    let config = match cli.load_config().await {
        Ok(config) => config,
        Err(e) => {
            // 로깅 설정을 읽지 못했으므로 기본값으로 초기화
            let _ = init_tracing(&GeneralConfig::default());
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(&config.general) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    if cli.validate {
        tracing::info!("configuration is valid");
        return ExitCode::SUCCESS;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "registrator exiting");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: RegistratorConfig) -> Result<()> {
    let start = Instant::now();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        registry_url = config.registry.url.as_str(),
        "registrator starting"
    );

    if config.metrics.enabled {
        metrics_server::install_metrics_recorder(&config.metrics)?;
    }

    let runtime = BollardDockerClient::connect(&config.connection.docker_host)?;
    let bridge = registrator_bridge::new(runtime.clone(), &config.registry.url, &config.bridge)?;

    let orchestrator = Orchestrator::from_config(Arc::new(bridge), Arc::new(runtime), &config)?;
    let shutdown = orchestrator.shutdown_signal();
    let signals = spawn_signal_listener(shutdown.clone());
    let uptime = metrics_server::spawn_uptime_updater(start, shutdown.clone());

    let result = orchestrator.run().await;

    shutdown.trigger();
    join_background("signal listener", signals).await;
    join_background("uptime updater", uptime).await;

    result?;
    tracing::info!(uptime_secs = start.elapsed().as_secs(), "registrator stopped");
    Ok(())
}
