//! CLI argument definitions for the `registrator` binary.
//!
//! Uses `clap` v4 derive macros. Every flag overrides the matching
//! `registrator.toml` field and `REGISTRATOR_*` environment variable.

use std::path::PathBuf;

use clap::Parser;
use registrator_core::config::{RegistratorConfig, split_csv};
use registrator_core::error::RegistratorError;

/// Registers and deregisters services for containers as they start and stop.
#[derive(Parser, Debug, Default)]
#[command(name = "registrator")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Registry URL describing the discovery backend (e.g. `memory://`).
    pub registry_url: Option<String>,

    /// Path to a registrator.toml configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    #[arg(long)]
    pub log_format: Option<String>,

    /// IP address to advertise for published ports.
    #[arg(long = "ip")]
    pub host_ip: Option<String>,

    /// Advertise container-internal addresses and ports.
    #[arg(long)]
    pub internal: bool,

    /// Advertise container global IPv6 addresses (wins over --internal).
    #[arg(long)]
    pub global: bool,

    /// Comma-separated tags appended to every service.
    #[arg(long)]
    pub tags: Option<String>,

    /// Deregister exited services: "always" or "on-success".
    #[arg(long)]
    pub deregister: Option<String>,

    /// Remove dangling services owned by this node during sync.
    #[arg(long)]
    pub cleanup: bool,

    /// Service TTL in seconds (0 disables).
    #[arg(long, allow_negative_numbers = true)]
    pub ttl: Option<i64>,

    /// Seconds between TTL refreshes (0 disables; must be below --ttl).
    #[arg(long, allow_negative_numbers = true)]
    pub ttl_refresh: Option<i64>,

    /// Seconds between forced resyncs (0 or less disables).
    #[arg(long, allow_negative_numbers = true)]
    pub resync: Option<i64>,

    /// Retries after the first failed ping (-1 retries forever).
    #[arg(long, allow_negative_numbers = true)]
    pub retry_attempts: Option<i64>,

    /// Milliseconds between connection retries.
    #[arg(long, allow_negative_numbers = true)]
    pub retry_interval: Option<i64>,

    /// What to do when the event stream closes: "exit" or "reconnect".
    #[arg(long)]
    pub on_stream_closed: Option<String>,

    /// Docker endpoint (unix socket path, tcp:// or http:// URL).
    #[arg(long)]
    pub docker_host: Option<String>,

    /// Validate configuration and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}

impl DaemonCli {
    /// Overlay the flags that were given onto `config`.
    pub fn apply(&self, config: &mut RegistratorConfig) {
        if let Some(url) = &self.registry_url {
            config.registry.url.clone_from(url);
        }
        if let Some(level) = &self.log_level {
            config.general.log_level.clone_from(level);
        }
        if let Some(format) = &self.log_format {
            config.general.log_format.clone_from(format);
        }

        if let Some(ip) = &self.host_ip {
            config.bridge.host_ip.clone_from(ip);
        }
        if self.internal {
            config.bridge.internal = true;
        }
        if self.global {
            config.bridge.global = true;
        }
        if let Some(tags) = &self.tags {
            config.bridge.tags = split_csv(tags);
        }
        if let Some(mode) = &self.deregister {
            config.bridge.deregister.clone_from(mode);
        }
        if self.cleanup {
            config.bridge.cleanup = true;
        }
        if let Some(ttl) = self.ttl {
            config.bridge.ttl = ttl;
        }
        if let Some(ttl_refresh) = self.ttl_refresh {
            config.bridge.ttl_refresh = ttl_refresh;
        }

        if let Some(resync) = self.resync {
            config.sync.resync_interval_secs = resync;
        }

        if let Some(attempts) = self.retry_attempts {
            config.connection.retry_attempts = attempts;
        }
        if let Some(interval) = self.retry_interval {
            config.connection.retry_interval_ms = interval;
        }
        if let Some(policy) = &self.on_stream_closed {
            config.connection.on_stream_closed.clone_from(policy);
        }
        if let Some(host) = &self.docker_host {
            config.connection.docker_host.clone_from(host);
        }
    }

    /// Resolve the final configuration: defaults, then file, then env, then flags.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the file is missing or malformed, or when
    /// the merged result fails validation.
    pub async fn load_config(&self) -> Result<RegistratorConfig, RegistratorError> {
        let mut config = match &self.config {
            Some(path) => RegistratorConfig::from_file(path).await?,
            None => RegistratorConfig::default(),
        };
        config.apply_env_overrides();
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}
