//! Shutdown coordination.
//!
//! [`ShutdownSignal`] is a single broadcast stop signal built on
//! `tokio_util::sync::CancellationToken`. Every loop selects over its own work and
//! [`ShutdownSignal::cancelled`]. Firing is idempotent: the first
//! [`trigger`](ShutdownSignal::trigger) wins and later calls are no-ops.
//!
//! Each orchestration cycle gets a [`child`](ShutdownSignal::child) signal, so closing
//! one cycle stops that cycle's loops without touching the process-wide signal, while
//! a process-wide stop reaches every cycle.

use anyhow::Result;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Broadcast stop signal observed by all loops.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the signal. Returns `true` only for the call that actually fired it.
    pub fn trigger(&self) -> bool {
        let first = !self.token.is_cancelled();
        self.token.cancel();
        first
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes once the signal (or any ancestor) has fired.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// A signal that fires with this one but can also be fired on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
///
/// # Errors
///
/// Returns an error if signal handlers cannot be installed.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("failed to install Ctrl-C handler: {}", e))?;
    Ok("CTRL-C")
}

/// Fire `shutdown` when the process receives SIGTERM/SIGINT.
///
/// The listener also ends, without firing, once `shutdown` fires for another reason.
pub fn spawn_signal_listener(shutdown: ShutdownSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = wait_for_shutdown_signal() => match result {
                Ok(signal) => {
                    tracing::info!(signal, "shutdown signal received");
                    shutdown.trigger();
                }
                Err(e) => {
                    tracing::error!(error = %e, "signal handling unavailable");
                }
            },
            _ = shutdown.cancelled() => {
                tracing::debug!("signal listener exiting");
            }
        }
    })
}

/// Await a background task after shutdown, logging it if the task panicked or was
/// cancelled instead of returning normally.
pub async fn join_background(task: &'static str, handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        tracing::warn!(task, error = %e, "background task terminated abnormally");
    }
}
