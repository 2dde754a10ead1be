//! Connection establishment.
//!
//! [`establish`] pings the backend until it answers or the retry budget runs out.
//! A successful ping returns immediately; a failed one sleeps `interval` before the
//! next try. With `Limited(n)` at most `n + 1` pings are made.
//!
//! The sleep between attempts also watches the shutdown signal, so an external stop
//! abandons the retries with [`ConnectionError::Cancelled`]. A ping already in flight
//! is never interrupted.

use std::future::Future;
use std::time::Duration;

use registrator_core::config::ConnectionConfig;
use registrator_core::error::{BridgeError, ConfigError, ConnectionError};
use registrator_core::metrics as m;
use tracing::{error, info, warn};

use crate::shutdown::ShutdownSignal;

/// How many retries follow the first failed ping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAttempts {
    /// Retry forever (`-1`).
    Unbounded,
    /// Retry `n` times after the first failure (`0` = exactly one attempt).
    Limited(u32),
}

impl RetryAttempts {
    /// Interprets the configured value: `-1` is unbounded, `n >= 0` is limited.
    pub fn from_config(value: i64) -> Result<Self, ConfigError> {
        match value {
            -1 => Ok(Self::Unbounded),
            n if n >= 0 => u32::try_from(n).map(Self::Limited).map_err(|_| {
                ConfigError::invalid("connection.retry_attempts", "value is too large")
            }),
            _ => Err(ConfigError::invalid(
                "connection.retry_attempts",
                "must be -1 (unbounded) or a non-negative number",
            )),
        }
    }

    /// `true` once `retries` retries have already been spent.
    fn exhausted_after(self, retries: u64) -> bool {
        match self {
            Self::Unbounded => false,
            Self::Limited(n) => retries >= u64::from(n),
        }
    }

    /// Value used in log fields (`-1` for unbounded).
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Unbounded => -1,
            Self::Limited(n) => i64::from(n),
        }
    }
}

/// Retry budget and spacing for [`establish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: RetryAttempts,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: RetryAttempts, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    /// Builds the policy from `[connection]`, rejecting a non-positive interval.
    pub fn from_config(config: &ConnectionConfig) -> Result<Self, ConfigError> {
        let interval_ms = u64::try_from(config.retry_interval_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or_else(|| {
                ConfigError::invalid("connection.retry_interval_ms", "must be greater than 0")
            })?;

        Ok(Self {
            attempts: RetryAttempts::from_config(config.retry_attempts)?,
            interval: Duration::from_millis(interval_ms),
        })
    }
}

/// Ping until success, exhaustion, or shutdown.
///
/// Returns the number of pings made on success.
pub async fn establish<F, Fut>(
    policy: &RetryPolicy,
    shutdown: &ShutdownSignal,
    mut ping: F,
) -> Result<u64, ConnectionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), BridgeError>>,
{
    let interval_ms = u64::try_from(policy.interval.as_millis()).unwrap_or(u64::MAX);
    let max_attempts = policy.attempts.as_i64();
    let mut retries: u64 = 0;

    loop {
        if shutdown.is_triggered() {
            return Err(ConnectionError::Cancelled { attempts: retries });
        }

        let attempts = retries + 1;
        match ping().await {
            Ok(()) => {
                metrics::counter!(m::CONNECTION_ATTEMPTS_TOTAL, m::LABEL_RESULT => "success")
                    .increment(1);
                info!(attempts, "backend connection established");
                return Ok(attempts);
            }
            Err(e) => {
                metrics::counter!(m::CONNECTION_ATTEMPTS_TOTAL, m::LABEL_RESULT => "failure")
                    .increment(1);

                if policy.attempts.exhausted_after(retries) {
                    error!(attempts, max_attempts, error = %e, "backend unreachable, giving up");
                    return Err(ConnectionError::Exhausted {
                        attempts,
                        source: e,
                    });
                }

                warn!(
                    attempt = attempts,
                    max_attempts,
                    interval_ms,
                    error = %e,
                    "backend ping failed, retrying"
                );
            }
        }

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                info!(attempts = retries + 1, "connection attempts abandoned on shutdown");
                return Err(ConnectionError::Cancelled { attempts: retries + 1 });
            }
            _ = tokio::time::sleep(policy.interval) => {}
        }
        retries += 1;
    }
}
