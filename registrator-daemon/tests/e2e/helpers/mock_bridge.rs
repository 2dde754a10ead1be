//! Recording bridge.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use registrator_core::bridge::BridgeHandle;
use registrator_core::error::BridgeError;

use super::{Call, CallLog};

type SyncHook = Box<dyn Fn(bool) + Send + Sync>;

/// Bridge that records every call and can fail a scripted number of pings.
pub struct MockBridge {
    log: CallLog,
    ping_failures: AtomicU64,
    sync_delay: Duration,
    sync_hook: Option<SyncHook>,
}

#[allow(dead_code)]
impl MockBridge {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ping_failures: AtomicU64::new(0),
            sync_delay: Duration::ZERO,
            sync_hook: None,
        }
    }

    /// Fail the next `n` pings.
    pub fn failing_pings(self, n: u64) -> Self {
        self.ping_failures.store(n, Ordering::SeqCst);
        self
    }

    /// Fail every ping.
    pub fn unreachable(self) -> Self {
        self.failing_pings(u64::MAX)
    }

    /// Make every `sync` take `delay` after running the hook.
    pub fn with_sync_delay(mut self, delay: Duration) -> Self {
        self.sync_delay = delay;
        self
    }

    /// Run `hook` at the start of every `sync`.
    pub fn with_sync_hook(mut self, hook: impl Fn(bool) + Send + Sync + 'static) -> Self {
        self.sync_hook = Some(Box::new(hook));
        self
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    pub fn pings(&self) -> usize {
        self.log.count(&Call::Ping)
    }

    pub fn refreshes(&self) -> usize {
        self.log.count(&Call::Refresh)
    }

    pub fn forced_syncs(&self) -> usize {
        self.log.count(&Call::Sync(true))
    }

    pub fn adds(&self, id: &str) -> usize {
        self.log.count(&Call::Add(id.to_owned()))
    }

    pub fn removes(&self, id: &str) -> usize {
        self.log.count(&Call::RemoveOnExit(id.to_owned()))
    }

    pub fn total_adds(&self) -> usize {
        self.log.count_matching(|c| matches!(c, Call::Add(_)))
    }

    pub fn total_removes(&self) -> usize {
        self.log
            .count_matching(|c| matches!(c, Call::RemoveOnExit(_)))
    }
}

impl BridgeHandle for MockBridge {
    async fn ping(&self) -> Result<(), BridgeError> {
        self.log.push(Call::Ping);
        let remaining = self.ping_failures.load(Ordering::SeqCst);
        if remaining == 0 {
            return Ok(());
        }
        if remaining != u64::MAX {
            self.ping_failures.store(remaining - 1, Ordering::SeqCst);
        }
        Err(BridgeError::Unreachable("mock registry down".to_owned()))
    }

    async fn sync(&self, force: bool) {
        self.log.push(Call::Sync(force));
        if let Some(hook) = &self.sync_hook {
            hook(force);
        }
        if !self.sync_delay.is_zero() {
            tokio::time::sleep(self.sync_delay).await;
        }
    }

    async fn refresh(&self) {
        self.log.push(Call::Refresh);
    }

    async fn add(&self, container_id: &str) {
        self.log.push(Call::Add(container_id.to_owned()));
    }

    async fn remove_on_exit(&self, container_id: &str) {
        self.log.push(Call::RemoveOnExit(container_id.to_owned()));
    }
}
