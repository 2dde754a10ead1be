//! Periodic maintenance loops.
//!
//! Two independent loops drive the bridge between events:
//!
//! - `refresh`: every `ttl_refresh` seconds, `bridge.refresh()`
//! - `resync`: every `resync_interval_secs` seconds, `bridge.sync(true)`
//!
//! A task whose interval is `<= 0` is never built, so no timer exists for it.
//! The first tick fires one full period after the loop starts. Each loop selects over
//! its own tick and the shutdown signal; the timer is dropped on every exit path.
//! Both loops live in one [`JoinSet`] that the orchestrator joins after stopping them.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use registrator_core::bridge::BridgeHandle;
use registrator_core::metrics as m;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::shutdown::ShutdownSignal;

pub const REFRESH_TASK: &str = "refresh";
pub const RESYNC_TASK: &str = "resync";

/// Upper bound on the delay before a loop's first tick. Larger periods never fire
/// within a process lifetime anyway, and `Instant` arithmetic past it can overflow.
const MAX_FIRST_TICK_DELAY: Duration = Duration::from_secs(86_400 * 365 * 30);

/// A named, strictly positive period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTask {
    pub name: &'static str,
    pub interval: Duration,
}

impl PeriodicTask {
    /// `None` when `interval_secs <= 0` (loop disabled).
    pub fn new(name: &'static str, interval_secs: i64) -> Option<Self> {
        let secs = u64::try_from(interval_secs).ok().filter(|s| *s > 0)?;
        Some(Self {
            name,
            interval: Duration::from_secs(secs),
        })
    }

    pub fn refresh(ttl_refresh_secs: i64) -> Option<Self> {
        Self::new(REFRESH_TASK, ttl_refresh_secs)
    }

    pub fn resync(resync_interval_secs: i64) -> Option<Self> {
        Self::new(RESYNC_TASK, resync_interval_secs)
    }
}

/// Run `action` once per tick until `shutdown` fires.
///
/// The action is awaited inline, so one loop never overlaps itself. Ticks missed
/// while an action runs long are skipped rather than replayed in a burst.
pub async fn run_periodic<F, Fut>(task: PeriodicTask, shutdown: ShutdownSignal, mut action: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let start = Instant::now() + task.interval.min(MAX_FIRST_TICK_DELAY);
    let mut ticker = tokio::time::interval_at(start, task.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    debug!(
        task = task.name,
        interval_secs = task.interval.as_secs(),
        "periodic loop armed"
    );

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                debug!(task = task.name, "periodic loop stopped");
                return;
            }
            _ = ticker.tick() => {
                metrics::counter!(m::PERIODIC_TICKS_TOTAL, m::LABEL_TASK => task.name)
                    .increment(1);
                debug!(task = task.name, "periodic tick");
                action().await;
            }
        }
    }
}

/// The refresh and resync loops of one orchestration cycle.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: JoinSet<()>,
}

impl Scheduler {
    /// Arm the enabled loops against `bridge`.
    pub fn spawn<B: BridgeHandle>(
        bridge: &Arc<B>,
        refresh: Option<PeriodicTask>,
        resync: Option<PeriodicTask>,
        shutdown: &ShutdownSignal,
    ) -> Self {
        let mut tasks = JoinSet::new();

        if let Some(task) = refresh {
            let bridge = Arc::clone(bridge);
            let shutdown = shutdown.clone();
            tasks.spawn(async move {
                run_periodic(task, shutdown, || bridge.refresh()).await;
            });
        }

        if let Some(task) = resync {
            let bridge = Arc::clone(bridge);
            let shutdown = shutdown.clone();
            tasks.spawn(async move {
                run_periodic(task, shutdown, || bridge.sync(true)).await;
            });
        }

        info!(
            refresh_secs = refresh.map(|t| t.interval.as_secs()),
            resync_secs = resync.map(|t| t.interval.as_secs()),
            "periodic loops started"
        );

        Self { tasks }
    }

    /// Number of loops still owned by the scheduler.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every loop to finish. Call after the shutdown signal has fired.
    pub async fn join(mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "periodic loop terminated abnormally");
            }
        }
    }
}
