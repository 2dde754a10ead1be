//! Orchestration loop -- connection, subscription, initial sync, and steady state.
//!
//! The [`Orchestrator`] owns the bridge handle and the container runtime and drives
//! one *cycle* at a time:
//!
//! ```text
//! Connecting ─► Subscribing ─► Syncing ─► Running ─► Closed ─┬─► Connecting   (reconnect)
//!                                                            └─► Stopped / error (exit)
//! ```
//!
//! # Ordering
//!
//! The event subscription is opened before `sync(false)` runs. Events emitted while
//! the sync is in progress wait in the stream buffer and are dispatched afterwards,
//! so a container that starts during the sync is never missed.
//!
//! # Shutdown
//!
//! Each cycle runs under a child of the process-wide [`ShutdownSignal`]. When the
//! cycle ends, its child signal fires and the periodic loops are joined before the
//! next state is entered. A process-wide stop reaches every stage: establishment
//! retries are abandoned, the dispatcher stops receiving, and [`Orchestrator::run`]
//! returns `Ok(())`.

use std::sync::Arc;
use std::time::SystemTime;

use registrator_core::bridge::BridgeHandle;
use registrator_core::config::{RegistratorConfig, StreamClosePolicy};
use registrator_core::error::{ConnectionError, RegistratorError};
use registrator_core::event::EventStream;
use registrator_core::metrics as m;
use registrator_core::runtime::ContainerRuntime;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::dispatcher::{self, DispatchOutcome};
use crate::establish::{RetryPolicy, establish};
use crate::scheduler::{PeriodicTask, Scheduler};
use crate::shutdown::ShutdownSignal;

/// Where the orchestration loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Connecting,
    Subscribing,
    Syncing,
    Running,
    Closed,
    Stopped,
}

impl LifecycleState {
    /// Value exported on the lifecycle state gauge.
    pub fn gauge_value(self) -> f64 {
        match self {
            Self::Connecting => 0.0,
            Self::Subscribing => 1.0,
            Self::Syncing => 2.0,
            Self::Running => 3.0,
            Self::Closed => 4.0,
            Self::Stopped => 5.0,
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Subscribing => "subscribing",
            Self::Syncing => "syncing",
            Self::Running => "running",
            Self::Closed => "closed",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Orchestration settings derived from the validated configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorOptions {
    pub retry: RetryPolicy,
    pub refresh: Option<PeriodicTask>,
    pub resync: Option<PeriodicTask>,
    pub on_stream_closed: StreamClosePolicy,
}

impl OrchestratorOptions {
    /// Validate `config` and extract the orchestration settings.
    pub fn from_config(config: &RegistratorConfig) -> Result<Self, RegistratorError> {
        config.validate()?;

        Ok(Self {
            retry: RetryPolicy::from_config(&config.connection)?,
            refresh: PeriodicTask::refresh(config.bridge.ttl_refresh),
            resync: PeriodicTask::resync(config.sync.resync_interval_secs),
            on_stream_closed: config.connection.stream_close_policy()?,
        })
    }
}

/// Outcome of one cycle.
enum CycleEnd {
    Shutdown,
    StreamClosed,
}

/// The daemon's orchestration loop.
pub struct Orchestrator<B, R> {
    bridge: Arc<B>,
    runtime: Arc<R>,
    options: OrchestratorOptions,
    state_tx: watch::Sender<LifecycleState>,
    shutdown: ShutdownSignal,
}

impl<B, R> Orchestrator<B, R>
where
    B: BridgeHandle,
    R: ContainerRuntime,
{
    pub fn new(bridge: Arc<B>, runtime: Arc<R>, options: OrchestratorOptions) -> Self {
        let (state_tx, _) = watch::channel(LifecycleState::Connecting);
        Self {
            bridge,
            runtime,
            options,
            state_tx,
            shutdown: ShutdownSignal::new(),
        }
    }

    /// Build from configuration. Fails before any connection attempt when the
    /// configuration is invalid.
    pub fn from_config(
        bridge: Arc<B>,
        runtime: Arc<R>,
        config: &RegistratorConfig,
    ) -> Result<Self, RegistratorError> {
        let options = OrchestratorOptions::from_config(config)?;
        Ok(Self::new(bridge, runtime, options))
    }

    /// Handle that stops [`run`](Self::run) when triggered.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    pub fn state(&self) -> LifecycleState {
        *self.state_tx.borrow()
    }

    /// Receiver that observes every state transition.
    pub fn watch_state(&self) -> watch::Receiver<LifecycleState> {
        self.state_tx.subscribe()
    }

    pub fn options(&self) -> &OrchestratorOptions {
        &self.options
    }

    fn set_state(&self, state: LifecycleState) {
        metrics::gauge!(m::LIFECYCLE_STATE).set(state.gauge_value());
        debug!(%state, "lifecycle state changed");
        self.state_tx.send_replace(state);
    }

    /// Run until shutdown (`Ok`) or a fatal error.
    ///
    /// # Errors
    ///
    /// - [`ConnectionError::Exhausted`] when the bridge never answers
    /// - [`RegistratorError::EventStreamClosed`] when the stream closes and the
    ///   policy is [`StreamClosePolicy::Exit`]
    /// - [`RegistratorError::Runtime`] when the event subscription cannot be opened
    ///   and the policy is [`StreamClosePolicy::Exit`]
    pub async fn run(&self) -> Result<(), RegistratorError> {
        info!(
            max_attempts = self.options.retry.attempts.as_i64(),
            on_stream_closed = %self.options.on_stream_closed,
            "orchestrator starting"
        );

        loop {
            let cycle = self.shutdown.child();
            let result = self.run_cycle(&cycle).await;
            cycle.trigger();

            match result {
                Ok(CycleEnd::Shutdown) => {
                    self.set_state(LifecycleState::Stopped);
                    info!("orchestrator stopped");
                    return Ok(());
                }
                Ok(CycleEnd::StreamClosed) => {
                    metrics::counter!(m::EVENT_STREAM_CLOSED_TOTAL).increment(1);
                    self.set_state(LifecycleState::Closed);

                    match self.options.on_stream_closed {
                        StreamClosePolicy::Exit => {
                            error!("docker event stream closed");
                            self.set_state(LifecycleState::Stopped);
                            return Err(RegistratorError::EventStreamClosed);
                        }
                        StreamClosePolicy::Reconnect => {
                            warn!("docker event stream closed, reconnecting");
                            if self.pause_before_reconnect().await {
                                self.set_state(LifecycleState::Stopped);
                                return Ok(());
                            }
                        }
                    }
                }
                Err(RegistratorError::Runtime(e))
                    if self.options.on_stream_closed == StreamClosePolicy::Reconnect =>
                {
                    self.set_state(LifecycleState::Closed);
                    warn!(error = %e, "event subscription failed, reconnecting");
                    if self.pause_before_reconnect().await {
                        self.set_state(LifecycleState::Stopped);
                        return Ok(());
                    }
                }
                Err(e) => {
                    self.set_state(LifecycleState::Stopped);
                    return Err(e);
                }
            }
        }
    }

    /// One pass through Connecting → Subscribing → Syncing → Running.
    ///
    /// Periodic loops started here are joined before returning.
    async fn run_cycle(&self, cycle: &ShutdownSignal) -> Result<CycleEnd, RegistratorError> {
        self.set_state(LifecycleState::Connecting);
        let bridge = Arc::clone(&self.bridge);
        match establish(&self.options.retry, cycle, || bridge.ping()).await {
            Ok(_) => {}
            Err(ConnectionError::Cancelled { attempts }) => {
                debug!(attempts, "establishment cancelled");
                return Ok(CycleEnd::Shutdown);
            }
            Err(e) => return Err(e.into()),
        }

        self.set_state(LifecycleState::Subscribing);
        let Some(events) = self.subscribe(cycle).await? else {
            return Ok(CycleEnd::Shutdown);
        };

        self.set_state(LifecycleState::Syncing);
        self.bridge.sync(false).await;
        if cycle.is_triggered() {
            return Ok(CycleEnd::Shutdown);
        }

        self.set_state(LifecycleState::Running);
        let scheduler = Scheduler::spawn(
            &self.bridge,
            self.options.refresh,
            self.options.resync,
            cycle,
        );
        let outcome = dispatcher::run(&self.bridge, events, cycle).await;

        cycle.trigger();
        scheduler.join().await;

        Ok(match outcome {
            DispatchOutcome::Shutdown => CycleEnd::Shutdown,
            DispatchOutcome::StreamClosed => CycleEnd::StreamClosed,
        })
    }

    /// Open the event stream. `None` when shutdown fired first.
    async fn subscribe(&self, cycle: &ShutdownSignal) -> Result<Option<EventStream>, RegistratorError> {
        let since = SystemTime::now();
        tokio::select! {
            biased;
            _ = cycle.cancelled() => Ok(None),
            result = self.runtime.subscribe(since) => {
                let events = result?;
                info!("subscribed to container events");
                Ok(Some(events))
            }
        }
    }

    /// Wait one retry interval. Returns `true` if shutdown fired meanwhile.
    async fn pause_before_reconnect(&self) -> bool {
        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => true,
            _ = tokio::time::sleep(self.options.retry.interval) => false,
        }
    }
}
