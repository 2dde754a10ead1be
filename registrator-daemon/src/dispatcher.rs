//! Event dispatcher.
//!
//! Consumes the lifecycle event stream in delivery order and turns each event into a
//! bridge call:
//!
//! | status  | action                         |
//! |---------|--------------------------------|
//! | `start` | `add(container_id)`            |
//! | `die`   | `remove_on_exit(container_id)` |
//! | other   | ignored                        |
//!
//! Every action runs in its own task so a slow bridge call never delays the next
//! receive. Actions for the same container are not serialized.

use std::fmt;
use std::sync::Arc;

use registrator_core::bridge::BridgeHandle;
use registrator_core::event::{EventStatus, EventStream, LifecycleEvent};
use registrator_core::metrics as m;
use registrator_core::types::short_id;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use crate::shutdown::ShutdownSignal;

/// Bridge action selected for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    RemoveOnExit,
}

impl Action {
    pub fn for_status(status: &EventStatus) -> Option<Self> {
        match status {
            EventStatus::Start => Some(Self::Add),
            EventStatus::Die => Some(Self::RemoveOnExit),
            EventStatus::Other(_) => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::RemoveOnExit => "remove_on_exit",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why [`run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The runtime closed the event stream.
    StreamClosed,
    /// The shutdown signal fired.
    Shutdown,
}

/// Spawn the bridge call for one event, if any.
pub fn dispatch<B: BridgeHandle>(bridge: &Arc<B>, event: LifecycleEvent) -> Option<JoinHandle<()>> {
    metrics::counter!(m::EVENTS_RECEIVED_TOTAL, m::LABEL_STATUS => event.status.label())
        .increment(1);

    let Some(action) = Action::for_status(&event.status) else {
        trace!(
            container_id = %short_id(&event.container_id),
            status = %event.status,
            "ignoring event"
        );
        return None;
    };

    metrics::counter!(m::DISPATCH_ACTIONS_TOTAL, m::LABEL_ACTION => action.label()).increment(1);
    debug!(
        container_id = %short_id(&event.container_id),
        %action,
        "dispatching event"
    );

    let bridge = Arc::clone(bridge);
    let container_id = event.container_id;
    Some(tokio::spawn(async move {
        match action {
            Action::Add => bridge.add(&container_id).await,
            Action::RemoveOnExit => bridge.remove_on_exit(&container_id).await,
        }
    }))
}

/// Drain `events` until the stream closes or `shutdown` fires.
pub async fn run<B: BridgeHandle>(
    bridge: &Arc<B>,
    mut events: EventStream,
    shutdown: &ShutdownSignal,
) -> DispatchOutcome {
    info!("listening for container events");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                debug!("dispatcher stopped by shutdown");
                return DispatchOutcome::Shutdown;
            }
            received = events.recv() => match received {
                Some(event) => {
                    dispatch(bridge, event);
                }
                None => return DispatchOutcome::StreamClosed,
            }
        }
    }
}
