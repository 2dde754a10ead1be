//! Scriptable container runtime.
//!
//! Each `subscribe` opens a fresh event channel; the test pushes events into the most
//! recent one with [`MockRuntime::emit`] and ends it with [`MockRuntime::close`].

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

use registrator_core::error::RuntimeError;
use registrator_core::event::{EventSender, EventStream, LifecycleEvent, event_channel};
use registrator_core::runtime::ContainerRuntime;
use registrator_core::types::ContainerInfo;

use super::{Call, CallLog};

pub struct MockRuntime {
    log: CallLog,
    current: Mutex<Option<EventSender>>,
    fail_subscribe: AtomicBool,
}

#[allow(dead_code)]
impl MockRuntime {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            current: Mutex::new(None),
            fail_subscribe: AtomicBool::new(false),
        }
    }

    /// Make every `subscribe` fail.
    pub fn failing_subscribe(self) -> Self {
        self.fail_subscribe.store(true, Ordering::SeqCst);
        self
    }

    /// Push an event into the open subscription. Returns `false` when none is open.
    pub fn emit(&self, container_id: &str, status: &str) -> bool {
        let current = self.current.lock().unwrap();
        match current.as_ref() {
            Some(tx) => tx
                .try_send(LifecycleEvent::new(container_id, status))
                .is_ok(),
            None => false,
        }
    }

    /// Close the open subscription.
    pub fn close(&self) {
        self.current.lock().unwrap().take();
    }

    pub fn is_subscribed(&self) -> bool {
        self.current.lock().unwrap().is_some()
    }

    pub fn subscriptions(&self) -> usize {
        self.log.count(&Call::Subscribe)
    }
}

impl ContainerRuntime for MockRuntime {
    async fn ping(&self) -> Result<(), RuntimeError> {
        Ok(())
    }

    async fn list_containers(&self) -> Result<Vec<ContainerInfo>, RuntimeError> {
        Ok(Vec::new())
    }

    async fn inspect_container(&self, id: &str) -> Result<ContainerInfo, RuntimeError> {
        Err(RuntimeError::ContainerNotFound(id.to_owned()))
    }

    async fn subscribe(&self, _since: SystemTime) -> Result<EventStream, RuntimeError> {
        self.log.push(Call::Subscribe);
        if self.fail_subscribe.load(Ordering::SeqCst) {
            return Err(RuntimeError::Connection("mock docker unavailable".to_owned()));
        }
        let (tx, rx) = event_channel();
        *self.current.lock().unwrap() = Some(tx);
        Ok(rx)
    }
}
