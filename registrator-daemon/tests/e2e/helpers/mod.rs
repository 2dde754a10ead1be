//! Shared E2E test helpers.

pub mod assertions;
pub mod config;
pub mod mock_bridge;
pub mod mock_runtime;

use std::sync::{Arc, Mutex};

/// One observable interaction with the bridge or the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Ping,
    Subscribe,
    Sync(bool),
    Refresh,
    Add(String),
    RemoveOnExit(String),
}

/// Ordered log shared by the mock bridge and the mock runtime.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

#[allow(dead_code)]
impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn snapshot(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.0.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn count_matching(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    /// Index of the first occurrence of `call`.
    pub fn position(&self, call: &Call) -> Option<usize> {
        self.0.lock().unwrap().iter().position(|c| c == call)
    }
}
