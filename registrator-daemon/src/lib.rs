//! Registrator daemon library.
//!
//! The orchestration loop lives here so it can be driven by integration tests;
//! the `registrator` binary (main.rs) wires it to Docker and the reference bridge.
//!
//! # Startup order
//!
//! 1. [`establish`]: ping the bridge until it answers (bounded or unbounded retries)
//! 2. subscribe to container lifecycle events
//! 3. initial `sync(false)` (events arriving meanwhile stay queued)
//! 4. [`scheduler`]: refresh / resync loops armed
//! 5. [`dispatcher`]: consume events until the stream closes or shutdown fires

pub mod cli;
pub mod dispatcher;
pub mod establish;
pub mod logging;
pub mod metrics_server;
pub mod orchestrator;
pub mod scheduler;
pub mod shutdown;

pub use orchestrator::{LifecycleState, Orchestrator, OrchestratorOptions};
pub use shutdown::ShutdownSignal;
