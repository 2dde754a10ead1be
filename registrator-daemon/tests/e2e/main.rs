//! E2E tests for the registrator orchestration loop.
//!
//! The orchestrator runs against a recording bridge and a scriptable runtime, so
//! every bridge call and subscription lands in one ordered call log.
//!
//! # Test Structure
//!
//! - `helpers/` -- mock bridge, mock runtime, config builders, polling assertions
//! - `scenarios/` -- one file per behavior (establishment, ordering, periodic loops,
//!   dispatch, shutdown, reconnect, configuration)
//!
//! # Running
//!
//! ```bash
//! cargo test -p registrator-daemon --test e2e
//! ```

mod helpers;
mod scenarios;
