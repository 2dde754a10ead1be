//! E2E test scenarios, one module per behavior.

mod config_validation;
mod establish;
mod ordering;
mod shutdown;
