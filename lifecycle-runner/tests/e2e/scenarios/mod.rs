//! E2E test scenarios.

mod config_error;
mod empty_plans;
mod plan_order;
mod setup_failure;
mod teardown_failure;
