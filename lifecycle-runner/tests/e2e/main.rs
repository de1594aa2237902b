//! E2E integration tests for lifecycle-runner.
//!
//! These tests drive the whole suite (coordinator, provisioner,
//! decommissioner, workers) against a recording platform client and check
//! the exact sequence of platform calls.
//!
//! # Test Structure
//!
//! - `helpers/` -- Shared test utilities (suite fixtures, call assertions)
//! - `scenarios/` -- Test files organized by scenario
//!
//! # Running
//!
//! ```bash
//! cargo test -p lifecycle-runner --test e2e
//! ```

mod helpers;
mod scenarios;
