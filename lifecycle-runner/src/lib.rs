//! Service lifecycle suite runner library.
//!
//! This library exposes the suite phases and the worker coordination for
//! integration testing and for embedding test frameworks. In production,
//! `lifecycle-runner` is used as a binary (main.rs).

pub mod coordinator;
pub mod decommissioner;
pub mod provisioner;
pub mod worker;
