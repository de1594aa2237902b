//! Remote platform client for the service lifecycle suite.
//!
//! # Module Structure
//!
//! - [`client`]: Platform API abstraction (`PlatformClient` trait, `PlatformCall`, `Operation`)
//! - [`cf_cli`]: Production client driving the `cf` CLI (`CfCliClient`)
//! - [`recording`]: Call-recording client for dry runs and tests (`RecordingClient`)
//! - [`error`]: Domain error types (`PlatformError`)

pub mod cf_cli;
pub mod client;
pub mod error;
pub mod recording;

// --- Public API Re-exports ---

pub use cf_cli::CfCliClient;
pub use client::{Operation, PlatformCall, PlatformClient};
pub use error::PlatformError;
pub use recording::RecordingClient;
