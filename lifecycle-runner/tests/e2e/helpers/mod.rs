//! Shared E2E test helpers.
//!
//! Provides suite fixtures (context and on-disk documents) and assertions
//! over the recorded platform call sequence.

pub mod calls;
pub mod fixture;
