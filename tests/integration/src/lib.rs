//! Integration test utilities for the team randomizer
//!
//! This crate provides scripted platform fakes and a helper for running
//! end-to-end tests against the REST API over a real socket.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
