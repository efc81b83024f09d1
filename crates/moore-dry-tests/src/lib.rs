// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for Moore crates.
//!
//! This crate provides commonly used test utilities to reduce duplication
//! across the Moore test suite.
//!
//! # Modules
//!
//! - [`alloc`] - Counting, fault-injecting global allocator
//! - [`config`] - In-memory profile store fake for testing without filesystem
//! - [`functions`] - Stock transition and output functions
//! - [`network`] - Network topology builders and observation helpers

pub mod alloc;
pub mod config;
pub mod functions;
pub mod network;

// Re-export commonly used items at crate root for convenience
pub use alloc::{measure, sweep_faults, AllocStats, CountingAlloc, FaultSweep};
pub use config::InMemoryProfileStore;
pub use functions::{
    and_fold, copy_input, counter, hold, low_bit_output, mask, shift_in, toggle,
};
pub use network::{observe, ring, Observation};
