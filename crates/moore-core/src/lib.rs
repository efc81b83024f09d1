// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! moore-core: synchronous networks of Moore automatons.
//!
//! A [`Network`] owns a set of Moore automatons (finite-state machines whose
//! output depends only on their current state). Automatons are wired together
//! bit by bit, output → input, and advanced in lock-step by [`Network::step`]
//! using a two-phase read/commit protocol, which models a synchronous digital
//! circuit: every automaton in a cohort observes the *pre-tick* outputs of its
//! sources, even across cyclic wiring.
//!
//! Automatons are addressed through generation-checked [`AutomatonId`]
//! handles. Deleting an automaton repairs every connection and relationship
//! that referenced it, so survivors never observe a dangling source.
//!
//! Every heap allocation the engine performs is fallible: allocation failure
//! surfaces as [`MooreError::OutOfMemory`] and leaves the network exactly as
//! it was before the call.
//!
//! # Example
//!
//! ```
//! use moore_core::{identity_output, Network};
//!
//! // Next state = current input (a one-bit delay line).
//! fn latch(next: &mut [u64], input: &[u64], _state: &[u64], _n: usize, _s: usize) {
//!     next[0] = input[0] & 1;
//! }
//!
//! let mut net = Network::new();
//! let src = net.create_full(0, 1, 1, latch, identity_output, &[1]).unwrap();
//! let dst = net.create_simple(1, 1, latch).unwrap();
//! net.connect(dst, 0, src, 0, 1).unwrap();
//! net.step(&[dst]).unwrap();
//! assert_eq!(net.get_output(dst).unwrap(), &[1]);
//! ```
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod arena;
mod automaton;
/// Bit-vector layout helpers (`ceil(L/64)` little-endian `u64` words).
pub mod bits;
mod config;
mod error;
mod ident;
mod network;
mod registry;
mod step;
mod wiring;

// Re-exports for stable public API
/// Automaton construction descriptor and caller-supplied function types.
pub use automaton::{identity_output, AutomatonSpec, Dimensions, OutputFn, TransitionFn};
/// Engine configuration (arena and registry pre-sizing).
pub use config::NetworkConfig;
/// Error type reported by every fallible operation.
pub use error::{MooreError, MooreResult};
/// Generation-checked automaton handle.
pub use ident::AutomatonId;
/// The automaton graph engine.
pub use network::Network;
/// Per-input-bit connection descriptor.
pub use wiring::Source;
