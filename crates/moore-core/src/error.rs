// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error type shared by every fallible network operation.
use std::collections::TryReserveError;

use thiserror::Error;

/// Errors reported by [`crate::Network`] operations.
///
/// Exactly one of two kinds is ever reported. A failed call never leaves a
/// partial mutation behind: the network is observably unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MooreError {
    /// A required value was absent, a dimension was zero where forbidden, a
    /// bit range was out of bounds, or a handle did not name a live automaton.
    ///
    /// The payload is a short human-readable reason for diagnostics; callers
    /// should match on the variant, not the text.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// A heap allocation failed.
    #[error("out of memory")]
    OutOfMemory,
}

impl From<TryReserveError> for MooreError {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

/// Convenience alias for results carrying a [`MooreError`].
pub type MooreResult<T> = Result<T, MooreError>;
