// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Automaton handle type.

/// Strongly typed handle naming one automaton inside a [`crate::Network`].
///
/// A handle is an arena slot index paired with the slot's generation at the
/// time the automaton was created. Deleting an automaton bumps the slot's
/// generation, so any handle still held by a caller (or by another automaton)
/// stops resolving instead of aliasing whatever automaton reuses the slot.
///
/// # Invariants
/// - Two live automatons never share a handle.
/// - A handle that once failed to resolve never resolves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AutomatonId {
    index: u32,
    generation: u32,
}

impl AutomatonId {
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the arena slot index.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Returns the slot generation this handle was minted for.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }

    #[inline]
    pub(crate) const fn slot(self) -> usize {
        self.index as usize
    }
}

impl core::fmt::Display for AutomatonId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_distinguishes_reused_slots() {
        let first = AutomatonId::new(3, 0);
        let reused = AutomatonId::new(3, 1);
        assert_ne!(first, reused);
        assert_eq!(first.index(), reused.index());
        assert_eq!(reused.to_string(), "3v1");
    }
}
