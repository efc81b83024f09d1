// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Slot arena owning every automaton of a network.
//!
//! Slots are reused through a free list. Each slot carries a generation that
//! is bumped on removal, so an [`AutomatonId`] minted for a previous occupant
//! never resolves to the new one. A slot whose generation is exhausted is
//! retired: it stays vacant and never returns to the free list.
//!
//! # Determinism
//! - Iteration order is by slot index.
//! - Free-list reuse is LIFO: the most recently freed slot is reused first.

use crate::error::{MooreError, MooreResult};
use crate::ident::AutomatonId;

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
    next_free: Option<u32>,
}

/// Contiguous storage with free-list reuse and generation-checked handles.
#[derive(Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            live: 0,
        }
    }

    /// Pre-reserves room for `additional` new slots.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> MooreResult<()> {
        self.slots.try_reserve(additional)?;
        Ok(())
    }

    /// Stores `value` and returns its handle.
    ///
    /// Reuses a free slot when one exists; otherwise grows the slot vector
    /// fallibly. On failure `value` is dropped and the arena is unchanged.
    pub(crate) fn try_insert(&mut self, value: T) -> MooreResult<AutomatonId> {
        if let Some(idx) = self.free_head {
            let slot = &mut self.slots[idx as usize];
            debug_assert!(slot.value.is_none(), "free slot must be vacant");
            self.free_head = slot.next_free.take();
            slot.value = Some(value);
            self.live += 1;
            return Ok(AutomatonId::new(idx, slot.generation));
        }
        let idx = u32::try_from(self.slots.len()).map_err(|_| MooreError::OutOfMemory)?;
        self.slots.try_reserve(1)?;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
            next_free: None,
        });
        self.live += 1;
        Ok(AutomatonId::new(idx, 0))
    }

    /// Removes and returns the value named by `id`, if live.
    pub(crate) fn remove(&mut self, id: AutomatonId) -> Option<T> {
        let slot = self.slots.get_mut(id.slot())?;
        if slot.generation != id.generation() {
            return None;
        }
        let value = slot.value.take()?;
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            slot.next_free = self.free_head;
            self.free_head = Some(id.index());
        }
        self.live -= 1;
        Some(value)
    }

    #[inline]
    pub(crate) fn get(&self, id: AutomatonId) -> Option<&T> {
        self.slots
            .get(id.slot())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.value.as_ref())
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: AutomatonId) -> Option<&mut T> {
        self.slots
            .get_mut(id.slot())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.value.as_mut())
    }

    #[inline]
    pub(crate) fn contains(&self, id: AutomatonId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) const fn len(&self) -> usize {
        self.live
    }

    /// Iterates live entries in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (AutomatonId, &T)> {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            let value = slot.value.as_ref()?;
            // Slot count never exceeds u32::MAX (enforced by try_insert).
            #[allow(clippy::cast_possible_truncation)]
            let id = AutomatonId::new(idx as u32, slot.generation);
            Some((id, value))
        })
    }
}
