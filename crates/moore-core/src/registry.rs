// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Parent/child relationship registry.
//!
//! Each automaton records the set of automatons feeding it (parents) and the
//! set reading from it (children). Entries are weak: they name automatons
//! that *may* be addressed by a connection descriptor, never owners. At most
//! one edge exists per ordered pair, however many bits are wired between them.
//!
//! The registry is what makes teardown `O(neighbors)`: deleting an automaton
//! only visits its own parents and children instead of scanning the network.
use std::collections::TryReserveError;

use rustc_hash::FxHashSet;

use crate::arena::Arena;
use crate::automaton::Automaton;
use crate::error::{MooreError, MooreResult};
use crate::ident::AutomatonId;

#[derive(Debug, Default)]
pub(crate) struct Registry {
    parents: FxHashSet<AutomatonId>,
    children: FxHashSet<AutomatonId>,
}

impl Registry {
    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut registry = Self::default();
        if capacity > 0 {
            registry.parents.try_reserve(capacity)?;
            registry.children.try_reserve(capacity)?;
        }
        Ok(registry)
    }

    pub(crate) fn parents(&self) -> impl Iterator<Item = AutomatonId> + '_ {
        self.parents.iter().copied()
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = AutomatonId> + '_ {
        self.children.iter().copied()
    }

    pub(crate) fn has_parent(&self, id: AutomatonId) -> bool {
        self.parents.contains(&id)
    }

    pub(crate) fn has_child(&self, id: AutomatonId) -> bool {
        self.children.contains(&id)
    }

    pub(crate) fn remove_parent(&mut self, id: AutomatonId) -> bool {
        self.parents.remove(&id)
    }

    pub(crate) fn remove_child(&mut self, id: AutomatonId) -> bool {
        self.children.remove(&id)
    }
}

/// Which side of an edge a reservation was made on.
#[derive(Clone, Copy)]
enum Side {
    Parents,
    Children,
}

/// Room reserved for one pending insertion.
///
/// `fresh` records that the set held no allocation before the reservation,
/// so rolling back must release the table again.
struct Reservation {
    owner: AutomatonId,
    side: Side,
    fresh: bool,
}

fn set_of(registry: &mut Registry, side: Side) -> &mut FxHashSet<AutomatonId> {
    match side {
        Side::Parents => &mut registry.parents,
        Side::Children => &mut registry.children,
    }
}

fn reserve(
    arena: &mut Arena<Automaton>,
    owner: AutomatonId,
    side: Side,
) -> MooreResult<Reservation> {
    let set = arena
        .get_mut(owner)
        .map(|a| set_of(&mut a.registry, side))
        .ok_or(MooreError::InvalidArgument("automaton is not live"))?;
    let fresh = set.capacity() == 0;
    set.try_reserve(1)?;
    Ok(Reservation { owner, side, fresh })
}

fn rollback(arena: &mut Arena<Automaton>, reservation: &Reservation) {
    if !reservation.fresh {
        return;
    }
    if let Some(a) = arena.get_mut(reservation.owner) {
        let set = set_of(&mut a.registry, reservation.side);
        debug_assert!(set.is_empty(), "fresh reservation gained entries");
        set.shrink_to_fit();
    }
}

/// Records `parent` as a parent of `child` and `child` as a child of
/// `parent`, unless the edge already exists.
///
/// Both sides are reserved before either is written. If the second
/// reservation fails, the first is rolled back so the registries are left
/// exactly as they were.
///
/// Returns `true` when a new edge was created.
pub(crate) fn link(
    arena: &mut Arena<Automaton>,
    parent: AutomatonId,
    child: AutomatonId,
) -> MooreResult<bool> {
    let needs_parent = !arena
        .get(child)
        .is_some_and(|a| a.registry.has_parent(parent));
    let needs_child = !arena
        .get(parent)
        .is_some_and(|a| a.registry.has_child(child));
    debug_assert_eq!(
        needs_parent, needs_child,
        "registry edge {parent} -> {child} is one-sided"
    );
    if !needs_parent && !needs_child {
        return Ok(false);
    }

    let first = if needs_parent {
        Some(reserve(arena, child, Side::Parents)?)
    } else {
        None
    };
    if needs_child {
        if let Err(err) = reserve(arena, parent, Side::Children) {
            if let Some(first) = &first {
                rollback(arena, first);
            }
            return Err(err);
        }
    }

    if let Some(a) = arena.get_mut(child) {
        a.registry.parents.insert(parent);
    }
    if let Some(a) = arena.get_mut(parent) {
        a.registry.children.insert(child);
    }
    Ok(true)
}
