// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Synchronous two-phase stepper.
//!
//! A tick runs in three passes over the cohort:
//!
//! 1. **Validate**: every handle must resolve. Nothing is mutated until this
//!    pass succeeds, so a rejected cohort leaves the network untouched.
//! 2. **Read**: each member latches its connected input bits from the
//!    *current* outputs of their sources and stages its next state into its
//!    scratch buffer. Outputs are never written in this pass, which is what
//!    makes the result independent of cohort order and gives mutually wired
//!    members each other's pre-tick outputs.
//! 3. **Commit**: each member swaps its staged state in and recomputes its
//!    output.
//!
//! The scratch buffer lives with the automaton, so a tick allocates nothing.
use crate::arena::Arena;
use crate::automaton::Automaton;
use crate::bits::{get_bit, set_bit};
use crate::error::{MooreError, MooreResult};
use crate::ident::AutomatonId;

pub(crate) fn step(arena: &mut Arena<Automaton>, cohort: &[AutomatonId]) -> MooreResult<()> {
    if cohort.is_empty() {
        return Err(MooreError::InvalidArgument("cohort must not be empty"));
    }
    if cohort.iter().any(|id| !arena.contains(*id)) {
        return Err(MooreError::InvalidArgument(
            "cohort names an automaton that is not live",
        ));
    }

    for &id in cohort {
        latch_and_stage(arena, id);
    }
    for &id in cohort {
        if let Some(a) = arena.get_mut(id) {
            a.commit();
        }
    }
    Ok(())
}

/// Refreshes the connected input bits of `id` and stages its next state.
fn latch_and_stage(arena: &mut Arena<Automaton>, id: AutomatonId) {
    // The input buffer is moved out so the sources (which may include `id`
    // itself) can be read through a shared borrow of the arena.
    let Some(mut input) = arena.get_mut(id).map(|a| std::mem::take(&mut a.input)) else {
        return;
    };
    if let Some(a) = arena.get(id) {
        for (bit, source) in a.sources.iter().enumerate() {
            let Some(source) = source else {
                continue;
            };
            let Some(from) = arena.get(source.automaton) else {
                debug_assert!(
                    false,
                    "input {bit} of {id} names dead source {}",
                    source.automaton
                );
                continue;
            };
            set_bit(&mut input, bit, get_bit(&from.output, source.bit));
        }
    }
    if let Some(a) = arena.get_mut(id) {
        a.input = input;
        a.stage();
    }
}
