// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The automaton graph engine.
use tracing::{debug, trace};

use crate::arena::Arena;
use crate::automaton::{
    identity_output, Automaton, AutomatonSpec, Blueprint, Dimensions, OutputFn, TransitionFn,
};
use crate::config::NetworkConfig;
use crate::error::{MooreError, MooreResult};
use crate::ident::AutomatonId;
use crate::registry::link;
use crate::wiring::{self, Source};

const NOT_LIVE: MooreError = MooreError::InvalidArgument("automaton is not live");

/// A network of Moore automatons wired output → input at bit granularity.
///
/// The network owns every automaton; callers hold [`AutomatonId`] handles.
/// Mutating operations take `&mut self`, so wiring changes and deletions can
/// never overlap a [`Network::step`] on the same network.
///
/// Every fallible operation either succeeds completely or returns an error
/// with the network observably unchanged.
#[derive(Debug, Default)]
pub struct Network {
    arena: Arena<Automaton>,
    config: NetworkConfig,
}

impl Network {
    /// Creates an empty network with the default configuration.
    pub const fn new() -> Self {
        Self {
            arena: Arena::new(),
            config: NetworkConfig {
                initial_capacity: 0,
                registry_capacity: 0,
            },
        }
    }

    /// Creates an empty network, pre-reserving the capacity `config` asks for.
    ///
    /// # Errors
    /// [`MooreError::OutOfMemory`] if the arena cannot be pre-reserved.
    pub fn with_config(config: NetworkConfig) -> MooreResult<Self> {
        let mut arena = Arena::new();
        arena.try_reserve(config.initial_capacity)?;
        Ok(Self { arena, config })
    }

    /// Returns the configuration this network was built with.
    pub const fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Number of live automatons.
    pub const fn len(&self) -> usize {
        self.arena.len()
    }

    /// Returns `true` if the network holds no automatons.
    pub const fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Returns `true` if `id` names a live automaton.
    pub fn contains(&self, id: AutomatonId) -> bool {
        self.arena.contains(id)
    }

    /// Iterates the handles of all live automatons in slot order.
    pub fn ids(&self) -> impl Iterator<Item = AutomatonId> + '_ {
        self.arena.iter().map(|(id, _)| id)
    }

    fn automaton(&self, id: AutomatonId) -> MooreResult<&Automaton> {
        self.arena.get(id).ok_or(NOT_LIVE)
    }

    fn automaton_mut(&mut self, id: AutomatonId) -> MooreResult<&mut Automaton> {
        self.arena.get_mut(id).ok_or(NOT_LIVE)
    }

    // ── Construction ────────────────────────────────────────────────────

    /// Creates an automaton from a descriptor.
    ///
    /// The new automaton's output is `output_fn(initial_state)` and all of its
    /// inputs are unconnected.
    ///
    /// # Errors
    /// - [`MooreError::InvalidArgument`] if a function or the initial state is
    ///   missing, the initial state is shorter than `ceil(s/64)` words, or
    ///   `m == 0` or `s == 0`.
    /// - [`MooreError::OutOfMemory`] if any buffer cannot be allocated. Every
    ///   allocation already made is released first.
    pub fn create(&mut self, spec: &AutomatonSpec<'_>) -> MooreResult<AutomatonId> {
        let blueprint = spec.validate()?;
        self.insert(&blueprint)
    }

    /// Creates an automaton with `n` inputs, `m` outputs and `s` state bits.
    ///
    /// Positional form of [`Network::create`]; see it for the error contract.
    pub fn create_full(
        &mut self,
        n: usize,
        m: usize,
        s: usize,
        transition: TransitionFn,
        output: OutputFn,
        initial_state: &[u64],
    ) -> MooreResult<AutomatonId> {
        self.create(
            &AutomatonSpec::new(n, m, s)
                .transition(transition)
                .output(output)
                .initial_state(initial_state),
        )
    }

    /// Creates an automaton whose output is its state (`m == s`), starting
    /// from the all-zero state.
    ///
    /// # Errors
    /// - [`MooreError::InvalidArgument`] if `s == 0`.
    /// - [`MooreError::OutOfMemory`] if any buffer cannot be allocated.
    pub fn create_simple(
        &mut self,
        n: usize,
        s: usize,
        transition: TransitionFn,
    ) -> MooreResult<AutomatonId> {
        let dims = Dimensions {
            inputs: n,
            outputs: s,
            state_bits: s,
        };
        let blueprint = Blueprint::new(dims, transition, identity_output, None)?;
        self.insert(&blueprint)
    }

    fn insert(&mut self, blueprint: &Blueprint<'_>) -> MooreResult<AutomatonId> {
        let automaton = Automaton::try_new(blueprint, self.config.registry_capacity)?;
        let id = self.arena.try_insert(automaton)?;
        debug!(
            %id,
            n = blueprint.dims.inputs,
            m = blueprint.dims.outputs,
            s = blueprint.dims.state_bits,
            "automaton created"
        );
        Ok(id)
    }

    // ── State and I/O ───────────────────────────────────────────────────

    /// Overwrites the state and recomputes the output.
    ///
    /// Only the first `ceil(s/64)` words of `bits` are read.
    ///
    /// # Errors
    /// [`MooreError::InvalidArgument`] if `id` is not live or `bits` is too
    /// short.
    pub fn set_state(&mut self, id: AutomatonId, bits: &[u64]) -> MooreResult<()> {
        self.automaton_mut(id)?.set_state(bits)
    }

    /// Overwrites the raw input buffer.
    ///
    /// Only the first `ceil(n/64)` words of `bits` are read. Bits that are
    /// connected to a source are overwritten again by the next step, so this
    /// is only meaningful for unconnected bits.
    ///
    /// # Errors
    /// [`MooreError::InvalidArgument`] if `id` is not live, the automaton has
    /// no inputs, or `bits` is too short.
    pub fn set_input(&mut self, id: AutomatonId, bits: &[u64]) -> MooreResult<()> {
        self.automaton_mut(id)?.set_input(bits)
    }

    /// Returns the output buffer (`ceil(m/64)` words).
    ///
    /// # Errors
    /// [`MooreError::InvalidArgument`] if `id` is not live.
    pub fn get_output(&self, id: AutomatonId) -> MooreResult<&[u64]> {
        Ok(&self.automaton(id)?.output)
    }

    /// Returns the state buffer (`ceil(s/64)` words).
    ///
    /// # Errors
    /// [`MooreError::InvalidArgument`] if `id` is not live.
    pub fn get_state(&self, id: AutomatonId) -> MooreResult<&[u64]> {
        Ok(self.automaton(id)?.state())
    }

    /// Returns the raw input buffer (`ceil(n/64)` words) as last latched or
    /// written.
    ///
    /// # Errors
    /// [`MooreError::InvalidArgument`] if `id` is not live.
    pub fn get_input(&self, id: AutomatonId) -> MooreResult<&[u64]> {
        Ok(&self.automaton(id)?.input)
    }

    /// Returns the bit widths of `id`.
    ///
    /// # Errors
    /// [`MooreError::InvalidArgument`] if `id` is not live.
    pub fn dimensions(&self, id: AutomatonId) -> MooreResult<Dimensions> {
        Ok(self.automaton(id)?.dims())
    }

    // ── Wiring ──────────────────────────────────────────────────────────

    /// Feeds input bits `[in_offset, in_offset + width)` of `input` from output
    /// bits `[out_offset, out_offset + width)` of `output`.
    ///
    /// Any previous source of those input bits is replaced. The parent/child
    /// relationship between the pair is registered once, however many bits
    /// are wired. Wiring an automaton to itself is allowed.
    ///
    /// # Errors
    /// - [`MooreError::InvalidArgument`] if either handle is not live,
    ///   `width == 0`, or either range exceeds the automaton's width.
    /// - [`MooreError::OutOfMemory`] if a relationship set cannot grow; no
    ///   descriptor or relationship is changed in that case.
    pub fn connect(
        &mut self,
        input: AutomatonId,
        in_offset: usize,
        output: AutomatonId,
        out_offset: usize,
        width: usize,
    ) -> MooreResult<()> {
        let in_dims = self.automaton(input)?.dims();
        let out_dims = self.automaton(output)?.dims();
        wiring::check_range(
            in_offset,
            width,
            in_dims.inputs,
            "input range exceeds the input width",
        )?;
        wiring::check_range(
            out_offset,
            width,
            out_dims.outputs,
            "output range exceeds the output width",
        )?;

        let new_edge = link(&mut self.arena, output, input)?;
        let sink = self.automaton_mut(input)?;
        wiring::rewire(&mut sink.sources, in_offset, output, out_offset, width);
        debug!(
            input = %input,
            in_offset,
            output = %output,
            out_offset,
            width,
            new_edge,
            "connected"
        );
        Ok(())
    }

    /// Marks input bits `[in_offset, in_offset + width)` of `id` unconnected.
    ///
    /// The raw input bits keep their last value. Parent/child relationships
    /// are left in place even if no bit links the pair any more; they are
    /// pruned only when one side is deleted.
    ///
    /// # Errors
    /// [`MooreError::InvalidArgument`] if `id` is not live, `width == 0`, or
    /// the range exceeds the input width.
    pub fn disconnect(&mut self, id: AutomatonId, in_offset: usize, width: usize) -> MooreResult<()> {
        let sink = self.automaton_mut(id)?;
        wiring::check_range(
            in_offset,
            width,
            sink.dims().inputs,
            "input range exceeds the input width",
        )?;
        wiring::clear(&mut sink.sources, in_offset, width);
        debug!(%id, in_offset, width, "disconnected");
        Ok(())
    }

    /// Returns the source feeding input bit `bit` of `id`, or `None` if the
    /// bit is unconnected.
    ///
    /// # Errors
    /// [`MooreError::InvalidArgument`] if `id` is not live or `bit` is not an
    /// input bit.
    pub fn source_of(&self, id: AutomatonId, bit: usize) -> MooreResult<Option<Source>> {
        self.automaton(id)?
            .sources
            .get(bit)
            .copied()
            .ok_or(MooreError::InvalidArgument("bit exceeds the input width"))
    }

    /// Returns `true` if at least one input bit of `to` is fed by `from`.
    ///
    /// # Errors
    /// [`MooreError::InvalidArgument`] if `to` is not live.
    pub fn feeds(&self, from: AutomatonId, to: AutomatonId) -> MooreResult<bool> {
        Ok(wiring::reads_from(&self.automaton(to)?.sources, from))
    }

    /// Registered parents of `id` (automatons it may read from), sorted.
    ///
    /// # Errors
    /// [`MooreError::InvalidArgument`] if `id` is not live.
    pub fn parents(&self, id: AutomatonId) -> MooreResult<Vec<AutomatonId>> {
        let mut out: Vec<_> = self.automaton(id)?.registry.parents().collect();
        out.sort_unstable();
        Ok(out)
    }

    /// Registered children of `id` (automatons that may read from it), sorted.
    ///
    /// # Errors
    /// [`MooreError::InvalidArgument`] if `id` is not live.
    pub fn children(&self, id: AutomatonId) -> MooreResult<Vec<AutomatonId>> {
        let mut out: Vec<_> = self.automaton(id)?.registry.children().collect();
        out.sort_unstable();
        Ok(out)
    }

    // ── Stepping ────────────────────────────────────────────────────────

    /// Advances every automaton in `cohort` by one synchronous tick.
    ///
    /// Each member first latches its connected input bits from the current
    /// outputs of their sources and computes its next state; only after every
    /// member has done so are the new states published and outputs
    /// recomputed. The result does not depend on cohort order. Automatons not
    /// in the cohort keep their outputs for the tick. A handle listed twice
    /// is advanced once.
    ///
    /// # Errors
    /// [`MooreError::InvalidArgument`] if `cohort` is empty or names an
    /// automaton that is not live. Nothing is changed in that case.
    pub fn step(&mut self, cohort: &[AutomatonId]) -> MooreResult<()> {
        crate::step::step(&mut self.arena, cohort)?;
        trace!(cohort = cohort.len(), "tick committed");
        Ok(())
    }

    // ── Teardown ────────────────────────────────────────────────────────

    /// Deletes `id` and repairs every automaton that referenced it.
    ///
    /// Every input bit anywhere in the network that read from `id` becomes
    /// unconnected (keeping its last raw value), and `id` is removed from the
    /// parent sets of its children and the child sets of its parents. The
    /// handle stops resolving immediately, so a second delete is rejected.
    ///
    /// # Errors
    /// [`MooreError::InvalidArgument`] if `id` is not live.
    pub fn delete(&mut self, id: AutomatonId) -> MooreResult<()> {
        let removed = self.arena.remove(id).ok_or(NOT_LIVE)?;

        let mut severed = 0usize;
        for child in removed.registry.children() {
            if child == id {
                continue;
            }
            let Some(c) = self.arena.get_mut(child) else {
                debug_assert!(false, "child {child} of {id} is not live");
                continue;
            };
            severed += wiring::sever(&mut c.sources, id);
            let had = c.registry.remove_parent(id);
            debug_assert!(had, "child {child} did not list {id} as parent");
        }
        for parent in removed.registry.parents() {
            if parent == id {
                continue;
            }
            let Some(p) = self.arena.get_mut(parent) else {
                debug_assert!(false, "parent {parent} of {id} is not live");
                continue;
            };
            let had = p.registry.remove_child(id);
            debug_assert!(had, "parent {parent} did not list {id} as child");
        }

        debug!(%id, severed, "automaton deleted");
        Ok(())
    }
}
