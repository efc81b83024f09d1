// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Automaton entity: dimensions, caller-supplied functions, and bit buffers.
use crate::bits::{try_filled, try_zeroed, words_for, WORD_BITS};
use crate::error::{MooreError, MooreResult};
use crate::registry::Registry;
use crate::wiring::Source;

/// Function pointer computing an automaton's next state.
///
/// Parameters, in order:
/// - `next_state`: output buffer of `ceil(s/64)` words. On entry it holds a
///   copy of the current state, so a function may update only the bits it
///   cares about.
/// - `input`: the `ceil(n/64)`-word input buffer, already refreshed from every
///   connected source for this tick.
/// - `state`: the current `ceil(s/64)`-word state.
/// - `n`: number of input bits.
/// - `s`: number of state bits.
///
/// The function must be pure and must not retain any of the slices.
pub type TransitionFn = fn(&mut [u64], &[u64], &[u64], usize, usize);

/// Function pointer computing an automaton's output from its state.
///
/// Parameters, in order:
/// - `output`: output buffer of `ceil(m/64)` words to overwrite in full.
/// - `state`: the current `ceil(s/64)`-word state.
/// - `m`: number of output bits.
/// - `s`: number of state bits.
pub type OutputFn = fn(&mut [u64], &[u64], usize, usize);

/// Canonical output function: copies state bits directly to output bits.
///
/// Intended for automatons with `m == s`. Only the low `m` bits are copied;
/// every output bit at or above `m` reads zero.
pub fn identity_output(output: &mut [u64], state: &[u64], m: usize, _s: usize) {
    let words = output.len().min(state.len());
    output[..words].copy_from_slice(&state[..words]);
    output[words..].fill(0);
    let tail = m % WORD_BITS;
    if tail != 0 {
        if let Some(last) = output.last_mut() {
            *last &= (1u64 << tail) - 1;
        }
    }
}

/// Bit widths of an automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Number of input bits (`n`).
    pub inputs: usize,
    /// Number of output bits (`m`).
    pub outputs: usize,
    /// Number of state bits (`s`).
    pub state_bits: usize,
}

/// Construction descriptor consumed by [`crate::Network::create`].
///
/// Functions and the initial state are optional so that an incomplete
/// descriptor is representable; [`crate::Network::create`] rejects it with
/// [`MooreError::InvalidArgument`].
///
/// # Example
///
/// ```
/// use moore_core::{identity_output, AutomatonSpec, Network};
///
/// fn hold(_next: &mut [u64], _input: &[u64], _state: &[u64], _n: usize, _s: usize) {}
///
/// let mut net = Network::new();
/// let spec = AutomatonSpec::new(0, 8, 8)
///     .transition(hold)
///     .output(identity_output)
///     .initial_state(&[0xA5]);
/// let id = net.create(&spec).unwrap();
/// assert_eq!(net.get_output(id).unwrap(), &[0xA5]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AutomatonSpec<'q> {
    dims: Dimensions,
    transition: Option<TransitionFn>,
    output: Option<OutputFn>,
    initial_state: Option<&'q [u64]>,
}

impl<'q> AutomatonSpec<'q> {
    /// Starts a descriptor for an automaton with `n` inputs, `m` outputs and
    /// `s` state bits.
    pub const fn new(n: usize, m: usize, s: usize) -> Self {
        Self {
            dims: Dimensions {
                inputs: n,
                outputs: m,
                state_bits: s,
            },
            transition: None,
            output: None,
            initial_state: None,
        }
    }

    /// Sets the transition function.
    pub const fn transition(mut self, transition: TransitionFn) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Sets the output function.
    pub const fn output(mut self, output: OutputFn) -> Self {
        self.output = Some(output);
        self
    }

    /// Sets the initial state. Must hold at least `ceil(s/64)` words.
    pub const fn initial_state(mut self, state: &'q [u64]) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Returns the requested dimensions.
    pub const fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub(crate) fn validate(&self) -> MooreResult<Blueprint<'q>> {
        let transition = self
            .transition
            .ok_or(MooreError::InvalidArgument("transition function is required"))?;
        let output = self
            .output
            .ok_or(MooreError::InvalidArgument("output function is required"))?;
        let initial = self
            .initial_state
            .ok_or(MooreError::InvalidArgument("initial state is required"))?;
        if initial.len() < words_for(self.dims.state_bits) {
            return Err(MooreError::InvalidArgument(
                "initial state is shorter than the state width",
            ));
        }
        Blueprint::new(self.dims, transition, output, Some(initial))
    }
}

/// A validated construction request.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Blueprint<'q> {
    pub(crate) dims: Dimensions,
    transition: TransitionFn,
    output: OutputFn,
    /// `None` means an all-zero initial state.
    initial: Option<&'q [u64]>,
}

impl<'q> Blueprint<'q> {
    pub(crate) fn new(
        dims: Dimensions,
        transition: TransitionFn,
        output: OutputFn,
        initial: Option<&'q [u64]>,
    ) -> MooreResult<Self> {
        if dims.outputs == 0 {
            return Err(MooreError::InvalidArgument("output width must be non-zero"));
        }
        if dims.state_bits == 0 {
            return Err(MooreError::InvalidArgument("state width must be non-zero"));
        }
        Ok(Self {
            dims,
            transition,
            output,
            initial,
        })
    }
}

/// A live automaton as stored in the network arena.
///
/// Invariants
/// - `input`, `state`, `output` and `scratch` hold exactly `ceil(n/64)`,
///   `ceil(s/64)`, `ceil(m/64)` and `ceil(s/64)` words.
/// - `sources.len() == n`.
/// - `output == output_fn(state)` between API calls.
/// - `scratch` and `staged` are only meaningful inside a single `step` call.
#[derive(Debug)]
pub(crate) struct Automaton {
    dims: Dimensions,
    transition: TransitionFn,
    output_fn: OutputFn,
    pub(crate) input: Vec<u64>,
    state: Vec<u64>,
    pub(crate) output: Vec<u64>,
    scratch: Vec<u64>,
    staged: bool,
    /// Connection descriptors, one per input bit.
    pub(crate) sources: Vec<Option<Source>>,
    pub(crate) registry: Registry,
}

impl Automaton {
    /// Allocates and initializes an automaton.
    ///
    /// Every buffer is allocated fallibly; if any allocation fails the ones
    /// already made are dropped before the error is returned.
    pub(crate) fn try_new(blueprint: &Blueprint<'_>, registry_capacity: usize) -> MooreResult<Self> {
        let dims = blueprint.dims;
        let state_words = words_for(dims.state_bits);
        let input = try_zeroed(words_for(dims.inputs))?;
        let mut state = try_zeroed(state_words)?;
        let output = try_zeroed(words_for(dims.outputs))?;
        let scratch = try_zeroed(state_words)?;
        let sources = try_filled(dims.inputs, None)?;
        let registry = Registry::try_with_capacity(registry_capacity)?;

        if let Some(initial) = blueprint.initial {
            state.copy_from_slice(&initial[..state_words]);
        }
        let mut automaton = Self {
            dims,
            transition: blueprint.transition,
            output_fn: blueprint.output,
            input,
            state,
            output,
            scratch,
            staged: false,
            sources,
            registry,
        };
        automaton.refresh_output();
        Ok(automaton)
    }

    pub(crate) const fn dims(&self) -> Dimensions {
        self.dims
    }

    pub(crate) fn state(&self) -> &[u64] {
        &self.state
    }

    fn refresh_output(&mut self) {
        (self.output_fn)(
            &mut self.output,
            &self.state,
            self.dims.outputs,
            self.dims.state_bits,
        );
    }

    /// Overwrites the state with the first `ceil(s/64)` words of `bits` and
    /// recomputes the output.
    pub(crate) fn set_state(&mut self, bits: &[u64]) -> MooreResult<()> {
        let words = self.state.len();
        if bits.len() < words {
            return Err(MooreError::InvalidArgument(
                "state buffer is shorter than the state width",
            ));
        }
        self.state.copy_from_slice(&bits[..words]);
        self.refresh_output();
        Ok(())
    }

    /// Overwrites the raw input buffer with the first `ceil(n/64)` words of
    /// `bits`. Connected bits are overwritten again on the next step.
    pub(crate) fn set_input(&mut self, bits: &[u64]) -> MooreResult<()> {
        if self.dims.inputs == 0 {
            return Err(MooreError::InvalidArgument("automaton has no inputs"));
        }
        let words = self.input.len();
        if bits.len() < words {
            return Err(MooreError::InvalidArgument(
                "input buffer is shorter than the input width",
            ));
        }
        self.input.copy_from_slice(&bits[..words]);
        Ok(())
    }

    /// Read phase: computes the next state into the scratch buffer.
    ///
    /// The visible state and output are untouched.
    pub(crate) fn stage(&mut self) {
        self.scratch.copy_from_slice(&self.state);
        (self.transition)(
            &mut self.scratch,
            &self.input,
            &self.state,
            self.dims.inputs,
            self.dims.state_bits,
        );
        self.staged = true;
    }

    /// Commit phase: publishes the staged state and recomputes the output.
    ///
    /// A second commit without an intervening [`Self::stage`] is a no-op.
    pub(crate) fn commit(&mut self) {
        if !self.staged {
            return;
        }
        std::mem::swap(&mut self.state, &mut self.scratch);
        self.staged = false;
        self.refresh_output();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn invert(next: &mut [u64], _input: &[u64], state: &[u64], _n: usize, _s: usize) {
        next[0] = !state[0] & 1;
    }

    fn doubled(output: &mut [u64], state: &[u64], _m: usize, _s: usize) {
        output[0] = state[0] * 2;
    }

    #[test]
    fn identity_output_drops_state_bits_above_m() {
        let mut output = [0u64];
        identity_output(&mut output, &[0xFF], 1, 8);
        assert_eq!(output, [1]);

        let mut wide = [u64::MAX; 2];
        identity_output(&mut wide, &[u64::MAX, u64::MAX], 70, 70);
        assert_eq!(wide, [u64::MAX, 0b11_1111]);

        let mut full = [0u64];
        identity_output(&mut full, &[u64::MAX], 64, 64);
        assert_eq!(full, [u64::MAX]);
    }

    #[test]
    fn spec_rejects_missing_parts() {
        let base = AutomatonSpec::new(1, 1, 1);
        assert!(matches!(
            base.output(identity_output).initial_state(&[0]).validate(),
            Err(MooreError::InvalidArgument(_))
        ));
        assert!(matches!(
            base.transition(invert).initial_state(&[0]).validate(),
            Err(MooreError::InvalidArgument(_))
        ));
        assert!(matches!(
            base.transition(invert).output(identity_output).validate(),
            Err(MooreError::InvalidArgument(_))
        ));
        assert!(matches!(
            AutomatonSpec::new(0, 1, 65)
                .transition(invert)
                .output(identity_output)
                .initial_state(&[0])
                .validate(),
            Err(MooreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn buffers_are_sized_from_dimensions() {
        let q = [7u64, 1];
        let bp = AutomatonSpec::new(130, 3, 70)
            .transition(invert)
            .output(doubled)
            .initial_state(&q)
            .validate()
            .unwrap();
        let a = Automaton::try_new(&bp, 0).unwrap();
        assert_eq!(a.input.len(), 3);
        assert_eq!(a.state.len(), 2);
        assert_eq!(a.output.len(), 1);
        assert_eq!(a.scratch.len(), 2);
        assert_eq!(a.sources.len(), 130);
        assert_eq!(a.output, vec![14]);
    }

    #[test]
    fn stage_is_invisible_until_commit() {
        let bp = AutomatonSpec::new(0, 1, 1)
            .transition(invert)
            .output(identity_output)
            .initial_state(&[0])
            .validate()
            .unwrap();
        let mut a = Automaton::try_new(&bp, 0).unwrap();
        a.stage();
        assert_eq!(a.state(), &[0]);
        assert_eq!(a.output, vec![0]);
        a.commit();
        assert_eq!(a.state(), &[1]);
        assert_eq!(a.output, vec![1]);
        a.commit();
        assert_eq!(a.state(), &[1], "unstaged commit must not swap again");
    }
}
