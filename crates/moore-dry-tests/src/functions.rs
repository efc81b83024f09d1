// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Stock transition and output functions for tests.
//!
//! Each function matches [`moore_core::TransitionFn`] or
//! [`moore_core::OutputFn`]. Functions that only make sense for narrow
//! automatons (`s <= 64`) say so.

use moore_core::bits::{get_bit, set_bit};

/// Mask with the low `bits` bits set (`bits` is clamped to 64).
pub const fn mask(bits: usize) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Keeps the current state.
pub fn hold(_next: &mut [u64], _input: &[u64], _state: &[u64], _n: usize, _s: usize) {}

/// Inverts state bit 0.
pub fn toggle(next: &mut [u64], _input: &[u64], state: &[u64], _n: usize, _s: usize) {
    set_bit(next, 0, !get_bit(state, 0));
}

/// State bit 0 becomes the AND of all `n` input bits.
pub fn and_fold(next: &mut [u64], input: &[u64], _state: &[u64], n: usize, _s: usize) {
    let all = (0..n).all(|bit| get_bit(input, bit));
    set_bit(next, 0, all);
}

/// Next state is the input, bit for bit (expects `n >= s`).
pub fn copy_input(next: &mut [u64], input: &[u64], _state: &[u64], _n: usize, s: usize) {
    for bit in 0..s {
        set_bit(next, bit, get_bit(input, bit));
    }
}

/// Increments the state modulo `2^s` (`s <= 64`).
pub fn counter(next: &mut [u64], _input: &[u64], state: &[u64], _n: usize, s: usize) {
    next[0] = state[0].wrapping_add(1) & mask(s);
}

/// Shifts the state left by one and feeds input bit 0 into bit 0 (`s <= 64`).
pub fn shift_in(next: &mut [u64], input: &[u64], state: &[u64], n: usize, s: usize) {
    let incoming = n > 0 && get_bit(input, 0);
    next[0] = ((state[0] << 1) | u64::from(incoming)) & mask(s);
}

/// Output is state bit 0 only (`m >= 1`).
pub fn low_bit_output(output: &mut [u64], state: &[u64], _m: usize, _s: usize) {
    output.fill(0);
    set_bit(output, 0, get_bit(state, 0));
}
