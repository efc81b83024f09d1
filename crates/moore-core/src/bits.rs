// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! An `L`-bit vector is stored as `ceil(L/64)` `u64` words. Bit `i` lives in
//! word `i / 64` at position `i % 64` (least significant bit first).
//!
//! Buffers are allocated through [`try_zeroed`], which reports allocation
//! failure instead of aborting.
use std::collections::TryReserveError;

/// Width of one bit-vector word.
pub const WORD_BITS: usize = 64;

/// Number of `u64` words needed to hold `bits` bits.
#[inline]
#[must_use]
pub const fn words_for(bits: usize) -> usize {
    bits.div_ceil(WORD_BITS)
}

/// Reads bit `bit` of `words`.
///
/// # Panics
/// Panics if `bit` lies beyond `words.len() * 64`.
#[inline]
#[must_use]
pub fn get_bit(words: &[u64], bit: usize) -> bool {
    (words[bit / WORD_BITS] >> (bit % WORD_BITS)) & 1 == 1
}

/// Writes bit `bit` of `words`.
///
/// # Panics
/// Panics if `bit` lies beyond `words.len() * 64`.
#[inline]
pub fn set_bit(words: &mut [u64], bit: usize, value: bool) {
    let mask = 1u64 << (bit % WORD_BITS);
    let word = &mut words[bit / WORD_BITS];
    if value {
        *word |= mask;
    } else {
        *word &= !mask;
    }
}

/// Allocates a zero-filled buffer of exactly `words` words.
///
/// A zero-length request performs no allocation.
pub(crate) fn try_zeroed(words: usize) -> Result<Vec<u64>, TryReserveError> {
    try_filled(words, 0)
}

/// Allocates a buffer of exactly `len` copies of `value`.
pub(crate) fn try_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>, TryReserveError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)?;
    buf.resize(len, value);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn words_for_rounds_up() {
        assert_eq!(words_for(0), 0);
        assert_eq!(words_for(1), 1);
        assert_eq!(words_for(64), 1);
        assert_eq!(words_for(65), 2);
        assert_eq!(words_for(128), 2);
        assert_eq!(words_for(129), 3);
    }

    #[test]
    fn bits_cross_word_boundaries() {
        let mut words = [0u64; 2];
        set_bit(&mut words, 0, true);
        set_bit(&mut words, 63, true);
        set_bit(&mut words, 64, true);
        assert_eq!(words, [1 | (1 << 63), 1]);
        assert!(get_bit(&words, 63));
        assert!(get_bit(&words, 64));
        assert!(!get_bit(&words, 65));

        set_bit(&mut words, 63, false);
        assert_eq!(words, [1, 1]);
    }

    #[test]
    fn zero_length_buffer_has_no_capacity() {
        let buf = try_zeroed(0).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 0);
    }
}
