// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Network topology builders and observation helpers.

use moore_core::{AutomatonId, MooreResult, Network};

use crate::functions::copy_input;

/// Builds a ring of `len` automatons, each `width` bits wide, where member
/// `i` reads all of member `i - 1`'s outputs (member 0 reads the last one).
///
/// Member `i` starts in state `i` (truncated to `width` bits), so a step
/// rotates the values one position around the ring.
pub fn ring(net: &mut Network, len: usize, width: usize) -> MooreResult<Vec<AutomatonId>> {
    let mut ids = Vec::with_capacity(len);
    for i in 0..len {
        let id = net.create_simple(width, width, copy_input)?;
        let seed = u64::try_from(i).unwrap_or(u64::MAX) & crate::functions::mask(width);
        let mut state = vec![0u64; moore_core::bits::words_for(width)];
        state[0] = seed;
        net.set_state(id, &state)?;
        ids.push(id);
    }
    for i in 0..len {
        let prev = ids[(i + len - 1) % len];
        net.connect(ids[i], 0, prev, 0, width)?;
    }
    Ok(ids)
}

/// State and output of one automaton at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// State words.
    pub state: Vec<u64>,
    /// Output words.
    pub output: Vec<u64>,
}

/// Captures state and output of every automaton in `ids`, in order.
pub fn observe(net: &Network, ids: &[AutomatonId]) -> MooreResult<Vec<Observation>> {
    ids.iter()
        .map(|&id| {
            Ok(Observation {
                state: net.get_state(id)?.to_vec(),
                output: net.get_output(id)?.to_vec(),
            })
        })
        .collect()
}
