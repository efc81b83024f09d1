// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Connection descriptors: which output bit feeds each input bit.
use crate::error::{MooreError, MooreResult};
use crate::ident::AutomatonId;

/// Source feeding one input bit: output bit `bit` of `automaton`.
///
/// Stored per input bit as `Option<Source>`; `None` means unconnected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Source {
    /// Automaton whose output is read.
    pub automaton: AutomatonId,
    /// Output bit index within that automaton.
    pub bit: usize,
}

/// Checks that `[offset, offset + width)` is a non-empty range within `limit`.
pub(crate) fn check_range(
    offset: usize,
    width: usize,
    limit: usize,
    out_of_range: &'static str,
) -> MooreResult<()> {
    if width == 0 {
        return Err(MooreError::InvalidArgument("width must be non-zero"));
    }
    match offset.checked_add(width) {
        Some(end) if end <= limit => Ok(()),
        _ => Err(MooreError::InvalidArgument(out_of_range)),
    }
}

/// Points `sources[in_offset..in_offset + width]` at consecutive output bits
/// of `from`, starting at `out_offset`. Prior sources are overwritten.
pub(crate) fn rewire(
    sources: &mut [Option<Source>],
    in_offset: usize,
    from: AutomatonId,
    out_offset: usize,
    width: usize,
) {
    for (i, slot) in sources[in_offset..in_offset + width].iter_mut().enumerate() {
        *slot = Some(Source {
            automaton: from,
            bit: out_offset + i,
        });
    }
}

/// Marks `sources[in_offset..in_offset + width]` unconnected.
pub(crate) fn clear(sources: &mut [Option<Source>], in_offset: usize, width: usize) {
    sources[in_offset..in_offset + width].fill(None);
}

/// Unconnects every descriptor naming `removed`. Returns how many were cut.
pub(crate) fn sever(sources: &mut [Option<Source>], removed: AutomatonId) -> usize {
    let mut cut = 0;
    for slot in sources.iter_mut() {
        if slot.is_some_and(|s| s.automaton == removed) {
            *slot = None;
            cut += 1;
        }
    }
    cut
}

/// Returns `true` if any descriptor names `from`.
pub(crate) fn reads_from(sources: &[Option<Source>], from: AutomatonId) -> bool {
    sources
        .iter()
        .any(|slot| slot.is_some_and(|s| s.automaton == from))
}
