// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Network construction settings.

/// Tuning knobs for a [`crate::Network`].
///
/// Neither setting changes simulation results; both only move allocations
/// from the first `create`/`connect` calls up front into
/// [`crate::Network::with_config`] and automaton construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NetworkConfig {
    /// Arena slots reserved when the network is built.
    pub initial_capacity: usize,
    /// Entries pre-reserved in each automaton's parent and child sets.
    pub registry_capacity: usize,
}

impl NetworkConfig {
    /// Sets [`Self::initial_capacity`].
    pub const fn with_initial_capacity(mut self, slots: usize) -> Self {
        self.initial_capacity = slots;
        self
    }

    /// Sets [`Self::registry_capacity`].
    pub const fn with_registry_capacity(mut self, entries: usize) -> Self {
        self.registry_capacity = entries;
        self
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: NetworkConfig = serde_json::from_str(r#"{"initial_capacity": 16}"#).unwrap();
        assert_eq!(cfg, NetworkConfig::default().with_initial_capacity(16));
    }
}
