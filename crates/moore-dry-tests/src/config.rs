// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory profile store fake for testing without filesystem I/O.

use moore_app_core::config::{ConfigError, ProfileStore};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-memory [`ProfileStore`] shared between clones.
///
/// Counts reads and writes and can be switched into failing mode, so tests
/// cover both the happy path and storage errors of `NetworkProfiles`.
///
/// # Example
///
/// ```
/// use moore_app_core::config::NetworkProfiles;
/// use moore_core::NetworkConfig;
/// use moore_dry_tests::InMemoryProfileStore;
///
/// let store = InMemoryProfileStore::new();
/// let profiles = NetworkProfiles::new(store.clone());
///
/// let cfg = NetworkConfig::default().with_initial_capacity(32);
/// profiles.save("bench", &cfg).unwrap();
/// assert_eq!(profiles.load("bench").unwrap(), cfg);
/// assert_eq!((store.reads(), store.writes()), (1, 1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    state: Arc<Mutex<StoreState>>,
}

#[derive(Debug, Default)]
struct StoreState {
    blobs: BTreeMap<String, Vec<u8>>,
    reads: usize,
    writes: usize,
    fail_reads: bool,
    fail_writes: bool,
}

impl InMemoryProfileStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `blob` under `key` directly, bypassing the counters.
    pub fn with_blob(self, key: &str, blob: &[u8]) -> Self {
        self.state().blobs.insert(key.to_owned(), blob.to_vec());
        self
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Makes every later `read` fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    /// Makes every later `write` fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// `read` calls so far, failed ones included.
    pub fn reads(&self) -> usize {
        self.state().reads
    }

    /// `write` calls so far, failed ones included.
    pub fn writes(&self) -> usize {
        self.state().writes
    }

    /// Returns a copy of the blob under `key`.
    pub fn blob(&self, key: &str) -> Option<Vec<u8>> {
        self.state().blobs.get(key).cloned()
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ConfigError> {
        let mut state = self.state();
        state.reads += 1;
        if state.fail_reads {
            return Err(ConfigError::Store("simulated read failure".into()));
        }
        Ok(state.blobs.get(key).cloned())
    }

    fn write(&self, key: &str, blob: &[u8]) -> Result<(), ConfigError> {
        let mut state = self.state();
        state.writes += 1;
        if state.fail_writes {
            return Err(ConfigError::Store("simulated write failure".into()));
        }
        state.blobs.insert(key.to_owned(), blob.to_vec());
        Ok(())
    }
}
