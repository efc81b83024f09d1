// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Named network profiles and the storage port behind them.
//!
//! A profile is a [`NetworkConfig`] persisted as JSON under
//! `network/<profile>`. Tools load a profile, falling back to
//! [`NetworkConfig::default`] when none was saved, and build an empty
//! [`Network`] from it.

use moore_core::{MooreError, Network, NetworkConfig};
use thiserror::Error;
use tracing::debug;

/// Profile used when a tool does not name one.
pub const DEFAULT_PROFILE: &str = "default";

/// Storage port for raw profile blobs.
pub trait ProfileStore {
    /// Reads the blob stored under `key`, or `None` if nothing is stored.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ConfigError>;
    /// Replaces the blob stored under `key`.
    fn write(&self, key: &str, blob: &[u8]) -> Result<(), ConfigError>;
}

/// Errors raised while loading, saving or applying a profile.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The profile name is empty or contains `/`.
    #[error("invalid profile name: {0:?}")]
    InvalidProfile(String),
    /// Backing storage could not be read or written.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Stored bytes are not a valid profile.
    #[error("malformed profile: {0}")]
    Json(#[from] serde_json::Error),
    /// The profile was loaded but the network could not be built from it.
    #[error("network error: {0}")]
    Network(#[from] MooreError),
    /// Store-specific failure.
    #[error("store error: {0}")]
    Store(String),
}

/// Storage key for `profile`.
pub fn profile_key(profile: &str) -> Result<String, ConfigError> {
    if profile.is_empty() || profile.contains('/') {
        return Err(ConfigError::InvalidProfile(profile.to_owned()));
    }
    Ok(format!("network/{profile}"))
}

/// Loads, saves and applies named [`NetworkConfig`] profiles.
pub struct NetworkProfiles<S> {
    store: S,
}

impl<S> NetworkProfiles<S> {
    /// Wraps `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the wrapped store.
    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S: ProfileStore> NetworkProfiles<S> {
    /// Loads `profile`, or the default configuration if it was never saved.
    ///
    /// An empty blob counts as never saved. Fields missing from a stored
    /// profile take their default values.
    pub fn load(&self, profile: &str) -> Result<NetworkConfig, ConfigError> {
        let key = profile_key(profile)?;
        match self.store.read(&key)? {
            Some(blob) if !blob.is_empty() => Ok(serde_json::from_slice(&blob)?),
            _ => {
                debug!(profile, "no stored network profile; using defaults");
                Ok(NetworkConfig::default())
            }
        }
    }

    /// Saves `config` as `profile`, replacing any earlier version.
    pub fn save(&self, profile: &str, config: &NetworkConfig) -> Result<(), ConfigError> {
        let key = profile_key(profile)?;
        let blob = serde_json::to_vec_pretty(config)?;
        self.store.write(&key, &blob)?;
        debug!(profile, bytes = blob.len(), "network profile saved");
        Ok(())
    }

    /// Builds an empty [`Network`] configured by `profile`.
    pub fn build(&self, profile: &str) -> Result<Network, ConfigError> {
        let config = self.load(profile)?;
        Ok(Network::with_config(config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_names_map_to_namespaced_keys() {
        assert!(matches!(profile_key("bench").as_deref(), Ok("network/bench")));
        assert!(matches!(profile_key(""), Err(ConfigError::InvalidProfile(_))));
        assert!(matches!(
            profile_key("a/b"),
            Err(ConfigError::InvalidProfile(_))
        ));
    }
}
