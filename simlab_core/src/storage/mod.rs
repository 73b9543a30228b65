//! # Storage
//!
//! A small key-value keyspace standing in for browser local storage, and the
//! scenario repository built on top of it.
//!
//! - [`KeyValueStore`] - string keys to JSON string values, unconditional
//!   overwrite, no transactions
//! - [`MemoryStorage`] - in-process map, used by tests and embedders
//! - [`FileStorage`] - one JSON file per key in a directory, atomic writes
//! - [`ScenarioRepository`] / [`ScenarioStore`] - typed access to scenarios
//!
//! ## Keys
//!
//! | Key | Contents |
//! |---|---|
//! | `simlab.scenario.draft` | latest saved draft (last write wins) |
//! | `simlab.scenario.<id>` | per-scenario record |
//! | `simlab.scenario.published.<id>` | published snapshot |
//! | `simlab.checklists` | JSON array of checklist records |
//! | `simlab.user` | logged-in user object |

mod file_store;
mod repository;

pub use file_store::FileStorage;
pub use repository::{ScenarioFilter, ScenarioRepository, ScenarioStore, ScenarioSummary};

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{SimError, SimResult};

/// Latest saved draft, overwritten on every save
pub const DRAFT_KEY: &str = "simlab.scenario.draft";
/// Prefix of per-scenario records
pub const SCENARIO_PREFIX: &str = "simlab.scenario.";
/// Prefix of published snapshots
pub const PUBLISHED_PREFIX: &str = "simlab.scenario.published.";
/// Flat list of checklist records
pub const CHECKLISTS_KEY: &str = "simlab.checklists";
/// Logged-in user
pub const USER_KEY: &str = "simlab.user";

/// String-keyed store of JSON documents.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> SimResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&mut self, key: &str, value: &str) -> SimResult<()>;

    /// Returns whether a value was present
    fn remove(&mut self, key: &str) -> SimResult<bool>;

    /// All keys, sorted
    fn keys(&self) -> SimResult<Vec<String>>;

    /// Read and deserialize a JSON value
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> SimResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| SimError::serialization(format!("Invalid JSON under '{}': {}", key, e))),
            None => Ok(None),
        }
    }

    /// Serialize and store a JSON value
    fn set_json<T: Serialize>(&mut self, key: &str, value: &T) -> SimResult<()>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string_pretty(value).map_err(SimError::serialization)?;
        self.set(key, &raw)
    }
}

impl<S: KeyValueStore> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> SimResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> SimResult<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> SimResult<bool> {
        (**self).remove(key)
    }

    fn keys(&self) -> SimResult<Vec<String>> {
        (**self).keys()
    }
}

/// In-memory key-value store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> SimResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> SimResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> SimResult<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self) -> SimResult<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}
