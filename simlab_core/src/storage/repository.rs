//! Scenario repository over a [`KeyValueStore`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use super::{KeyValueStore, DRAFT_KEY, PUBLISHED_PREFIX, SCENARIO_PREFIX};
use crate::errors::{SimError, SimResult};
use crate::file_io::parse_scenario;
use crate::scenario::{Scenario, ScenarioStatus};

/// Criteria for [`ScenarioRepository::list`]. Empty criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioFilter {
    pub status: Option<ScenarioStatus>,
    /// Case-insensitive substring of the title
    pub title_contains: Option<String>,
    pub author: Option<String>,
}

impl ScenarioFilter {
    pub fn with_status(mut self, status: ScenarioStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_title(mut self, needle: impl Into<String>) -> Self {
        self.title_contains = Some(needle.into());
        self
    }

    pub fn matches(&self, scenario: &Scenario) -> bool {
        if let Some(status) = self.status {
            if scenario.meta.status != status {
                return false;
            }
        }
        if let Some(needle) = &self.title_contains {
            if !scenario.title().to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        if let Some(author) = &self.author {
            if scenario.meta.author != *author {
                return false;
            }
        }
        true
    }
}

/// List-view row for a stored scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub id: Uuid,
    pub title: String,
    pub status: ScenarioStatus,
    pub author: String,
    pub frame_count: usize,
    pub modified: DateTime<Utc>,
}

impl From<&Scenario> for ScenarioSummary {
    fn from(scenario: &Scenario) -> Self {
        ScenarioSummary {
            id: scenario.id(),
            title: scenario.title().to_string(),
            status: scenario.meta.status,
            author: scenario.meta.author.clone(),
            frame_count: scenario.frames.len(),
            modified: scenario.meta.modified,
        }
    }
}

/// Storage-agnostic access to scenarios.
pub trait ScenarioRepository {
    /// Per-id record
    fn get(&self, id: &Uuid) -> SimResult<Option<Scenario>>;

    /// Store the per-id record, replacing any previous version
    fn put(&mut self, scenario: &Scenario) -> SimResult<()>;

    /// Summaries of stored records matching `filter`, most recently modified first
    fn list(&self, filter: &ScenarioFilter) -> SimResult<Vec<ScenarioSummary>>;

    /// Remove the per-id record and its published snapshot
    fn delete(&mut self, id: &Uuid) -> SimResult<bool>;

    /// Overwrite the single latest-draft slot
    fn put_draft(&mut self, scenario: &Scenario) -> SimResult<()>;

    fn latest_draft(&self) -> SimResult<Option<Scenario>>;

    fn put_published(&mut self, scenario: &Scenario) -> SimResult<()>;

    fn get_published(&self, id: &Uuid) -> SimResult<Option<Scenario>>;
}

/// [`ScenarioRepository`] backed by any [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct ScenarioStore<S> {
    storage: S,
}

impl<S: KeyValueStore> ScenarioStore<S> {
    pub fn new(storage: S) -> Self {
        ScenarioStore { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    fn record_key(id: &Uuid) -> String {
        format!("{}{}", SCENARIO_PREFIX, id)
    }

    fn published_key(id: &Uuid) -> String {
        format!("{}{}", PUBLISHED_PREFIX, id)
    }

    fn read(&self, key: &str) -> SimResult<Option<Scenario>> {
        match self.storage.get(key)? {
            Some(raw) => parse_scenario(&raw, key).map(Some),
            None => Ok(None),
        }
    }

    fn write(&mut self, key: &str, scenario: &Scenario) -> SimResult<()> {
        let raw = serde_json::to_string_pretty(scenario).map_err(SimError::serialization)?;
        self.storage.set(key, &raw)
    }

    /// Ids of every per-id record (excluding the draft slot and published snapshots)
    fn record_ids(&self) -> SimResult<Vec<Uuid>> {
        Ok(self
            .storage
            .keys()?
            .into_iter()
            .filter(|k| !k.starts_with(PUBLISHED_PREFIX))
            .filter_map(|k| k.strip_prefix(SCENARIO_PREFIX).and_then(|rest| Uuid::parse_str(rest).ok()))
            .collect())
    }
}

impl<S: KeyValueStore> ScenarioRepository for ScenarioStore<S> {
    fn get(&self, id: &Uuid) -> SimResult<Option<Scenario>> {
        self.read(&Self::record_key(id))
    }

    fn put(&mut self, scenario: &Scenario) -> SimResult<()> {
        self.write(&Self::record_key(&scenario.id()), scenario)?;
        debug!(id = %scenario.id(), "scenario record stored");
        Ok(())
    }

    fn list(&self, filter: &ScenarioFilter) -> SimResult<Vec<ScenarioSummary>> {
        let mut rows = Vec::new();
        for id in self.record_ids()? {
            match self.get(&id) {
                Ok(Some(scenario)) if filter.matches(&scenario) => rows.push(ScenarioSummary::from(&scenario)),
                Ok(_) => {}
                Err(e) => warn!(%id, error = %e, "skipping unreadable scenario record"),
            }
        }
        rows.sort_by(|a, b| b.modified.cmp(&a.modified));
        Ok(rows)
    }

    fn delete(&mut self, id: &Uuid) -> SimResult<bool> {
        let removed = self.storage.remove(&Self::record_key(id))?;
        self.storage.remove(&Self::published_key(id))?;
        if removed {
            debug!(%id, "scenario record deleted");
        }
        Ok(removed)
    }

    fn put_draft(&mut self, scenario: &Scenario) -> SimResult<()> {
        self.write(DRAFT_KEY, scenario)
    }

    fn latest_draft(&self) -> SimResult<Option<Scenario>> {
        self.read(DRAFT_KEY)
    }

    fn put_published(&mut self, scenario: &Scenario) -> SimResult<()> {
        self.write(&Self::published_key(&scenario.id()), scenario)
    }

    fn get_published(&self, id: &Uuid) -> SimResult<Option<Scenario>> {
        self.read(&Self::published_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Field;
    use crate::storage::MemoryStorage;

    fn titled(title: &str) -> Scenario {
        let mut s = Scenario::new("Author");
        s.set_field(Field::Title, title);
        s
    }

    #[test]
    fn test_put_get_roundtrip() {
        let mut repo = ScenarioStore::new(MemoryStorage::new());
        let scenario = titled("Hipoglicemia");
        repo.put(&scenario).unwrap();
        assert_eq!(repo.get(&scenario.id()).unwrap(), Some(scenario));
        assert!(repo.get(&Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_list_filters_and_skips_special_keys() {
        let mut repo = ScenarioStore::new(MemoryStorage::new());
        let a = titled("PCR em AESP");
        let mut b = titled("Anafilaxia");
        b.meta.status = ScenarioStatus::Published;
        repo.put(&a).unwrap();
        repo.put(&b).unwrap();
        repo.put_draft(&a).unwrap();
        repo.put_published(&b).unwrap();

        assert_eq!(repo.list(&ScenarioFilter::default()).unwrap().len(), 2);

        let published = repo
            .list(&ScenarioFilter::default().with_status(ScenarioStatus::Published))
            .unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].title, "Anafilaxia");

        let by_title = repo.list(&ScenarioFilter::default().with_title("aesp")).unwrap();
        assert_eq!(by_title[0].id, a.id());
    }

    #[test]
    fn test_list_skips_corrupt_records() {
        let mut repo = ScenarioStore::new(MemoryStorage::new());
        repo.put(&titled("Ok")).unwrap();
        let bad_key = format!("{}{}", SCENARIO_PREFIX, Uuid::new_v4());
        repo.storage_mut().set(&bad_key, "{broken").unwrap();
        assert_eq!(repo.list(&ScenarioFilter::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_draft_slot_is_last_write_wins() {
        let mut repo = ScenarioStore::new(MemoryStorage::new());
        repo.put_draft(&titled("First")).unwrap();
        repo.put_draft(&titled("Second")).unwrap();
        assert_eq!(repo.latest_draft().unwrap().unwrap().title(), "Second");
    }

    #[test]
    fn test_delete_removes_published_snapshot() {
        let mut repo = ScenarioStore::new(MemoryStorage::new());
        let s = titled("Trauma");
        repo.put(&s).unwrap();
        repo.put_published(&s).unwrap();
        assert!(repo.delete(&s.id()).unwrap());
        assert!(repo.get(&s.id()).unwrap().is_none());
        assert!(repo.get_published(&s.id()).unwrap().is_none());
        assert!(!repo.delete(&s.id()).unwrap());
    }
}
