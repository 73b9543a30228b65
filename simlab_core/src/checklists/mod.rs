//! # Checklists
//!
//! Reusable materials checklists and debriefing templates, kept as a flat
//! JSON list under [`CHECKLISTS_KEY`](crate::storage::CHECKLISTS_KEY).

mod debriefing;

pub use debriefing::{DebriefingModel, DebriefingTemplate};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{SimError, SimResult};
use crate::storage::{KeyValueStore, CHECKLISTS_KEY};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub label: String,
    #[serde(default)]
    pub checked: bool,
}

impl ChecklistItem {
    pub fn new(label: impl Into<String>) -> Self {
        ChecklistItem {
            label: label.into(),
            checked: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChecklistSection {
    pub title: String,
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
}

/// Free-form materials checklist: titled sections of checkable items
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MaterialsChecklist {
    #[serde(default)]
    pub sections: Vec<ChecklistSection>,
}

impl MaterialsChecklist {
    /// Append an item to the section titled `section`, creating the section if needed
    pub fn add_item(&mut self, section: &str, label: impl Into<String>) {
        let item = ChecklistItem::new(label);
        match self.sections.iter_mut().find(|s| s.title == section) {
            Some(existing) => existing.items.push(item),
            None => self.sections.push(ChecklistSection {
                title: section.to_string(),
                items: vec![item],
            }),
        }
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    pub fn checked_count(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| s.items.iter())
            .filter(|i| i.checked)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload")]
pub enum ChecklistKind {
    Materials(MaterialsChecklist),
    Debriefing(DebriefingTemplate),
}

impl ChecklistKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ChecklistKind::Materials(_) => "Materials",
            ChecklistKind::Debriefing(_) => "Debriefing",
        }
    }
}

/// Stored checklist record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    pub id: Uuid,
    pub title: String,
    pub created: DateTime<Utc>,
    pub kind: ChecklistKind,
}

/// Checklist records over a [`KeyValueStore`].
pub struct ChecklistBook<S> {
    storage: S,
}

impl<S: KeyValueStore> ChecklistBook<S> {
    pub fn new(storage: S) -> Self {
        ChecklistBook { storage }
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    /// All records. A missing key is an empty list; so is an unreadable one.
    pub fn list(&self) -> SimResult<Vec<Checklist>> {
        match self.storage.get_json::<Vec<Checklist>>(CHECKLISTS_KEY) {
            Ok(records) => Ok(records.unwrap_or_default()),
            Err(SimError::SerializationError { reason }) => {
                warn!(%reason, "checklist list unreadable, treating as empty");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    pub fn get(&self, id: &Uuid) -> SimResult<Option<Checklist>> {
        Ok(self.list()?.into_iter().find(|c| c.id == *id))
    }

    pub fn create(&mut self, title: impl Into<String>, kind: ChecklistKind) -> SimResult<Checklist> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(SimError::missing_field("title"));
        }
        let record = Checklist {
            id: Uuid::new_v4(),
            title,
            created: Utc::now(),
            kind,
        };
        let mut records = self.list()?;
        records.push(record.clone());
        self.storage.set_json(CHECKLISTS_KEY, &records)?;
        debug!(id = %record.id, kind = record.kind.display_name(), "checklist created");
        Ok(record)
    }

    pub fn delete(&mut self, id: &Uuid) -> SimResult<bool> {
        let mut records = self.list()?;
        let before = records.len();
        records.retain(|c| c.id != *id);
        if records.len() == before {
            return Ok(false);
        }
        self.storage.set_json(CHECKLISTS_KEY, &records)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn crash_cart() -> ChecklistKind {
        let mut materials = MaterialsChecklist::default();
        materials.add_item("Via aérea", "Bolsa-válvula-máscara");
        materials.add_item("Via aérea", "Laringoscópio");
        materials.add_item("Drogas", "Adrenalina 1mg");
        ChecklistKind::Materials(materials)
    }

    #[test]
    fn test_list_is_empty_before_first_create() {
        let storage = MemoryStorage::new();
        let book = ChecklistBook::new(storage);
        assert!(book.list().unwrap().is_empty());
        assert!(book.into_inner().is_empty());
    }

    #[test]
    fn test_create_get_delete() {
        let mut book = ChecklistBook::new(MemoryStorage::new());
        let created = book.create("Carrinho de parada", crash_cart()).unwrap();
        let debrief = book
            .create("PEARLS padrão", ChecklistKind::Debriefing(DebriefingTemplate::blank(DebriefingModel::Pearls)))
            .unwrap();

        assert_eq!(book.list().unwrap().len(), 2);
        let fetched = book.get(&created.id).unwrap().unwrap();
        match &fetched.kind {
            ChecklistKind::Materials(m) => {
                assert_eq!(m.sections.len(), 2);
                assert_eq!(m.item_count(), 3);
                assert_eq!(m.checked_count(), 0);
            }
            other => panic!("unexpected kind {:?}", other),
        }

        assert!(book.delete(&created.id).unwrap());
        assert!(!book.delete(&created.id).unwrap());
        assert_eq!(book.list().unwrap(), vec![debrief]);
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut book = ChecklistBook::new(MemoryStorage::new());
        let err = book.create("  ", crash_cart()).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
    }

    #[test]
    fn test_unreadable_list_treated_as_empty() {
        let mut storage = MemoryStorage::new();
        storage.set(CHECKLISTS_KEY, "not json").unwrap();
        let mut book = ChecklistBook::new(&mut storage);
        assert!(book.list().unwrap().is_empty());

        book.create("Novo", crash_cart()).unwrap();
        assert_eq!(book.list().unwrap().len(), 1);
    }
}
