//! # Scenario Aggregate
//!
//! The `Scenario` struct is the root container for one authored simulation
//! case. It is what the wizard edits, what the repository stores, and what
//! gets exported to `.simlab` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Scenario
//! ├── meta: ScenarioMetadata (version, id, status, author, timestamps)
//! ├── form: ScenarioFormData (identification, patient, objectives, equipment)
//! ├── frames: FrameSequence (ordered frames + transition graph)
//! └── debriefing: Option<DebriefingTemplate>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use simlab_core::form::Field;
//! use simlab_core::frames::Frame;
//! use simlab_core::scenario::Scenario;
//!
//! let mut scenario = Scenario::new("Dra. Ana");
//! scenario.set_field(Field::Title, "PCR em AESP");
//! scenario.add_frame(Frame::new("Initial assessment"));
//!
//! let json = serde_json::to_string_pretty(&scenario).unwrap();
//! assert!(json.contains("PCR em AESP"));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::checklists::DebriefingTemplate;
use crate::equipment::EquipmentItem;
use crate::errors::SimResult;
use crate::form::{Field, HistoryFlag, ListField, ScenarioFormData};
use crate::frames::{Frame, FrameId, FrameSequence, Transition};

/// Current schema version for stored scenarios and `.simlab` files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Publication state of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    #[default]
    Draft,
    Published,
}

impl ScenarioStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            ScenarioStatus::Draft => "Draft",
            ScenarioStatus::Published => "Published",
        }
    }
}

impl std::fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Scenario metadata stored alongside the form body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    pub id: Uuid,

    #[serde(default)]
    pub status: ScenarioStatus,

    /// Who authored the scenario
    #[serde(default)]
    pub author: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,

    /// When the scenario was last published
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
}

/// Root scenario container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub meta: ScenarioMetadata,

    #[serde(default)]
    pub form: ScenarioFormData,

    #[serde(default)]
    pub frames: FrameSequence,

    #[serde(default)]
    pub debriefing: Option<DebriefingTemplate>,
}

impl Scenario {
    /// Create a new empty draft.
    ///
    /// # Example
    ///
    /// ```rust
    /// use simlab_core::scenario::{Scenario, ScenarioStatus};
    ///
    /// let scenario = Scenario::new("Dr. Silva");
    /// assert_eq!(scenario.meta.status, ScenarioStatus::Draft);
    /// assert!(scenario.frames.is_empty());
    /// ```
    pub fn new(author: impl Into<String>) -> Self {
        let now = Utc::now();
        Scenario {
            meta: ScenarioMetadata {
                version: SCHEMA_VERSION.to_string(),
                id: Uuid::new_v4(),
                status: ScenarioStatus::Draft,
                author: author.into(),
                created: now,
                modified: now,
                published: None,
            },
            form: ScenarioFormData::default(),
            frames: FrameSequence::default(),
            debriefing: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.meta.id
    }

    pub fn title(&self) -> &str {
        &self.form.identification.title
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        debug!(field = field.key(), "set field");
        self.form.set_field(field, value);
        self.touch();
    }

    pub fn set_history_flag(&mut self, flag: HistoryFlag, value: bool) {
        self.form.set_history_flag(flag, value);
        self.touch();
    }

    /// Add an objective; see [`ScenarioFormData::add_to_list`].
    pub fn add_to_list(&mut self, list: ListField, item: impl Into<String>) -> bool {
        let added = self.form.add_to_list(list, item);
        if added {
            self.touch();
        }
        added
    }

    pub fn remove_from_list<F>(&mut self, list: ListField, predicate: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let removed = self.form.remove_from_list(list, predicate);
        if removed > 0 {
            self.touch();
        }
        removed
    }

    pub fn add_equipment(&mut self, item: EquipmentItem) -> Uuid {
        let id = self.form.add_equipment(item);
        self.touch();
        id
    }

    pub fn remove_equipment(&mut self, id: &Uuid) -> Option<EquipmentItem> {
        let item = self.form.remove_equipment(id);
        if item.is_some() {
            self.touch();
        }
        item
    }

    pub fn add_frame(&mut self, frame: Frame) -> FrameId {
        let id = self.frames.add(frame);
        self.touch();
        id
    }

    pub fn remove_frame(&mut self, id: FrameId) -> Option<Frame> {
        let frame = self.frames.remove(id);
        if frame.is_some() {
            self.touch();
        }
        frame
    }

    pub fn frame(&self, id: FrameId) -> Option<&Frame> {
        self.frames.get(id)
    }

    /// Get a mutable reference to a frame.
    ///
    /// Like the other setters, this marks the scenario as modified when the
    /// frame exists.
    pub fn frame_mut(&mut self, id: FrameId) -> Option<&mut Frame> {
        if self.frames.get(id).is_some() {
            self.touch();
        }
        self.frames.get_mut(id)
    }

    pub fn move_frame(&mut self, id: FrameId, index: usize) -> SimResult<()> {
        self.frames.move_to(id, index)?;
        self.touch();
        Ok(())
    }

    pub fn duplicate_frame(&mut self, id: FrameId) -> SimResult<FrameId> {
        let copy = self.frames.duplicate(id)?;
        self.touch();
        Ok(copy)
    }

    pub fn add_transition(&mut self, from: FrameId, transition: Transition) -> SimResult<()> {
        self.frames.add_transition(from, transition)?;
        self.touch();
        Ok(())
    }

    pub fn remove_transition(&mut self, from: FrameId, to: FrameId) -> bool {
        let removed = self.frames.remove_transition(from, to);
        if removed {
            self.touch();
        }
        removed
    }

    pub fn set_debriefing(&mut self, template: Option<DebriefingTemplate>) {
        self.debriefing = template;
        self.touch();
    }

    pub fn is_published(&self) -> bool {
        self.meta.status == ScenarioStatus::Published
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklists::DebriefingModel;
    use crate::frames::ParameterSet;

    #[test]
    fn test_scenario_creation() {
        let scenario = Scenario::new("Dra. Ana");
        assert_eq!(scenario.meta.author, "Dra. Ana");
        assert_eq!(scenario.meta.version, SCHEMA_VERSION);
        assert_eq!(scenario.meta.status, ScenarioStatus::Draft);
        assert!(scenario.meta.published.is_none());
        assert!(scenario.title().is_empty());
    }

    #[test]
    fn test_setters_touch_modified() {
        let mut scenario = Scenario::new("Author");
        let created = scenario.meta.modified;
        std::thread::sleep(std::time::Duration::from_millis(2));
        scenario.set_field(Field::Title, "Choque anafilático");
        assert!(scenario.meta.modified > created);
        assert_eq!(scenario.title(), "Choque anafilático");
    }

    #[test]
    fn test_rejected_duplicate_does_not_touch() {
        let mut scenario = Scenario::new("Author");
        scenario.add_to_list(ListField::TechnicalObjectives, "Recognize anaphylaxis");
        let stamp = scenario.meta.modified;
        assert!(!scenario.add_to_list(ListField::TechnicalObjectives, "Recognize anaphylaxis"));
        assert_eq!(scenario.meta.modified, stamp);
    }

    #[test]
    fn test_scenario_serialization_roundtrip() {
        let mut scenario = Scenario::new("Author");
        scenario.set_field(Field::Title, "Sepse");
        scenario.set_field(Field::PatientAge, "72");
        scenario.set_history_flag(HistoryFlag::Diabetes, true);
        scenario.add_equipment(EquipmentItem::new("Infusion pump").with_quantity(2));
        let a = scenario.add_frame(Frame::new("Triage").with_parameters(ParameterSet {
            temperature_c: Some(39.2),
            ..Default::default()
        }));
        let b = scenario.add_frame(Frame::new("Septic shock"));
        scenario.add_transition(a, Transition::new(b, "No fluids in 10 min")).unwrap();
        scenario.set_debriefing(Some(DebriefingTemplate::blank(DebriefingModel::Pearls)));

        let json = serde_json::to_string_pretty(&scenario).unwrap();
        assert!(json.contains("\"status\": \"draft\""));
        let roundtrip: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, scenario);
    }

    #[test]
    fn test_minimal_json_defaults() {
        let json = format!(
            r#"{{"meta": {{"version": "0.1.0", "id": "{}", "created": "2025-01-01T00:00:00Z", "modified": "2025-01-01T00:00:00Z"}}}}"#,
            Uuid::new_v4()
        );
        let scenario: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(scenario.meta.status, ScenarioStatus::Draft);
        assert!(scenario.frames.is_empty());
        assert!(scenario.debriefing.is_none());
    }
}
