//! # Scenario Form Data
//!
//! The editable body of a scenario: identification, patient profile,
//! briefs, objectives and equipment. Every input is stored exactly as typed.
//! Nothing is validated at write time; an empty title or a half-filled
//! patient profile is a perfectly representable draft, and only the
//! [`validation`](crate::validation) module decides whether it is complete.
//!
//! ## Structure
//!
//! ```text
//! ScenarioFormData
//! ├── identification: Identification (title, audience, duration, type, complexity)
//! ├── patient: PatientProfile (demographics, history flags, notes)
//! ├── briefs: Briefs (clinical case, student brief, facilitator notes)
//! ├── smart: SmartObjective (S, M, A, R, T)
//! ├── technical_objectives: Vec<String>
//! ├── non_technical_objectives: Vec<String>
//! └── equipment: Vec<EquipmentItem>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use simlab_core::form::{Field, ListField, ScenarioFormData};
//!
//! let mut form = ScenarioFormData::default();
//! form.set_field(Field::Title, "PCR em AESP");
//! assert!(form.add_to_list(ListField::TechnicalObjectives, "Start CPR within 10 s"));
//! assert!(!form.add_to_list(ListField::TechnicalObjectives, "Start CPR within 10 s"));
//! assert_eq!(form.text(Field::Title), "PCR em AESP");
//! ```

mod fields;

pub use fields::{Field, HistoryFlag, ListField};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::equipment::EquipmentItem;

/// Identification tab inputs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identification {
    pub title: String,
    pub target_audience: String,
    /// Estimated duration as typed (e.g. "30 min")
    pub duration: String,
    pub scenario_type: String,
    pub complexity: String,
}

/// Medical history checkboxes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalHistory {
    pub hypertension: bool,
    pub diabetes: bool,
    pub asthma: bool,
    pub cardiopathy: bool,
    pub smoker: bool,
    pub known_allergies: bool,
}

impl MedicalHistory {
    pub fn get(&self, flag: HistoryFlag) -> bool {
        match flag {
            HistoryFlag::Hypertension => self.hypertension,
            HistoryFlag::Diabetes => self.diabetes,
            HistoryFlag::Asthma => self.asthma,
            HistoryFlag::Cardiopathy => self.cardiopathy,
            HistoryFlag::Smoker => self.smoker,
            HistoryFlag::KnownAllergies => self.known_allergies,
        }
    }

    pub fn set(&mut self, flag: HistoryFlag, value: bool) {
        let slot = match flag {
            HistoryFlag::Hypertension => &mut self.hypertension,
            HistoryFlag::Diabetes => &mut self.diabetes,
            HistoryFlag::Asthma => &mut self.asthma,
            HistoryFlag::Cardiopathy => &mut self.cardiopathy,
            HistoryFlag::Smoker => &mut self.smoker,
            HistoryFlag::KnownAllergies => &mut self.known_allergies,
        };
        *slot = value;
    }

    /// Flags currently checked, in form order
    pub fn active_flags(&self) -> Vec<HistoryFlag> {
        HistoryFlag::ALL.iter().copied().filter(|f| self.get(*f)).collect()
    }
}

/// Patient profile tab inputs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientProfile {
    pub name: String,
    pub age: String,
    pub sex: String,
    pub weight: String,
    pub chief_complaint: String,
    pub history: MedicalHistory,
    pub history_notes: String,
}

/// Free-text briefs read before and during the session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Briefs {
    pub clinical_case: String,
    pub student_brief: String,
    pub facilitator_notes: String,
}

/// SMART learning objective
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartObjective {
    pub specific: String,
    pub measurable: String,
    pub achievable: String,
    pub relevant: String,
    pub time_bound: String,
}

/// The editable body of a scenario draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioFormData {
    pub identification: Identification,
    pub patient: PatientProfile,
    pub briefs: Briefs,
    pub smart: SmartObjective,
    pub technical_objectives: Vec<String>,
    pub non_technical_objectives: Vec<String>,
    pub equipment: Vec<EquipmentItem>,
}

impl ScenarioFormData {
    /// Read a text field
    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.identification.title,
            Field::TargetAudience => &self.identification.target_audience,
            Field::Duration => &self.identification.duration,
            Field::ScenarioType => &self.identification.scenario_type,
            Field::Complexity => &self.identification.complexity,
            Field::PatientName => &self.patient.name,
            Field::PatientAge => &self.patient.age,
            Field::PatientSex => &self.patient.sex,
            Field::PatientWeight => &self.patient.weight,
            Field::ChiefComplaint => &self.patient.chief_complaint,
            Field::HistoryNotes => &self.patient.history_notes,
            Field::ClinicalCase => &self.briefs.clinical_case,
            Field::StudentBrief => &self.briefs.student_brief,
            Field::FacilitatorNotes => &self.briefs.facilitator_notes,
            Field::SmartSpecific => &self.smart.specific,
            Field::SmartMeasurable => &self.smart.measurable,
            Field::SmartAchievable => &self.smart.achievable,
            Field::SmartRelevant => &self.smart.relevant,
            Field::SmartTimeBound => &self.smart.time_bound,
        }
    }

    fn text_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.identification.title,
            Field::TargetAudience => &mut self.identification.target_audience,
            Field::Duration => &mut self.identification.duration,
            Field::ScenarioType => &mut self.identification.scenario_type,
            Field::Complexity => &mut self.identification.complexity,
            Field::PatientName => &mut self.patient.name,
            Field::PatientAge => &mut self.patient.age,
            Field::PatientSex => &mut self.patient.sex,
            Field::PatientWeight => &mut self.patient.weight,
            Field::ChiefComplaint => &mut self.patient.chief_complaint,
            Field::HistoryNotes => &mut self.patient.history_notes,
            Field::ClinicalCase => &mut self.briefs.clinical_case,
            Field::StudentBrief => &mut self.briefs.student_brief,
            Field::FacilitatorNotes => &mut self.briefs.facilitator_notes,
            Field::SmartSpecific => &mut self.smart.specific,
            Field::SmartMeasurable => &mut self.smart.measurable,
            Field::SmartAchievable => &mut self.smart.achievable,
            Field::SmartRelevant => &mut self.smart.relevant,
            Field::SmartTimeBound => &mut self.smart.time_bound,
        }
    }

    /// Replace one text field. No trimming, coercion or validation.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        *self.text_mut(field) = value.into();
    }

    /// Whether a text field holds anything other than whitespace
    pub fn is_filled(&self, field: Field) -> bool {
        !self.text(field).trim().is_empty()
    }

    pub fn set_history_flag(&mut self, flag: HistoryFlag, value: bool) {
        self.patient.history.set(flag, value);
    }

    /// The objective list addressed by `list`
    pub fn list(&self, list: ListField) -> &[String] {
        match list {
            ListField::TechnicalObjectives => &self.technical_objectives,
            ListField::NonTechnicalObjectives => &self.non_technical_objectives,
        }
    }

    fn list_mut(&mut self, list: ListField) -> &mut Vec<String> {
        match list {
            ListField::TechnicalObjectives => &mut self.technical_objectives,
            ListField::NonTechnicalObjectives => &mut self.non_technical_objectives,
        }
    }

    /// Append an item to an objective list.
    ///
    /// Returns `false` (and leaves the list untouched) when an equal string
    /// is already present.
    pub fn add_to_list(&mut self, list: ListField, item: impl Into<String>) -> bool {
        let item = item.into();
        let target = self.list_mut(list);
        if target.iter().any(|existing| *existing == item) {
            return false;
        }
        target.push(item);
        true
    }

    /// Remove every entry matching `predicate`; returns how many were removed.
    pub fn remove_from_list<F>(&mut self, list: ListField, mut predicate: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let target = self.list_mut(list);
        let before = target.len();
        target.retain(|item| !predicate(item));
        before - target.len()
    }

    /// Total objective count across both lists
    pub fn objective_count(&self) -> usize {
        self.technical_objectives.len() + self.non_technical_objectives.len()
    }

    /// Append an equipment item. Items are compared by id only.
    pub fn add_equipment(&mut self, item: EquipmentItem) -> Uuid {
        let id = item.id;
        self.equipment.push(item);
        id
    }

    /// Remove the equipment item with `id`, if present.
    pub fn remove_equipment(&mut self, id: &Uuid) -> Option<EquipmentItem> {
        let index = self.equipment.iter().position(|item| item.id == *id)?;
        Some(self.equipment.remove(index))
    }

    pub fn equipment_item(&self, id: &Uuid) -> Option<&EquipmentItem> {
        self.equipment.iter().find(|item| item.id == *id)
    }

    pub fn equipment_item_mut(&mut self, id: &Uuid) -> Option<&mut EquipmentItem> {
        self.equipment.iter_mut().find(|item| item.id == *id)
    }
}
