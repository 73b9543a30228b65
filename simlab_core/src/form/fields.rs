//! Field identifiers for the scenario form.
//!
//! Front ends address form inputs through these enums rather than raw
//! strings. Each identifier has a stable snake_case key so dynamic callers
//! (the CLI, JSON patches) can map user input onto a field.

use serde::{Deserialize, Serialize};

/// A free-text input on the scenario form.
///
/// # Example
/// ```
/// use simlab_core::form::Field;
///
/// assert_eq!(Field::from_key("patient_age"), Some(Field::PatientAge));
/// assert_eq!(Field::PatientAge.key(), "patient_age");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    // Identification
    Title,
    TargetAudience,
    Duration,
    ScenarioType,
    Complexity,
    // Patient profile
    PatientName,
    PatientAge,
    PatientSex,
    PatientWeight,
    ChiefComplaint,
    HistoryNotes,
    // Briefs
    ClinicalCase,
    StudentBrief,
    FacilitatorNotes,
    // SMART objective
    SmartSpecific,
    SmartMeasurable,
    SmartAchievable,
    SmartRelevant,
    SmartTimeBound,
}

impl Field {
    /// All text fields in form order
    pub const ALL: [Field; 19] = [
        Field::Title,
        Field::TargetAudience,
        Field::Duration,
        Field::ScenarioType,
        Field::Complexity,
        Field::PatientName,
        Field::PatientAge,
        Field::PatientSex,
        Field::PatientWeight,
        Field::ChiefComplaint,
        Field::HistoryNotes,
        Field::ClinicalCase,
        Field::StudentBrief,
        Field::FacilitatorNotes,
        Field::SmartSpecific,
        Field::SmartMeasurable,
        Field::SmartAchievable,
        Field::SmartRelevant,
        Field::SmartTimeBound,
    ];

    /// Stable snake_case key
    pub fn key(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::TargetAudience => "target_audience",
            Field::Duration => "duration",
            Field::ScenarioType => "scenario_type",
            Field::Complexity => "complexity",
            Field::PatientName => "patient_name",
            Field::PatientAge => "patient_age",
            Field::PatientSex => "patient_sex",
            Field::PatientWeight => "patient_weight",
            Field::ChiefComplaint => "chief_complaint",
            Field::HistoryNotes => "history_notes",
            Field::ClinicalCase => "clinical_case",
            Field::StudentBrief => "student_brief",
            Field::FacilitatorNotes => "facilitator_notes",
            Field::SmartSpecific => "smart_specific",
            Field::SmartMeasurable => "smart_measurable",
            Field::SmartAchievable => "smart_achievable",
            Field::SmartRelevant => "smart_relevant",
            Field::SmartTimeBound => "smart_time_bound",
        }
    }

    /// Look up a field by its key
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.key() == key)
    }

    /// Human-readable label, used in validation messages and prompts
    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::TargetAudience => "Target audience",
            Field::Duration => "Estimated duration",
            Field::ScenarioType => "Scenario type",
            Field::Complexity => "Complexity",
            Field::PatientName => "Patient name",
            Field::PatientAge => "Patient age",
            Field::PatientSex => "Patient sex",
            Field::PatientWeight => "Patient weight",
            Field::ChiefComplaint => "Chief complaint",
            Field::HistoryNotes => "History notes",
            Field::ClinicalCase => "Clinical case",
            Field::StudentBrief => "Student brief",
            Field::FacilitatorNotes => "Facilitator notes",
            Field::SmartSpecific => "Specific",
            Field::SmartMeasurable => "Measurable",
            Field::SmartAchievable => "Achievable",
            Field::SmartRelevant => "Relevant",
            Field::SmartTimeBound => "Time-bound",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A checkbox in the patient's medical history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryFlag {
    Hypertension,
    Diabetes,
    Asthma,
    Cardiopathy,
    Smoker,
    KnownAllergies,
}

impl HistoryFlag {
    pub const ALL: [HistoryFlag; 6] = [
        HistoryFlag::Hypertension,
        HistoryFlag::Diabetes,
        HistoryFlag::Asthma,
        HistoryFlag::Cardiopathy,
        HistoryFlag::Smoker,
        HistoryFlag::KnownAllergies,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            HistoryFlag::Hypertension => "hypertension",
            HistoryFlag::Diabetes => "diabetes",
            HistoryFlag::Asthma => "asthma",
            HistoryFlag::Cardiopathy => "cardiopathy",
            HistoryFlag::Smoker => "smoker",
            HistoryFlag::KnownAllergies => "known_allergies",
        }
    }

    pub fn from_key(key: &str) -> Option<HistoryFlag> {
        HistoryFlag::ALL.iter().copied().find(|f| f.key() == key)
    }
}

/// One of the ordered objective lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListField {
    TechnicalObjectives,
    NonTechnicalObjectives,
}

impl ListField {
    pub fn key(&self) -> &'static str {
        match self {
            ListField::TechnicalObjectives => "technical_objectives",
            ListField::NonTechnicalObjectives => "non_technical_objectives",
        }
    }

    pub fn from_key(key: &str) -> Option<ListField> {
        match key {
            "technical_objectives" | "technical" => Some(ListField::TechnicalObjectives),
            "non_technical_objectives" | "non_technical" => Some(ListField::NonTechnicalObjectives),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keys_roundtrip() {
        for field in Field::ALL {
            assert_eq!(Field::from_key(field.key()), Some(field));
        }
        assert_eq!(Field::from_key("nonexistent"), None);
    }

    #[test]
    fn test_field_serialization_matches_key() {
        let json = serde_json::to_string(&Field::SmartTimeBound).unwrap();
        assert_eq!(json, "\"smart_time_bound\"");
    }

    #[test]
    fn test_history_flag_keys() {
        for flag in HistoryFlag::ALL {
            assert_eq!(HistoryFlag::from_key(flag.key()), Some(flag));
        }
    }

    #[test]
    fn test_list_field_aliases() {
        assert_eq!(ListField::from_key("technical"), Some(ListField::TechnicalObjectives));
        assert_eq!(
            ListField::from_key("non_technical_objectives"),
            Some(ListField::NonTechnicalObjectives)
        );
        assert_eq!(ListField::from_key("equipment"), None);
    }
}
