//! # Validation
//!
//! One validator for every wizard tab, driven by a [`ValidationProfile`]:
//! a mapping from tab to a list of [`Requirement`]s. The lenient and strict
//! rule sets are two profiles of the same engine (see [`profiles`]), so the
//! result contract is always the same structured [`TabReport`].
//!
//! Validators never mutate the scenario.
//!
//! ## Example
//!
//! ```rust
//! use simlab_core::form::Field;
//! use simlab_core::navigator::Tab;
//! use simlab_core::scenario::Scenario;
//! use simlab_core::validation::ValidationProfile;
//!
//! let profile = ValidationProfile::lenient();
//! let mut scenario = Scenario::new("Author");
//!
//! assert!(!profile.validate_tab(Tab::Identification, &scenario).is_valid());
//! scenario.set_field(Field::Title, "PCR em AESP");
//! assert!(profile.validate_tab(Tab::Identification, &scenario).is_valid());
//! ```

pub mod profiles;

pub use profiles::ProfileKind;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::form::Field;
use crate::navigator::Tab;
use crate::scenario::Scenario;

/// A single problem found by a validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Field key or collection name the issue is attached to
    pub field: String,
    /// Message shown to the author
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Collections that can carry a minimum-count rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Countable {
    /// Technical plus non-technical objectives
    Objectives,
    TechnicalObjectives,
    NonTechnicalObjectives,
    Frames,
    /// Frames whose parameter set is populated
    FramesWithParameters,
    Equipment,
}

impl Countable {
    pub fn key(&self) -> &'static str {
        match self {
            Countable::Objectives => "objectives",
            Countable::TechnicalObjectives => "technical_objectives",
            Countable::NonTechnicalObjectives => "non_technical_objectives",
            Countable::Frames => "frames",
            Countable::FramesWithParameters => "frames_with_parameters",
            Countable::Equipment => "equipment",
        }
    }

    fn noun(&self) -> &'static str {
        match self {
            Countable::Objectives => "learning objective(s)",
            Countable::TechnicalObjectives => "technical objective(s)",
            Countable::NonTechnicalObjectives => "non-technical objective(s)",
            Countable::Frames => "frame(s)",
            Countable::FramesWithParameters => "frame(s) with physiological parameters",
            Countable::Equipment => "equipment item(s)",
        }
    }

    /// Current size of the collection in `scenario`
    pub fn count(&self, scenario: &Scenario) -> usize {
        let form = &scenario.form;
        match self {
            Countable::Objectives => form.objective_count(),
            Countable::TechnicalObjectives => form.technical_objectives.len(),
            Countable::NonTechnicalObjectives => form.non_technical_objectives.len(),
            Countable::Frames => scenario.frames.len(),
            Countable::FramesWithParameters => scenario.frames.with_parameters_count(),
            Countable::Equipment => form.equipment.len(),
        }
    }
}

/// One rule a tab must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Requirement {
    /// The text field must contain something other than whitespace
    Filled { field: Field },
    /// The collection must hold at least `min` entries
    MinCount { of: Countable, min: usize },
    /// A debriefing template must be selected
    DebriefingSelected,
    /// Every transition must target an existing frame
    TransitionsResolve,
    /// Populated parameter sets must stay within plausible ranges
    PlausibleParameters,
}

impl Requirement {
    pub fn filled(field: Field) -> Self {
        Requirement::Filled { field }
    }

    pub fn min_count(of: Countable, min: usize) -> Self {
        Requirement::MinCount { of, min }
    }

    /// Append the issues this rule finds in `scenario` to `issues`
    fn check(&self, scenario: &Scenario, issues: &mut Vec<ValidationIssue>) {
        match self {
            Requirement::Filled { field } => {
                if !scenario.form.is_filled(*field) {
                    issues.push(ValidationIssue::new(
                        field.key(),
                        format!("{} is required", field.label()),
                    ));
                }
            }
            Requirement::MinCount { of, min } => {
                let count = of.count(scenario);
                if count < *min {
                    issues.push(ValidationIssue::new(
                        of.key(),
                        format!("At least {} {} required (found {})", min, of.noun(), count),
                    ));
                }
            }
            Requirement::DebriefingSelected => {
                if scenario.debriefing.is_none() {
                    issues.push(ValidationIssue::new(
                        "debriefing",
                        "Select a debriefing model",
                    ));
                }
            }
            Requirement::TransitionsResolve => {
                for (from, to) in scenario.frames.dangling_transitions() {
                    issues.push(ValidationIssue::new(
                        "frames",
                        format!("Frame {} transitions to missing frame {}", from, to),
                    ));
                }
            }
            Requirement::PlausibleParameters => {
                for frame in &scenario.frames {
                    let Some(params) = frame.parameters.as_ref() else {
                        continue;
                    };
                    for (name, value) in params.implausible_values() {
                        issues.push(ValidationIssue::new(
                            format!("frames.{}.{}", frame.id, name),
                            format!("Frame {} has an implausible {} ({})", frame.id, name, value),
                        ));
                    }
                }
            }
        }
    }
}

/// Validation result for one tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabReport {
    pub tab: Tab,
    pub issues: Vec<ValidationIssue>,
}

impl TabReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Validation results for every tab except the review tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub tabs: Vec<TabReport>,
}

impl ValidationReport {
    /// True when every tab passes, i.e. the scenario may be published
    pub fn is_publishable(&self) -> bool {
        self.tabs.iter().all(TabReport::is_valid)
    }

    pub fn incomplete_tabs(&self) -> Vec<Tab> {
        self.tabs.iter().filter(|r| !r.is_valid()).map(|r| r.tab).collect()
    }

    pub fn issue_count(&self) -> usize {
        self.tabs.iter().map(|r| r.issues.len()).sum()
    }

    pub fn for_tab(&self, tab: Tab) -> Option<&TabReport> {
        self.tabs.iter().find(|r| r.tab == tab)
    }
}

/// A named rule set mapping each tab to its requirements.
///
/// Tabs without an entry have no requirements. The review tab never has its
/// own entry: it aggregates every other tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationProfile {
    pub name: String,
    pub rules: BTreeMap<Tab, Vec<Requirement>>,
}

impl ValidationProfile {
    /// Empty profile; every tab passes until rules are added
    pub fn new(name: impl Into<String>) -> Self {
        ValidationProfile {
            name: name.into(),
            rules: BTreeMap::new(),
        }
    }

    /// Add a rule to a tab (builder pattern)
    pub fn with_rule(mut self, tab: Tab, requirement: Requirement) -> Self {
        self.rules.entry(tab).or_default().push(requirement);
        self
    }

    /// Built-in lenient profile
    pub fn lenient() -> Self {
        profiles::LENIENT.clone()
    }

    /// Built-in strict profile
    pub fn strict() -> Self {
        profiles::STRICT.clone()
    }

    pub fn requirements(&self, tab: Tab) -> &[Requirement] {
        self.rules.get(&tab).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Run the validator of one tab.
    ///
    /// For [`Tab::Review`] the report holds the issues of every other tab.
    pub fn validate_tab(&self, tab: Tab, scenario: &Scenario) -> TabReport {
        let mut issues = Vec::new();
        if tab == Tab::Review {
            for report in self.validate_all(scenario).tabs {
                issues.extend(report.issues);
            }
        } else {
            for requirement in self.requirements(tab) {
                requirement.check(scenario, &mut issues);
            }
        }
        TabReport { tab, issues }
    }

    /// Validate every tab that feeds the review
    pub fn validate_all(&self, scenario: &Scenario) -> ValidationReport {
        let tabs = Tab::ALL
            .iter()
            .copied()
            .filter(|t| *t != Tab::Review)
            .map(|t| self.validate_tab(t, scenario))
            .collect();
        ValidationReport { tabs }
    }
}

impl Default for ValidationProfile {
    fn default() -> Self {
        ValidationProfile::lenient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklists::{DebriefingModel, DebriefingTemplate};
    use crate::equipment::EquipmentItem;
    use crate::form::ListField;
    use crate::frames::{Frame, ParameterSet};
    use proptest::prelude::*;

    fn vitals() -> ParameterSet {
        ParameterSet {
            heart_rate_bpm: Some(40),
            rhythm: Some("AESP".to_string()),
            ..Default::default()
        }
    }

    fn complete_lenient() -> Scenario {
        let mut s = Scenario::new("Author");
        s.set_field(Field::Title, "PCR em AESP");
        s.set_field(Field::PatientName, "João");
        s.set_field(Field::PatientAge, "58");
        s.set_field(Field::PatientSex, "M");
        s.add_to_list(ListField::TechnicalObjectives, "High-quality CPR");
        s.add_frame(Frame::new("Arrest").with_parameters(vitals()));
        s.add_equipment(EquipmentItem::new("Defibrillator"));
        s
    }

    #[test]
    fn test_identification_title_scenario() {
        let profile = ValidationProfile::lenient();
        let mut scenario = Scenario::new("Author");
        let report = profile.validate_tab(Tab::Identification, &scenario);
        assert!(!report.is_valid());
        assert_eq!(report.issues[0].field, "title");

        scenario.set_field(Field::Title, "PCR em AESP");
        assert!(profile.validate_tab(Tab::Identification, &scenario).is_valid());
    }

    #[test]
    fn test_frames_thresholds_differ_between_profiles() {
        let lenient = ValidationProfile::lenient();
        let strict = ValidationProfile::strict();
        let mut scenario = Scenario::new("Author");

        assert!(!lenient.validate_tab(Tab::Frames, &scenario).is_valid());
        assert!(!strict.validate_tab(Tab::Frames, &scenario).is_valid());

        scenario.add_frame(Frame::new("Arrest").with_parameters(vitals()));
        assert!(lenient.validate_tab(Tab::Frames, &scenario).is_valid());
        assert!(!strict.validate_tab(Tab::Frames, &scenario).is_valid());
    }

    #[test]
    fn test_strict_frames_need_parameters() {
        let strict = ValidationProfile::strict();
        let mut scenario = Scenario::new("Author");
        scenario.add_frame(Frame::new("A").with_parameters(vitals()));
        scenario.add_frame(Frame::new("B"));
        scenario.add_frame(Frame::new("C"));
        let report = strict.validate_tab(Tab::Frames, &scenario);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].field, "frames_with_parameters");

        let id = scenario.frames.iter().nth(1).map(|f| f.id).unwrap();
        scenario.frame_mut(id).unwrap().parameters = Some(vitals());
        assert!(strict.validate_tab(Tab::Frames, &scenario).is_valid());
    }

    #[test]
    fn test_patient_requires_name_age_sex_jointly() {
        let profile = ValidationProfile::lenient();
        let mut scenario = Scenario::new("Author");
        scenario.set_field(Field::PatientName, "Maria");
        scenario.set_field(Field::PatientAge, "34");
        let report = profile.validate_tab(Tab::Patient, &scenario);
        assert_eq!(report.issues, vec![ValidationIssue::new("patient_sex", "Patient sex is required")]);
    }

    #[test]
    fn test_strict_objectives_need_two() {
        let strict = ValidationProfile::strict();
        let mut scenario = Scenario::new("Author");
        scenario.add_to_list(ListField::TechnicalObjectives, "Intubate");
        assert!(!strict.validate_tab(Tab::Objectives, &scenario).is_valid());
        scenario.add_to_list(ListField::NonTechnicalObjectives, "Lead the team");
        assert!(strict.validate_tab(Tab::Objectives, &scenario).is_valid());
    }

    #[test]
    fn test_debriefing_only_required_by_strict() {
        let scenario = Scenario::new("Author");
        assert!(ValidationProfile::lenient().validate_tab(Tab::Debriefing, &scenario).is_valid());
        assert!(!ValidationProfile::strict().validate_tab(Tab::Debriefing, &scenario).is_valid());

        let mut scenario = scenario;
        scenario.set_debriefing(Some(DebriefingTemplate::blank(DebriefingModel::Gas)));
        assert!(ValidationProfile::strict().validate_tab(Tab::Debriefing, &scenario).is_valid());
    }

    #[test]
    fn test_dangling_transition_is_reported() {
        let profile = ValidationProfile::lenient();
        let json = r#"[{"id": 1, "title": "A", "transitions": [{"target": 3}]}]"#;
        let mut scenario = Scenario::new("Author");
        scenario.frames = serde_json::from_str(json).unwrap();
        let report = profile.validate_tab(Tab::Frames, &scenario);
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].message.contains("F3"));
    }

    #[test]
    fn test_review_aggregates_other_tabs() {
        let profile = ValidationProfile::lenient();
        let scenario = complete_lenient();
        assert!(profile.validate_tab(Tab::Review, &scenario).is_valid());
        assert!(profile.validate_all(&scenario).is_publishable());

        let empty = Scenario::new("Author");
        let review = profile.validate_tab(Tab::Review, &empty);
        let all = profile.validate_all(&empty);
        assert_eq!(review.issues.len(), all.issue_count());
        assert_eq!(
            all.incomplete_tabs(),
            vec![Tab::Identification, Tab::Objectives, Tab::Patient, Tab::Frames, Tab::Materials]
        );
    }

    #[test]
    fn test_custom_profile() {
        let profile = ValidationProfile::new("materials-only")
            .with_rule(Tab::Materials, Requirement::min_count(Countable::Equipment, 2));
        let scenario = complete_lenient();
        assert!(profile.validate_tab(Tab::Identification, &Scenario::new("x")).is_valid());
        let report = profile.validate_tab(Tab::Materials, &scenario);
        assert_eq!(report.issues[0].message, "At least 2 equipment item(s) required (found 1)");
    }

    #[test]
    fn test_profile_json_shape() {
        let profile = ValidationProfile::new("p").with_rule(Tab::Identification, Requirement::filled(Field::Title));
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains(r#""identificacao":[{"rule":"filled","field":"title"}]"#));
        let parsed: ValidationProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, profile);
    }

    proptest! {
        #[test]
        fn prop_required_fields_fail_iff_any_empty(
            title in "( |[a-zA-Z ]{0,12})",
            audience in "( |[a-zA-Z ]{0,12})",
            duration in "( |[0-9 ]{0,4})",
            kind in "( |[a-zA-Z ]{0,12})",
        ) {
            let strict = ValidationProfile::strict();
            let mut scenario = Scenario::new("Author");
            scenario.set_field(Field::Title, title.clone());
            scenario.set_field(Field::TargetAudience, audience.clone());
            scenario.set_field(Field::Duration, duration.clone());
            scenario.set_field(Field::ScenarioType, kind.clone());

            let any_empty = [&title, &audience, &duration, &kind]
                .iter()
                .any(|v| v.trim().is_empty());
            let report = strict.validate_tab(Tab::Identification, &scenario);
            prop_assert_eq!(report.is_valid(), !any_empty);
        }
    }
}
