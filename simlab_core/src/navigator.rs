//! # Tab Navigator
//!
//! Tracks which wizard tab is active, derives the status of every tab from
//! the current scenario, and gates forward navigation on the active tab's
//! validator.
//!
//! - `next` refuses to move while the active tab is invalid
//! - `previous` always moves back (bounded at the first tab)
//! - `select` models a direct tab click; it bypasses the forward gate unless
//!   `gate_direct_selection` is set
//!
//! ## Example
//!
//! ```rust
//! use simlab_core::form::Field;
//! use simlab_core::navigator::{Tab, TabNavigator};
//! use simlab_core::scenario::Scenario;
//! use simlab_core::validation::ValidationProfile;
//!
//! let profile = ValidationProfile::lenient();
//! let mut scenario = Scenario::new("Author");
//! let mut nav = TabNavigator::default();
//!
//! assert!(nav.next(&scenario, &profile).is_err());
//! scenario.set_field(Field::Title, "PCR em AESP");
//! assert_eq!(nav.next(&scenario, &profile).unwrap(), Tab::Objectives);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{SimError, SimResult};
use crate::scenario::Scenario;
use crate::validation::ValidationProfile;

/// Wizard sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tab {
    #[serde(rename = "identificacao")]
    Identification,
    #[serde(rename = "objetivos")]
    Objectives,
    #[serde(rename = "paciente")]
    Patient,
    #[serde(rename = "frames")]
    Frames,
    #[serde(rename = "materiais")]
    Materials,
    #[serde(rename = "debriefing")]
    Debriefing,
    #[serde(rename = "revisao")]
    Review,
}

impl Tab {
    pub const ALL: [Tab; 7] = [
        Tab::Identification,
        Tab::Objectives,
        Tab::Patient,
        Tab::Frames,
        Tab::Materials,
        Tab::Debriefing,
        Tab::Review,
    ];

    /// Stable key used in routes and stored UI state
    pub fn key(&self) -> &'static str {
        match self {
            Tab::Identification => "identificacao",
            Tab::Objectives => "objetivos",
            Tab::Patient => "paciente",
            Tab::Frames => "frames",
            Tab::Materials => "materiais",
            Tab::Debriefing => "debriefing",
            Tab::Review => "revisao",
        }
    }

    /// Look up a tab by key; English names are accepted as aliases.
    ///
    /// # Example
    /// ```
    /// use simlab_core::navigator::Tab;
    /// assert_eq!(Tab::from_key("identificacao"), Some(Tab::Identification));
    /// assert_eq!(Tab::from_key("materials"), Some(Tab::Materials));
    /// ```
    pub fn from_key(key: &str) -> Option<Tab> {
        let key = key.trim().to_ascii_lowercase();
        Tab::ALL.iter().copied().find(|t| t.key() == key).or(match key.as_str() {
            "identification" => Some(Tab::Identification),
            "objectives" => Some(Tab::Objectives),
            "patient" => Some(Tab::Patient),
            "materials" | "equipment" => Some(Tab::Materials),
            "review" => Some(Tab::Review),
            _ => None,
        })
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Tab::Identification => "Identification",
            Tab::Objectives => "Objectives",
            Tab::Patient => "Patient",
            Tab::Frames => "Frames",
            Tab::Materials => "Materials",
            Tab::Debriefing => "Debriefing",
            Tab::Review => "Review",
        }
    }
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Derived status shown on each tab header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabStatus {
    Complete,
    Active,
    Incomplete,
}

impl TabStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            TabStatus::Complete => "[x]",
            TabStatus::Active => "[>]",
            TabStatus::Incomplete => "[ ]",
        }
    }
}

/// Active-tab state machine over an ordered list of tabs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabNavigator {
    tabs: Vec<Tab>,
    active: usize,
    /// When set, a direct tab click must pass the same gate as `next` for
    /// every tab before the target.
    #[serde(default)]
    pub gate_direct_selection: bool,
}

impl TabNavigator {
    /// Navigator over `tabs`, starting on the first one.
    ///
    /// An empty list falls back to [`Tab::ALL`].
    pub fn new(tabs: Vec<Tab>) -> Self {
        let tabs = if tabs.is_empty() { Tab::ALL.to_vec() } else { tabs };
        TabNavigator {
            tabs,
            active: 0,
            gate_direct_selection: false,
        }
    }

    pub fn with_gated_selection(mut self, gated: bool) -> Self {
        self.gate_direct_selection = gated;
        self
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn active(&self) -> Tab {
        self.tabs[self.active]
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn is_first(&self) -> bool {
        self.active == 0
    }

    pub fn is_last(&self) -> bool {
        self.active + 1 == self.tabs.len()
    }

    /// Advance one tab if the active tab validates.
    ///
    /// On the last tab this is a no-op returning the active tab.
    pub fn next(&mut self, scenario: &Scenario, profile: &ValidationProfile) -> SimResult<Tab> {
        let current = self.active();
        let report = profile.validate_tab(current, scenario);
        if !report.is_valid() {
            debug!(tab = current.key(), issues = report.issues.len(), "forward navigation blocked");
            return Err(SimError::tab_incomplete(current.key(), report.issues));
        }
        if !self.is_last() {
            self.active += 1;
        }
        debug!(from = current.key(), to = self.active().key(), "next tab");
        Ok(self.active())
    }

    /// Move back one tab, bounded at the first tab.
    pub fn previous(&mut self) -> Tab {
        self.active = self.active.saturating_sub(1);
        self.active()
    }

    /// Jump directly to `tab` (a tab click).
    ///
    /// Without gating, any tab in the list can be selected regardless of the
    /// state of the tabs it skips. With gating, moving forward requires every
    /// tab before the target to validate; moving backward is always allowed.
    pub fn select(&mut self, tab: Tab, scenario: &Scenario, profile: &ValidationProfile) -> SimResult<Tab> {
        let target = self
            .tabs
            .iter()
            .position(|t| *t == tab)
            .ok_or_else(|| SimError::not_found("Tab", tab.key()))?;

        if target > self.active {
            let skipped = self.tabs[..target]
                .iter()
                .map(|t| profile.validate_tab(*t, scenario))
                .find(|report| !report.is_valid());

            if let Some(report) = skipped {
                if self.gate_direct_selection {
                    return Err(SimError::tab_incomplete(report.tab.key(), report.issues));
                }
                warn!(
                    target = tab.key(),
                    incomplete = report.tab.key(),
                    "tab selection skips an incomplete tab"
                );
            }
        }

        self.active = target;
        Ok(tab)
    }

    /// Status of every tab, in order
    pub fn statuses(&self, scenario: &Scenario, profile: &ValidationProfile) -> Vec<(Tab, TabStatus)> {
        self.tabs
            .iter()
            .enumerate()
            .map(|(i, tab)| {
                let status = if i == self.active {
                    TabStatus::Active
                } else if profile.validate_tab(*tab, scenario).is_valid() {
                    TabStatus::Complete
                } else {
                    TabStatus::Incomplete
                };
                (*tab, status)
            })
            .collect()
    }

    /// Whether the review tab would enable publishing
    pub fn can_publish(&self, scenario: &Scenario, profile: &ValidationProfile) -> bool {
        profile.validate_tab(Tab::Review, scenario).is_valid()
    }
}

impl Default for TabNavigator {
    fn default() -> Self {
        TabNavigator::new(Tab::ALL.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equipment::EquipmentItem;
    use crate::form::{Field, ListField};
    use crate::frames::Frame;
    use proptest::prelude::*;

    fn complete() -> Scenario {
        let mut s = Scenario::new("Author");
        s.set_field(Field::Title, "Asma grave");
        s.set_field(Field::PatientName, "Lucas");
        s.set_field(Field::PatientAge, "9");
        s.set_field(Field::PatientSex, "M");
        s.add_to_list(ListField::TechnicalObjectives, "Nebulize salbutamol");
        s.add_frame(Frame::new("Wheezing"));
        s.add_equipment(EquipmentItem::new("Nebulizer"));
        s
    }

    #[test]
    fn test_next_blocked_by_invalid_tab() {
        let profile = ValidationProfile::lenient();
        let scenario = Scenario::new("Author");
        let mut nav = TabNavigator::default();

        let err = nav.next(&scenario, &profile).unwrap_err();
        match err {
            SimError::TabIncomplete { tab, issues } => {
                assert_eq!(tab, "identificacao");
                assert_eq!(issues.len(), 1);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(nav.active(), Tab::Identification);
    }

    #[test]
    fn test_walk_to_review_and_stop() {
        let profile = ValidationProfile::lenient();
        let scenario = complete();
        let mut nav = TabNavigator::default();
        for expected in &Tab::ALL[1..] {
            assert_eq!(nav.next(&scenario, &profile).unwrap(), *expected);
        }
        assert!(nav.is_last());
        assert_eq!(nav.next(&scenario, &profile).unwrap(), Tab::Review);
        assert_eq!(nav.active_index(), Tab::ALL.len() - 1);
        assert!(nav.can_publish(&scenario, &profile));
    }

    #[test]
    fn test_previous_is_bounded() {
        let mut nav = TabNavigator::default();
        assert_eq!(nav.previous(), Tab::Identification);
        assert!(nav.is_first());
    }

    #[test]
    fn test_select_bypasses_gate_by_default() {
        let profile = ValidationProfile::lenient();
        let scenario = Scenario::new("Author");
        let mut nav = TabNavigator::default();
        assert_eq!(nav.select(Tab::Materials, &scenario, &profile).unwrap(), Tab::Materials);
        assert_eq!(nav.active(), Tab::Materials);
    }

    #[test]
    fn test_gated_select_reports_first_incomplete_tab() {
        let profile = ValidationProfile::lenient();
        let mut scenario = Scenario::new("Author");
        scenario.set_field(Field::Title, "Asma grave");
        let mut nav = TabNavigator::default().with_gated_selection(true);

        let err = nav.select(Tab::Frames, &scenario, &profile).unwrap_err();
        assert!(matches!(err, SimError::TabIncomplete { ref tab, .. } if tab == "objetivos"));
        assert_eq!(nav.active(), Tab::Identification);

        // Backward selection is never gated
        let mut nav = TabNavigator::default().with_gated_selection(true);
        let full = complete();
        nav.select(Tab::Review, &full, &profile).unwrap();
        assert_eq!(nav.select(Tab::Identification, &scenario, &profile).unwrap(), Tab::Identification);
    }

    #[test]
    fn test_select_unknown_tab() {
        let profile = ValidationProfile::lenient();
        let scenario = Scenario::new("Author");
        let mut nav = TabNavigator::new(vec![Tab::Identification, Tab::Review]);
        assert!(nav.select(Tab::Frames, &scenario, &profile).is_err());
    }

    #[test]
    fn test_statuses() {
        let profile = ValidationProfile::lenient();
        let mut scenario = Scenario::new("Author");
        scenario.set_field(Field::Title, "Asma grave");
        let mut nav = TabNavigator::default();
        nav.next(&scenario, &profile).unwrap();

        let statuses = nav.statuses(&scenario, &profile);
        assert_eq!(statuses[0], (Tab::Identification, TabStatus::Complete));
        assert_eq!(statuses[1], (Tab::Objectives, TabStatus::Active));
        assert_eq!(statuses[2], (Tab::Patient, TabStatus::Incomplete));
        // Lenient debriefing has no requirements
        assert_eq!(statuses[5], (Tab::Debriefing, TabStatus::Complete));
        assert_eq!(statuses[6], (Tab::Review, TabStatus::Incomplete));
    }

    #[test]
    fn test_tab_keys() {
        for tab in Tab::ALL {
            assert_eq!(Tab::from_key(tab.key()), Some(tab));
            assert_eq!(serde_json::to_string(&tab).unwrap(), format!("\"{}\"", tab.key()));
        }
        assert_eq!(Tab::from_key("unknown"), None);
    }

    proptest! {
        #[test]
        fn prop_next_never_passes_last_or_invalid(steps in prop::collection::vec(any::<bool>(), 0..30), filled in any::<bool>()) {
            let profile = ValidationProfile::lenient();
            let scenario = if filled { complete() } else { Scenario::new("Author") };
            let mut nav = TabNavigator::default();
            for forward in steps {
                let before = nav.active_index();
                if forward {
                    let valid = profile.validate_tab(nav.active(), &scenario).is_valid();
                    let result = nav.next(&scenario, &profile);
                    prop_assert_eq!(result.is_ok(), valid);
                    if !valid {
                        prop_assert_eq!(nav.active_index(), before);
                    }
                } else {
                    nav.previous();
                }
                prop_assert!(nav.active_index() < nav.tabs().len());
            }
        }
    }
}
