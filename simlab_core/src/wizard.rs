//! # Wizard
//!
//! The authoring session: one in-memory [`Scenario`], the [`TabNavigator`]
//! over it and the validation profile in force. Nothing is persisted until
//! [`Wizard::save_draft`] or [`Wizard::publish`] is called.
//!
//! ```rust
//! use simlab_core::form::Field;
//! use simlab_core::storage::{MemoryStorage, ScenarioStore};
//! use simlab_core::wizard::{PublishOutcome, Wizard};
//! use simlab_core::ValidationProfile;
//!
//! let mut repo = ScenarioStore::new(MemoryStorage::new());
//! let mut wizard = Wizard::new("instrutor@simlab.com", ValidationProfile::lenient());
//! wizard.scenario_mut().set_field(Field::Title, "PCR em AESP");
//!
//! let id = wizard.save_draft(&mut repo).unwrap();
//! let outcome = wizard.publish(&mut repo).unwrap();
//! assert!(matches!(outcome, PublishOutcome::Blocked(_)));
//! assert_eq!(wizard.scenario().id(), id);
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::LabConfig;
use crate::errors::{SimError, SimResult};
use crate::navigator::{Tab, TabNavigator, TabStatus};
use crate::scenario::{Scenario, ScenarioStatus};
use crate::storage::ScenarioRepository;
use crate::validation::{ValidationProfile, ValidationReport};

/// Result of a publish attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "details", rename_all = "snake_case")]
pub enum PublishOutcome {
    Published(Uuid),
    /// The draft was saved but the review did not pass
    Blocked(ValidationReport),
}

pub struct Wizard {
    scenario: Scenario,
    navigator: TabNavigator,
    profile: ValidationProfile,
    dirty: bool,
}

impl Wizard {
    /// Start a new scenario
    pub fn new(author: impl Into<String>, profile: ValidationProfile) -> Self {
        Wizard::with_scenario(Scenario::new(author), profile)
    }

    /// Start a new scenario with the profile and gating from `config`
    pub fn from_config(config: &LabConfig, author: impl Into<String>) -> Self {
        Wizard::new(author, config.validation_profile()).with_gated_selection(config.gate_direct_selection)
    }

    /// Edit an existing scenario
    pub fn with_scenario(scenario: Scenario, profile: ValidationProfile) -> Self {
        Wizard {
            scenario,
            navigator: TabNavigator::default(),
            profile,
            dirty: false,
        }
    }

    /// Reopen a stored scenario by id
    pub fn resume<R: ScenarioRepository>(repo: &R, id: &Uuid, profile: ValidationProfile) -> SimResult<Self> {
        let scenario = repo.get(id)?.ok_or_else(|| SimError::not_found("Scenario", id))?;
        Ok(Wizard::with_scenario(scenario, profile))
    }

    /// Reopen whatever sits in the draft slot
    pub fn resume_latest<R: ScenarioRepository>(repo: &R, profile: ValidationProfile) -> SimResult<Option<Self>> {
        Ok(repo
            .latest_draft()?
            .map(|scenario| Wizard::with_scenario(scenario, profile)))
    }

    pub fn with_gated_selection(mut self, gated: bool) -> Self {
        self.navigator = self.navigator.with_gated_selection(gated);
        self
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    /// Mutable access for edits; marks the session as having unsaved changes
    pub fn scenario_mut(&mut self) -> &mut Scenario {
        self.dirty = true;
        &mut self.scenario
    }

    pub fn profile(&self) -> &ValidationProfile {
        &self.profile
    }

    pub fn navigator(&self) -> &TabNavigator {
        &self.navigator
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn active_tab(&self) -> Tab {
        self.navigator.active()
    }

    pub fn next(&mut self) -> SimResult<Tab> {
        self.navigator.next(&self.scenario, &self.profile)
    }

    pub fn previous(&mut self) -> Tab {
        self.navigator.previous()
    }

    pub fn select(&mut self, tab: Tab) -> SimResult<Tab> {
        self.navigator.select(tab, &self.scenario, &self.profile)
    }

    pub fn statuses(&self) -> Vec<(Tab, TabStatus)> {
        self.navigator.statuses(&self.scenario, &self.profile)
    }

    /// The review tab's view: every other tab's report
    pub fn review(&self) -> ValidationReport {
        self.profile.validate_all(&self.scenario)
    }

    /// Write the per-id record and the draft slot, regardless of validity.
    pub fn save_draft<R: ScenarioRepository>(&mut self, repo: &mut R) -> SimResult<Uuid> {
        self.scenario.touch();
        repo.put(&self.scenario)?;
        repo.put_draft(&self.scenario)?;
        self.dirty = false;
        info!(id = %self.scenario.id(), title = self.scenario.title(), "draft saved");
        Ok(self.scenario.id())
    }

    /// Save the draft, then publish if the whole review passes.
    ///
    /// A blocked publish stores the scenario as a draft, even one that was
    /// published before, and writes nothing to the published slot. The last
    /// published snapshot stays readable through `get_published`.
    pub fn publish<R: ScenarioRepository>(&mut self, repo: &mut R) -> SimResult<PublishOutcome> {
        let report = self.review();
        if !report.is_publishable() {
            // A record that fails review is never stored as published
            self.scenario.meta.status = ScenarioStatus::Draft;
            self.save_draft(repo)?;
            warn!(
                id = %self.scenario.id(),
                issues = report.issue_count(),
                "publish blocked by incomplete tabs"
            );
            return Ok(PublishOutcome::Blocked(report));
        }

        self.scenario.meta.status = ScenarioStatus::Published;
        self.scenario.meta.published = Some(Utc::now());
        self.save_draft(repo)?;
        repo.put_published(&self.scenario)?;
        info!(id = %self.scenario.id(), "scenario published");
        Ok(PublishOutcome::Published(self.scenario.id()))
    }
}
