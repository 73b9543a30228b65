//! # simlab_core - Clinical Simulation Scenario Authoring
//!
//! `simlab_core` holds everything a SimLab front end needs to author a
//! simulation scenario: the scenario state, the tabbed wizard navigator, the
//! per-tab validators, the local key-value persistence and the checklist
//! library. All records are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Drafts are always representable**: setters never reject input;
//!   completeness is decided by validation profiles
//! - **One validator contract**: every tab yields a structured `TabReport`
//! - **Storage behind traits**: `KeyValueStore` and `ScenarioRepository`
//! - **Rich Errors**: structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use simlab_core::form::Field;
//! use simlab_core::storage::{MemoryStorage, ScenarioStore};
//! use simlab_core::{ValidationProfile, Wizard};
//!
//! let mut repo = ScenarioStore::new(MemoryStorage::new());
//! let mut wizard = Wizard::new("instrutor@simlab.com", ValidationProfile::lenient());
//! wizard.scenario_mut().set_field(Field::Title, "PCR em AESP");
//! let id = wizard.save_draft(&mut repo).unwrap();
//! assert_eq!(wizard.scenario().id(), id);
//! ```
//!
//! ## Modules
//!
//! - [`scenario`] - Scenario aggregate and metadata
//! - [`form`], [`frames`], [`equipment`] - the editable parts of a scenario
//! - [`navigator`] - Tab state machine with the forward gate
//! - [`validation`] - Profile-driven tab validators
//! - [`wizard`] - Authoring session: save draft, publish
//! - [`storage`] - Key-value keyspace and scenario repository
//! - [`checklists`] - Materials checklists and debriefing templates
//! - [`auth`] - Mock login
//! - [`config`] - TOML configuration with environment overrides
//! - [`errors`] - Structured error types
//! - [`file_io`] - Atomic writes, locking, `.simlab` export/import

pub mod auth;
pub mod checklists;
pub mod config;
pub mod equipment;
pub mod errors;
pub mod file_io;
pub mod form;
pub mod frames;
pub mod navigator;
pub mod scenario;
pub mod storage;
pub mod validation;
pub mod wizard;

// Re-export commonly used types at crate root for convenience
pub use config::LabConfig;
pub use errors::{SimError, SimResult};
pub use file_io::{export_scenario, import_scenario, FileLock};
pub use navigator::{Tab, TabNavigator, TabStatus};
pub use scenario::{Scenario, ScenarioMetadata, ScenarioStatus};
pub use validation::{ProfileKind, ValidationProfile, ValidationReport};
pub use wizard::{PublishOutcome, Wizard};
