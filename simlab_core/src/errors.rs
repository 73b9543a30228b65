//! # Error Types
//!
//! Structured error types for simlab_core. Every variant carries enough
//! context for a front end to show an inline message next to the offending
//! field or tab, and serializes to JSON for machine consumers.
//!
//! ## Example
//!
//! ```rust
//! use simlab_core::errors::{SimError, SimResult};
//!
//! fn parse_quantity(raw: &str) -> SimResult<u32> {
//!     raw.trim().parse().map_err(|_| {
//!         SimError::invalid_input("quantity", raw, "Quantity must be a whole number")
//!     })
//! }
//!
//! assert!(parse_quantity("3").is_ok());
//! assert!(parse_quantity("three").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::ValidationIssue;

/// Result type alias for simlab_core operations
pub type SimResult<T> = Result<T, SimError>;

/// Structured error type for scenario authoring operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum SimError {
    /// An input value is invalid (out of range, wrong format, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A record (scenario, frame, equipment item, checklist) does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A wizard tab failed validation and blocks forward navigation
    #[error("Tab '{tab}' is incomplete ({} issue(s))", .issues.len())]
    TabIncomplete {
        tab: String,
        issues: Vec<ValidationIssue>,
    },

    /// Login rejected by the mock authenticator
    #[error("Invalid credentials for '{email}'")]
    InvalidCredentials { email: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Configuration file could not be read or parsed
    #[error("Configuration error in '{source_name}': {reason}")]
    ConfigError { source_name: String, reason: String },
}

impl SimError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        SimError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        SimError::MissingField {
            field: field.into(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        SimError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create a TabIncomplete error
    pub fn tab_incomplete(tab: impl Into<String>, issues: Vec<ValidationIssue>) -> Self {
        SimError::TabIncomplete {
            tab: tab.into(),
            issues,
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        SimError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        SimError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Wrap a serde_json error
    pub fn serialization(err: impl ToString) -> Self {
        SimError::SerializationError {
            reason: err.to_string(),
        }
    }

    /// Check if this is a recoverable error (the user can correct or retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SimError::FileLocked { .. }
                | SimError::TabIncomplete { .. }
                | SimError::InvalidCredentials { .. }
                | SimError::InvalidInput { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            SimError::InvalidInput { .. } => "INVALID_INPUT",
            SimError::MissingField { .. } => "MISSING_FIELD",
            SimError::NotFound { .. } => "NOT_FOUND",
            SimError::TabIncomplete { .. } => "TAB_INCOMPLETE",
            SimError::InvalidCredentials { .. } => "INVALID_CREDENTIALS",
            SimError::FileError { .. } => "FILE_ERROR",
            SimError::FileLocked { .. } => "FILE_LOCKED",
            SimError::SerializationError { .. } => "SERIALIZATION_ERROR",
            SimError::VersionMismatch { .. } => "VERSION_MISMATCH",
            SimError::ConfigError { .. } => "CONFIG_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = SimError::invalid_input("quantity", "-1", "Quantity must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: SimError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SimError::missing_field("title").error_code(), "MISSING_FIELD");
        assert_eq!(SimError::not_found("Frame", 7).error_code(), "NOT_FOUND");
        assert_eq!(
            SimError::tab_incomplete("identificacao", vec![]).error_code(),
            "TAB_INCOMPLETE"
        );
    }

    #[test]
    fn test_tab_incomplete_message_counts_issues() {
        let error = SimError::tab_incomplete(
            "paciente",
            vec![
                ValidationIssue::new("patient_name", "Patient name is required"),
                ValidationIssue::new("patient_age", "Patient age is required"),
            ],
        );
        assert_eq!(error.to_string(), "Tab 'paciente' is incomplete (2 issue(s))");
        assert!(error.is_recoverable());
    }

    #[test]
    fn test_not_found_is_not_recoverable() {
        assert!(!SimError::not_found("Scenario", "abc").is_recoverable());
    }
}
