//! Lab configuration.
//!
//! Loaded from a TOML file when one is given, then overridden by the
//! `SIMLAB_STORAGE_DIR`, `SIMLAB_PROFILE` and `SIMLAB_AUTHOR` environment
//! variables.
//!
//! ```toml
//! storage_dir = "/var/lib/simlab"
//! profile = "strict"
//! gate_direct_selection = true
//! author = "instrutor@simlab.com"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{SimError, SimResult};
use crate::validation::{ProfileKind, ValidationProfile};

pub const ENV_STORAGE_DIR: &str = "SIMLAB_STORAGE_DIR";
pub const ENV_PROFILE: &str = "SIMLAB_PROFILE";
pub const ENV_AUTHOR: &str = "SIMLAB_AUTHOR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    /// Directory of the file-backed key-value store
    pub storage_dir: PathBuf,
    pub profile: ProfileKind,
    /// Require earlier tabs to be valid before jumping to a later one
    pub gate_direct_selection: bool,
    /// Author recorded on new scenarios when nobody is logged in
    pub author: String,
}

impl Default for LabConfig {
    fn default() -> Self {
        LabConfig {
            storage_dir: PathBuf::from(".simlab"),
            profile: ProfileKind::Lenient,
            gate_direct_selection: false,
            author: String::new(),
        }
    }
}

impl LabConfig {
    pub fn from_toml_str(contents: &str, source_name: &str) -> SimResult<Self> {
        toml::from_str(contents).map_err(|e| SimError::ConfigError {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> SimResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| SimError::ConfigError {
            source_name: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&contents, &path.display().to_string())?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// File (if any) plus environment overrides
    pub fn resolve(path: Option<&Path>) -> SimResult<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env()
    }

    pub fn apply_env(self) -> SimResult<Self> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup` (an environment-like source)
    pub fn apply_overrides<F>(mut self, lookup: F) -> SimResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_STORAGE_DIR).filter(|v| !v.is_empty()) {
            self.storage_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup(ENV_PROFILE).filter(|v| !v.is_empty()) {
            self.profile = ProfileKind::parse(&raw).map_err(|e| SimError::ConfigError {
                source_name: ENV_PROFILE.to_string(),
                reason: e.to_string(),
            })?;
        }
        if let Some(author) = lookup(ENV_AUTHOR) {
            self.author = author;
        }
        Ok(self)
    }

    pub fn validation_profile(&self) -> ValidationProfile {
        self.profile.profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_empty() {
        let config = LabConfig::from_toml_str("", "inline").unwrap();
        assert_eq!(config, LabConfig::default());
        assert_eq!(config.validation_profile().name, "lenient");
    }

    #[test]
    fn test_parse_full_file() {
        let config = LabConfig::from_toml_str(
            r#"
            storage_dir = "/tmp/simlab"
            profile = "strict"
            gate_direct_selection = true
            author = "instrutor@simlab.com"
            "#,
            "inline",
        )
        .unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/simlab"));
        assert_eq!(config.profile, ProfileKind::Strict);
        assert!(config.gate_direct_selection);
    }

    #[test]
    fn test_bad_profile_is_config_error() {
        let err = LabConfig::from_toml_str("profile = \"harsh\"", "lab.toml").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_overrides() {
        let config = LabConfig::default()
            .apply_overrides(|name| match name {
                ENV_PROFILE => Some("Strict".to_string()),
                ENV_AUTHOR => Some("admin@simlab.com".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.profile, ProfileKind::Strict);
        assert_eq!(config.author, "admin@simlab.com");
        assert_eq!(config.storage_dir, PathBuf::from(".simlab"));

        let err = LabConfig::default()
            .apply_overrides(|name| (name == ENV_PROFILE).then(|| "nope".to_string()))
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_missing_file() {
        let err = LabConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
