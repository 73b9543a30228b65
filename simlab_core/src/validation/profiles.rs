//! Built-in validation profiles.
//!
//! | Tab | Lenient | Strict |
//! |---|---|---|
//! | identification | title | title, audience, duration, type |
//! | objectives | ≥1 objective | ≥2 objectives |
//! | patient | name, age, sex | name, age, sex |
//! | frames | ≥1 frame | ≥3 frames, ≥2 with parameters, plausible vitals |
//! | materials | ≥1 item | ≥1 item |
//! | debriefing | - | model selected |
//!
//! Both profiles require transitions to resolve to existing frames.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::{Countable, Requirement, ValidationProfile};
use crate::errors::{SimError, SimResult};
use crate::form::Field;
use crate::navigator::Tab;

pub(crate) static LENIENT: Lazy<ValidationProfile> = Lazy::new(|| {
    ValidationProfile::new("lenient")
        .with_rule(Tab::Identification, Requirement::filled(Field::Title))
        .with_rule(Tab::Objectives, Requirement::min_count(Countable::Objectives, 1))
        .with_rule(Tab::Patient, Requirement::filled(Field::PatientName))
        .with_rule(Tab::Patient, Requirement::filled(Field::PatientAge))
        .with_rule(Tab::Patient, Requirement::filled(Field::PatientSex))
        .with_rule(Tab::Frames, Requirement::min_count(Countable::Frames, 1))
        .with_rule(Tab::Frames, Requirement::TransitionsResolve)
        .with_rule(Tab::Materials, Requirement::min_count(Countable::Equipment, 1))
});

pub(crate) static STRICT: Lazy<ValidationProfile> = Lazy::new(|| {
    ValidationProfile::new("strict")
        .with_rule(Tab::Identification, Requirement::filled(Field::Title))
        .with_rule(Tab::Identification, Requirement::filled(Field::TargetAudience))
        .with_rule(Tab::Identification, Requirement::filled(Field::Duration))
        .with_rule(Tab::Identification, Requirement::filled(Field::ScenarioType))
        .with_rule(Tab::Objectives, Requirement::min_count(Countable::Objectives, 2))
        .with_rule(Tab::Patient, Requirement::filled(Field::PatientName))
        .with_rule(Tab::Patient, Requirement::filled(Field::PatientAge))
        .with_rule(Tab::Patient, Requirement::filled(Field::PatientSex))
        .with_rule(Tab::Frames, Requirement::min_count(Countable::Frames, 3))
        .with_rule(Tab::Frames, Requirement::min_count(Countable::FramesWithParameters, 2))
        .with_rule(Tab::Frames, Requirement::TransitionsResolve)
        .with_rule(Tab::Frames, Requirement::PlausibleParameters)
        .with_rule(Tab::Materials, Requirement::min_count(Countable::Equipment, 1))
        .with_rule(Tab::Debriefing, Requirement::DebriefingSelected)
});

/// Selector for the built-in profiles, used by configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    #[default]
    Lenient,
    Strict,
}

impl ProfileKind {
    pub fn profile(&self) -> ValidationProfile {
        match self {
            ProfileKind::Lenient => ValidationProfile::lenient(),
            ProfileKind::Strict => ValidationProfile::strict(),
        }
    }

    pub fn parse(raw: &str) -> SimResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(ProfileKind::Lenient),
            "strict" => Ok(ProfileKind::Strict),
            other => Err(SimError::invalid_input(
                "profile",
                other,
                "Expected 'lenient' or 'strict'",
            )),
        }
    }
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileKind::Lenient => write!(f, "lenient"),
            ProfileKind::Strict => write!(f, "strict"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_has_no_own_rules() {
        assert!(LENIENT.requirements(Tab::Review).is_empty());
        assert!(STRICT.requirements(Tab::Review).is_empty());
    }

    #[test]
    fn test_strict_is_superset_of_lenient() {
        for tab in Tab::ALL {
            for rule in LENIENT.requirements(tab) {
                let covered = STRICT.requirements(tab).iter().any(|strict_rule| {
                    match (rule, strict_rule) {
                        (
                            Requirement::MinCount { of, min },
                            Requirement::MinCount { of: strict_of, min: strict_min },
                        ) => of == strict_of && strict_min >= min,
                        (a, b) => a == b,
                    }
                });
                assert!(covered, "strict profile misses {:?} on {:?}", rule, tab);
            }
        }
    }

    #[test]
    fn test_profile_kind_parse() {
        assert_eq!(ProfileKind::parse("Strict").unwrap(), ProfileKind::Strict);
        assert_eq!(ProfileKind::parse("lenient").unwrap().profile().name, "lenient");
        assert!(ProfileKind::parse("relaxed").is_err());
    }
}
