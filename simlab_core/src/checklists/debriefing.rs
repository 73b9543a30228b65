//! Debriefing templates.
//!
//! Each supported debriefing model has its own fixed set of phases. The
//! enum serializes with a `model` discriminator:
//!
//! ```json
//! { "model": "Gas", "gather": "...", "analyze": "...", "summarize": "..." }
//! { "model": "ThreeD", "defusing": "...", "discovering": "...", "deepening": "..." }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{SimError, SimResult};

/// Debriefing model identifier, without content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebriefingModel {
    Gas,
    Pearls,
    TeamGains,
    ThreeD,
}

impl DebriefingModel {
    pub const ALL: [DebriefingModel; 4] = [
        DebriefingModel::Gas,
        DebriefingModel::Pearls,
        DebriefingModel::TeamGains,
        DebriefingModel::ThreeD,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            DebriefingModel::Gas => "GAS",
            DebriefingModel::Pearls => "PEARLS",
            DebriefingModel::TeamGains => "TeamGAINS",
            DebriefingModel::ThreeD => "3D",
        }
    }

    /// Parse a model name as typed by a user (case-insensitive)
    pub fn parse(raw: &str) -> SimResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gas" => Ok(DebriefingModel::Gas),
            "pearls" => Ok(DebriefingModel::Pearls),
            "teamgains" | "team_gains" | "team-gains" => Ok(DebriefingModel::TeamGains),
            "3d" | "threed" | "three_d" => Ok(DebriefingModel::ThreeD),
            other => Err(SimError::invalid_input(
                "debriefing_model",
                other,
                "Expected one of: GAS, PEARLS, TeamGAINS, 3D",
            )),
        }
    }

    /// Phase names in the order they are run
    pub fn phases(&self) -> &'static [&'static str] {
        match self {
            DebriefingModel::Gas => &["gather", "analyze", "summarize"],
            DebriefingModel::Pearls => &[
                "setting_the_scene",
                "reactions",
                "description",
                "analysis",
                "application_summary",
            ],
            DebriefingModel::TeamGains => &[
                "reactions",
                "clinical_component",
                "transfer",
                "expert_model",
                "team_behaviour",
                "summary",
            ],
            DebriefingModel::ThreeD => &["defusing", "discovering", "deepening"],
        }
    }
}

impl std::fmt::Display for DebriefingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A debriefing script with the phase prompts of its model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "model")]
pub enum DebriefingTemplate {
    /// Gather, Analyze, Summarize
    Gas {
        #[serde(default)]
        gather: String,
        #[serde(default)]
        analyze: String,
        #[serde(default)]
        summarize: String,
    },
    /// Promoting Excellence And Reflective Learning in Simulation
    Pearls {
        #[serde(default)]
        setting_the_scene: String,
        #[serde(default)]
        reactions: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        analysis: String,
        #[serde(default)]
        application_summary: String,
    },
    /// Team-focused six-step debriefing
    TeamGains {
        #[serde(default)]
        reactions: String,
        #[serde(default)]
        clinical_component: String,
        #[serde(default)]
        transfer: String,
        #[serde(default)]
        expert_model: String,
        #[serde(default)]
        team_behaviour: String,
        #[serde(default)]
        summary: String,
    },
    /// Defusing, Discovering, Deepening
    ThreeD {
        #[serde(default)]
        defusing: String,
        #[serde(default)]
        discovering: String,
        #[serde(default)]
        deepening: String,
    },
}

impl DebriefingTemplate {
    /// Empty template for a model
    pub fn blank(model: DebriefingModel) -> Self {
        match model {
            DebriefingModel::Gas => DebriefingTemplate::Gas {
                gather: String::new(),
                analyze: String::new(),
                summarize: String::new(),
            },
            DebriefingModel::Pearls => DebriefingTemplate::Pearls {
                setting_the_scene: String::new(),
                reactions: String::new(),
                description: String::new(),
                analysis: String::new(),
                application_summary: String::new(),
            },
            DebriefingModel::TeamGains => DebriefingTemplate::TeamGains {
                reactions: String::new(),
                clinical_component: String::new(),
                transfer: String::new(),
                expert_model: String::new(),
                team_behaviour: String::new(),
                summary: String::new(),
            },
            DebriefingModel::ThreeD => DebriefingTemplate::ThreeD {
                defusing: String::new(),
                discovering: String::new(),
                deepening: String::new(),
            },
        }
    }

    pub fn model(&self) -> DebriefingModel {
        match self {
            DebriefingTemplate::Gas { .. } => DebriefingModel::Gas,
            DebriefingTemplate::Pearls { .. } => DebriefingModel::Pearls,
            DebriefingTemplate::TeamGains { .. } => DebriefingModel::TeamGains,
            DebriefingTemplate::ThreeD { .. } => DebriefingModel::ThreeD,
        }
    }

    /// (phase, text) pairs in run order
    pub fn phases(&self) -> Vec<(&'static str, &str)> {
        let names = self.model().phases();
        let texts: Vec<&str> = match self {
            DebriefingTemplate::Gas { gather, analyze, summarize } => {
                vec![gather.as_str(), analyze.as_str(), summarize.as_str()]
            }
            DebriefingTemplate::Pearls {
                setting_the_scene,
                reactions,
                description,
                analysis,
                application_summary,
            } => vec![
                setting_the_scene.as_str(),
                reactions.as_str(),
                description.as_str(),
                analysis.as_str(),
                application_summary.as_str(),
            ],
            DebriefingTemplate::TeamGains {
                reactions,
                clinical_component,
                transfer,
                expert_model,
                team_behaviour,
                summary,
            } => vec![
                reactions.as_str(),
                clinical_component.as_str(),
                transfer.as_str(),
                expert_model.as_str(),
                team_behaviour.as_str(),
                summary.as_str(),
            ],
            DebriefingTemplate::ThreeD {
                defusing,
                discovering,
                deepening,
            } => vec![defusing.as_str(), discovering.as_str(), deepening.as_str()],
        };
        names.iter().copied().zip(texts).collect()
    }

    /// Set the text of one phase by name.
    pub fn set_phase(&mut self, phase: &str, text: impl Into<String>) -> SimResult<()> {
        let slot = match (self, phase) {
            (DebriefingTemplate::Gas { gather, .. }, "gather") => gather,
            (DebriefingTemplate::Gas { analyze, .. }, "analyze") => analyze,
            (DebriefingTemplate::Gas { summarize, .. }, "summarize") => summarize,
            (DebriefingTemplate::Pearls { setting_the_scene, .. }, "setting_the_scene") => setting_the_scene,
            (DebriefingTemplate::Pearls { reactions, .. }, "reactions") => reactions,
            (DebriefingTemplate::Pearls { description, .. }, "description") => description,
            (DebriefingTemplate::Pearls { analysis, .. }, "analysis") => analysis,
            (DebriefingTemplate::Pearls { application_summary, .. }, "application_summary") => application_summary,
            (DebriefingTemplate::TeamGains { reactions, .. }, "reactions") => reactions,
            (DebriefingTemplate::TeamGains { clinical_component, .. }, "clinical_component") => clinical_component,
            (DebriefingTemplate::TeamGains { transfer, .. }, "transfer") => transfer,
            (DebriefingTemplate::TeamGains { expert_model, .. }, "expert_model") => expert_model,
            (DebriefingTemplate::TeamGains { team_behaviour, .. }, "team_behaviour") => team_behaviour,
            (DebriefingTemplate::TeamGains { summary, .. }, "summary") => summary,
            (DebriefingTemplate::ThreeD { defusing, .. }, "defusing") => defusing,
            (DebriefingTemplate::ThreeD { discovering, .. }, "discovering") => discovering,
            (DebriefingTemplate::ThreeD { deepening, .. }, "deepening") => deepening,
            (template, other) => {
                return Err(SimError::invalid_input(
                    "debriefing_phase",
                    other,
                    format!("{} has no phase named '{}'", template.model(), other),
                ))
            }
        };
        *slot = text.into();
        Ok(())
    }

    /// Phases that still have no text
    pub fn empty_phases(&self) -> Vec<&'static str> {
        self.phases()
            .into_iter()
            .filter(|(_, text)| text.trim().is_empty())
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_template_matches_model() {
        for model in DebriefingModel::ALL {
            let template = DebriefingTemplate::blank(model);
            assert_eq!(template.model(), model);
            assert_eq!(template.phases().len(), model.phases().len());
            assert_eq!(template.empty_phases().len(), model.phases().len());
        }
    }

    #[test]
    fn test_set_phase() {
        let mut template = DebriefingTemplate::blank(DebriefingModel::ThreeD);
        template.set_phase("defusing", "How are you feeling?").unwrap();
        assert_eq!(template.empty_phases(), vec!["discovering", "deepening"]);

        let err = template.set_phase("gather", "x").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_model_parse() {
        assert_eq!(DebriefingModel::parse("PEARLS").unwrap(), DebriefingModel::Pearls);
        assert_eq!(DebriefingModel::parse("TeamGAINS").unwrap(), DebriefingModel::TeamGains);
        assert_eq!(DebriefingModel::parse("3D").unwrap(), DebriefingModel::ThreeD);
        assert!(DebriefingModel::parse("plus-delta").is_err());
    }

    #[test]
    fn test_tagged_serialization() {
        let mut template = DebriefingTemplate::blank(DebriefingModel::Gas);
        template.set_phase("gather", "What happened?").unwrap();
        let json = serde_json::to_string(&template).unwrap();
        assert!(json.contains("\"model\":\"Gas\""));

        let parsed: DebriefingTemplate =
            serde_json::from_str(r#"{"model": "Gas", "gather": "What happened?"}"#).unwrap();
        assert_eq!(parsed, template);
    }
}
