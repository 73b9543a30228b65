//! # Equipment Items
//!
//! Entries on a scenario's materials list. Items only live in the scenario;
//! they carry no link to the lab's stock records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{SimError, SimResult};

/// One line on the materials list.
///
/// ## JSON Example
///
/// ```json
/// {
///   "id": "6f1c0c7e-2a53-4c3f-9a47-0b1f0d0f9a11",
///   "kind": "Defibrillator",
///   "model": "R Series",
///   "brand": "Zoll",
///   "quantity": 1,
///   "observations": "Pads attached"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    pub id: Uuid,

    /// Equipment type (e.g. "Defibrillator", "Manikin")
    pub kind: String,

    #[serde(default)]
    pub model: String,

    #[serde(default)]
    pub brand: String,

    #[serde(default = "default_quantity")]
    pub quantity: u32,

    #[serde(default)]
    pub observations: String,
}

fn default_quantity() -> u32 {
    1
}

impl EquipmentItem {
    /// New item of the given type with quantity 1 and a fresh id
    pub fn new(kind: impl Into<String>) -> Self {
        EquipmentItem {
            id: Uuid::new_v4(),
            kind: kind.into(),
            model: String::new(),
            brand: String::new(),
            quantity: default_quantity(),
            observations: String::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_observations(mut self, observations: impl Into<String>) -> Self {
        self.observations = observations.into();
        self
    }

    /// Parse a quantity typed into a form input
    pub fn parse_quantity(raw: &str) -> SimResult<u32> {
        let trimmed = raw.trim();
        match trimmed.parse::<u32>() {
            Ok(0) => Err(SimError::invalid_input("quantity", trimmed, "Quantity must be at least 1")),
            Ok(q) => Ok(q),
            Err(_) => Err(SimError::invalid_input(
                "quantity",
                trimmed,
                "Quantity must be a whole number",
            )),
        }
    }

    /// One-line description for list views, e.g. "2x Defibrillator (Zoll R Series)"
    pub fn display_name(&self) -> String {
        let detail = [self.brand.trim(), self.model.trim()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        if detail.is_empty() {
            format!("{}x {}", self.quantity, self.kind)
        } else {
            format!("{}x {} ({})", self.quantity, self.kind, detail)
        }
    }
}
