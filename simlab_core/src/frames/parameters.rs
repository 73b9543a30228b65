//! Physiological parameter sets shown on the simulator monitor for a frame.

use serde::{Deserialize, Serialize};

/// Vital signs for one frame. Every value is optional; a set with at least
/// one value is considered populated.
///
/// ## JSON Example
///
/// ```json
/// {
///   "heart_rate_bpm": 38,
///   "systolic_mmhg": 70,
///   "diastolic_mmhg": 40,
///   "spo2_percent": 82,
///   "rhythm": "Sinus bradycardia"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate_bpm: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub systolic_mmhg: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diastolic_mmhg: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respiratory_rate_rpm: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spo2_percent: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etco2_mmhg: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glucose_mg_dl: Option<u32>,
    /// Cardiac rhythm label (e.g. "AESP", "Ventricular fibrillation")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rhythm: Option<String>,
}

/// Plausible ranges used by [`ParameterSet::implausible_values`]
const HEART_RATE_RANGE: (f64, f64) = (0.0, 300.0);
const SYSTOLIC_RANGE: (f64, f64) = (0.0, 300.0);
const DIASTOLIC_RANGE: (f64, f64) = (0.0, 200.0);
const RESPIRATORY_RANGE: (f64, f64) = (0.0, 80.0);
const SPO2_RANGE: (f64, f64) = (0.0, 100.0);
const TEMPERATURE_RANGE: (f64, f64) = (25.0, 45.0);
const ETCO2_RANGE: (f64, f64) = (0.0, 150.0);
const GLUCOSE_RANGE: (f64, f64) = (0.0, 1500.0);

impl ParameterSet {
    /// True when at least one vital is present
    pub fn is_populated(&self) -> bool {
        self.heart_rate_bpm.is_some()
            || self.systolic_mmhg.is_some()
            || self.diastolic_mmhg.is_some()
            || self.respiratory_rate_rpm.is_some()
            || self.spo2_percent.is_some()
            || self.temperature_c.is_some()
            || self.etco2_mmhg.is_some()
            || self.glucose_mg_dl.is_some()
            || self.rhythm.as_deref().is_some_and(|r| !r.trim().is_empty())
    }

    /// Blood pressure formatted as "sys/dia", when both values are present
    pub fn blood_pressure(&self) -> Option<String> {
        match (self.systolic_mmhg, self.diastolic_mmhg) {
            (Some(sys), Some(dia)) => Some(format!("{}/{}", sys, dia)),
            _ => None,
        }
    }

    /// Values outside physiologically plausible ranges, as (name, value) pairs.
    ///
    /// A diastolic pressure above the systolic one is also reported.
    pub fn implausible_values(&self) -> Vec<(&'static str, f64)> {
        let mut out = Vec::new();
        let mut check = |name: &'static str, value: Option<f64>, (lo, hi): (f64, f64)| {
            if let Some(v) = value {
                if v < lo || v > hi {
                    out.push((name, v));
                }
            }
        };
        check("heart_rate_bpm", self.heart_rate_bpm.map(f64::from), HEART_RATE_RANGE);
        check("systolic_mmhg", self.systolic_mmhg.map(f64::from), SYSTOLIC_RANGE);
        check("diastolic_mmhg", self.diastolic_mmhg.map(f64::from), DIASTOLIC_RANGE);
        check("respiratory_rate_rpm", self.respiratory_rate_rpm.map(f64::from), RESPIRATORY_RANGE);
        check("spo2_percent", self.spo2_percent.map(f64::from), SPO2_RANGE);
        check("temperature_c", self.temperature_c, TEMPERATURE_RANGE);
        check("etco2_mmhg", self.etco2_mmhg.map(f64::from), ETCO2_RANGE);
        check("glucose_mg_dl", self.glucose_mg_dl.map(f64::from), GLUCOSE_RANGE);

        if let (Some(sys), Some(dia)) = (self.systolic_mmhg, self.diastolic_mmhg) {
            if dia > sys {
                out.push(("diastolic_mmhg", f64::from(dia)));
            }
        }
        out
    }

    /// Compact monitor-style summary, e.g. "HR 38 | BP 70/40 | SpO2 82%"
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(hr) = self.heart_rate_bpm {
            parts.push(format!("HR {}", hr));
        }
        if let Some(bp) = self.blood_pressure() {
            parts.push(format!("BP {}", bp));
        }
        if let Some(rr) = self.respiratory_rate_rpm {
            parts.push(format!("RR {}", rr));
        }
        if let Some(spo2) = self.spo2_percent {
            parts.push(format!("SpO2 {}%", spo2));
        }
        if let Some(t) = self.temperature_c {
            parts.push(format!("T {:.1}°C", t));
        }
        if let Some(etco2) = self.etco2_mmhg {
            parts.push(format!("EtCO2 {}", etco2));
        }
        if let Some(glucose) = self.glucose_mg_dl {
            parts.push(format!("Glu {}", glucose));
        }
        if let Some(rhythm) = self.rhythm.as_deref().filter(|r| !r.trim().is_empty()) {
            parts.push(rhythm.to_string());
        }
        parts.join(" | ")
    }
}
