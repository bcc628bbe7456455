//! Vital-sign readings for the monitoring dashboard.
//!
//! A reading is a single point-in-time snapshot. Readings carry no ordering
//! relationship to each other and are evaluated independently.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// JSON key for body temperature (°C).
pub const KEY_TEMPERATURE: &str = "temperature";
/// JSON key for heart rate (BPM).
pub const KEY_HEART_RATE: &str = "heart_rate";
/// JSON key for oxygen saturation (%).
pub const KEY_SPO2: &str = "spo2";
/// JSON key for blood pressure (free-form).
pub const KEY_BLOOD_PRESSURE: &str = "bp";
/// JSON key for respiratory rate (breaths/min).
pub const KEY_RESPIRATORY_RATE: &str = "respiratory_rate";
/// JSON key carrying the patient ID in the single-patient shape.
pub const KEY_PATIENT_ID: &str = "patient_id";

/// One patient's vital signs.
///
/// Serializes to the per-patient JSON shape:
/// `{"temperature": 36.8, "heart_rate": 78, "spo2": 97, "bp": "120/80", "respiratory_rate": 16}`
///
/// Parsing goes through `from_value` so every reading is validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VitalReading {
    /// Body temperature in °C
    #[serde(rename = "temperature")]
    pub temperature_c: f64,

    /// Heart rate in beats per minute
    #[serde(rename = "heart_rate")]
    pub heart_rate_bpm: i64,

    /// Peripheral oxygen saturation, 0-100 %
    #[serde(rename = "spo2")]
    pub spo2_percent: f64,

    /// Blood pressure as entered, e.g. "120/80" (display only)
    #[serde(rename = "bp")]
    pub blood_pressure: String,

    /// Breaths per minute (display only)
    pub respiratory_rate: i64,
}

/// Why a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    NotNumeric,
    NotInteger,
    NotFinite,
    OutOfRange,
    NotString,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Missing => "missing",
            Self::NotNumeric => "not a number",
            Self::NotInteger => "not an integer",
            Self::NotFinite => "not finite",
            Self::OutOfRange => "out of range",
            Self::NotString => "not a string",
        };
        f.write_str(s)
    }
}

/// A rejected field and the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: &'static str,
    pub problem: FieldProblem,
}

/// A reading could not be accepted. Lists every offending field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid vital reading: {}", describe(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

fn describe(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{} ({})", i.field, i.problem))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// Names of all rejected fields, in check order.
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        self.issues.iter().map(|i| i.field).collect()
    }

    /// Whether `field` is among the rejected fields.
    #[must_use]
    pub fn names(&self, field: &str) -> bool {
        self.issues.iter().any(|i| i.field == field)
    }
}

/// Collects field issues while parsing or validating.
#[derive(Default)]
struct Issues(Vec<FieldIssue>);

impl Issues {
    fn push(&mut self, field: &'static str, problem: FieldProblem) {
        self.0.push(FieldIssue { field, problem });
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues: self.0 })
        }
    }
}

fn read_float(obj: &serde_json::Map<String, Value>, key: &'static str, issues: &mut Issues) -> f64 {
    match obj.get(key) {
        None | Some(Value::Null) => issues.push(key, FieldProblem::Missing),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v.is_finite() => return v,
            _ => issues.push(key, FieldProblem::NotFinite),
        },
        Some(_) => issues.push(key, FieldProblem::NotNumeric),
    }
    f64::NAN
}

fn read_integer(obj: &serde_json::Map<String, Value>, key: &'static str, issues: &mut Issues) -> i64 {
    match obj.get(key) {
        None | Some(Value::Null) => issues.push(key, FieldProblem::Missing),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_i64() {
                return v;
            }
            // Spreadsheet exports write whole numbers as 78.0
            match n.as_f64() {
                Some(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => {
                    return v as i64;
                }
                _ => issues.push(key, FieldProblem::NotInteger),
            }
        }
        Some(_) => issues.push(key, FieldProblem::NotNumeric),
    }
    0
}

fn read_string(obj: &serde_json::Map<String, Value>, key: &'static str, issues: &mut Issues) -> String {
    match obj.get(key) {
        None | Some(Value::Null) => issues.push(key, FieldProblem::Missing),
        Some(Value::String(s)) => return s.clone(),
        Some(_) => issues.push(key, FieldProblem::NotString),
    }
    String::new()
}

impl VitalReading {
    /// Parse a per-patient JSON object.
    ///
    /// Unknown keys (such as `patient_id`) are ignored.
    ///
    /// # Errors
    /// Returns a `ValidationError` naming every missing or malformed field.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let Some(obj) = value.as_object() else {
            let issues = [
                KEY_TEMPERATURE,
                KEY_HEART_RATE,
                KEY_SPO2,
                KEY_BLOOD_PRESSURE,
                KEY_RESPIRATORY_RATE,
            ]
            .into_iter()
            .map(|field| FieldIssue {
                field,
                problem: FieldProblem::Missing,
            })
            .collect();
            return Err(ValidationError { issues });
        };

        let mut issues = Issues::default();
        let reading = Self {
            temperature_c: read_float(obj, KEY_TEMPERATURE, &mut issues),
            heart_rate_bpm: read_integer(obj, KEY_HEART_RATE, &mut issues),
            spo2_percent: read_float(obj, KEY_SPO2, &mut issues),
            blood_pressure: read_string(obj, KEY_BLOOD_PRESSURE, &mut issues),
            respiratory_rate: read_integer(obj, KEY_RESPIRATORY_RATE, &mut issues),
        };
        issues.finish()?;
        reading.validate()?;
        Ok(reading)
    }

    /// Check the numeric invariants of a reading built in code.
    ///
    /// # Errors
    /// Returns a `ValidationError` for non-finite values or SpO₂ outside 0-100.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Issues::default();

        if !self.temperature_c.is_finite() {
            issues.push(KEY_TEMPERATURE, FieldProblem::NotFinite);
        }
        if !self.spo2_percent.is_finite() {
            issues.push(KEY_SPO2, FieldProblem::NotFinite);
        } else if !(0.0..=100.0).contains(&self.spo2_percent) {
            issues.push(KEY_SPO2, FieldProblem::OutOfRange);
        }

        issues.finish()
    }

    /// Display lines in the dashboard's fixed order.
    #[must_use]
    pub fn display_lines(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Temperature", format!("{} °C", self.temperature_c)),
            ("Heart Rate", format!("{} BPM", self.heart_rate_bpm)),
            ("SpO₂", format!("{} %", self.spo2_percent)),
            ("Blood Pressure", self.blood_pressure.clone()),
            ("Respiratory Rate", self.respiratory_rate.to_string()),
        ]
    }
}

/// Patient ID to reading, ordered by ID.
pub type VitalsDocument = BTreeMap<String, VitalReading>;

/// A single patient's reading in the exported shape (`patient_id` alongside
/// the vital keys).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientExport {
    pub patient_id: String,
    #[serde(flatten)]
    pub reading: VitalReading,
}
