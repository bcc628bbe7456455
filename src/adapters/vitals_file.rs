//! Vitals document adapter: read patient readings from JSON, export one back.
//!
//! Two input shapes are accepted:
//! - an object keyed by patient ID, each value a per-patient reading
//! - a single flat reading carrying `patient_id` alongside the vital keys

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::domain::vitals::{KEY_PATIENT_ID, KEY_TEMPERATURE};
use crate::domain::{PatientExport, ValidationError, VitalReading, VitalsDocument};

/// Error type for vitals documents.
#[derive(Debug, thiserror::Error)]
pub enum VitalsFileError {
    #[error("Cannot read vitals file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Vitals document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Vitals document must be a JSON object")]
    NotAnObject,

    #[error("Patient {patient_id}: {source}")]
    InvalidReading {
        patient_id: String,
        #[source]
        source: ValidationError,
    },
}

/// Read and validate a vitals document from disk.
///
/// # Errors
/// Returns error if the file is unreadable, not JSON, or any reading is invalid.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<VitalsDocument, VitalsFileError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| VitalsFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = parse_document(&text)?;
    tracing::debug!("Loaded {} patient readings from {:?}", document.len(), path);
    Ok(document)
}

/// Parse a vitals document.
///
/// # Errors
/// Returns error if the text is not a JSON object or any reading is invalid.
/// Every patient is checked; the first invalid one is reported.
pub fn parse_document(text: &str) -> Result<VitalsDocument, VitalsFileError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(obj) = &value else {
        return Err(VitalsFileError::NotAnObject);
    };

    if is_single_patient(obj) {
        let patient_id = obj
            .get(KEY_PATIENT_ID)
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_default();
        let reading = VitalReading::from_value(&value).map_err(|source| {
            VitalsFileError::InvalidReading {
                patient_id: patient_id.clone(),
                source,
            }
        })?;
        return Ok(VitalsDocument::from([(patient_id, reading)]));
    }

    obj.iter()
        .map(|(patient_id, entry)| {
            VitalReading::from_value(entry)
                .map(|reading| (patient_id.clone(), reading))
                .map_err(|source| VitalsFileError::InvalidReading {
                    patient_id: patient_id.clone(),
                    source,
                })
        })
        .collect()
}

/// A flat reading holds scalars only; a keyed document holds one object per
/// patient, even when a patient ID happens to be `temperature`.
fn is_single_patient(obj: &serde_json::Map<String, Value>) -> bool {
    if obj.values().any(Value::is_object) {
        return false;
    }
    let has_id = matches!(
        obj.get(KEY_PATIENT_ID),
        Some(Value::String(_) | Value::Number(_))
    );
    let has_temperature = matches!(obj.get(KEY_TEMPERATURE), Some(Value::Number(_)));
    has_id || has_temperature
}

/// Serialize one patient's reading for download.
///
/// # Errors
/// Returns error if serialization fails.
pub fn export_patient(patient_id: &str, reading: &VitalReading) -> Result<String, VitalsFileError> {
    let export = PatientExport {
        patient_id: patient_id.to_string(),
        reading: reading.clone(),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}
