//! Domain layer: Core types for vitals and users.
//!
//! This module contains plain data types with no I/O.
//! All types are serializable and implement strict validation.

mod alert;
mod user;
pub mod vitals;

pub use alert::{Alert, AlertLevel, Metric};
pub use user::{Role, UserRecord};
pub use vitals::{FieldIssue, FieldProblem, PatientExport, ValidationError, VitalReading, VitalsDocument};
