//! Adapters layer: Concrete implementations of ports.
//!
//! - `json_store`: user records in a JSON file (plus an in-memory variant)
//! - `hashing`: password schemes (legacy static salt, Argon2id, migrating)
//! - `vitals_file`: vitals documents in and single-patient exports out
//! - `sanitize`: credential redaction for logs

pub mod hashing;
pub mod json_store;
pub mod sanitize;
pub mod vitals_file;

pub use json_store::StoreError;
pub use vitals_file::VitalsFileError;
