//! # Vitalwatch
//!
//! Vital-sign threshold alerting with a file-backed credential gate.
//!
//! This crate provides:
//! - Threshold classification of patient vitals with alerts and recommendations
//! - A credential store mapping usernames to salted password hashes
//! - A command-line dashboard over both
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (VitalReading, Alert, UserRecord)
//! - `ports`: Trait definitions for persistence and password hashing
//! - `adapters`: Concrete implementations (JSON files, Argon2id, SHA-256)
//! - `application`: Use cases orchestrating domain and ports
//! - `cli`: Command-line presentation and session state
//! - `config`: Environment-driven configuration

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{Assessment, CredentialStore, RegistrationError, VitalsEvaluator};
pub use domain::{Alert, AlertLevel, Metric, Role, UserRecord, VitalReading};

/// Result type for Vitalwatch operations
pub type Result<T> = std::result::Result<T, VitalwatchError>;

/// Main error type for Vitalwatch
#[derive(Debug, thiserror::Error)]
pub enum VitalwatchError {
    #[error("Invalid vitals: {0}")]
    Validation(#[from] domain::ValidationError),

    #[error("Credential store failed: {0}")]
    Store(#[from] adapters::StoreError),

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] ports::HashError),

    #[error("Registration failed: {0}")]
    Registration(#[from] application::RegistrationError),

    #[error("Vitals file error: {0}")]
    VitalsFile(#[from] adapters::VitalsFileError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid session transition: {0}")]
    Session(#[from] cli::TransitionError),

    #[error("Invalid username or password")]
    AuthenticationFailed,

    #[error("Unknown patient: {0}")]
    UnknownPatient(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
