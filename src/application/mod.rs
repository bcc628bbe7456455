//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod credentials;
pub mod evaluator;

#[cfg(test)]
mod evaluator_proptest;

pub use credentials::{CredentialStore, RegistrationError};
pub use evaluator::{Assessment, Classification, VitalsEvaluator};
