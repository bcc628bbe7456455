//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (files, hashing backends).

mod password_scheme;
mod user_repository;

pub use password_scheme::{HashError, PasswordScheme};
pub use user_repository::{UserRecords, UserRepository};
