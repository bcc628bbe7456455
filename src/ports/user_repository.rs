//! User repository port: Trait for whole-store persistence of user records.
//!
//! This trait abstracts the storage backend (a JSON file) from the credential logic.

use std::collections::BTreeMap;

use crate::domain::UserRecord;

/// All user records, keyed by username.
pub type UserRecords = BTreeMap<String, UserRecord>;

/// Trait for persisted user records.
///
/// The store is read and written as a whole. Implementations do not need to
/// guard against concurrent writers; `CredentialStore` serializes its own
/// read-modify-write cycles.
pub trait UserRepository: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every record.
    ///
    /// # Returns
    /// An empty map if the store does not exist yet.
    ///
    /// # Errors
    /// Returns error if the store exists but cannot be read or parsed.
    fn load(&self) -> Result<UserRecords, Self::Error>;

    /// Replace the stored records with `records`.
    ///
    /// # Errors
    /// Returns error if the store cannot be written.
    fn save(&self, records: &UserRecords) -> Result<(), Self::Error>;
}
