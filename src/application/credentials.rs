//! Credential store: register and verify users over a `UserRepository`.
//!
//! The store owns the hashing scheme and the read-modify-write cycle. It
//! never persists or logs plaintext passwords.
//!
//! # Concurrency
//!
//! `register` loads the whole store, checks uniqueness, inserts and saves.
//! That cycle runs under an in-process mutex, so two registrations through the
//! same `CredentialStore` cannot both claim a username. Separate processes
//! writing the same file are not coordinated and follow last-writer-wins.

use std::sync::{Arc, Mutex};

use crate::adapters::StoreError;
use crate::domain::{Role, UserRecord};
use crate::ports::{HashError, PasswordScheme, UserRecords, UserRepository};

/// Why a registration was refused.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("Username '{0}' is already registered")]
    DuplicateUsername(String),

    #[error("Invalid input: {0}")]
    InvalidInput(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Hashing(#[from] HashError),
}

/// Durable registry of usernames to password hashes.
pub struct CredentialStore<R, H>
where
    R: UserRepository,
    H: PasswordScheme,
{
    repository: Arc<R>,
    scheme: H,
    write_lock: Mutex<()>,
}

impl<R, H> CredentialStore<R, H>
where
    R: UserRepository,
    R::Error: Into<StoreError>,
    H: PasswordScheme,
{
    /// Create a credential store over `repository` using `scheme`.
    pub fn new(repository: Arc<R>, scheme: H) -> Self {
        Self {
            repository,
            scheme,
            write_lock: Mutex::new(()),
        }
    }

    /// Name of the active password scheme.
    #[must_use]
    pub fn scheme_name(&self) -> &'static str {
        self.scheme.name()
    }

    /// One-way digest of `password` under the active scheme.
    ///
    /// # Errors
    /// Returns error if the hashing backend fails.
    pub fn hash(&self, password: &str) -> Result<String, HashError> {
        self.scheme.hash(password)
    }

    /// All records, keyed by username. Empty if nothing was persisted yet.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    pub fn load(&self) -> Result<UserRecords, StoreError> {
        self.repository.load().map_err(Into::into)
    }

    /// Replace the persisted records.
    ///
    /// # Errors
    /// Returns error if the store cannot be written.
    pub fn save(&self, records: &UserRecords) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        self.repository.save(records).map_err(Into::into)
    }

    /// Look up a single record.
    ///
    /// # Errors
    /// Returns error if the store cannot be read.
    pub fn lookup(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.load()?.remove(username))
    }

    /// Register a new user.
    ///
    /// Usernames match exactly and case-sensitively. `role` defaults to Viewer.
    ///
    /// # Errors
    /// - `InvalidInput` if the username or password is empty
    /// - `DuplicateUsername` if the username exists; the stored record is untouched
    /// - `Store` / `Hashing` on backend failures
    pub fn register(
        &self,
        username: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<(), RegistrationError> {
        if username.is_empty() {
            return Err(RegistrationError::InvalidInput("username must not be empty"));
        }
        if password.is_empty() {
            return Err(RegistrationError::InvalidInput("password must not be empty"));
        }

        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;

        let mut records = self.repository.load().map_err(Into::<StoreError>::into)?;
        if records.contains_key(username) {
            tracing::warn!("Registration refused: username already taken");
            return Err(RegistrationError::DuplicateUsername(username.to_string()));
        }

        let role = role.unwrap_or_default();
        let hash = self.scheme.hash(password)?;
        records.insert(
            username.to_string(),
            UserRecord::new(username, hash, role),
        );

        self.repository
            .save(&records)
            .map_err(Into::<StoreError>::into)?;

        tracing::info!(
            scheme = self.scheme.name(),
            "Registered user {} with role {}",
            username,
            role
        );
        Ok(())
    }

    /// Check a username/password pair.
    ///
    /// Returns `Ok(false)` for unknown users, wrong passwords, and stored
    /// hashes the active scheme cannot read.
    ///
    /// # Errors
    /// Returns error only if the store cannot be read.
    pub fn verify(&self, username: &str, password: &str) -> Result<bool, StoreError> {
        Ok(self.authenticate(username, password)?.is_some())
    }

    /// Verify and return the record on success. The store is read once.
    ///
    /// # Errors
    /// Returns error only if the store cannot be read.
    pub fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let Some(record) = self.lookup(username)? else {
            tracing::warn!("Login failed: unknown user");
            return Ok(None);
        };

        match self.scheme.verify(password, &record.password_hash) {
            Ok(true) => {
                tracing::info!("User {} authenticated", username);
                Ok(Some(record))
            }
            Ok(false) => {
                tracing::warn!("Login failed for {}: wrong password", username);
                Ok(None)
            }
            Err(e) => {
                tracing::warn!(
                    scheme = self.scheme.name(),
                    "Login failed for {}: {}",
                    username,
                    e
                );
                Ok(None)
            }
        }
    }
}
