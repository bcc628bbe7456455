//! Password scheme port: pluggable one-way password hashing.
//!
//! Swapping the scheme changes what is stored in the `hash` field but not
//! the register/verify contract.

/// Errors from a hashing backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HashError {
    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Stored hash has an unrecognised format")]
    UnrecognisedFormat,
}

/// Trait for password hashing strategies.
pub trait PasswordScheme: Send + Sync {
    /// Short identifier used in configuration and logs.
    fn name(&self) -> &'static str;

    /// Produce the value to persist for `password`.
    ///
    /// # Errors
    /// Returns `HashError::Hashing` if the backend fails.
    fn hash(&self, password: &str) -> Result<String, HashError>;

    /// Check `password` against a previously persisted value.
    ///
    /// Returns `Ok(false)` on mismatch. Implementations compare in constant time.
    ///
    /// # Errors
    /// Returns `HashError::UnrecognisedFormat` if `stored` was not produced by
    /// a scheme this implementation understands.
    fn verify(&self, password: &str, stored: &str) -> Result<bool, HashError>;
}

impl<T: PasswordScheme + ?Sized> PasswordScheme for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn hash(&self, password: &str) -> Result<String, HashError> {
        (**self).hash(password)
    }

    fn verify(&self, password: &str, stored: &str) -> Result<bool, HashError> {
        (**self).verify(password, stored)
    }
}
