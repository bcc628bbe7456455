//! Password schemes: implementations of `PasswordScheme`.
//!
//! - `LegacySaltedSha256`: SHA-256 over a single application-wide salt
//!   followed by the password, hex encoded. Compatible with stores written by
//!   earlier dashboard releases. Every user shares the salt and the digest is fast,
//!   so this scheme should only be used to read existing stores.
//! - `Argon2idScheme`: Argon2id with a random salt per hash, stored as a PHC
//!   string (`$argon2id$v=19$...`).
//! - `MigratingScheme`: hashes with Argon2id, verifies both formats.

use argon2::{
    password_hash::{PasswordHash, SaltString},
    Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version,
};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::ports::{HashError, PasswordScheme};

/// Salt used when no salt file is configured.
pub const DEFAULT_STATIC_SALT: &str = "vitalwatch-static-salt";

/// Argon2id memory cost in KiB (46 MiB).
const ARGON2_M_COST: u32 = 47104;
const ARGON2_T_COST: u32 = 1;
const ARGON2_P_COST: u32 = 1;

/// Length of a hex-encoded SHA-256 digest.
const SHA256_HEX_LEN: usize = 64;

/// SHA-256 with a fixed, shared salt.
#[derive(Clone)]
pub struct LegacySaltedSha256 {
    salt: Zeroizing<String>,
}

impl LegacySaltedSha256 {
    #[must_use]
    pub fn new(salt: impl Into<String>) -> Self {
        Self {
            salt: Zeroizing::new(salt.into()),
        }
    }

    fn digest_hex(&self, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(password.as_bytes());
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    /// Whether `stored` looks like a value this scheme produced.
    #[must_use]
    pub fn recognises(stored: &str) -> bool {
        stored.len() == SHA256_HEX_LEN && stored.bytes().all(|b| b.is_ascii_hexdigit())
    }
}

impl Default for LegacySaltedSha256 {
    fn default() -> Self {
        Self::new(DEFAULT_STATIC_SALT)
    }
}

impl std::fmt::Debug for LegacySaltedSha256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacySaltedSha256")
            .field("salt_len", &self.salt.len())
            .finish()
    }
}

impl PasswordScheme for LegacySaltedSha256 {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn hash(&self, password: &str) -> Result<String, HashError> {
        Ok(self.digest_hex(password))
    }

    fn verify(&self, password: &str, stored: &str) -> Result<bool, HashError> {
        if !Self::recognises(stored) {
            return Err(HashError::UnrecognisedFormat);
        }
        let candidate = self.digest_hex(password);
        let stored = stored.to_ascii_lowercase();
        Ok(bool::from(candidate.as_bytes().ct_eq(stored.as_bytes())))
    }
}

/// Argon2id with a per-hash random salt.
#[derive(Debug, Clone)]
pub struct Argon2idScheme {
    params: Params,
}

impl Argon2idScheme {
    /// Scheme with the default cost parameters.
    ///
    /// # Errors
    /// Returns error if the parameters are rejected by the backend.
    pub fn new() -> Result<Self, HashError> {
        Self::with_costs(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST)
    }

    /// Scheme with explicit costs (memory in KiB, iterations, lanes).
    ///
    /// # Errors
    /// Returns error if the parameters are rejected by the backend.
    pub fn with_costs(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, HashError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| HashError::Hashing(format!("Invalid Argon2 params: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    #[must_use]
    pub fn recognises(stored: &str) -> bool {
        stored.starts_with("$argon2")
    }
}

impl PasswordScheme for Argon2idScheme {
    fn name(&self) -> &'static str {
        "argon2"
    }

    fn hash(&self, password: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| HashError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> Result<bool, HashError> {
        let parsed = PasswordHash::new(stored).map_err(|_| HashError::UnrecognisedFormat)?;

        // Costs are read from the PHC string, so older hashes keep verifying
        // after the defaults change.
        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashError::Hashing(e.to_string())),
        }
    }
}

/// Hash new passwords with Argon2id; accept legacy digests on verify.
#[derive(Debug, Clone)]
pub struct MigratingScheme {
    current: Argon2idScheme,
    legacy: LegacySaltedSha256,
}

impl MigratingScheme {
    #[must_use]
    pub fn new(current: Argon2idScheme, legacy: LegacySaltedSha256) -> Self {
        Self { current, legacy }
    }
}

impl PasswordScheme for MigratingScheme {
    fn name(&self) -> &'static str {
        "migrating"
    }

    fn hash(&self, password: &str) -> Result<String, HashError> {
        self.current.hash(password)
    }

    fn verify(&self, password: &str, stored: &str) -> Result<bool, HashError> {
        if Argon2idScheme::recognises(stored) {
            self.current.verify(password, stored)
        } else if LegacySaltedSha256::recognises(stored) {
            self.legacy.verify(password, stored)
        } else {
            Err(HashError::UnrecognisedFormat)
        }
    }
}
