//! Runtime configuration from environment variables.
//!
//! | Variable                      | Default              |
//! |-------------------------------|----------------------|
//! | `VITALWATCH_USERS_FILE`       | `users.json`         |
//! | `VITALWATCH_VITALS_FILE`      | `sample_vitals.json` |
//! | `VITALWATCH_HASH_SCHEME`      | `argon2`             |
//! | `VITALWATCH_STATIC_SALT_FILE` | built-in salt        |
//! | `VITALWATCH_LOG_MODE`         | `stderr`             |
//! | `VITALWATCH_LOG_FILE`         | `vitalwatch.log`     |
//!
//! The legacy salt is a secret and is only read from a file, never from the
//! environment itself.

use std::path::PathBuf;
use std::str::FromStr;

use zeroize::Zeroizing;

use crate::adapters::hashing::{
    Argon2idScheme, LegacySaltedSha256, MigratingScheme, DEFAULT_STATIC_SALT,
};
use crate::ports::{HashError, PasswordScheme};

pub const USERS_FILE_ENV: &str = "VITALWATCH_USERS_FILE";
pub const VITALS_FILE_ENV: &str = "VITALWATCH_VITALS_FILE";
pub const HASH_SCHEME_ENV: &str = "VITALWATCH_HASH_SCHEME";
pub const STATIC_SALT_FILE_ENV: &str = "VITALWATCH_STATIC_SALT_FILE";
pub const LOG_MODE_ENV: &str = "VITALWATCH_LOG_MODE";
pub const LOG_FILE_ENV: &str = "VITALWATCH_LOG_FILE";

/// Error type for configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown {HASH_SCHEME_ENV} '{0}' (expected argon2, legacy or migrating)")]
    UnknownHashScheme(String),

    #[error("Unknown {LOG_MODE_ENV} '{0}' (expected stderr, stdout or file)")]
    UnknownLogMode(String),

    #[error("Cannot read salt file {path:?}: {source}")]
    SaltFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Salt file {0:?} is empty")]
    EmptySalt(PathBuf),
}

/// Which password scheme hashes new registrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashSchemeKind {
    #[default]
    Argon2,
    Legacy,
    Migrating,
}

impl FromStr for HashSchemeKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "argon2" | "argon2id" => Ok(Self::Argon2),
            "legacy" | "sha256" => Ok(Self::Legacy),
            "migrating" => Ok(Self::Migrating),
            other => Err(ConfigError::UnknownHashScheme(other.to_string())),
        }
    }
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogMode {
    #[default]
    Stderr,
    Stdout,
    File,
}

impl FromStr for LogMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stderr" | "auto" => Ok(Self::Stderr),
            "stdout" => Ok(Self::Stdout),
            "file" => Ok(Self::File),
            other => Err(ConfigError::UnknownLogMode(other.to_string())),
        }
    }
}

/// Resolved configuration.
#[derive(Clone)]
pub struct Config {
    pub users_file: PathBuf,
    pub vitals_file: PathBuf,
    pub hash_scheme: HashSchemeKind,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
    static_salt: Zeroizing<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("users_file", &self.users_file)
            .field("vitals_file", &self.vitals_file)
            .field("hash_scheme", &self.hash_scheme)
            .field("log_mode", &self.log_mode)
            .field("log_file", &self.log_file)
            .finish_non_exhaustive()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            users_file: PathBuf::from("users.json"),
            vitals_file: PathBuf::from("sample_vitals.json"),
            hash_scheme: HashSchemeKind::default(),
            log_mode: LogMode::default(),
            log_file: PathBuf::from("vitalwatch.log"),
            static_salt: Zeroizing::new(DEFAULT_STATIC_SALT.to_string()),
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns error on unknown enum values or an unreadable salt file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup` (injectable for tests).
    ///
    /// # Errors
    /// Returns error on unknown enum values or an unreadable salt file.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let static_salt = match get(STATIC_SALT_FILE_ENV) {
            Some(path) => read_salt_file(PathBuf::from(path.trim()))?,
            None => defaults.static_salt.clone(),
        };

        Ok(Self {
            users_file: get(USERS_FILE_ENV).map_or(defaults.users_file, PathBuf::from),
            vitals_file: get(VITALS_FILE_ENV).map_or(defaults.vitals_file, PathBuf::from),
            hash_scheme: get(HASH_SCHEME_ENV)
                .map(|v| v.parse::<HashSchemeKind>())
                .transpose()?
                .unwrap_or_default(),
            log_mode: get(LOG_MODE_ENV)
                .map(|v| v.parse::<LogMode>())
                .transpose()?
                .unwrap_or_default(),
            log_file: get(LOG_FILE_ENV).map_or(defaults.log_file, PathBuf::from),
            static_salt,
        })
    }

    /// Build the configured password scheme.
    ///
    /// # Errors
    /// Returns error if the Argon2 parameters are rejected.
    pub fn password_scheme(&self) -> Result<Box<dyn PasswordScheme>, HashError> {
        let legacy = LegacySaltedSha256::new(self.static_salt.as_str());
        let scheme: Box<dyn PasswordScheme> = match self.hash_scheme {
            HashSchemeKind::Argon2 => Box::new(Argon2idScheme::new()?),
            HashSchemeKind::Legacy => Box::new(legacy),
            HashSchemeKind::Migrating => {
                Box::new(MigratingScheme::new(Argon2idScheme::new()?, legacy))
            }
        };
        Ok(scheme)
    }
}

fn read_salt_file(path: PathBuf) -> Result<Zeroizing<String>, ConfigError> {
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::SaltFile {
        path: path.clone(),
        source,
    })?;
    let content = Zeroizing::new(content);
    let salt = content.trim_end_matches(['\n', '\r']);
    if salt.is_empty() {
        return Err(ConfigError::EmptySalt(path));
    }
    Ok(Zeroizing::new(salt.to_string()))
}
