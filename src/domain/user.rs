//! User records for the credential gate.

use serde::{Deserialize, Serialize};

/// What a signed-in user is allowed to see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[serde(alias = "Doctor")]
    Doctor,
    #[serde(alias = "Health Worker", alias = "HealthWorker")]
    HealthWorker,
    #[default]
    #[serde(alias = "Viewer")]
    Viewer,
}

impl Role {
    /// Human-readable label for the role.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Doctor => "Doctor",
            Self::HealthWorker => "Health Worker",
            Self::Viewer => "Viewer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "doctor" => Ok(Self::Doctor),
            "health_worker" | "healthworker" => Ok(Self::HealthWorker),
            "viewer" => Ok(Self::Viewer),
            other => Err(format!("unknown role '{other}' (expected doctor, health_worker or viewer)")),
        }
    }
}

/// A registered user.
///
/// Stored under its username key; the key is not repeated in the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(skip)]
    pub username: String,

    /// Output of the configured password scheme (hex digest or PHC string)
    #[serde(rename = "hash")]
    pub password_hash: String,

    #[serde(default)]
    pub role: Role,

    /// Registration time, absent in stores written by older versions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl UserRecord {
    #[must_use]
    pub fn new(username: impl Into<String>, password_hash: String, role: Role) -> Self {
        Self {
            username: username.into(),
            password_hash,
            role,
            created_at: Some(chrono::Utc::now()),
        }
    }
}

// Keep the hash out of logs and panic messages.
impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("username", &self.username)
            .field("role", &self.role)
            .field("hash_len", &self.password_hash.len())
            .finish()
    }
}
