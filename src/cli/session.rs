//! Session state: which page is showing and who is signed in.
//!
//! Allowed moves:
//!
//! ```text
//! Register --show_login--> Login
//! Login --show_register--> Register
//! Login --sign_in--------> Dashboard   (successful verify only)
//! Dashboard --logout-----> Login
//! ```
//!
//! Anything else is a `TransitionError` and leaves the context unchanged.

use crate::domain::{Role, UserRecord};

/// Current page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    Register,
    #[default]
    Login,
    Dashboard,
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Register => write!(f, "register"),
            Self::Login => write!(f, "login"),
            Self::Dashboard => write!(f, "dashboard"),
        }
    }
}

/// A move the session state machine refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot go from {from} to {to}")]
pub struct TransitionError {
    pub from: Page,
    pub to: Page,
}

/// Signed-in user as the dashboard sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub username: String,
    pub role: Role,
}

impl From<UserRecord> for CurrentUser {
    fn from(record: UserRecord) -> Self {
        Self {
            username: record.username,
            role: record.role,
        }
    }
}

/// Per-invocation session, owned by the command layer and passed explicitly.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    page: Page,
    current_user: Option<CurrentUser>,
}

impl SessionContext {
    /// Start on the login page with nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start on a given page. Starting on the dashboard is refused since no
    /// user has been verified.
    pub fn starting_at(page: Page) -> Result<Self, TransitionError> {
        if page == Page::Dashboard {
            return Err(TransitionError {
                from: Page::Login,
                to: Page::Dashboard,
            });
        }
        Ok(Self {
            page,
            current_user: None,
        })
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.current_user.as_ref()
    }

    /// Register -> Login.
    pub fn show_login(&mut self) -> Result<(), TransitionError> {
        self.move_to(Page::Register, Page::Login)
    }

    /// Login -> Register.
    pub fn show_register(&mut self) -> Result<(), TransitionError> {
        self.move_to(Page::Login, Page::Register)
    }

    /// Login -> Dashboard. Callers pass the record returned by a successful
    /// `CredentialStore::authenticate`.
    pub fn sign_in(&mut self, user: impl Into<CurrentUser>) -> Result<(), TransitionError> {
        self.move_to(Page::Login, Page::Dashboard)?;
        let user = user.into();
        tracing::debug!("Session opened for {}", user.username);
        self.current_user = Some(user);
        Ok(())
    }

    /// Dashboard -> Login, clearing the user.
    pub fn logout(&mut self) -> Result<(), TransitionError> {
        self.move_to(Page::Dashboard, Page::Login)?;
        self.current_user = None;
        Ok(())
    }

    fn move_to(&mut self, expected: Page, to: Page) -> Result<(), TransitionError> {
        if self.page != expected {
            return Err(TransitionError {
                from: self.page,
                to,
            });
        }
        self.page = to;
        Ok(())
    }
}
