//! Domain service for registration, login and OIDC provisioning.

use serde::Serialize;
use thiserror::Error;

use crate::clients::google::GoogleProfile;
use crate::models::user::User;

/// Role stored on a credentials row for regular accounts.
pub const DEFAULT_ROLE: &str = "DEFAULT";

/// Role stored on a credentials row for administrators.
pub const ADMIN_ROLE: &str = "ADMIN";

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username already exists")]
    UsernameTaken,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Principal role, parsed from the stored role string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Default,
    Admin,
}

impl Role {
    #[must_use]
    pub fn parse(role: &str) -> Self {
        if role == ADMIN_ROLE {
            Self::Admin
        } else {
            Self::Default
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => ADMIN_ROLE,
            Self::Default => DEFAULT_ROLE,
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Per-request principal, resolved from the session by middleware and
/// passed explicitly to handlers and services.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

/// Fields submitted on the registration form.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub birthday: Option<String>,
    pub username: String,
    pub password: String,
}

/// Login result carrying the principal identity and role.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Registers a local account: one user row plus one credentials row.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UsernameTaken`] when the username is already
    /// registered; no second credentials row is created in that case.
    async fn register(&self, registration: Registration) -> Result<User, AuthError>;

    /// Verifies a username/password pair and returns the principal.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if verification fails.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Logs in a Google OIDC principal, provisioning a user and a
    /// credentials row (random unusable password) on first sight of the
    /// (email, "google") pair. A second login provisions nothing.
    async fn login_google(&self, profile: GoogleProfile) -> Result<LoginResult, AuthError>;

    /// Resolves the auth context for a session's username, if it still
    /// maps to an account.
    async fn context_for(&self, username: &str) -> Result<Option<AuthContext>, AuthError>;
}
