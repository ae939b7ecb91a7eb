//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::clients::google::GoogleProfile;
use crate::config::SecurityConfig;
use crate::db::Store;
use crate::db::repositories::credentials::generate_random_password;
use crate::models::user::{DEFAULT_PROVIDER, GOOGLE_PROVIDER, NewUser, User};
use crate::services::auth_service::{
    AuthContext, AuthError, AuthService, DEFAULT_ROLE, LoginResult, Registration, Role,
};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn validate_registration(registration: &Registration) -> Result<(), AuthError> {
        let required = [
            ("name", &registration.name),
            ("surname", &registration.surname),
            ("email", &registration.email),
            ("username", &registration.username),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(AuthError::Validation(format!("{field} is required")));
            }
        }

        if registration.password.len() < 8 {
            return Err(AuthError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        Self::validate_registration(&registration)?;

        // Checked proactively so the form gets a stable username-exists
        // answer; the unique column backstops concurrent registrations.
        if self.store.credentials_exist(&registration.username).await? {
            return Err(AuthError::UsernameTaken);
        }

        let user = self
            .store
            .insert_user(NewUser {
                name: registration.name,
                surname: registration.surname,
                email: registration.email,
                birthday: registration.birthday,
                provider: DEFAULT_PROVIDER.to_string(),
            })
            .await?;

        self.store
            .insert_credentials(
                &registration.username,
                &registration.password,
                DEFAULT_ROLE,
                user.id,
                Some(&self.security),
            )
            .await?;

        info!("Registered user {} ({})", registration.username, user.id);

        Ok(user)
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let is_valid = self.store.verify_password(username, password).await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let (credentials, user) = self
            .store
            .get_credentials_with_user(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(LoginResult {
            user_id: user.id,
            username: credentials.username,
            role: Role::parse(&credentials.role),
        })
    }

    async fn login_google(&self, profile: GoogleProfile) -> Result<LoginResult, AuthError> {
        let existing = self
            .store
            .get_user_by_email_and_provider(&profile.email, GOOGLE_PROVIDER)
            .await?;

        let user = if let Some(user) = existing {
            user
        } else {
            // The email doubles as the username; a local account already
            // holding it cannot be silently taken over.
            if self.store.credentials_exist(&profile.email).await? {
                return Err(AuthError::UsernameTaken);
            }

            let user = self
                .store
                .insert_user(NewUser {
                    name: profile.given_name.unwrap_or_default(),
                    surname: profile.family_name.unwrap_or_default(),
                    email: profile.email.clone(),
                    birthday: profile.birthdate,
                    provider: GOOGLE_PROVIDER.to_string(),
                })
                .await?;

            self.store
                .insert_credentials(
                    &profile.email,
                    &generate_random_password(),
                    DEFAULT_ROLE,
                    user.id,
                    Some(&self.security),
                )
                .await?;

            info!("Provisioned Google user {} ({})", profile.email, user.id);

            user
        };

        let credentials = self
            .store
            .get_credentials_by_user_id(user.id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(LoginResult {
            user_id: user.id,
            username: credentials.username,
            role: Role::parse(&credentials.role),
        })
    }

    async fn context_for(&self, username: &str) -> Result<Option<AuthContext>, AuthError> {
        let Some((credentials, user)) = self.store.get_credentials_with_user(username).await?
        else {
            return Ok(None);
        };

        Ok(Some(AuthContext {
            user_id: user.id,
            username: credentials.username,
            role: Role::parse(&credentials.role),
        }))
    }
}
