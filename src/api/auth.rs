use axum::{
    Json,
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;
use uuid::Uuid;

use super::{ApiError, ApiResponse, AppState, UserDto};
use crate::services::{AuthContext, Registration, Role};

/// Session key holding the authenticated username.
const SESSION_USER_KEY: &str = "user";

/// Session key holding the pending OAuth state token.
const SESSION_OAUTH_STATE_KEY: &str = "oauth_state";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub surname: String,
    pub email: String,
    #[serde(default)]
    pub birthday: Option<String>,
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub role: Role,
    /// Where the client should navigate after login, by role.
    pub redirect: String,
}

#[derive(Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: String,
    pub state: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the session to an [`AuthContext`] and stores it in the request
/// extensions. Requests without a live session are rejected.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let username = session
        .get::<String>(SESSION_USER_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    let Some(username) = username else {
        return Ok((StatusCode::UNAUTHORIZED, "Unauthorized").into_response());
    };

    let Some(ctx) = state.auth_service().context_for(&username).await? else {
        // Session survived its account; drop it.
        let _ = session.flush().await;
        return Ok((StatusCode::UNAUTHORIZED, "Unauthorized").into_response());
    };

    tracing::Span::current().record("user_id", ctx.user_id);

    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}

/// Rejects principals without the admin role. Must run after
/// [`auth_middleware`] so the context is present.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let ctx = request
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    if !ctx.role.is_admin() {
        return Err(ApiError::Forbidden(
            "Administrator role required".to_string(),
        ));
    }

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Creates a local account: one user row plus one credentials row.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .auth_service()
        .register(Registration {
            name: payload.name,
            surname: payload.surname,
            email: payload.email,
            birthday: payload.birthday,
            username: payload.username,
            password: payload.password,
        })
        .await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// POST /auth/login
/// Authenticates with username and password and creates the session.
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth_service()
        .login(&payload.username, &payload.password)
        .await?;

    session
        .insert(SESSION_USER_KEY, &result.username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(LoginResponse {
        username: result.username,
        role: result.role,
        redirect: redirect_for(result.role).to_string(),
    })))
}

/// POST /auth/logout
/// Invalidates the session and removes the cookie.
pub async fn logout(session: Session) -> impl IntoResponse {
    let _ = session.flush().await;
    (StatusCode::OK, "Logged out")
}

/// GET /auth/google
/// Starts the Google OIDC flow by redirecting to the consent screen.
pub async fn google_login(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Redirect, ApiError> {
    let google = state
        .google()
        .ok_or_else(|| ApiError::validation("Google login is not enabled"))?;

    let state_token = Uuid::new_v4().simple().to_string();
    session
        .insert(SESSION_OAUTH_STATE_KEY, &state_token)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    Ok(Redirect::to(&google.authorize_url(&state_token)))
}

/// GET /auth/google/callback
/// Completes the OIDC flow: validates state, exchanges the code, fetches
/// userinfo, provisions on first login, and creates the session.
pub async fn google_callback(
    State(state): State<Arc<AppState>>,
    session: Session,
    Query(params): Query<OAuthCallbackQuery>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let google = state
        .google()
        .ok_or_else(|| ApiError::validation("Google login is not enabled"))?;

    let expected: Option<String> = session
        .remove(SESSION_OAUTH_STATE_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    if expected.as_deref() != Some(params.state.as_str()) {
        return Err(ApiError::Unauthorized("OAuth state mismatch".to_string()));
    }

    let profile = google
        .login(&params.code)
        .await
        .map_err(|e| ApiError::google_error(e.to_string()))?;

    let result = state.auth_service().login_google(profile).await?;

    session
        .insert(SESSION_USER_KEY, &result.username)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    Ok(Json(ApiResponse::success(LoginResponse {
        username: result.username,
        role: result.role,
        redirect: redirect_for(result.role).to_string(),
    })))
}

// ============================================================================
// Helpers
// ============================================================================

/// Post-login navigation target by role.
const fn redirect_for(role: Role) -> &'static str {
    if role.is_admin() { "/admin" } else { "/" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_by_role() {
        assert_eq!(redirect_for(Role::Admin), "/admin");
        assert_eq!(redirect_for(Role::Default), "/");
    }
}
