use axum::extract::State;
use serde::Deserialize;
use services::auth_service::{LoginResult, TokenPair};
use validator::Validate;

use crate::auth::AuthUser;
use crate::extract::JsonBody;
use crate::response::{ApiResult, ok};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email.
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// POST /api/v1/auth/login
///
/// ### Request Body
/// ```json
/// { "username": "alice", "password": "password123" }
/// ```
///
/// ### Responses
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "access_token": "...",
///     "refresh_token": "...",
///     "token_type": "Bearer",
///     "expires_in": 7200,
///     "user": { "id": "...", "username": "alice", "role": "student", "permissions": ["achievement:create", "..."] }
///   },
///   "message": "Login successful"
/// }
/// ```
/// - `400 Bad Request` (missing fields)
/// - `401 Unauthorized` (`Invalid username or password`, `Account is inactive`)
pub async fn login(State(state): State<AppState>, JsonBody(req): JsonBody<LoginRequest>) -> ApiResult<LoginResult> {
    req.validate()?;
    let result = state.auth().login(&req.username, &req.password).await?;
    ok(result, "Login successful")
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "refresh_token is required"))]
    pub refresh_token: String,
}

/// POST /api/v1/auth/refresh
///
/// Exchanges a refresh token for a new pair. The presented token must be the
/// one issued most recently for its user; it stops working once used.
///
/// - `200 OK` with the same token fields as login (without `user`)
/// - `401 Unauthorized` (`Invalid or expired refresh token`, `Refresh token has been revoked`)
pub async fn refresh(State(state): State<AppState>, JsonBody(req): JsonBody<RefreshRequest>) -> ApiResult<TokenPair> {
    req.validate()?;
    let tokens = state.auth().refresh(&req.refresh_token).await?;
    ok(tokens, "Token refreshed")
}

/// POST /api/v1/auth/logout
///
/// Revokes the caller's refresh token. The access token stays valid until it
/// expires.
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> ApiResult<()> {
    state.auth().logout(user.user_id()).await?;
    ok((), "Logged out")
}
