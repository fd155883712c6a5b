use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::TypedHeader;
use headers::{Authorization, authorization::Bearer};

use crate::auth::claims::AuthUser;
use crate::response::ApiError;
use crate::state::AppState;

/// Extracts `AuthUser` from the `Authorization: Bearer <jwt>` header.
///
/// If the permission guard already resolved the caller for this request, its
/// copy (with permissions loaded) is returned instead of decoding again.
///
/// # Errors
/// - `401 Unauthorized` if the header is missing or malformed, or the token is
///   invalid or expired.
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::unauthorized("Missing or invalid Authorization header"))?;

        let claims = state.tokens().decode_access(bearer.token())?;
        Ok(AuthUser(claims))
    }
}
