use axum::extract::{Path, State};
use services::achievement_service::AchievementView;
use validator::Validate;

use super::common::AchievementRequest;
use crate::auth::AuthUser;
use crate::extract::JsonBody;
use crate::response::{ApiResult, ok};
use crate::state::AppState;

/// PUT /api/v1/achievements/{id}
///
/// Replaces the content of a draft. Only the owning student may do this.
///
/// - `200 OK`
/// - `400 Bad Request` (validation, or not in `draft`)
/// - `403 Forbidden` (not the owner)
/// - `404 Not Found`
pub async fn update_achievement(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<AchievementRequest>,
) -> ApiResult<AchievementView> {
    req.validate()?;
    let view = state.achievements().update(&user.caller(), &id, req.into()).await?;
    ok(view, "Achievement updated successfully")
}
