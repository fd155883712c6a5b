use axum::extract::{Path, State};

use crate::auth::AuthUser;
use crate::response::{ApiResult, ok};
use crate::state::AppState;

/// DELETE /api/v1/achievements/{id}
///
/// Soft-deletes a draft owned by the caller. Deleted achievements disappear
/// from every read.
///
/// - `200 OK` with `data: null`
/// - `400 Bad Request` (not in `draft`)
/// - `403 Forbidden` (not the owner)
/// - `404 Not Found`
pub async fn delete_achievement(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.achievements().delete(&user.caller(), &id).await?;
    ok((), "Achievement deleted successfully")
}
