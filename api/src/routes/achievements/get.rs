use axum::extract::{Path, Query, State};
use db::models::achievement_status_history;
use services::achievement_service::AchievementView;
use util::pagination::{Page, PageQuery, Pagination};

use crate::auth::AuthUser;
use crate::response::{ApiResult, ok};
use crate::state::AppState;

/// GET /api/v1/achievements
///
/// Role-scoped list:
/// - student: own achievements (any status except deleted)
/// - lecturer: advisees' achievements in `submitted`
/// - admin: everything not deleted
///
/// ### Query Parameters
/// - `page` (default 1), `limit` (default 10). Invalid values fall back to the defaults.
///
/// ```json
/// {
///   "success": true,
///   "data": { "items": [ { "id": "...", "status": "draft", "title": "..." } ], "page": 1, "limit": 10, "total": 1 },
///   "message": "Achievements retrieved successfully"
/// }
/// ```
pub async fn list_achievements(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<AchievementView>> {
    let page = state
        .achievements()
        .list(&user.caller(), &Pagination::from(&query))
        .await?;
    ok(page, "Achievements retrieved successfully")
}

/// GET /api/v1/achievements/{id}
///
/// - `200 OK` with the joined reference and document
/// - `404 Not Found` if missing or deleted
pub async fn get_achievement(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<AchievementView> {
    let view = state.achievements().get(&id).await?;
    ok(view, "Achievement retrieved successfully")
}

/// GET /api/v1/achievements/{id}/history
///
/// Status transitions, oldest first.
///
/// ```json
/// {
///   "success": true,
///   "data": [
///     { "from_status": null, "to_status": "draft", "changed_by": "...", "note": null, "created_at": "..." },
///     { "from_status": "draft", "to_status": "submitted", "changed_by": "...", "note": null, "created_at": "..." }
///   ],
///   "message": "History retrieved successfully"
/// }
/// ```
pub async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<achievement_status_history::Model>> {
    let history = state.achievements().history(&id).await?;
    ok(history, "History retrieved successfully")
}
