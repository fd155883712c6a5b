use axum::extract::{Path, Query, State};
use services::user_service::UserView;
use util::pagination::{Page, PageQuery, Pagination};

use crate::response::{ApiResult, ok};
use crate::state::AppState;

/// GET /api/v1/users
///
/// Paginated with `page` / `limit`, oldest accounts first.
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "items": [ { "id": "...", "username": "admin", "role": "admin", "is_active": true } ],
///     "page": 1, "limit": 10, "total": 1
///   },
///   "message": "Users retrieved successfully"
/// }
/// ```
pub async fn list_users(State(state): State<AppState>, Query(query): Query<PageQuery>) -> ApiResult<Page<UserView>> {
    let page = state.users().list(&Pagination::from(&query)).await?;
    ok(page, "Users retrieved successfully")
}

/// GET /api/v1/users/{id}
pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UserView> {
    let user = state.users().get(&id).await?;
    ok(user, "User retrieved successfully")
}
