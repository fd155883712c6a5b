use axum::extract::{Path, State};

use crate::response::{ApiResult, ok};
use crate::state::AppState;

/// DELETE /api/v1/users/{id}
///
/// - `200 OK`
/// - `400 Bad Request` if the user's student profile still owns achievements
/// - `404 Not Found`
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.users().delete(&id).await?;
    ok((), "User deleted successfully")
}
