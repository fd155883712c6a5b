use axum::extract::{Path, Query, State};
use services::directory_service::{LecturerView, StudentView};
use util::pagination::{Page, PageQuery, Pagination};

use crate::auth::AuthUser;
use crate::response::{ApiResult, ok};
use crate::state::AppState;

/// GET /api/v1/lecturers
pub async fn list_lecturers(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<LecturerView>> {
    let page = state.directory().list_lecturers(&Pagination::from(&query)).await?;
    ok(page, "Lecturers retrieved successfully")
}

/// GET /api/v1/lecturers/{id}/advisees
///
/// A lecturer may only list their own advisees; admins may list anyone's.
///
/// - `403 Forbidden` for another lecturer's advisees
/// - `404 Not Found` if the lecturer does not exist
pub async fn get_advisees(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<StudentView>> {
    let advisees = state.directory().advisees(&user.caller(), &id).await?;
    ok(advisees, "Advisees retrieved successfully")
}
