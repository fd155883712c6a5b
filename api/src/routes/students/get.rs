use axum::extract::{Path, Query, State};
use services::achievement_service::AchievementView;
use services::directory_service::StudentView;
use util::pagination::{Page, PageQuery, Pagination};

use crate::response::{ApiResult, ok};
use crate::state::AppState;

/// GET /api/v1/students
///
/// Paginated, ordered by student number.
pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<StudentView>> {
    let page = state.directory().list_students(&Pagination::from(&query)).await?;
    ok(page, "Students retrieved successfully")
}

/// GET /api/v1/students/{id}
pub async fn get_student(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StudentView> {
    let student = state.directory().get_student(&id).await?;
    ok(student, "Student retrieved successfully")
}

/// GET /api/v1/students/{id}/achievements
///
/// Every live achievement of the student regardless of status.
///
/// - `404 Not Found` if the student does not exist
pub async fn get_student_achievements(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<AchievementView>> {
    let achievements = state.achievements().list_for_student(&id).await?;
    ok(achievements, "Student achievements retrieved successfully")
}
