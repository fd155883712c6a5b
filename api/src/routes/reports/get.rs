use axum::extract::{Path, State};
use services::report_service::{AchievementStatistics, StudentReport};

use crate::response::{ApiResult, ok};
use crate::state::AppState;

/// GET /api/v1/reports/statistics
///
/// Totals over every verified achievement that still has a document.
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "total_verified_achievements": 2,
///     "total_points": 50,
///     "average_points": 25.0,
///     "achievement_by_type": { "competition": 1, "publication": 1 }
///   },
///   "message": "Statistics retrieved successfully"
/// }
/// ```
pub async fn get_statistics(State(state): State<AppState>) -> ApiResult<AchievementStatistics> {
    let stats = state.reports().statistics().await?;
    ok(stats, "Statistics retrieved successfully")
}

/// GET /api/v1/reports/student/{id}
///
/// - `200 OK` with totals, per-type sums and averages, and the verified documents
/// - `404 Not Found` if the student does not exist
pub async fn get_student_report(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StudentReport> {
    let report = state.reports().student_report(&id).await?;
    ok(report, "Student report retrieved successfully")
}
