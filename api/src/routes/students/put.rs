use axum::extract::{Path, State};
use serde::Deserialize;
use services::directory_service::StudentView;

use crate::extract::JsonBody;
use crate::response::{ApiResult, ok};
use crate::state::AppState;

/// `null`, a missing field or an empty string clear the advisor.
#[derive(Debug, Deserialize)]
pub struct UpdateAdvisorRequest {
    #[serde(default)]
    pub advisor_id: Option<String>,
}

impl UpdateAdvisorRequest {
    fn advisor(&self) -> Option<&str> {
        self.advisor_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

/// PUT /api/v1/students/{id}/advisor
///
/// ```json
/// { "advisor_id": "<lecturer id>" }
/// ```
///
/// - `200 OK` with the updated student
/// - `400 Bad Request` if `advisor_id` is not a lecturer
/// - `404 Not Found` if the student does not exist
pub async fn update_advisor(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateAdvisorRequest>,
) -> ApiResult<StudentView> {
    let student = state.directory().update_advisor(&id, req.advisor()).await?;
    ok(student, "Advisor updated successfully")
}
