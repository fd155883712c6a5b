use axum::extract::State;
use services::user_service::UserView;
use validator::Validate;

use super::common::CreateUserRequest;
use crate::extract::JsonBody;
use crate::response::{ApiResult, created};
use crate::state::AppState;

/// POST /api/v1/users
///
/// Creates an account. A `student` or `lecturer` profile in the body is
/// created when the assigned role has that name; it is ignored otherwise.
///
/// ### Request Body
/// ```json
/// {
///   "username": "dina",
///   "email": "dina@uni.test",
///   "password": "password123",
///   "full_name": "Dina Maharani",
///   "role_id": "...",
///   "student": { "student_number": "S-0042", "program_study": "CS", "academic_year": "2025", "advisor_id": "..." }
/// }
/// ```
///
/// - `201 Created`
/// - `400 Bad Request` (validation, unknown role or advisor, duplicate username/email)
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> ApiResult<UserView> {
    req.validate()?;
    let user = state.users().create(req.into()).await?;
    created(user, "User created successfully")
}
