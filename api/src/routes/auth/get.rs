use axum::extract::State;
use services::auth_service::Profile;

use crate::auth::AuthUser;
use crate::response::{ApiResult, ok};
use crate::state::AppState;

/// GET /api/v1/auth/profile
///
/// The caller's account, role, permissions and, when present, the `student`
/// or `lecturer` profile.
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "user": { "id": "...", "username": "alice", "email": "alice@uni.test", "full_name": "Alice", "is_active": true },
///     "role": "student",
///     "permissions": ["achievement:create", "..."],
///     "student": { "id": "...", "student_number": "S-1001", "advisor_id": "..." }
///   },
///   "message": "Profile retrieved successfully"
/// }
/// ```
pub async fn get_profile(State(state): State<AppState>, user: AuthUser) -> ApiResult<Profile> {
    let profile = state.auth().profile(user.user_id()).await?;
    ok(profile, "Profile retrieved successfully")
}
